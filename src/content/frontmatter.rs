//! Front-matter extraction
//!
//! A content item is a directory holding one `index[.<locale>].<ext>` file
//! per locale. Markdown files (`md`, `mdx`) carry a `---` fenced YAML block;
//! template components (`astro`) carry a `---` fenced script whose `meta`
//! export holds the metadata.

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use tokio::fs;

use super::error::ContentError;
use super::locale::{parse_index_filename, INDEX_MARKER};
use super::meta::parse_meta_export;

lazy_static! {
    static ref TEMPLATE_HEADER: Regex = Regex::new(r"(?s)---\s*\n(.*)\n---\s*\n").unwrap();
}

/// OS metadata and editor droppings that never count as content
const JUNK_NAMES: &[&str] = &[
    ".DS_Store",
    ".AppleDouble",
    ".LSOverride",
    ".Spotlight-V100",
    ".Trashes",
    "__MACOSX",
    "Thumbs.db",
    "ehthumbs.db",
    "Desktop.ini",
    "desktop.ini",
    "npm-debug.log",
    ".localized",
];

/// Whether a directory entry name is filesystem junk
pub fn is_junk(name: &str) -> bool {
    JUNK_NAMES.contains(&name)
        || name.starts_with("._")
        || name.ends_with('~')
        || (name.starts_with(".#") && name.len() > 2)
        || name.ends_with(".swp")
}

/// Custom deserializer that handles both a single string and a list of strings
pub(crate) fn string_or_vec<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::{self, SeqAccess, Visitor};
    use std::fmt;

    struct StringOrVec;

    impl<'de> Visitor<'de> for StringOrVec {
        type Value = Vec<String>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a string or a list of strings")
        }

        fn visit_str<E>(self, value: &str) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(vec![value.to_string()])
        }

        fn visit_seq<S>(self, mut seq: S) -> Result<Self::Value, S::Error>
        where
            S: SeqAccess<'de>,
        {
            let mut vec = Vec::new();
            while let Some(item) = seq.next_element::<String>()? {
                vec.push(item);
            }
            Ok(vec)
        }

        fn visit_none<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }

        fn visit_unit<E>(self) -> Result<Self::Value, E>
        where
            E: de::Error,
        {
            Ok(Vec::new())
        }
    }

    deserializer.deserialize_any(StringOrVec)
}

/// Accepts `order: 3` as well as `order: "3"`
pub(crate) fn optional_string_or_number<'de, D>(
    deserializer: D,
) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum StringOrNumber {
        String(String),
        Number(serde_json::Number),
    }

    Ok(
        Option::<StringOrNumber>::deserialize(deserializer)?.map(|value| match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Number(n) => n.to_string(),
        }),
    )
}

/// Source formats an index file can be written in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    /// `md` / `mdx` with a YAML block
    Markdown,
    /// `astro` component with a `meta` export
    Template,
}

impl SourceFormat {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext {
            "md" | "mdx" => Some(SourceFormat::Markdown),
            "astro" => Some(SourceFormat::Template),
            _ => None,
        }
    }
}

/// One locale variant of a content item, as read from disk
#[derive(Debug, Clone, PartialEq)]
pub struct FrontmatterResult {
    pub locale: String,
    /// Metadata mapping
    pub data: Value,
    /// Body text after the header, unmodified
    pub content: String,
    /// File the variant was read from
    pub source: PathBuf,
}

/// Split a Markdown document into its YAML block and body.
///
/// Returns `(None, source)` when the document has no front-matter.
pub fn split_markdown(source: &str) -> (Option<&str>, &str) {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);

    // `----` is a thematic break, not a fence
    if !source.starts_with("---") || source[3..].starts_with('-') {
        return (None, source);
    }

    let Some(open_end) = source.find('\n') else {
        return (None, source);
    };

    let Some(found) = source[open_end..].find("\n---") else {
        return (None, source);
    };
    let close = open_end + found;

    let yaml = if close > open_end {
        &source[open_end + 1..close]
    } else {
        ""
    };

    let body = &source[close + 4..];
    let body = body.strip_prefix('\r').unwrap_or(body);
    let body = body.strip_prefix('\n').unwrap_or(body);

    (Some(yaml), body)
}

/// Parse a Markdown index file into `(metadata, body)`
pub fn parse_markdown(path: &Path, source: &str) -> Result<(Value, String), ContentError> {
    let (yaml, body) = split_markdown(source);

    let data = match yaml {
        Some(yaml) if !yaml.trim().is_empty() => {
            let value: Value =
                serde_yaml::from_str(yaml).map_err(|source| ContentError::InvalidYaml {
                    path: path.to_path_buf(),
                    source,
                })?;
            match value {
                Value::Object(_) => value,
                Value::Null => Value::Object(Map::new()),
                _ => {
                    return Err(ContentError::NotAMapping {
                        path: path.to_path_buf(),
                    })
                }
            }
        }
        _ => Value::Object(Map::new()),
    };

    Ok((data, body.to_string()))
}

/// Parse a template component into `(meta, body)`
pub fn parse_template(path: &Path, source: &str) -> Result<(Value, String), ContentError> {
    let missing_header = || ContentError::MissingHeader {
        path: path.to_path_buf(),
    };

    let captures = TEMPLATE_HEADER.captures(source).ok_or_else(missing_header)?;
    let (Some(whole), Some(header)) = (captures.get(0), captures.get(1)) else {
        return Err(missing_header());
    };
    if header.as_str().is_empty() {
        return Err(missing_header());
    }

    let meta = parse_meta_export(header.as_str())
        .map_err(|source| ContentError::Meta {
            path: path.to_path_buf(),
            source,
        })?
        .ok_or_else(|| ContentError::MissingMetaExport {
            path: path.to_path_buf(),
        })?;

    Ok((meta, source[whole.end()..].to_string()))
}

/// Parse an index file's contents according to its format
pub fn parse_source(
    path: &Path,
    format: SourceFormat,
    source: &str,
) -> Result<(Value, String), ContentError> {
    match format {
        SourceFormat::Markdown => parse_markdown(path, source),
        SourceFormat::Template => parse_template(path, source),
    }
}

/// Read every locale variant of the content item in `dir`.
///
/// `index.<ext>` belongs to `primary_locale`. Results are in filename order.
pub async fn get_frontmatter(
    dir: &Path,
    primary_locale: &str,
) -> Result<Vec<FrontmatterResult>, ContentError> {
    let mut entries = fs::read_dir(dir)
        .await
        .map_err(|e| ContentError::io(dir, e))?;

    let mut names = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| ContentError::io(dir, e))?
    {
        let file_type = entry
            .file_type()
            .await
            .map_err(|e| ContentError::io(entry.path(), e))?;
        if !file_type.is_file() {
            continue;
        }
        if let Some(name) = entry.file_name().to_str() {
            names.push(name.to_string());
        }
    }
    names.sort();

    let marker = format!("{}.", INDEX_MARKER);
    let mut seen = HashSet::new();
    let mut results = Vec::new();

    for name in names {
        if is_junk(&name) || !name.starts_with(&marker) {
            continue;
        }

        let path = dir.join(&name);
        let extension = name.rsplit('.').next().unwrap_or_default();
        let Some(format) = SourceFormat::from_extension(extension) else {
            tracing::debug!("Skipping {:?}: unsupported extension", path);
            continue;
        };

        let parsed =
            parse_index_filename(&name).map_err(|source| ContentError::InvalidFilename {
                path: path.clone(),
                source,
            })?;

        let locale = parsed.locale_or(primary_locale).to_string();
        if !seen.insert(locale.clone()) {
            return Err(ContentError::DuplicateLocale {
                dir: dir.to_path_buf(),
                locale,
            });
        }

        let source = fs::read_to_string(&path)
            .await
            .map_err(|e| ContentError::io(&path, e))?;
        let (data, content) = parse_source(&path, format, &source)?;

        tracing::debug!("Read {} frontmatter from {:?}", locale, path);
        results.push(FrontmatterResult {
            locale,
            data,
            content,
            source: path,
        });
    }

    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_split_markdown() {
        let content = "---\ntitle: Hello World\ntags:\n  - rust\n---\n\nThis is the content.\n";
        let (yaml, body) = split_markdown(content);
        assert_eq!(yaml, Some("title: Hello World\ntags:\n  - rust"));
        assert_eq!(body, "\nThis is the content.\n");
    }

    #[test]
    fn test_split_markdown_without_frontmatter() {
        let content = "# Heading\n\n---\nnot: yaml\n---\n";
        assert_eq!(split_markdown(content), (None, content));

        let thematic = "----\nfoo\n";
        assert_eq!(split_markdown(thematic), (None, thematic));

        let unclosed = "---\ntitle: x\n";
        assert_eq!(split_markdown(unclosed), (None, unclosed));
    }

    #[test]
    fn test_split_markdown_empty_block() {
        let (yaml, body) = split_markdown("---\n---\nBody");
        assert_eq!(yaml, Some(""));
        assert_eq!(body, "Body");
    }

    #[test]
    fn test_parse_markdown() {
        let path = Path::new("post/index.md");
        let (data, body) =
            parse_markdown(path, "---\ntitle: Hi\norder: 2\n---\nBody text").unwrap();
        assert_eq!(data, json!({"title": "Hi", "order": 2}));
        assert_eq!(body, "Body text");
    }

    #[test]
    fn test_parse_markdown_rejects_non_mapping() {
        let path = Path::new("post/index.md");
        let err = parse_markdown(path, "---\n- a\n- b\n---\nBody").unwrap_err();
        assert!(matches!(err, ContentError::NotAMapping { .. }));
    }

    #[test]
    fn test_parse_template() {
        let source = r#"---
import Layout from "../../layouts/Layout.astro";
export const meta = {
    title: "A component post",
    authors: ["crutchcorn"],
};
---
<Layout>
    <p>Hello</p>
</Layout>
"#;
        let path = Path::new("post/index.astro");
        let (data, body) = parse_template(path, source).unwrap();
        assert_eq!(
            data,
            json!({"title": "A component post", "authors": ["crutchcorn"]})
        );
        assert_eq!(body, "<Layout>\n    <p>Hello</p>\n</Layout>\n");
    }

    #[test]
    fn test_parse_template_errors_name_path() {
        let path = Path::new("content/blog/broken/index.astro");

        let err = parse_template(path, "<div>No header</div>").unwrap_err();
        assert!(matches!(err, ContentError::MissingHeader { .. }));
        assert!(err.to_string().contains("content/blog/broken/index.astro"));

        let err = parse_template(path, "---\nconst x = 1;\n---\n<div />").unwrap_err();
        assert!(matches!(err, ContentError::MissingMetaExport { .. }));
        assert!(err.to_string().contains("does not define a 'meta' export"));
    }

    #[test]
    fn test_is_junk() {
        assert!(is_junk(".DS_Store"));
        assert!(is_junk("Thumbs.db"));
        assert!(is_junk("._index.md"));
        assert!(is_junk("index.md~"));
        assert!(!is_junk("index.md"));
        assert!(!is_junk("my-post"));
    }

    #[tokio::test]
    async fn test_get_frontmatter_locales() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("index.md"),
            "---\ntitle: Hello\n---\nEnglish body",
        )
        .unwrap();
        std::fs::write(
            dir.path().join("index.fr.md"),
            "---\ntitle: Bonjour\n---\nCorps français",
        )
        .unwrap();
        std::fs::write(dir.path().join(".DS_Store"), "junk").unwrap();
        std::fs::write(dir.path().join("cover.png"), "not read").unwrap();

        let results = get_frontmatter(dir.path(), "en").await.unwrap();
        assert_eq!(results.len(), 2);

        let fr = results.iter().find(|r| r.locale == "fr").unwrap();
        assert_eq!(fr.data, json!({"title": "Bonjour"}));
        assert_eq!(fr.content, "Corps français");

        let en = results.iter().find(|r| r.locale == "en").unwrap();
        assert_eq!(en.data, json!({"title": "Hello"}));
        assert_eq!(en.content, "English body");
        assert_eq!(en.source, dir.path().join("index.md"));
    }

    #[tokio::test]
    async fn test_get_frontmatter_duplicate_locale() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.md"), "---\ntitle: A\n---\n").unwrap();
        std::fs::write(dir.path().join("index.mdx"), "---\ntitle: B\n---\n").unwrap();

        let err = get_frontmatter(dir.path(), "en").await.unwrap_err();
        assert!(matches!(err, ContentError::DuplicateLocale { ref locale, .. } if locale == "en"));
    }

    #[tokio::test]
    async fn test_get_frontmatter_skips_backup_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.md"), "---\ntitle: A\n---\n").unwrap();
        std::fs::write(dir.path().join("index.fr.md.orig"), "---\ntitle: B\n---\n").unwrap();
        std::fs::write(dir.path().join("index.bak"), "").unwrap();

        let results = get_frontmatter(dir.path(), "en").await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].locale, "en");
    }

    #[tokio::test]
    async fn test_get_frontmatter_bad_locale_segments() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("index.fr.ca.md"), "---\ntitle: A\n---\n").unwrap();

        let err = get_frontmatter(dir.path(), "en").await.unwrap_err();
        assert!(matches!(err, ContentError::InvalidFilename { .. }));
    }

    #[tokio::test]
    async fn test_get_frontmatter_missing_dir() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = get_frontmatter(&missing, "en").await.unwrap_err();
        assert!(matches!(err, ContentError::Io { .. }));
    }
}
