//! Locale derivation from index filenames
//!
//! A content directory holds one index file per locale:
//! `index.md` belongs to the primary locale, `index.fr.mdx` to `fr`.

use std::path::Path;
use thiserror::Error;

/// Reserved stem of every content index file
pub const INDEX_MARKER: &str = "index";

/// Reasons an index filename cannot be parsed
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LocaleError {
    #[error("filename is empty")]
    Empty,

    #[error("'{0}' is not an index file")]
    NotIndex(String),

    #[error("'{0}' has no extension")]
    MissingExtension(String),

    #[error("'{0}' has an empty locale segment")]
    EmptyLocale(String),

    #[error("'{0}' has more than one locale segment")]
    TooManySegments(String),
}

/// A parsed `index[.<locale>].<ext>` filename
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexFilename<'a> {
    /// Locale suffix, `None` for the primary locale
    pub locale: Option<&'a str>,
    /// File extension without the dot
    pub extension: &'a str,
}

impl<'a> IndexFilename<'a> {
    /// Resolve the locale, falling back to the primary locale
    pub fn locale_or<'b>(&self, primary: &'b str) -> &'b str
    where
        'a: 'b,
    {
        self.locale.unwrap_or(primary)
    }
}

/// Parse an index filename into its locale and extension
pub fn parse_index_filename(name: &str) -> Result<IndexFilename<'_>, LocaleError> {
    if name.is_empty() {
        return Err(LocaleError::Empty);
    }

    let segments: Vec<&str> = name.split('.').collect();
    if segments[0] != INDEX_MARKER {
        return Err(LocaleError::NotIndex(name.to_string()));
    }

    match segments.as_slice() {
        [_] => Err(LocaleError::MissingExtension(name.to_string())),
        [_, ext] if ext.is_empty() => Err(LocaleError::MissingExtension(name.to_string())),
        [_, ext] => Ok(IndexFilename {
            locale: None,
            extension: *ext,
        }),
        [_, _, ext] if ext.is_empty() => Err(LocaleError::MissingExtension(name.to_string())),
        [_, locale, _] if locale.is_empty() => Err(LocaleError::EmptyLocale(name.to_string())),
        [_, locale, ext] => Ok(IndexFilename {
            locale: Some(*locale),
            extension: *ext,
        }),
        _ => Err(LocaleError::TooManySegments(name.to_string())),
    }
}

/// Locale of a source path, falling back to `primary` when the filename
/// is not a well-formed index filename
pub fn locale_from_path(path: &Path, primary: &str) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .and_then(|n| parse_index_filename(n).ok())
        .and_then(|f| f.locale)
        .unwrap_or(primary)
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_locale() {
        let parsed = parse_index_filename("index.md").unwrap();
        assert_eq!(parsed.locale, None);
        assert_eq!(parsed.extension, "md");
        assert_eq!(parsed.locale_or("en"), "en");
    }

    #[test]
    fn test_locale_suffix() {
        let parsed = parse_index_filename("index.fr.mdx").unwrap();
        assert_eq!(parsed.locale, Some("fr"));
        assert_eq!(parsed.extension, "mdx");
        assert_eq!(parsed.locale_or("en"), "fr");
    }

    #[test]
    fn test_malformed_filenames() {
        assert_eq!(parse_index_filename(""), Err(LocaleError::Empty));
        assert_eq!(
            parse_index_filename("readme.md"),
            Err(LocaleError::NotIndex("readme.md".into()))
        );
        assert_eq!(
            parse_index_filename("index"),
            Err(LocaleError::MissingExtension("index".into()))
        );
        assert_eq!(
            parse_index_filename("index."),
            Err(LocaleError::MissingExtension("index.".into()))
        );
        assert_eq!(
            parse_index_filename("index..md"),
            Err(LocaleError::EmptyLocale("index..md".into()))
        );
        assert_eq!(
            parse_index_filename("index.fr.draft.md"),
            Err(LocaleError::TooManySegments("index.fr.draft.md".into()))
        );
    }

    #[test]
    fn test_locale_from_path() {
        let path = Path::new("content/blog/hello-world/index.es.md");
        assert_eq!(locale_from_path(path, "en"), "es");
        assert_eq!(locale_from_path(Path::new("content/blog/x/index.md"), "en"), "en");
        assert_eq!(locale_from_path(Path::new("content/blog/x/notes.txt"), "en"), "en");
    }
}
