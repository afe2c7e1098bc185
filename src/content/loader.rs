//! Content loader - builds the content store from the site directories

use anyhow::{Context, Result};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use super::error::ContentError;
use super::frontmatter::{get_frontmatter, is_junk, FrontmatterResult};
use super::image::{HeaderSizer, ImageMeta, ImageSizer};
use super::post::{parse_fields, CollectionInfo, PostInfo, RawCollectionInfo, RawPostInfo};
use super::roster::{AuthorProfile, Roster};
use super::store::ContentStore;
use super::words::count_words;
use crate::helpers::{format_date, generated_path, parse_date};
use crate::Site;

/// Locale variants of one content directory
struct ContentDir {
    slug: String,
    variants: Vec<FrontmatterResult>,
}

impl ContentDir {
    fn locales(&self) -> Vec<String> {
        self.variants.iter().map(|v| v.locale.clone()).collect()
    }
}

/// Loads posts, collections and the roster of a site
pub struct ContentLoader<'a> {
    site: &'a Site,
    sizer: Arc<dyn ImageSizer>,
}

impl<'a> ContentLoader<'a> {
    /// Create a new content loader reading image headers itself
    pub fn new(site: &'a Site) -> Self {
        Self::with_sizer(site, Arc::new(HeaderSizer))
    }

    /// Create a content loader with a custom image sizer
    pub fn with_sizer(site: &'a Site, sizer: Arc<dyn ImageSizer>) -> Self {
        Self { site, sizer }
    }

    /// Load everything into an immutable store
    pub async fn load(&self) -> Result<ContentStore> {
        let config = &self.site.config;

        let roster = Roster::load(
            &self.site.data_dir,
            &config.data_server_dir(),
            self.sizer.as_ref(),
            config.strict_references,
        )
        .await
        .with_context(|| format!("Failed to load roster from {:?}", self.site.data_dir))?;

        let collections = self.load_collections(&roster).await?;
        let mut posts = self.load_posts(&roster, &collections).await?;

        sort_posts(&mut posts);
        assign_banners(&mut posts, config.posts_per_page, &config.generated_dir);

        let tags: BTreeSet<String> = posts
            .iter()
            .flat_map(|p| p.tags().iter().cloned())
            .collect();

        tracing::info!(
            "Loaded {} posts, {} collections, {} authors and {} tags",
            posts.len(),
            collections.len(),
            roster.authors.len(),
            tags.len()
        );

        Ok(ContentStore::new(
            roster,
            collections,
            posts,
            tags,
            config.default_locale.clone(),
        ))
    }

    /// Load every collection variant, in directory order
    async fn load_collections(&self, roster: &Roster) -> Result<Vec<Arc<CollectionInfo>>> {
        let dirs = read_content_dirs(
            &self.site.collections_dir,
            &self.site.config.default_locale,
        )
        .await?;

        let mut collections = Vec::new();
        for dir in dirs {
            let locales = dir.locales();
            for variant in dir.variants {
                let collection = self
                    .build_collection(&dir.slug, &locales, variant, roster)
                    .await?;
                collections.push(Arc::new(collection));
            }
        }

        Ok(collections)
    }

    async fn build_collection(
        &self,
        slug: &str,
        locales: &[String],
        variant: FrontmatterResult,
        roster: &Roster,
    ) -> Result<CollectionInfo, ContentError> {
        let FrontmatterResult {
            locale,
            data,
            content,
            source,
        } = variant;
        let frontmatter: RawCollectionInfo = parse_fields(&source, data)?;

        let authors_meta = self.resolve_authors(&frontmatter.authors, roster, &source)?;

        let dir = source.parent().unwrap_or(Path::new("."));
        let cover_img_meta = ImageMeta::resolve(
            self.sizer.as_ref(),
            &frontmatter.cover_img,
            dir,
            &self.site.config.collection_server_dir(slug),
        )
        .await?;

        tracing::debug!("Loaded collection {} ({})", slug, locale);
        Ok(CollectionInfo {
            frontmatter,
            slug: slug.to_string(),
            locale,
            locales: locales.to_vec(),
            authors_meta,
            cover_img_meta,
            content,
            source,
        })
    }

    /// Load every post variant, in directory order
    async fn load_posts(
        &self,
        roster: &Roster,
        collections: &[Arc<CollectionInfo>],
    ) -> Result<Vec<PostInfo>> {
        let dirs = read_content_dirs(&self.site.posts_dir, &self.site.config.default_locale).await?;

        let mut posts = Vec::new();
        for dir in dirs {
            let locales = dir.locales();
            for variant in dir.variants {
                let ordinal = posts.len();
                let post = self.build_post(&dir.slug, &locales, variant, roster, collections, ordinal)?;
                posts.push(post);
            }
        }

        Ok(posts)
    }

    fn build_post(
        &self,
        slug: &str,
        locales: &[String],
        variant: FrontmatterResult,
        roster: &Roster,
        collections: &[Arc<CollectionInfo>],
        ordinal: usize,
    ) -> Result<PostInfo, ContentError> {
        let config = &self.site.config;
        let FrontmatterResult {
            locale,
            data,
            content,
            source,
        } = variant;
        let frontmatter: RawPostInfo = parse_fields(&source, data)?;

        let authors_meta = self.resolve_authors(&frontmatter.authors, roster, &source)?;

        let published_at = parse_optional_date(&source, frontmatter.published.as_deref())?;
        let edited_at = parse_optional_date(&source, frontmatter.edited.as_deref())?;

        let license_meta = match frontmatter.license.as_deref() {
            Some(id) => self
                .resolve_reference(roster.license(id).cloned(), &source, "license", id)?,
            None => None,
        };

        let collection_meta = match frontmatter.collection.as_deref() {
            Some(id) => self.resolve_reference(
                find_collection(collections, id, &locale).cloned(),
                &source,
                "collection",
                id,
            )?,
            None => None,
        };

        tracing::debug!("Loaded post {} ({})", slug, locale);
        Ok(PostInfo {
            slug: slug.to_string(),
            locale,
            locales: locales.to_vec(),
            authors_meta,
            word_count: count_words(&content).total(),
            published_meta: published_at.map(|d| format_date(&d, &config.date_format)),
            edited_meta: edited_at.map(|d| format_date(&d, &config.date_format)),
            license_meta,
            collection_meta,
            social_img: generated_path(&config.generated_dir, slug, "twitter-preview.jpg"),
            banner_img: None,
            published_at,
            ordinal,
            content,
            source,
            frontmatter,
        })
    }

    /// Look up each author id, keeping one entry per id
    fn resolve_authors(
        &self,
        ids: &[String],
        roster: &Roster,
        source: &Path,
    ) -> Result<Vec<Option<Arc<AuthorProfile>>>, ContentError> {
        ids.iter()
            .map(|id| self.resolve_reference(roster.author(id).cloned(), source, "author", id))
            .collect()
    }

    /// Unresolved references are fatal in strict mode and `None` otherwise
    fn resolve_reference<T>(
        &self,
        found: Option<T>,
        source: &Path,
        kind: &'static str,
        id: &str,
    ) -> Result<Option<T>, ContentError> {
        if found.is_none() {
            if self.site.config.strict_references {
                return Err(ContentError::UnresolvedReference {
                    path: source.to_path_buf(),
                    kind,
                    id: id.to_string(),
                });
            }
            tracing::warn!("{:?} references unknown {} '{}'", source, kind, id);
        }
        Ok(found)
    }
}

/// A collection by slug, preferring the given locale
fn find_collection<'c>(
    collections: &'c [Arc<CollectionInfo>],
    slug: &str,
    locale: &str,
) -> Option<&'c Arc<CollectionInfo>> {
    collections
        .iter()
        .find(|c| c.slug == slug && c.locale == locale)
        .or_else(|| collections.iter().find(|c| c.slug == slug))
}

fn parse_optional_date(
    source: &Path,
    value: Option<&str>,
) -> Result<Option<chrono::DateTime<chrono::FixedOffset>>, ContentError> {
    value
        .map(|s| {
            parse_date(s).ok_or_else(|| ContentError::InvalidDate {
                path: source.to_path_buf(),
                value: s.to_string(),
            })
        })
        .transpose()
}

/// Non-junk subdirectories of `root`, sorted by name
async fn list_content_dirs(root: &Path) -> Result<Vec<(String, PathBuf)>> {
    let mut entries = tokio::fs::read_dir(root)
        .await
        .with_context(|| format!("Failed to read directory: {:?}", root))?;

    let mut dirs = Vec::new();
    while let Some(entry) = entries
        .next_entry()
        .await
        .with_context(|| format!("Failed to read directory: {:?}", root))?
    {
        let Some(name) = entry.file_name().to_str().map(String::from) else {
            continue;
        };
        if is_junk(&name) || !entry.file_type().await?.is_dir() {
            continue;
        }
        dirs.push((name, entry.path()));
    }
    dirs.sort();

    Ok(dirs)
}

/// Read the front-matter of every content directory under `root`, one task
/// per directory. Results keep directory order.
async fn read_content_dirs(root: &Path, primary_locale: &str) -> Result<Vec<ContentDir>> {
    let dirs = list_content_dirs(root).await?;

    let mut tasks = JoinSet::new();
    for (index, (slug, dir)) in dirs.into_iter().enumerate() {
        let primary_locale = primary_locale.to_string();
        tasks.spawn(async move {
            let variants = get_frontmatter(&dir, &primary_locale).await;
            (index, slug, variants)
        });
    }

    let mut indexed = Vec::with_capacity(tasks.len());
    while let Some(joined) = tasks.join_next().await {
        let (index, slug, variants) = joined.context("Content task failed")?;
        indexed.push((index, ContentDir {
            slug,
            variants: variants?,
        }));
    }
    indexed.sort_by_key(|(index, _)| *index);

    Ok(indexed.into_iter().map(|(_, dir)| dir).collect())
}

/// Publication date, newest first.
///
/// A comparator that only answers "before" or "after" is not a total order,
/// and `sort_by` may panic on one. Ties are therefore broken explicitly:
/// equal dates put the later-read post first, which is the order such a
/// comparator produces on a stable sort, and posts without a date sort last.
pub fn newest_first(a: &PostInfo, b: &PostInfo) -> Ordering {
    match (a.published_at, b.published_at) {
        (Some(x), Some(y)) if x != y => y.cmp(&x),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        _ => b.ordinal.cmp(&a.ordinal),
    }
}

/// Sort posts with [`newest_first`]
pub fn sort_posts(posts: &mut [PostInfo]) {
    posts.sort_by(newest_first);
}

/// Give a banner to the first and middle post of every page, per locale
pub fn assign_banners(posts: &mut [PostInfo], per_page: usize, generated_dir: &str) {
    let per_page = per_page.max(1);
    let mut counters: HashMap<String, usize> = HashMap::new();

    for post in posts.iter_mut() {
        let count = *counters
            .entry(post.locale.clone())
            .and_modify(|c| *c += 1)
            .or_insert(0);

        let index = count % per_page;
        if index == 0 || index == per_page / 2 {
            post.banner_img = Some(generated_path(generated_dir, &post.slug, "banner.jpg"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content::image::tests::png_header;
    use crate::content::post::tests::test_post;
    use crate::content::roster::tests::write_data_dir;

    fn write(path: &Path, content: impl AsRef<[u8]>) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, content).unwrap();
    }

    /// A site with one collection in two locales and one bilingual post
    fn create_site(root: &Path) {
        write_data_dir(
            &root.join("content/data"),
            r#"[{"id": "crutchcorn", "name": "Corbin Crutchley", "profileImg": "avatar.png"}]"#,
        );

        let guide = root.join("content/collections/guide");
        write(&guide.join("index.md"), "---\ntitle: The Guide\ncoverImg: ./cover.png\n---\n");
        write(&guide.join("index.fr.md"), "---\ntitle: Le Guide\ncoverImg: ./cover.png\n---\n");
        write(&guide.join("cover.png"), png_header(1200, 1600));

        let hello = root.join("content/blog/hello");
        write(
            &hello.join("index.md"),
            "---\ntitle: Hello\npublished: 2021-03-01\nedited: 2021-04-02T10:00:00Z\nauthors: crutchcorn\nlicense: cc-by-4\ncollection: guide\n---\nHello.\n",
        );
        write(
            &hello.join("index.fr.md"),
            "---\ntitle: Bonjour\npublished: 2021-03-01\nauthors: crutchcorn\ncollection: guide\n---\nBonjour.\n",
        );
        write(
            &hello.join("index.de.md"),
            "---\ntitle: Hallo\npublished: 2021-03-01\ncollection: guide\n---\nHallo.\n",
        );
    }

    fn site(root: &Path, strict_references: bool) -> Site {
        let config = SiteConfig {
            strict_references,
            ..SiteConfig::default()
        };
        Site::with_config(root, config)
    }

    fn post<'s>(store: &'s ContentStore, locale: &str) -> &'s PostInfo {
        store.posts.iter().find(|p| p.locale == locale).unwrap()
    }

    fn numbered(posts: &mut [PostInfo]) {
        for (i, post) in posts.iter_mut().enumerate() {
            post.ordinal = i;
        }
    }

    #[test]
    fn test_newest_first() {
        let mut posts = vec![
            test_post("old", "en", Some("2019-01-01")),
            test_post("undated", "en", None),
            test_post("new", "en", Some("2022-06-01")),
            test_post("mid", "en", Some("2020-03-15T10:00:00Z")),
        ];
        numbered(&mut posts);
        sort_posts(&mut posts);

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["new", "mid", "old", "undated"]);
    }

    #[test]
    fn test_equal_dates_reverse_reading_order() {
        let mut posts = vec![
            test_post("a", "en", Some("2021-01-01")),
            test_post("b", "en", Some("2021-01-01")),
            test_post("c", "en", Some("2021-01-01")),
        ];
        numbered(&mut posts);
        sort_posts(&mut posts);

        let slugs: Vec<_> = posts.iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(slugs, vec!["c", "b", "a"]);
    }

    #[test]
    fn test_sort_is_idempotent() {
        let mut posts: Vec<_> = ["2021-01-01", "2020-01-01", "2021-01-01", "2022-01-01"]
            .iter()
            .enumerate()
            .map(|(i, date)| test_post(&format!("p{}", i), "en", Some(*date)))
            .collect();
        numbered(&mut posts);

        sort_posts(&mut posts);
        let once: Vec<_> = posts.iter().map(|p| p.slug.clone()).collect();
        sort_posts(&mut posts);
        let twice: Vec<_> = posts.iter().map(|p| p.slug.clone()).collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn test_assign_banners() {
        let mut posts: Vec<_> = (0..10)
            .map(|i| test_post(&format!("p{}", i), "en", None))
            .collect();
        assign_banners(&mut posts, 8, "/generated");

        let with_banner: Vec<_> = posts
            .iter()
            .enumerate()
            .filter(|(_, p)| p.banner_img.is_some())
            .map(|(i, _)| i)
            .collect();
        assert_eq!(with_banner, vec![0, 4, 8]);
        assert_eq!(posts[4].banner_img.as_deref(), Some("/generated/p4.banner.jpg"));
    }

    #[test]
    fn test_assign_banners_counts_per_locale() {
        let mut posts = vec![
            test_post("a", "en", None),
            test_post("a", "fr", None),
            test_post("b", "en", None),
            test_post("c", "en", None),
        ];
        assign_banners(&mut posts, 4, "/generated");

        let banners: Vec<_> = posts.iter().map(|p| p.banner_img.is_some()).collect();
        assert_eq!(banners, vec![true, true, false, true]);
    }

    #[test]
    fn test_assign_banners_zero_per_page() {
        let mut posts = vec![test_post("a", "en", None), test_post("b", "en", None)];
        assign_banners(&mut posts, 0, "/generated");
        assert!(posts.iter().all(|p| p.banner_img.is_some()));
    }

    #[tokio::test]
    async fn test_missing_root_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("missing");
        let err = read_content_dirs(&missing, "en").await.err().unwrap();
        assert!(format!("{:#}", err).contains("missing"));
    }

    #[tokio::test]
    async fn test_read_content_dirs_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        for slug in ["zeta", "alpha", "mid"] {
            let post_dir = dir.path().join(slug);
            std::fs::create_dir(&post_dir).unwrap();
            std::fs::write(
                post_dir.join("index.md"),
                format!("---\ntitle: {}\n---\n", slug),
            )
            .unwrap();
        }
        std::fs::write(dir.path().join(".DS_Store"), "").unwrap();

        let dirs = read_content_dirs(dir.path(), "en").await.unwrap();
        let slugs: Vec<_> = dirs.iter().map(|d| d.slug.as_str()).collect();
        assert_eq!(slugs, vec!["alpha", "mid", "zeta"]);
        assert_eq!(dirs[0].locales(), vec!["en"]);
    }

    #[tokio::test]
    async fn test_collection_prefers_same_locale() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let store = site(dir.path(), false).load().await.unwrap();

        let fr = post(&store, "fr").collection_meta.as_ref().unwrap();
        assert_eq!(fr.locale, "fr");
        assert_eq!(fr.frontmatter.title, "Le Guide");

        let en = post(&store, "en").collection_meta.as_ref().unwrap();
        assert_eq!(en.locale, "en");
        assert_eq!(en.frontmatter.title, "The Guide");

        let de = post(&store, "de").collection_meta.as_ref().unwrap();
        assert_eq!(de.slug, "guide");
    }

    #[tokio::test]
    async fn test_dates_and_license() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        let store = site(dir.path(), false).load().await.unwrap();

        let en = post(&store, "en");
        assert_eq!(en.published_meta.as_deref(), Some("March 1, 2021"));
        assert_eq!(en.edited_meta.as_deref(), Some("April 2, 2021"));
        assert_eq!(en.license_meta.as_ref().unwrap().id, "cc-by-4");

        let fr = post(&store, "fr");
        assert_eq!(fr.edited_meta, None);
        assert_eq!(fr.license_meta, None);
    }

    #[tokio::test]
    async fn test_unknown_license_and_collection() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        write(
            &dir.path().join("content/blog/stray/index.md"),
            "---\ntitle: Stray\nlicense: nope\ncollection: missing\n---\n",
        );

        let store = site(dir.path(), false).load().await.unwrap();
        let stray = store.posts.iter().find(|p| p.slug == "stray").unwrap();
        assert_eq!(stray.license_meta, None);
        assert!(stray.collection_meta.is_none());

        let err = site(dir.path(), true).load().await.unwrap_err();
        match err.downcast_ref::<ContentError>() {
            Some(ContentError::UnresolvedReference { kind, id, .. }) => {
                assert_eq!(*kind, "license");
                assert_eq!(id, "nope");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_collection_strict() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        write(
            &dir.path().join("content/blog/stray/index.md"),
            "---\ntitle: Stray\ncollection: missing\n---\n",
        );

        let err = site(dir.path(), true).load().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ContentError>(),
            Some(ContentError::UnresolvedReference { kind: "collection", .. })
        ));
    }

    #[tokio::test]
    async fn test_load_fails_without_posts_dir() {
        let dir = tempfile::tempdir().unwrap();
        create_site(dir.path());
        std::fs::remove_dir_all(dir.path().join("content/blog")).unwrap();

        let err = site(dir.path(), false).load().await.unwrap_err();
        assert!(format!("{:#}", err).contains("content/blog"));
    }
}
