//! The loaded content of a site and the queries pages run against it

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;

use super::image::ImageMeta;
use super::locale::locale_from_path;
use super::post::{CollectionInfo, PostInfo};
use super::roster::{AuthorProfile, License, Role, Roster};

/// Author id to profile picture
pub type ProfilePictureMap = IndexMap<String, ImageMeta>;

/// Immutable aggregate of everything the loader read
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentStore {
    pub about: Value,
    pub authors: Vec<Arc<AuthorProfile>>,
    pub roles: Vec<Role>,
    pub licenses: Vec<License>,
    pub collections: Vec<Arc<CollectionInfo>>,
    /// Newest first
    pub posts: Vec<PostInfo>,
    pub tags: BTreeSet<String>,
    #[serde(skip)]
    primary_locale: String,
}

impl ContentStore {
    pub fn new(
        roster: Roster,
        collections: Vec<Arc<CollectionInfo>>,
        posts: Vec<PostInfo>,
        tags: BTreeSet<String>,
        primary_locale: String,
    ) -> Self {
        Self {
            about: roster.about,
            authors: roster.authors,
            roles: roster.roles,
            licenses: roster.licenses,
            collections,
            posts,
            tags,
            primary_locale,
        }
    }

    pub fn primary_locale(&self) -> &str {
        &self.primary_locale
    }

    /// Posts in one locale, newest first
    pub fn posts_by_locale(&self, locale: &str) -> Vec<&PostInfo> {
        self.posts.iter().filter(|p| p.locale == locale).collect()
    }

    /// Posts in one locale listing `author_id` as an author
    pub fn posts_by_author(&self, author_id: &str, locale: &str) -> Vec<&PostInfo> {
        self.posts
            .iter()
            .filter(|p| p.locale == locale && p.has_author(author_id))
            .collect()
    }

    /// Posts of a collection in one locale, by their `order` value
    ///
    /// Orders compare as strings; posts without one sort first.
    pub fn posts_by_collection(&self, collection: &str, locale: &str) -> Vec<&PostInfo> {
        let mut posts: Vec<&PostInfo> = self
            .posts
            .iter()
            .filter(|p| {
                p.locale == locale && p.frontmatter.collection.as_deref() == Some(collection)
            })
            .collect();
        posts.sort_by(|a, b| {
            let a = a.frontmatter.order.as_deref().unwrap_or("");
            let b = b.frontmatter.order.as_deref().unwrap_or("");
            a.cmp(b)
        });
        posts
    }

    /// The post variant read from `path`
    pub fn post_by_source_path(&self, path: impl AsRef<Path>) -> Option<&PostInfo> {
        let (slug, locale) = self.identify(path.as_ref())?;
        self.posts
            .iter()
            .find(|p| p.slug == slug && p.locale == locale)
    }

    /// The collection variant read from `path`
    pub fn collection_by_source_path(&self, path: impl AsRef<Path>) -> Option<&Arc<CollectionInfo>> {
        let (slug, locale) = self.identify(path.as_ref())?;
        self.collections
            .iter()
            .find(|c| c.slug == slug && c.locale == locale)
    }

    /// Slug from the parent directory, locale from the filename
    fn identify<'p>(&self, path: &'p Path) -> Option<(&'p str, String)> {
        let slug = path.parent()?.file_name()?.to_str()?;
        Some((slug, locale_from_path(path, &self.primary_locale)))
    }

    pub fn author(&self, id: &str) -> Option<&Arc<AuthorProfile>> {
        self.authors.iter().find(|a| a.id == id)
    }

    pub fn collections_by_locale(&self, locale: &str) -> Vec<&Arc<CollectionInfo>> {
        self.collections
            .iter()
            .filter(|c| c.locale == locale)
            .collect()
    }

    /// Profile pictures of every author, by id
    pub fn profile_picture_map(&self) -> ProfilePictureMap {
        self.authors
            .iter()
            .map(|a| (a.id.clone(), a.profile_img_meta.clone()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::post::tests::test_post;
    use serde_json::json;

    fn roster() -> Roster {
        Roster {
            about: json!({}),
            authors: Vec::new(),
            roles: Vec::new(),
            licenses: Vec::new(),
        }
    }

    fn store(posts: Vec<PostInfo>) -> ContentStore {
        ContentStore::new(roster(), Vec::new(), posts, BTreeSet::new(), "en".to_string())
    }

    fn in_collection(slug: &str, locale: &str, order: Option<&str>) -> PostInfo {
        let mut post = test_post(slug, locale, None);
        post.frontmatter.collection = Some("guide".to_string());
        post.frontmatter.order = order.map(String::from);
        post
    }

    #[test]
    fn test_posts_by_locale() {
        let store = store(vec![
            test_post("a", "en", None),
            test_post("a", "fr", None),
            test_post("b", "en", None),
        ]);
        assert_eq!(store.posts_by_locale("en").len(), 2);
        assert_eq!(store.posts_by_locale("fr").len(), 1);
        assert!(store.posts_by_locale("de").is_empty());
    }

    #[test]
    fn test_posts_by_author() {
        let mut a = test_post("a", "en", None);
        a.frontmatter.authors = vec!["crutchcorn".to_string(), "fennifith".to_string()];
        let mut b = test_post("b", "en", None);
        b.frontmatter.authors = vec!["fennifith".to_string()];
        let mut a_fr = test_post("a", "fr", None);
        a_fr.frontmatter.authors = vec!["crutchcorn".to_string()];

        let store = store(vec![a, b, a_fr]);
        let slugs: Vec<_> = store
            .posts_by_author("crutchcorn", "en")
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["a"]);
        assert_eq!(store.posts_by_author("fennifith", "en").len(), 2);
    }

    #[test]
    fn test_posts_by_collection() {
        let store = store(vec![
            in_collection("third", "en", Some("3")),
            in_collection("first", "en", Some("1")),
            test_post("outside", "en", None),
            in_collection("second", "en", Some("2")),
            in_collection("premier", "fr", Some("1")),
            in_collection("intro", "en", None),
        ]);

        let slugs: Vec<_> = store
            .posts_by_collection("guide", "en")
            .iter()
            .map(|p| p.slug.as_str())
            .collect();
        assert_eq!(slugs, vec!["intro", "first", "second", "third"]);
    }

    #[test]
    fn test_post_by_source_path() {
        let store = store(vec![test_post("hello", "en", None), test_post("hello", "fr", None)]);

        let post = store
            .post_by_source_path("content/blog/hello/index.fr.md")
            .unwrap();
        assert_eq!(post.locale, "fr");

        let post = store.post_by_source_path("content/blog/hello/index.md").unwrap();
        assert_eq!(post.locale, "en");

        // unparseable filenames fall back to the primary locale
        let post = store.post_by_source_path("content/blog/hello/notes.md").unwrap();
        assert_eq!(post.locale, "en");

        assert!(store.post_by_source_path("content/blog/missing/index.md").is_none());
        assert!(store.post_by_source_path("index.md").is_none());
    }
}
