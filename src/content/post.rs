//! Post and collection models

use chrono::{DateTime, FixedOffset};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use super::error::ContentError;
use super::frontmatter::{optional_string_or_number, string_or_vec};
use super::image::ImageMeta;
use super::roster::{AuthorProfile, License};

/// Post metadata as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPostInfo {
    pub title: String,

    #[serde(default)]
    pub description: String,

    /// Publication date as written
    pub published: Option<String>,

    /// Last edit date as written
    pub edited: Option<String>,

    /// Author ids
    #[serde(default, deserialize_with = "string_or_vec")]
    pub authors: Vec<String>,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub tags: Vec<String>,

    /// License id
    pub license: Option<String>,

    /// Collection slug
    pub collection: Option<String>,

    /// Position inside the collection, compared as a string
    #[serde(default, deserialize_with = "optional_string_or_number")]
    pub order: Option<String>,

    pub original_link: Option<String>,

    #[serde(default)]
    pub noindex: bool,

    pub up_to_date_slug: Option<String>,

    /// Custom front-matter fields
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A post locale variant with everything derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostInfo {
    #[serde(flatten)]
    pub frontmatter: RawPostInfo,

    /// Name of the post directory
    pub slug: String,

    pub locale: String,

    /// Every locale the post is available in
    pub locales: Vec<String>,

    /// One entry per author id, `None` when the id is not in the roster
    pub authors_meta: Vec<Option<Arc<AuthorProfile>>>,

    pub word_count: usize,

    /// Formatted publication date
    pub published_meta: Option<String>,

    /// Formatted edit date
    pub edited_meta: Option<String>,

    pub license_meta: Option<License>,

    pub collection_meta: Option<Arc<CollectionInfo>>,

    pub social_img: String,

    pub banner_img: Option<String>,

    #[serde(skip)]
    pub published_at: Option<DateTime<FixedOffset>>,

    /// Position in which the post was read
    #[serde(skip)]
    pub ordinal: usize,

    /// Body text
    #[serde(skip)]
    pub content: String,

    #[serde(skip)]
    pub source: PathBuf,
}

impl PostInfo {
    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }

    pub fn tags(&self) -> &[String] {
        &self.frontmatter.tags
    }

    /// Whether `author_id` is listed as an author
    pub fn has_author(&self, author_id: &str) -> bool {
        self.frontmatter.authors.iter().any(|a| a == author_id)
    }

    /// Resolved authors, skipping unknown ids
    pub fn resolved_authors(&self) -> impl Iterator<Item = &Arc<AuthorProfile>> {
        self.authors_meta.iter().flatten()
    }
}

/// Collection kinds with dedicated layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionType {
    Book,
}

/// Link button shown on a collection page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollectionButton {
    pub text: String,
    pub url: String,
}

/// Planned chapter that has no post yet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChapterInfo {
    pub title: String,
    #[serde(default)]
    pub description: String,
}

/// Collection metadata as authored
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCollectionInfo {
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default, deserialize_with = "string_or_vec")]
    pub authors: Vec<String>,

    /// Cover image path relative to the collection directory
    pub cover_img: String,

    pub social_img: Option<String>,

    #[serde(rename = "type")]
    pub kind: Option<CollectionType>,

    pub published: Option<String>,

    #[serde(default)]
    pub noindex: bool,

    #[serde(default)]
    pub buttons: Vec<CollectionButton>,

    pub chapter_list: Option<Vec<ChapterInfo>>,

    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A collection locale variant with everything derived from it
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CollectionInfo {
    #[serde(flatten)]
    pub frontmatter: RawCollectionInfo,

    /// Name of the collection directory
    pub slug: String,

    pub locale: String,

    pub locales: Vec<String>,

    pub authors_meta: Vec<Option<Arc<AuthorProfile>>>,

    pub cover_img_meta: ImageMeta,

    #[serde(skip)]
    pub content: String,

    #[serde(skip)]
    pub source: PathBuf,
}

impl CollectionInfo {
    pub fn title(&self) -> &str {
        &self.frontmatter.title
    }
}

/// Deserialize a front-matter mapping into a typed record
pub fn parse_fields<T: DeserializeOwned>(path: &Path, data: Value) -> Result<T, ContentError> {
    serde_json::from_value(data).map_err(|source| ContentError::InvalidFields {
        path: path.to_path_buf(),
        source,
    })
}
