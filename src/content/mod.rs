//! Content module - reads posts, collections and authors into a store

mod error;
mod frontmatter;
pub mod image;
pub mod loader;
mod locale;
pub mod meta;
pub(crate) mod post;
mod roster;
mod store;
mod words;

pub use error::ContentError;
pub use frontmatter::{get_frontmatter, is_junk, split_markdown, FrontmatterResult, SourceFormat};
pub use image::{HeaderSizer, ImageMeta, ImageSize, ImageSizer};
pub use loader::{assign_banners, newest_first, sort_posts, ContentLoader};
pub use locale::{locale_from_path, parse_index_filename, IndexFilename, LocaleError};
pub use meta::{parse_meta_export, MetaError};
pub use post::{
    ChapterInfo, CollectionButton, CollectionInfo, CollectionType, PostInfo, RawCollectionInfo,
    RawPostInfo,
};
pub use roster::{normalize_username, AuthorProfile, License, RawAuthor, Role, Roster, Socials};
pub use store::{ContentStore, ProfilePictureMap};
pub use words::{count_words, WordCounts};
