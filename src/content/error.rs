//! Content errors
//!
//! Every variant names the file or directory at fault. None of them are
//! recoverable: the build aborts on the first one.

use std::path::PathBuf;
use thiserror::Error;

use super::locale::LocaleError;
use super::meta::MetaError;

#[derive(Error, Debug)]
pub enum ContentError {
    #[error("failed to read {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid index filename {}", path.display())]
    InvalidFilename {
        path: PathBuf,
        #[source]
        source: LocaleError,
    },

    #[error("{} contains more than one index file for locale '{locale}'", dir.display())]
    DuplicateLocale { dir: PathBuf, locale: String },

    #[error("invalid YAML frontmatter in {}", path.display())]
    InvalidYaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("frontmatter in {} is not a mapping", path.display())]
    NotAMapping { path: PathBuf },

    #[error("Astro file {} does not have valid frontmatter!", path.display())]
    MissingHeader { path: PathBuf },

    #[error("Astro file {} does not define a 'meta' export!", path.display())]
    MissingMetaExport { path: PathBuf },

    #[error("failed to evaluate the 'meta' export of {}", path.display())]
    Meta {
        path: PathBuf,
        #[source]
        source: MetaError,
    },

    #[error("invalid frontmatter fields in {}", path.display())]
    InvalidFields {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid JSON in {}", path.display())]
    InvalidJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid date '{value}' in {}", path.display())]
    InvalidDate { path: PathBuf, value: String },

    #[error("unrecognized image format: {}", path.display())]
    UnknownImageFormat { path: PathBuf },

    #[error("{} references unknown {kind} '{id}'", path.display())]
    UnresolvedReference {
        path: PathBuf,
        kind: &'static str,
        id: String,
    },
}

impl ContentError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ContentError::Io {
            path: path.into(),
            source,
        }
    }
}
