//! unicorn-content: the content layer of a statically generated blog
//!
//! This crate reads posts, collections and author rosters from a site
//! directory into an immutable store and renders post cards from it.

pub mod commands;
pub mod components;
pub mod config;
pub mod content;
pub mod helpers;

use anyhow::Result;
use std::path::Path;

/// A site on disk
#[derive(Clone)]
pub struct Site {
    /// Site configuration
    pub config: config::SiteConfig,
    /// Base directory
    pub base_dir: std::path::PathBuf,
    /// Post directories live here
    pub posts_dir: std::path::PathBuf,
    /// Collection directories live here
    pub collections_dir: std::path::PathBuf,
    /// Roster and catalog files live here
    pub data_dir: std::path::PathBuf,
}

impl Site {
    /// Open a site, reading `_config.yml` when present
    pub fn new<P: AsRef<Path>>(base_dir: P) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        let config_path = base_dir.join("_config.yml");

        let config = if config_path.exists() {
            config::SiteConfig::load(&config_path)?
        } else {
            config::SiteConfig::default()
        };

        Ok(Self::with_config(base_dir, config))
    }

    /// Open a site with an explicit configuration
    pub fn with_config<P: AsRef<Path>>(base_dir: P, config: config::SiteConfig) -> Self {
        let base_dir = base_dir.as_ref().to_path_buf();
        let posts_dir = base_dir.join(&config.posts_dir);
        let collections_dir = base_dir.join(&config.collections_dir);
        let data_dir = base_dir.join(&config.data_dir);

        Self {
            config,
            base_dir,
            posts_dir,
            collections_dir,
            data_dir,
        }
    }

    /// Load all content
    pub async fn load(&self) -> Result<content::ContentStore> {
        content::ContentLoader::new(self).load().await
    }
}
