//! Site configuration (_config.yml)

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Main site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    // Directory
    pub posts_dir: String,
    pub collections_dir: String,
    pub data_dir: String,

    // Locale
    pub default_locale: String,

    // Date / Time format
    pub date_format: String,

    // Pagination
    pub posts_per_page: usize,

    // References
    pub strict_references: bool,

    // Generated images
    pub generated_dir: String,

    // Store any additional fields
    #[serde(flatten)]
    pub extra: HashMap<String, serde_yaml::Value>,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            posts_dir: "content/blog".to_string(),
            collections_dir: "content/collections".to_string(),
            data_dir: "content/data".to_string(),

            default_locale: "en".to_string(),

            date_format: "MMMM D, YYYY".to_string(),

            posts_per_page: 8,

            strict_references: false,

            generated_dir: "/generated".to_string(),
            extra: HashMap::new(),
        }
    }
}

impl SiteConfig {
    /// Load configuration from a file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {:?}", path))?;
        let config: SiteConfig = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {:?}", path))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the loader cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.default_locale.is_empty() || self.default_locale.contains('.') {
            anyhow::bail!("Invalid default_locale: {:?}", self.default_locale);
        }
        if self.posts_per_page == 0 {
            anyhow::bail!("posts_per_page must be at least 1");
        }
        Ok(())
    }

    /// Server directory the data directory is published under
    pub fn data_server_dir(&self) -> String {
        format!("/{}/", self.data_dir.trim_matches('/'))
    }

    /// Server directory of one collection
    pub fn collection_server_dir(&self, slug: &str) -> String {
        format!("/{}/{}/", self.collections_dir.trim_matches('/'), slug)
    }
}
