//! Export the content store

use anyhow::{Context, Result};
use std::path::Path;

use crate::Site;

/// Write the loaded content as JSON to `output`, or stdout
pub async fn run(site: &Site, output: Option<&Path>) -> Result<()> {
    let store = site.load().await?;
    let json = serde_json::to_string_pretty(&store)?;

    match output {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent)
                    .await
                    .with_context(|| format!("Failed to create directory: {:?}", parent))?;
            }
            tokio::fs::write(path, json)
                .await
                .with_context(|| format!("Failed to write: {:?}", path))?;
            tracing::info!("Exported {} posts to {:?}", store.posts.len(), path);
        }
        None => println!("{}", json),
    }

    Ok(())
}
