//! Show one content item

use anyhow::Result;
use std::path::Path;

use crate::content::ContentStore;
use crate::Site;

/// Print the post or collection read from `path` as JSON
pub async fn run(site: &Site, path: &Path) -> Result<()> {
    let store = site.load().await?;
    match render(&store, path)? {
        Some(json) => println!("{}", json),
        None => println!("Not found: {:?}", path),
    }
    Ok(())
}

/// JSON of the post, or else the collection, at a source path
pub fn render(store: &ContentStore, path: &Path) -> Result<Option<String>> {
    if let Some(post) = store.post_by_source_path(path) {
        return Ok(Some(serde_json::to_string_pretty(post)?));
    }
    if let Some(collection) = store.collection_by_source_path(path) {
        return Ok(Some(serde_json::to_string_pretty(collection)?));
    }
    Ok(None)
}
