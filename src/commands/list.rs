//! List site content

use anyhow::Result;
use std::fmt::Write;

use crate::content::ContentStore;
use crate::Site;

/// List site content by type
pub async fn run(site: &Site, content_type: &str, locale: Option<&str>) -> Result<()> {
    let store = site.load().await?;
    print!("{}", render(&store, content_type, locale)?);
    Ok(())
}

/// Listing of one content type, in the primary locale unless given
pub fn render(store: &ContentStore, content_type: &str, locale: Option<&str>) -> Result<String> {
    let locale = locale.unwrap_or(store.primary_locale());
    let mut out = String::new();

    match content_type {
        "post" | "posts" => {
            let posts = store.posts_by_locale(locale);
            writeln!(out, "Posts ({}):", posts.len())?;
            for post in posts {
                writeln!(
                    out,
                    "  {} - {} [{}]",
                    post.published_meta.as_deref().unwrap_or("undated"),
                    post.title(),
                    post.slug
                )?;
            }
        }
        "collection" | "collections" => {
            let collections = store.collections_by_locale(locale);
            writeln!(out, "Collections ({}):", collections.len())?;
            for collection in collections {
                let posts = store.posts_by_collection(&collection.slug, locale);
                writeln!(
                    out,
                    "  {} [{}] ({} posts)",
                    collection.title(),
                    collection.slug,
                    posts.len()
                )?;
            }
        }
        "author" | "authors" => {
            writeln!(out, "Authors ({}):", store.authors.len())?;
            for author in &store.authors {
                let posts = store.posts_by_author(&author.id, locale);
                writeln!(out, "  {} [{}] ({} posts)", author.name, author.id, posts.len())?;
            }
        }
        "tag" | "tags" => {
            writeln!(out, "Tags ({}):", store.tags.len())?;
            for tag in &store.tags {
                let count = store
                    .posts
                    .iter()
                    .filter(|p| p.tags().contains(tag))
                    .count();
                writeln!(out, "  {} ({})", tag, count)?;
            }
        }
        _ => {
            anyhow::bail!(
                "Unknown type: {}. Available: posts, collections, authors, tags",
                content_type
            );
        }
    }

    Ok(out)
}
