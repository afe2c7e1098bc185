//! Render the post card grid

use anyhow::Result;

use crate::components::post_card_grid;
use crate::content::ContentStore;
use crate::Site;

/// Print one page of the post card grid
pub async fn run(site: &Site, locale: Option<&str>, expanded: bool, page: usize) -> Result<()> {
    let store = site.load().await?;
    println!(
        "{}",
        render(&store, locale, expanded, page, site.config.posts_per_page)?
    );
    Ok(())
}

/// Grid of the posts on `page`, counting from 1
pub fn render(
    store: &ContentStore,
    locale: Option<&str>,
    expanded: bool,
    page: usize,
    per_page: usize,
) -> Result<String> {
    if page == 0 {
        anyhow::bail!("Pages are numbered from 1");
    }

    let locale = locale.unwrap_or(store.primary_locale());
    let posts = store.posts_by_locale(locale);
    let per_page = per_page.max(1);
    let start = (page - 1).saturating_mul(per_page).min(posts.len());
    let end = start.saturating_add(per_page).min(posts.len());

    tracing::debug!(
        "Rendering posts {}..{} of {} ({})",
        start,
        end,
        posts.len(),
        locale
    );
    Ok(post_card_grid(
        &posts[start..end],
        &store.profile_picture_map(),
        expanded,
    ))
}
