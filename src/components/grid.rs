//! Post card grid

use super::post_card::{post_card, post_card_expanded, ImageLoading};
use crate::content::{PostInfo, ProfilePictureMap};

/// Number of expanded cards whose images sit above the fold
const EAGER_IMAGES: usize = 4;

/// Render a list of post cards.
///
/// With `expanded` set, posts that carry a banner get the expanded card.
pub fn post_card_grid(posts: &[&PostInfo], profile_pics: &ProfilePictureMap, expanded: bool) -> String {
    let mut html = String::from(r#"<ul class="post-card-grid" role="list" id="post-list-container">"#);

    for (i, post) in posts.iter().enumerate() {
        if expanded && post.banner_img.is_some() {
            let loading = if i < EAGER_IMAGES {
                ImageLoading::Eager
            } else {
                ImageLoading::Lazy
            };
            html.push_str(&post_card_expanded(post, "grid-expanded", profile_pics, loading));
        } else {
            html.push_str(&post_card(post, "", profile_pics));
        }
    }

    html.push_str("</ul>");
    html
}
