//! HTML components rendered from loaded content

mod grid;
mod post_card;

pub use grid::post_card_grid;
pub use post_card::{post_card, post_card_expanded, ImageLoading};
