//! Post cards

use crate::content::{AuthorProfile, PostInfo, ProfilePictureMap};
use crate::helpers::{class_names, encode_query_component, html_escape, image_tag};

/// Alt text of generated banner images
const BANNER_ALT: &str = "Computer code and text on a computer screen";

/// Calendar icon shown next to the publish date
const CALENDAR_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" width="16" height="16" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><rect x="3" y="4" width="18" height="18" rx="2"/><path d="M16 2v4M8 2v4M3 10h18"/></svg>"#;

/// Image `loading` attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImageLoading {
    Eager,
    #[default]
    Lazy,
}

impl ImageLoading {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageLoading::Eager => "eager",
            ImageLoading::Lazy => "lazy",
        }
    }
}

/// Compact post card
pub fn post_card(post: &PostInfo, class: &str, profile_pics: &ProfilePictureMap) -> String {
    let mut html = format!(r#"<li class="{}">"#, html_escape(&class_names(&["card", class])));
    html.push_str(&card_header(post, "text-style-headline-5"));
    html.push_str(&card_meta(post, profile_pics));
    html.push_str("</li>");
    html
}

/// Post card with its banner image
pub fn post_card_expanded(
    post: &PostInfo,
    class: &str,
    profile_pics: &ProfilePictureMap,
    loading: ImageLoading,
) -> String {
    let mut html = format!(
        r#"<li class="{}">"#,
        html_escape(&class_names(&["card", class, "card-expanded"]))
    );
    if let Some(banner) = &post.banner_img {
        html.push_str(&image_tag(
            banner,
            BANNER_ALT,
            None,
            loading.as_str(),
            Some("card-image"),
        ));
    }
    html.push_str(&card_header(post, "text-style-headline-2"));
    html.push_str(&card_meta(post, profile_pics));
    html.push_str("</li>");
    html
}

fn card_header(post: &PostInfo, heading_class: &str) -> String {
    format!(
        r#"<a href="/posts/{}" class="card-header"><h2 class="{}">{}</h2></a>"#,
        html_escape(&post.slug),
        heading_class,
        html_escape(post.title())
    )
}

/// Authors, date, description and tags
fn card_meta(post: &PostInfo, profile_pics: &ProfilePictureMap) -> String {
    let mut html = String::from(r#"<div class="card-meta"><ul class="unlist-inline gap-2">"#);
    for author in post.resolved_authors() {
        html.push_str("<li>");
        html.push_str(&author_chip(author, profile_pics));
        html.push_str("</li>");
    }
    html.push_str("</ul>");

    html.push_str(&format!(
        r#"<p class="d-flex gap-1 card-date"><span class="d-flex">{}</span>{}</p>"#,
        CALENDAR_ICON,
        html_escape(post.published_meta.as_deref().unwrap_or(""))
    ));
    html.push_str("</div>");

    // descriptions are authored HTML
    html.push_str(&format!(
        r#"<p class="card-excerpt">{}</p>"#,
        post.frontmatter.description
    ));

    html.push_str(r#"<ul class="unlist-inline gap-2">"#);
    for tag in post.tags() {
        html.push_str(&format!(
            r#"<li><a class="chip" href="/search?q={}">{}</a></li>"#,
            encode_query_component(tag),
            html_escape(tag)
        ));
    }
    html.push_str("</ul>");
    html
}

/// Small author tag with profile picture
fn author_chip(author: &AuthorProfile, profile_pics: &ProfilePictureMap) -> String {
    let picture = profile_pics
        .get(&author.id)
        .map(|img| {
            image_tag(
                &img.relative_server_path,
                "",
                Some((24, 24)),
                ImageLoading::Lazy.as_str(),
                Some("unicorn-tag-image"),
            )
        })
        .unwrap_or_default();

    format!(
        r#"<a href="/unicorns/{}" class="unicorn-tag" style="--unicorn-color: {}">{}<span>{}</span></a>"#,
        html_escape(&author.id),
        html_escape(&author.color),
        picture,
        html_escape(&author.name)
    )
}
