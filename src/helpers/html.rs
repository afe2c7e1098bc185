//! HTML helper functions

/// Escape HTML special characters
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Generate an image tag with intrinsic dimensions
///
/// # Examples
/// ```ignore
/// image_tag("/generated/post.banner.jpg", "", Some((1200, 630)), "lazy", Some("image"))
/// ```
pub fn image_tag(
    src: &str,
    alt: &str,
    dimensions: Option<(u32, u32)>,
    loading: &str,
    class: Option<&str>,
) -> String {
    let size_attrs = dimensions
        .map(|(width, height)| format!(r#" width="{}" height="{}""#, width, height))
        .unwrap_or_default();
    let class_attr = class
        .filter(|c| !c.is_empty())
        .map(|c| format!(r#" class="{}""#, html_escape(c)))
        .unwrap_or_default();

    format!(
        r#"<img src="{}" alt="{}"{}{} loading="{}">"#,
        html_escape(src),
        html_escape(alt),
        size_attrs,
        class_attr,
        loading
    )
}

/// Join CSS class names, skipping empty ones
pub fn class_names(names: &[&str]) -> String {
    names
        .iter()
        .map(|n| n.trim())
        .filter(|n| !n.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
