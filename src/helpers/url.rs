//! URL and path helper functions

use percent_encoding::{utf8_percent_encode, AsciiSet, CONTROLS};

/// Characters escaped in a query component (matches `encodeURIComponent`)
const QUERY_COMPONENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'$')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b',')
    .add(b'/')
    .add(b':')
    .add(b';')
    .add(b'<')
    .add(b'=')
    .add(b'>')
    .add(b'?')
    .add(b'@')
    .add(b'[')
    .add(b'\\')
    .add(b']')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Resolve `path` against a server directory, producing a root-relative URL path
///
/// `.` and `..` segments are resolved and duplicate slashes collapsed.
///
/// # Examples
/// ```ignore
/// full_relative_path("/content/data/", "./crutchcorn.jpg") // -> "/content/data/crutchcorn.jpg"
/// ```
pub fn full_relative_path(base: &str, path: &str) -> String {
    let mut segments: Vec<&str> = Vec::new();

    for segment in base.split('/').chain(path.split('/')) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            s => segments.push(s),
        }
    }

    format!("/{}", segments.join("/"))
}

/// Path of an asset produced by the image generation step
///
/// # Examples
/// ```ignore
/// generated_path("/generated", "my-post", "banner.jpg") // -> "/generated/my-post.banner.jpg"
/// ```
pub fn generated_path(generated_dir: &str, slug: &str, suffix: &str) -> String {
    format!("{}/{}.{}", generated_dir.trim_end_matches('/'), slug, suffix)
}

/// Encode a value for use inside a query string
pub fn encode_query_component(value: &str) -> String {
    utf8_percent_encode(value, QUERY_COMPONENT).to_string()
}
