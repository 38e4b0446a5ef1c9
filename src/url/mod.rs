//! URL helpers
//!
//! The dictionary site hands out detail links as paths relative to the site
//! root (for example `34/KOKORNKOCQXVILXVB/`). These helpers glue such paths
//! onto the configured base URL.

/// Joins a base URL with path segments
///
/// One trailing slash is removed from `prefix`, and one leading and one
/// trailing slash from each segment, before joining everything with `/`.
///
/// # Examples
///
/// ```
/// use excavator::url::join_url;
///
/// assert_eq!(
///     join_url("http://hy.example.com/", &["/34/KOKORNKOCQXVILXVB/"]),
///     "http://hy.example.com/34/KOKORNKOCQXVILXVB"
/// );
/// ```
pub fn join_url(prefix: &str, segments: &[&str]) -> String {
    let prefix = if prefix.len() > 1 {
        prefix.strip_suffix('/').unwrap_or(prefix)
    } else {
        prefix
    };

    let mut parts = Vec::with_capacity(segments.len() + 1);
    parts.push(prefix);
    parts.extend(segments.iter().map(|s| trim_slash(s)));
    parts.join("/")
}

/// Removes one leading and one trailing `/` from a path segment
///
/// Single-character strings are returned unchanged.
pub fn trim_slash(s: &str) -> &str {
    if s.len() <= 1 {
        return s;
    }
    let s = s.strip_suffix('/').unwrap_or(s);
    s.strip_prefix('/').unwrap_or(s)
}

/// Builds the cache identity for a form submission
///
/// Form posts to the same URL with different bodies are different resources,
/// so the encoded body becomes part of the identity.
pub fn form_identity(url: &str, encoded_body: &str) -> String {
    if encoded_body.is_empty() {
        url.to_string()
    } else {
        format!("{}?{}", url, encoded_body)
    }
}
