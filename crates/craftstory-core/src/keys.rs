//! Storage key/path conventions.
//!
//! Pure string functions shared by the local and S3 backends. These define
//! the canonical layout of posts and images in either store.

/// Key of the JSON array holding every published post, newest first.
pub const POSTS_INDEX: &str = "posts/index.json";

/// Owner segment used when a post is published without an identity.
pub const ANONYMOUS_OWNER: &str = "anonymous";

/// Key for an uploaded post image: `posts/{owner}/{millis}-{filename}`.
///
/// `filename` must already be sanitized.
pub fn post_image(owner: Option<&str>, uploaded_at_millis: i64, filename: &str) -> String {
    let owner = owner
        .map(owner_segment)
        .unwrap_or_else(|| ANONYMOUS_OWNER.to_string());
    format!("posts/{owner}/{uploaded_at_millis}-{filename}")
}

fn owner_segment(owner: &str) -> String {
    let segment: String = owner
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    if segment.is_empty() {
        ANONYMOUS_OWNER.to_string()
    } else {
        segment
    }
}
