use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Upper bound on the number of tags kept for a story.
pub const MAX_TAGS: usize = 5;

/// The `{story, tags}` record recovered from generation output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratedRecord {
    pub story: String,
    pub tags: Vec<String>,
}

impl GeneratedRecord {
    /// Build a record from a parsed JSON object.
    ///
    /// A missing or non-string `story` becomes empty; `tags` keeps only string
    /// entries, normalized by [`normalize_tags`].
    pub fn from_object(object: &Map<String, Value>) -> Self {
        let story = object
            .get("story")
            .and_then(Value::as_str)
            .map(|s| s.trim().to_string())
            .unwrap_or_default();

        let tags = object
            .get("tags")
            .and_then(Value::as_array)
            .map(|values| normalize_tags(values.iter().filter_map(Value::as_str)))
            .unwrap_or_default();

        Self { story, tags }
    }
}

/// Trim each tag, drop empty ones, and keep at most [`MAX_TAGS`] in order.
pub fn normalize_tags<'a>(tags: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    tags.into_iter()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .map(str::to_string)
        .collect()
}
