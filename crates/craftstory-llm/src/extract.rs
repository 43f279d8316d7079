//! Recovery of a JSON object from free-form model output.
//!
//! Models are asked for a bare JSON object but routinely wrap it in a
//! markdown fence, add a sentence before or after it, or leave a trailing
//! comma behind. This is a best-effort heuristic, not a JSON grammar: it
//! takes everything between the first `{` and the last `}`, so stray braces
//! in surrounding prose will corrupt the candidate.

use serde_json::{Map, Value};
use tracing::debug;

use crate::error::ExtractError;

/// Recover the JSON object embedded in `text`.
///
/// 1. Trim, then strip a leading ```` ``` ```` / ```` ```json ```` fence and a
///    trailing ```` ``` ```` fence.
/// 2. If a `{ … }` span exists, parse it strictly, then again with trailing
///    commas removed.
/// 3. Otherwise parse the whole remaining text.
///
/// Anything that does not end up as a JSON object is
/// [`ExtractError::Unrecoverable`].
pub fn extract_json_from_text(text: &str) -> Result<Map<String, Value>, ExtractError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ExtractError::Empty);
    }

    let unfenced = strip_code_fence(trimmed);

    let parsed = match (unfenced.find('{'), unfenced.rfind('}')) {
        (Some(start), Some(end)) if start < end => parse_lenient(&unfenced[start..=end]),
        _ => serde_json::from_str::<Value>(unfenced).ok(),
    };

    match parsed {
        Some(Value::Object(object)) => Ok(object),
        _ => Err(ExtractError::Unrecoverable),
    }
}

/// Strip a markdown code fence (optionally tagged `json`) from both ends.
pub fn strip_code_fence(text: &str) -> &str {
    let mut body = text.trim();

    if let Some(rest) = body.strip_prefix("```") {
        body = match rest.get(..4) {
            Some(tag) if tag.eq_ignore_ascii_case("json") => &rest[4..],
            _ => rest,
        };
    }

    if let Some(rest) = body.trim_end().strip_suffix("```") {
        body = rest;
    }

    body.trim()
}

fn parse_lenient(candidate: &str) -> Option<Value> {
    if let Ok(value) = serde_json::from_str::<Value>(candidate) {
        return Some(value);
    }

    let repaired = remove_trailing_commas(candidate);
    let value = serde_json::from_str::<Value>(&repaired).ok()?;
    debug!("recovered model output after removing trailing commas");
    Some(value)
}

/// Drop every comma that is followed (after optional whitespace) by `}` or
/// `]`. Commas inside string literals are kept.
pub fn remove_trailing_commas(json: &str) -> String {
    let mut out = String::with_capacity(json.len());
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in json.char_indices() {
        if in_string {
            out.push(c);
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == '"' {
                in_string = false;
            }
            continue;
        }

        match c {
            '"' => {
                in_string = true;
                out.push(c);
            }
            ',' => {
                let next = json[i + 1..].chars().find(|n| !n.is_whitespace());
                if !matches!(next, Some('}' | ']')) {
                    out.push(c);
                }
            }
            _ => out.push(c),
        }
    }

    out
}
