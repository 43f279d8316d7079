//! Prompt construction for story generation.
//!
//! User input is interpolated verbatim. Nothing here defends against text
//! that tries to override the instructions.

use craftstory_core::models::request::{trimmed, GenerationRequest};

pub const DEFAULT_PLACE: &str = "India";
pub const DEFAULT_PRODUCT_NAME: &str = "A handmade item";
pub const DEFAULT_CRAFT_TYPE: &str = "craft";
pub const DEFAULT_TONE: &str = "Warm & Personal";
pub const DEFAULT_LANGUAGE: &str = "English";

const PREAMBLE: &str = "\
You are a storyteller who helps rural artisans share the story behind their handmade work.
Write about the craft item described by the following details.

";

/// Build the generation prompt for a craft item.
///
/// Every field is emitted as a `key="value"` line in a fixed order, with
/// blank `place`, `productName`, `craftType`, `tone` and `language` replaced
/// by their defaults. The output is deterministic for a given request.
pub fn craft_prompt(request: &GenerationRequest) -> String {
    let tone = or_default(trimmed(&request.tone), DEFAULT_TONE);
    let language = or_default(trimmed(&request.language), DEFAULT_LANGUAGE);

    let fields = [
        ("name", trimmed(&request.name)),
        ("age", trimmed(&request.age)),
        ("place", or_default(trimmed(&request.place), DEFAULT_PLACE)),
        (
            "productName",
            or_default(trimmed(&request.product_name), DEFAULT_PRODUCT_NAME),
        ),
        (
            "craftType",
            or_default(trimmed(&request.craft_type), DEFAULT_CRAFT_TYPE),
        ),
        ("materials", trimmed(&request.materials)),
        ("inspiration", trimmed(&request.inspiration)),
        ("audience", trimmed(&request.audience)),
        ("tone", tone),
        ("language", language),
    ];

    let mut prompt = String::from(PREAMBLE);

    for (key, value) in fields {
        prompt.push_str(&format!("{key}=\"{value}\"\n"));
    }

    let description = request.description_text();
    if !description.is_empty() {
        prompt.push_str(&format!("description=\"{description}\"\n"));
    }

    prompt.push_str(&format!(
        "\n\
Respond with a single JSON object that has exactly two keys:
- \"story\": a story of 200 to 500 words about the artisan and the item, written in a {tone} tone, in {language}.
- \"tags\": an array of 5 short tags describing the item.
Return only the JSON object, with no markdown and no commentary."
    ));

    prompt
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.is_empty() { fallback } else { value }
}
