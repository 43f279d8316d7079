use tracing::{info, warn};
use uuid::Uuid;

use craftstory_core::models::record::GeneratedRecord;
use craftstory_core::models::request::GenerationRequest;

use crate::error::{ExtractError, LlmError};
use crate::extract::extract_json_from_text;
use crate::generator::TextGenerator;
use crate::prompt::craft_prompt;

/// Generate a story record for a craft item.
///
/// Builds the prompt, invokes `generator` once, and recovers the
/// `{story, tags}` record from its output. Output that cannot be parsed is
/// returned in [`LlmError::Unparseable`] and logged as a diagnostic.
pub async fn generate_story(
    generator: &dyn TextGenerator,
    request: &GenerationRequest,
) -> Result<GeneratedRecord, LlmError> {
    let transaction_id = Uuid::new_v4();
    let prompt = craft_prompt(request);

    info!(
        transaction_id = %transaction_id,
        model = generator.model_id(),
        prompt_len = prompt.len(),
        "starting story generation"
    );

    let text = generator.generate(&prompt).await?;

    let object = match extract_json_from_text(&text) {
        Ok(object) => object,
        Err(ExtractError::Empty) => {
            warn!(transaction_id = %transaction_id, "model returned empty text");
            return Err(LlmError::EmptyResponse);
        }
        Err(ExtractError::Unrecoverable) => {
            warn!(
                transaction_id = %transaction_id,
                raw = %text,
                "could not recover story record from model output"
            );
            return Err(LlmError::Unparseable { raw: text });
        }
    };

    let record = GeneratedRecord::from_object(&object);
    if record.story.is_empty() {
        return Err(LlmError::EmptyStory);
    }

    info!(
        transaction_id = %transaction_id,
        text_len = text.len(),
        tags = record.tags.len(),
        "story generation complete"
    );

    Ok(record)
}
