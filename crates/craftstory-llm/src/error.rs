use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("{provider} API key is not configured")]
    MissingApiKey { provider: &'static str },

    #[error("model invocation failed: {0}")]
    Invocation(String),

    #[error("response parsing failed: {0}")]
    ResponseParse(String),

    #[error("model returned an empty response")]
    EmptyResponse,

    #[error("could not parse a story from the model output")]
    Unparseable { raw: String },

    #[error("model returned a record without a story")]
    EmptyStory,
}

/// Why no JSON object could be recovered from generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ExtractError {
    #[error("generated text is empty")]
    Empty,

    #[error("no structured record recoverable")]
    Unrecoverable,
}
