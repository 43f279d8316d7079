use futures::future::BoxFuture;

use crate::error::LlmError;

/// Sampling parameters shared by every backend.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationSettings {
    pub temperature: f32,
    pub top_p: f32,
    /// Ignored by backends without top-k sampling (Bedrock Converse).
    pub top_k: u32,
    pub max_output_tokens: u32,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            top_p: 0.9,
            top_k: 40,
            max_output_tokens: 1024,
        }
    }
}

/// A text generation service: prompt in, free-form text out.
pub trait TextGenerator: Send + Sync {
    /// Model identifier, for logging.
    fn model_id(&self) -> &str;

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, LlmError>>;
}
