//! Text generation via the Gemini `generateContent` REST endpoint.
//!
//! Uses the blocking `ureq` client on Tokio's blocking pool. There is no
//! timeout or retry beyond the client's defaults; a failed call surfaces
//! immediately as [`LlmError::Invocation`].

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::LlmError;
use crate::generator::{GenerationSettings, TextGenerator};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-1.5-flash";

pub struct GeminiGenerator {
    api_key: Option<String>,
    model: String,
    base_url: String,
    settings: GenerationSettings,
}

impl GeminiGenerator {
    /// A missing `api_key` is accepted here and reported on first use.
    pub fn new(
        api_key: Option<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
        settings: GenerationSettings,
    ) -> Self {
        Self {
            api_key: api_key.filter(|k| !k.trim().is_empty()),
            model: model.into(),
            base_url: base_url.into(),
            settings,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url.trim_end_matches('/'),
            self.model
        )
    }
}

impl TextGenerator for GeminiGenerator {
    fn model_id(&self) -> &str {
        &self.model
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(async move {
            let api_key = self
                .api_key
                .clone()
                .ok_or(LlmError::MissingApiKey { provider: "gemini" })?;

            let url = self.endpoint();
            let body = GenerateContentRequest::new(prompt, &self.settings);

            info!(model = %self.model, "calling gemini generateContent");

            let raw = tokio::task::spawn_blocking(move || post_json(&url, &api_key, &body))
                .await
                .map_err(|e| LlmError::Invocation(format!("generation task failed: {e}")))??;

            text_from_response(&raw)
        })
    }
}

fn post_json(url: &str, api_key: &str, body: &GenerateContentRequest) -> Result<String, LlmError> {
    let mut response = ureq::post(url)
        .header("x-goog-api-key", api_key)
        .send_json(body)
        .map_err(|e| LlmError::Invocation(e.to_string()))?;

    response
        .body_mut()
        .read_to_string()
        .map_err(|e| LlmError::ResponseParse(e.to_string()))
}

/// Concatenate the text parts of the first candidate in a `generateContent`
/// response body. A response without candidates yields an empty string.
pub fn text_from_response(raw: &str) -> Result<String, LlmError> {
    let response: GenerateContentResponse =
        serde_json::from_str(raw).map_err(|e| LlmError::ResponseParse(e.to_string()))?;

    let text = response
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .map(|content| {
            content
                .parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();

    Ok(text)
}

// ── Wire types ───────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest {
    contents: Vec<RequestContent>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct RequestContent {
    role: &'static str,
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    text: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    top_p: f32,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

impl GenerateContentRequest {
    fn new(prompt: &str, settings: &GenerationSettings) -> Self {
        Self {
            contents: vec![RequestContent {
                role: "user",
                parts: vec![RequestPart {
                    text: prompt.to_string(),
                }],
            }],
            generation_config: GenerationConfig {
                temperature: settings.temperature,
                top_p: settings.top_p,
                top_k: settings.top_k,
                max_output_tokens: settings.max_output_tokens,
                response_mime_type: "text/plain",
            },
        }
    }
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: Option<String>,
}
