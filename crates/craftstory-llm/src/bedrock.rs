use aws_sdk_bedrockruntime::Client;
use aws_sdk_bedrockruntime::types::{
    ContentBlock, ConversationRole, InferenceConfiguration, Message,
};
use futures::future::BoxFuture;
use tracing::info;

use crate::error::LlmError;
use crate::generator::{GenerationSettings, TextGenerator};

pub const DEFAULT_MODEL_ID: &str = "us.anthropic.claude-haiku-4-5-20251001-v1:0";

/// Text generation through the Bedrock Converse API.
pub struct BedrockGenerator {
    client: Client,
    model_id: String,
    settings: GenerationSettings,
}

impl BedrockGenerator {
    pub fn new(client: Client, model_id: impl Into<String>, settings: GenerationSettings) -> Self {
        Self {
            client,
            model_id: model_id.into(),
            settings,
        }
    }

    /// Build a generator from the default AWS credential chain and region.
    pub async fn from_env(model_id: impl Into<String>, settings: GenerationSettings) -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config), model_id, settings)
    }
}

impl TextGenerator for BedrockGenerator {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, LlmError>> {
        Box::pin(invoke_converse(
            &self.client,
            &self.model_id,
            &self.settings,
            prompt,
        ))
    }
}

/// Core invocation using the Bedrock Converse API.
/// Returns the concatenated text blocks of the reply.
async fn invoke_converse(
    client: &Client,
    model_id: &str,
    settings: &GenerationSettings,
    user_message: &str,
) -> Result<String, LlmError> {
    let inference = InferenceConfiguration::builder()
        .temperature(settings.temperature)
        .top_p(settings.top_p)
        .max_tokens(i32::try_from(settings.max_output_tokens).unwrap_or(i32::MAX))
        .build();

    let response = client
        .converse()
        .model_id(model_id)
        .inference_config(inference)
        .messages(
            Message::builder()
                .role(ConversationRole::User)
                .content(ContentBlock::Text(user_message.to_string()))
                .build()
                .map_err(|e| LlmError::Invocation(e.to_string()))?,
        )
        .send()
        .await
        .map_err(|e| LlmError::Invocation(e.into_service_error().to_string()))?;

    let output_message = response
        .output()
        .and_then(|o| o.as_message().ok())
        .ok_or_else(|| LlmError::ResponseParse("no message in response".to_string()))?;

    let response_text = output_message
        .content()
        .iter()
        .filter_map(|block| {
            if let ContentBlock::Text(text) = block {
                Some(text.as_str())
            } else {
                None
            }
        })
        .collect::<Vec<_>>()
        .join("");

    if let Some(usage) = response.usage() {
        info!(
            model = model_id,
            input_tokens = usage.input_tokens,
            output_tokens = usage.output_tokens,
            "bedrock converse complete"
        );
    }

    Ok(response_text)
}
