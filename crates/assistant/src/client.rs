//! The completion client itself.

use reqwest::Client;
use tracing::debug;

use crate::api_types::{ApiErrorBody, ChatCompletionRequest, ChatCompletionResponse, ChatMessage};
use crate::config::AssistantConfig;
use crate::error::AssistantError;

/// Thin wrapper over one chat-completion endpoint.
#[derive(Debug, Clone)]
pub struct CompletionClient {
    client: Client,
    config: AssistantConfig,
}

impl CompletionClient {
    pub fn new(config: AssistantConfig) -> Result<Self, AssistantError> {
        if config.api_key.is_empty() {
            return Err(AssistantError::Configuration(
                "falta la clave del servicio de IA".to_string(),
            ));
        }
        let client = Client::builder()
            .build()
            .map_err(AssistantError::Network)?;
        Ok(Self { client, config })
    }

    /// Sends the account context plus the user question; returns the answer
    /// text.
    pub async fn complete(&self, context: &str, question: &str) -> Result<String, AssistantError> {
        let url = format!(
            "{}/v1/chat/completions",
            self.config.api_url.trim_end_matches('/')
        );
        let request = ChatCompletionRequest {
            model: self.config.model.clone(),
            messages: vec![ChatMessage::system(context), ChatMessage::user(question)],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        debug!(model = %self.config.model, "sending completion request");
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|parsed| parsed.error.message)
                .unwrap_or(body);
            return Err(AssistantError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let completion: ChatCompletionResponse = response.json().await?;
        completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(AssistantError::EmptyCompletion)
    }
}
