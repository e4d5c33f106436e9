//! Configuration for the completion client.

/// Connection settings for the completion API.
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    /// Base URL, e.g. `https://api.openai.com`.
    pub api_url: String,
    /// Bearer key.
    pub api_key: String,
    /// Model name.
    pub model: String,
    /// Maximum tokens for the answer.
    pub max_tokens: Option<u32>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.openai.com".to_string(),
            api_key: String::new(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: Some(1024),
            temperature: Some(0.7),
        }
    }
}
