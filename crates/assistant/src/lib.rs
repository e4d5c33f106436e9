//! Client for the external completion API the chat endpoint forwards to.
//!
//! The API is OpenAI-compatible: one `/v1/chat/completions` call with a
//! system context and the user question, returning a text answer. It is
//! treated as a black box with no latency or availability guarantees.

pub use client::CompletionClient;
pub use config::AssistantConfig;
pub use error::AssistantError;

mod api_types;
mod client;
mod config;
mod error;
