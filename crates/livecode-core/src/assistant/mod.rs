//! Chat assistant backed by a generative language model.
//!
//! One request is one conversational turn: the frontend sends the message
//! plus its own copy of the history, and this module shapes it for the model
//! and hands back plain text. Without a credential the assistant answers
//! with a fixed "not configured" message instead of failing.

use crate::config::ProxyConfig;
use crate::core_types::AssistantRequest;
use crate::errors::ProxyError;
use async_trait::async_trait;
use std::sync::Arc;

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiClient;

pub const NOT_CONFIGURED_RESPONSE: &str =
    "AI is not configured. Please set GEMINI_API_KEY in the backend .env file.";
pub const NO_RESPONSE_FALLBACK: &str = "Sorry, I couldn't generate a response.";

#[async_trait]
pub trait Assistant: Send + Sync {
    async fn respond(&self, request: &AssistantRequest) -> Result<String, ProxyError>;

    /// Whether a real model sits behind this assistant.
    fn is_enabled(&self) -> bool;
}

/// Degraded assistant used when no credential is configured.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredAssistant;

#[async_trait]
impl Assistant for UnconfiguredAssistant {
    async fn respond(&self, _request: &AssistantRequest) -> Result<String, ProxyError> {
        Ok(NOT_CONFIGURED_RESPONSE.to_string())
    }

    fn is_enabled(&self) -> bool {
        false
    }
}

/// Build the assistant selected by the configuration.
pub fn create_assistant(config: &ProxyConfig) -> Arc<dyn Assistant> {
    match &config.assistant {
        Some(backend) => {
            let client = GeminiClient::new(backend);
            log::info!("Assistant backend: Gemini model {}", client.model());
            Arc::new(client)
        }
        None => {
            log::warn!("GEMINI_API_KEY not set, assistant is disabled");
            Arc::new(UnconfiguredAssistant)
        }
    }
}
