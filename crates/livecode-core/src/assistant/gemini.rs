//! Google Gemini client for the editor assistant
//!
//! Sends one `generateContent` call per chat turn: the fixed system
//! instruction, the prior history and the current user turn. Roles are mapped
//! to Gemini's `user` / `model` pair.

use crate::assistant::prompt::{build_conversation, SYSTEM_INSTRUCTION};
use crate::assistant::{Assistant, NO_RESPONSE_FALLBACK};
use crate::config::AssistantBackendConfig;
use crate::core_types::{AssistantRequest, ChatMessage, ChatRole};
use crate::errors::ProxyError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

pub const MAX_OUTPUT_TOKENS: u32 = 2048;
pub const TEMPERATURE: f32 = 0.7;

/// Google Gemini API client
pub struct GeminiClient {
    api_key: String,
    model: String,
    client: Client,
    base_url: String,
}

impl GeminiClient {
    /// Create a new Gemini client
    pub fn new(config: &AssistantBackendConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(rename = "systemInstruction")]
    system_instruction: GeminiContent,
    #[serde(rename = "generationConfig")]
    generation_config: GeminiGenerationConfig,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    role: Option<String>,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    text: Option<String>,
}

#[derive(Debug, Serialize)]
struct GeminiGenerationConfig {
    temperature: f32,
    #[serde(rename = "maxOutputTokens")]
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    #[serde(default)]
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorDetails,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorDetails {
    code: u16,
    message: String,
}

fn text_content(role: Option<&str>, text: String) -> GeminiContent {
    GeminiContent {
        role: role.map(str::to_string),
        parts: vec![GeminiPart { text: Some(text) }],
    }
}

fn convert_messages_to_gemini_contents(messages: Vec<ChatMessage>) -> Vec<GeminiContent> {
    messages
        .into_iter()
        .map(|message| {
            let role = match message.role {
                ChatRole::User => "user",
                ChatRole::Assistant => "model",
            };
            text_content(Some(role), message.content)
        })
        .collect()
}

/// Concatenated text parts of the first candidate, if there is any text.
fn extract_text(response: GeminiResponse) -> Option<String> {
    let content = response.candidates.into_iter().next()?.content?;
    let text: String = content.parts.into_iter().filter_map(|part| part.text).collect();
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

#[async_trait]
impl Assistant for GeminiClient {
    async fn respond(&self, request: &AssistantRequest) -> Result<String, ProxyError> {
        let gemini_request = GeminiRequest {
            contents: convert_messages_to_gemini_contents(build_conversation(request)),
            system_instruction: text_content(None, SYSTEM_INSTRUCTION.to_string()),
            generation_config: GeminiGenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        log::debug!(
            "Sending {} turns to Gemini model {}",
            gemini_request.contents.len(),
            self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&gemini_request)
            .send()
            .await
            .map_err(|e| ProxyError::RemoteUnavailable(format!("Gemini API request failed: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());

            if let Ok(gemini_error) = serde_json::from_str::<GeminiError>(&error_text) {
                return Err(ProxyError::RemoteUnavailable(format!(
                    "Gemini API error {}: {}",
                    gemini_error.error.code, gemini_error.error.message
                )));
            }

            return Err(ProxyError::RemoteUnavailable(format!(
                "Gemini API request failed with status {}: {}",
                status, error_text
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| ProxyError::ProtocolError(format!("Failed to parse Gemini response: {}", e)))?;

        Ok(extract_text(gemini_response).unwrap_or_else(|| {
            log::warn!("Gemini returned no text, using fallback response");
            NO_RESPONSE_FALLBACK.to_string()
        }))
    }

    fn is_enabled(&self) -> bool {
        true
    }
}
