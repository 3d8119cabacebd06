//! Data shapes exchanged with the editor frontend and the remote backends
//!
//! The request/response bodies of the HTTP surface live here next to the
//! normalized execution result, so that the server crate stays a thin
//! translation layer. Every field the frontend may omit carries a serde
//! default instead of failing the request.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Reads an optional string field, treating `null` like an absent value.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the execution backend's language catalog.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct LanguageDescriptor {
    pub id: u32,
    pub name: String,
}

/// A single job handed to the execution backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionRequest {
    pub language_id: u32,
    pub source: String,
    pub stdin: String,
}

/// Opaque handle issued by the execution backend for a pending job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionToken(pub String);

impl SubmissionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Status reported when the poll deadline passes before the job finishes.
pub const TIMEOUT_STATUS: &str = "timeout";

/// Normalized outcome of one submission.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExecutionResult {
    pub stdout: Option<String>,
    pub stderr: Option<String>,
    pub compile_output: Option<String>,
    pub message: Option<String>,
    pub time: Option<String>,
    pub memory: Option<String>,
    pub status: String,
}

impl ExecutionResult {
    pub fn timed_out(&self) -> bool {
        self.status == TIMEOUT_STATUS
    }

    /// The text shown in the console panel: stdout, else stderr, else
    /// compiler output. The first present stream wins even when empty.
    pub fn console_output(&self) -> String {
        self.stdout
            .as_ref()
            .or(self.stderr.as_ref())
            .or(self.compile_output.as_ref())
            .cloned()
            .unwrap_or_default()
    }
}

/// Body of `POST /api/execute`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct ExecuteRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub language: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub code: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub input: String,
}

/// Response of `POST /api/execute`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ExecutionReport {
    pub output: String,
    pub time: Option<String>,
    pub memory: Option<String>,
    pub status: String,
    pub logs: Vec<String>,
    /// Set when the payload was fabricated because no execution backend is configured.
    pub mocked: bool,
}

impl From<ExecutionResult> for ExecutionReport {
    fn from(result: ExecutionResult) -> Self {
        Self {
            output: result.console_output(),
            time: result.time,
            memory: result.memory,
            status: result.status,
            logs: Vec::new(),
            mocked: false,
        }
    }
}

/// Speaker of a chat turn. Anything other than `"user"` is treated as the assistant.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(from = "Option<Value>", into = "String")]
pub enum ChatRole {
    User,
    #[default]
    Assistant,
}

impl From<Option<Value>> for ChatRole {
    fn from(role: Option<Value>) -> Self {
        match role {
            Some(Value::String(role)) => ChatRole::from(role),
            _ => ChatRole::Assistant,
        }
    }
}

impl From<String> for ChatRole {
    fn from(role: String) -> Self {
        if role == "user" {
            ChatRole::User
        } else {
            ChatRole::Assistant
        }
    }
}

impl From<ChatRole> for String {
    fn from(role: ChatRole) -> Self {
        match role {
            ChatRole::User => "user".to_string(),
            ChatRole::Assistant => "assistant".to_string(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    #[serde(default)]
    pub role: ChatRole,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub content: String,
}

/// Body of `POST /api/ai`.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
#[serde(rename_all = "camelCase")]
pub struct AssistantRequest {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub message: String,
    #[serde(default)]
    pub current_code: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub history: Vec<ChatMessage>,
}

/// Response of `POST /api/ai`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct AssistantReply {
    pub response: String,
}
