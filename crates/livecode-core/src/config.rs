//! Environment-driven configuration for both proxies
//!
//! Configuration is read once at startup. A missing backend URL or credential
//! is not an error: it switches the matching proxy into its degraded mode.
//! Only values that are present but unparsable fail startup.

use crate::errors::ProxyError;
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 4000;
pub const DEFAULT_EXECUTION_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-3-flash-preview";
pub const DEFAULT_GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Connection settings for the remote execution backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExecutionBackendConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    /// RapidAPI host. When present the key is sent RapidAPI-style.
    pub api_host: Option<String>,
}

/// Connection settings for the generative backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssistantBackendConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    pub execution: Option<ExecutionBackendConfig>,
    pub assistant: Option<AssistantBackendConfig>,
    pub port: u16,
    pub execution_timeout: Duration,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            execution: None,
            assistant: None,
            port: DEFAULT_PORT,
            execution_timeout: DEFAULT_EXECUTION_TIMEOUT,
        }
    }
}

impl ProxyConfig {
    /// Load from the process environment, honouring a `.env` file if one exists.
    pub fn from_env() -> Result<Self, ProxyError> {
        match dotenvy::dotenv() {
            Ok(path) => log::debug!("Loaded environment overrides from {}", path.display()),
            Err(e) if e.not_found() => {}
            Err(e) => log::warn!("Ignoring unreadable .env file: {}", e),
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Load from an arbitrary variable source. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProxyError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let execution = var("JUDGE0_URL").map(|base_url| ExecutionBackendConfig {
            base_url,
            api_key: var("JUDGE0_KEY"),
            api_host: var("JUDGE0_HOST"),
        });

        let assistant = var("GEMINI_API_KEY").map(|api_key| AssistantBackendConfig {
            api_key,
            model: var("GEMINI_MODEL").unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string()),
            base_url: var("GEMINI_BASE_URL").unwrap_or_else(|| DEFAULT_GEMINI_BASE_URL.to_string()),
        });

        let port = match var("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|e| ProxyError::Config(format!("Invalid PORT '{}': {}", raw, e)))?,
            None => DEFAULT_PORT,
        };

        let execution_timeout = match var("EXECUTION_TIMEOUT_MS") {
            Some(raw) => raw
                .trim()
                .parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| {
                    ProxyError::Config(format!("Invalid EXECUTION_TIMEOUT_MS '{}': {}", raw, e))
                })?,
            None => DEFAULT_EXECUTION_TIMEOUT,
        };

        Ok(Self {
            execution,
            assistant,
            port,
            execution_timeout,
        })
    }

    pub fn execution_enabled(&self) -> bool {
        self.execution.is_some()
    }

    pub fn assistant_enabled(&self) -> bool {
        self.assistant.is_some()
    }
}
