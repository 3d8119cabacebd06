//! Judge0 REST client: language catalog, submission and status polling
//!
//! Jobs are submitted asynchronously (`wait=false`) and then polled by token
//! until Judge0 reports a terminal status or the caller's deadline passes.
//! On deadline a last status fetch is made so whatever output exists is
//! returned, but the status is forced to `timeout`. Nothing is retried and an
//! abandoned token is never cancelled on the Judge0 side.

use crate::config::ExecutionBackendConfig;
use crate::core_types::{
    ExecuteRequest, ExecutionReport, ExecutionResult, LanguageDescriptor, SubmissionRequest,
    SubmissionToken, TIMEOUT_STATUS,
};
use crate::errors::ProxyError;
use crate::executors::catalog::LanguageCatalog;
use crate::executors::languages;
use crate::executors::ExecutionBackend;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::time::Duration;
use tokio::time::{sleep_until, Instant};

/// Per-request HTTP timeout towards Judge0.
pub const REQUEST_TIMEOUT: Duration = Duration::from_millis(5000);
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(300);
/// Judge0 CE status ids: 1 In Queue, 2 Processing, 3 Accepted, 4+ finished with
/// a verdict or error. Pinned to the 1.13 API.
pub const TERMINAL_STATUS_THRESHOLD: i64 = 3;

pub struct Judge0Client {
    client: Client,
    base_url: String,
    catalog: LanguageCatalog,
    default_timeout: Duration,
    poll_interval: Duration,
    terminal_status_threshold: i64,
}

#[derive(Debug, Serialize)]
struct Judge0SubmissionBody<'a> {
    language_id: u32,
    source_code: &'a str,
    stdin: &'a str,
    stdout: bool,
    stderr: bool,
    compile_output: bool,
    base64_encoded: bool,
}

#[derive(Debug, Deserialize)]
struct Judge0SubmissionCreated {
    #[serde(default)]
    token: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Judge0Status {
    #[serde(default)]
    id: Option<i64>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct Judge0SubmissionState {
    #[serde(default)]
    status: Option<Judge0Status>,
    #[serde(default)]
    stdout: Option<String>,
    #[serde(default)]
    stderr: Option<String>,
    #[serde(default)]
    compile_output: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    time: Option<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    memory: Option<String>,
}

// Judge0 reports `time` as a string and `memory` as an integer.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl Judge0SubmissionState {
    fn status_id(&self) -> i64 {
        self.status.as_ref().and_then(|s| s.id).unwrap_or(0)
    }

    fn into_result(self, status: String) -> ExecutionResult {
        ExecutionResult {
            stdout: self.stdout,
            stderr: self.stderr,
            compile_output: self.compile_output,
            message: self.message,
            time: self.time,
            memory: self.memory,
            status,
        }
    }
}

impl Judge0Client {
    /// Create a client for the given backend configuration.
    pub fn new(config: &ExecutionBackendConfig) -> Result<Self, ProxyError> {
        let headers = auth_headers(config.api_key.as_deref(), config.api_host.as_deref())?;
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()
            .map_err(|e| ProxyError::Config(format!("Failed to build Judge0 HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            catalog: LanguageCatalog::new(),
            default_timeout: crate::config::DEFAULT_EXECUTION_TIMEOUT,
            poll_interval: DEFAULT_POLL_INTERVAL,
            terminal_status_threshold: TERMINAL_STATUS_THRESHOLD,
        })
    }

    /// Deadline used by [`ExecutionBackend::execute`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Override the lowest status id treated as finished.
    pub fn with_terminal_status_threshold(mut self, threshold: i64) -> Self {
        self.terminal_status_threshold = threshold;
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn catalog(&self) -> &LanguageCatalog {
        &self.catalog
    }

    async fn fetch_languages(&self) -> Result<Vec<LanguageDescriptor>, ProxyError> {
        let url = format!("{}/languages", self.base_url);
        log::debug!("Fetching Judge0 language catalog from {}", url);

        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        let languages: Option<Vec<LanguageDescriptor>> = response
            .json()
            .await
            .map_err(|e| ProxyError::ProtocolError(format!("Failed to parse Judge0 languages: {}", e)))?;
        Ok(languages.unwrap_or_default())
    }

    /// Map a friendly key such as `python` or `cpp` to a Judge0 language id.
    pub async fn resolve_language_id(&self, key: &str) -> Result<Option<u32>, ProxyError> {
        let catalog = self.catalog.get_or_fetch(|| self.fetch_languages()).await?;
        Ok(languages::resolve_language_id(&catalog, key))
    }

    /// Submit a job without waiting for it to run.
    pub async fn submit(&self, request: &SubmissionRequest) -> Result<SubmissionToken, ProxyError> {
        let url = format!("{}/submissions?base64_encoded=false&wait=false", self.base_url);
        let body = Judge0SubmissionBody {
            language_id: request.language_id,
            source_code: &request.source,
            stdin: &request.stdin,
            stdout: true,
            stderr: true,
            compile_output: true,
            base64_encoded: false,
        };

        let response = self.client.post(&url).json(&body).send().await?;
        let response = check_status(response).await?;
        let created: Judge0SubmissionCreated = response
            .json()
            .await
            .map_err(|e| ProxyError::ProtocolError(format!("Failed to parse Judge0 submission: {}", e)))?;

        match created.token {
            Some(token) if !token.is_empty() => {
                log::debug!("Judge0 accepted submission {}", token);
                Ok(SubmissionToken(token))
            }
            _ => Err(ProxyError::ProtocolError(
                "Judge0 did not return a token".to_string(),
            )),
        }
    }

    async fn fetch_state(&self, token: &SubmissionToken) -> Result<Judge0SubmissionState, ProxyError> {
        let url = format!("{}/submissions/{}?base64_encoded=false", self.base_url, token.as_str());
        let response = self.client.get(&url).send().await?;
        let response = check_status(response).await?;
        let state: Option<Judge0SubmissionState> = response
            .json()
            .await
            .map_err(|e| ProxyError::ProtocolError(format!("Failed to parse Judge0 status: {}", e)))?;
        Ok(state.unwrap_or_default())
    }

    /// Submit a job and poll it until it finishes or `timeout` elapses.
    pub async fn run_submission(
        &self,
        request: &SubmissionRequest,
        timeout: Duration,
    ) -> Result<ExecutionResult, ProxyError> {
        let deadline = Instant::now() + timeout;
        let token = self.submit(request).await?;

        let mut polls = 0usize;
        while Instant::now() < deadline {
            let state = self.fetch_state(&token).await?;
            polls += 1;
            let status_id = state.status_id();
            log::debug!("Judge0 submission {} poll {} status {}", token.as_str(), polls, status_id);

            if status_id >= self.terminal_status_threshold {
                let description = state
                    .status
                    .as_ref()
                    .and_then(|s| s.description.clone())
                    .unwrap_or_else(|| "finished".to_string());
                return Ok(state.into_result(description));
            }

            sleep_until((Instant::now() + self.poll_interval).min(deadline)).await;
        }

        log::warn!(
            "Judge0 submission {} still running after {:?}, giving up after {} polls",
            token.as_str(),
            timeout,
            polls
        );
        let last = self.fetch_state(&token).await?;
        Ok(last.into_result(TIMEOUT_STATUS.to_string()))
    }
}

#[async_trait]
impl ExecutionBackend for Judge0Client {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecutionReport, ProxyError> {
        let language_id = self
            .resolve_language_id(&request.language)
            .await?
            .ok_or_else(|| ProxyError::UnresolvedLanguage(request.language.clone()))?;

        let submission = SubmissionRequest {
            language_id,
            source: request.code.clone(),
            stdin: request.input.clone(),
        };
        let result = self.run_submission(&submission, self.default_timeout).await?;
        Ok(ExecutionReport::from(result))
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

fn auth_headers(api_key: Option<&str>, api_host: Option<&str>) -> Result<HeaderMap, ProxyError> {
    let mut headers = HeaderMap::new();
    let mut insert = |name: &'static str, value: &str| -> Result<(), ProxyError> {
        let value = HeaderValue::from_str(value)
            .map_err(|e| ProxyError::Config(format!("Invalid value for {} header: {}", name, e)))?;
        headers.insert(HeaderName::from_static(name), value);
        Ok(())
    };

    match (api_key, api_host) {
        (Some(key), Some(host)) => {
            insert("x-rapidapi-key", key)?;
            insert("x-rapidapi-host", host)?;
        }
        (Some(key), None) => insert("x-auth-token", key)?,
        _ => {}
    }

    Ok(headers)
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProxyError> {
    if response.status().is_success() {
        return Ok(response);
    }
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProxyError::RemoteUnavailable(format!(
        "Judge0 request failed with status {}: {}",
        status, body
    )))
}
