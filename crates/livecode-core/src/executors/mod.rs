//! Code execution through a remote backend.
//!
//! The editor's run button ends up here. With a Judge0 URL configured, jobs
//! are resolved to a Judge0 language, submitted and polled to completion;
//! without one, a mocked executor answers so the UI keeps working offline.

use crate::config::ProxyConfig;
use crate::core_types::{ExecuteRequest, ExecutionReport};
use crate::errors::ProxyError;
use async_trait::async_trait;
use std::sync::Arc;

pub mod catalog;
pub mod judge0;
pub mod languages;
pub mod mocked;

pub use catalog::LanguageCatalog;
pub use judge0::Judge0Client;
pub use mocked::MockedExecutor;

#[async_trait]
pub trait ExecutionBackend: Send + Sync {
    /// Run one request end to end.
    ///
    /// Returns [`ProxyError::UnresolvedLanguage`] when the language is not
    /// supported; a poll timeout is a normal report with status `timeout`.
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecutionReport, ProxyError>;

    /// Whether a real backend sits behind this executor.
    fn is_enabled(&self) -> bool;
}

/// Build the executor selected by the configuration.
pub fn create_executor(config: &ProxyConfig) -> Result<Arc<dyn ExecutionBackend>, ProxyError> {
    match &config.execution {
        Some(backend) => {
            let client = Judge0Client::new(backend)?.with_timeout(config.execution_timeout);
            log::info!("Execution backend: Judge0 at {}", client.base_url());
            Ok(Arc::new(client))
        }
        None => {
            log::warn!("JUDGE0_URL not set, code execution will be mocked");
            Ok(Arc::new(MockedExecutor::new()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionBackendConfig;

    #[test]
    fn test_create_executor_without_backend_is_mocked() {
        let executor = create_executor(&ProxyConfig::default()).unwrap();
        assert!(!executor.is_enabled());
    }

    #[test]
    fn test_create_executor_with_backend() {
        let config = ProxyConfig {
            execution: Some(ExecutionBackendConfig {
                base_url: "http://localhost:2358".to_string(),
                api_key: Some("token".to_string()),
                api_host: None,
            }),
            ..Default::default()
        };
        let executor = create_executor(&config).unwrap();
        assert!(executor.is_enabled());
    }
}
