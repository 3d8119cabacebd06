//! Stand-in executor used when no execution backend is configured
//!
//! Produces a fixed, clearly labelled payload without touching the network.
//! The report carries `mocked: true` so callers can tell it from a real run.

use crate::core_types::{ExecuteRequest, ExecutionReport};
use crate::errors::ProxyError;
use crate::executors::ExecutionBackend;
use async_trait::async_trait;

#[derive(Debug, Default, Clone)]
pub struct MockedExecutor;

impl MockedExecutor {
    pub fn new() -> Self {
        Self
    }

    pub fn report_for(request: &ExecuteRequest) -> ExecutionReport {
        let language = if request.language.is_empty() {
            "unknown"
        } else {
            request.language.as_str()
        };
        let output = format!(
            "Mocked execution — language: {}\nInput: {}\n\n=== Output ===\nHello from mocked runner!",
            language, request.input
        );

        ExecutionReport {
            output,
            time: Some("0.12s".to_string()),
            memory: Some("8MB".to_string()),
            status: "success".to_string(),
            logs: vec!["mocked".to_string()],
            mocked: true,
        }
    }
}

#[async_trait]
impl ExecutionBackend for MockedExecutor {
    async fn execute(&self, request: &ExecuteRequest) -> Result<ExecutionReport, ProxyError> {
        log::debug!("No execution backend configured, returning mocked output");
        Ok(Self::report_for(request))
    }

    fn is_enabled(&self) -> bool {
        false
    }
}
