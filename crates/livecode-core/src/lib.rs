//! Backend core for the LiveCode+ online editor.
//!
//! The editor talks to two remote services through this crate:
//!
//! - **Execution**: a Judge0 instance compiles and runs the user's code. The
//!   friendly language key is resolved against Judge0's catalog, the job is
//!   submitted asynchronously and polled until it finishes or times out.
//! - **Assistant**: Google Gemini answers chat messages with the editor's
//!   current code attached as context.
//!
//! Either backend may be left unconfigured, in which case a degraded
//! implementation answers without touching the network.

pub mod assistant;
pub mod config;
pub mod core_types;
pub mod errors;
pub mod executors;

pub use assistant::{create_assistant, Assistant};
pub use config::ProxyConfig;
pub use core_types::*;
pub use errors::ProxyError;
pub use executors::{create_executor, ExecutionBackend};

#[cfg(test)]
pub mod test_utils;
