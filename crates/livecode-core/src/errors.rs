//! Error types shared by the execution and assistant proxies
//!
//! Failures are grouped by what the caller can do about them: a language the
//! execution backend does not know is the caller's problem, while transport
//! and decoding failures belong to the remote backend. Timeouts are not errors
//! at all; they come back as a normal result with a `timeout` status.

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ProxyError {
    #[error("unsupported language: {0}")]
    UnresolvedLanguage(String),
    #[error("{0}")]
    RemoteUnavailable(String),
    #[error("{0}")]
    ProtocolError(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

impl ProxyError {
    /// True when the failure was caused by the request rather than a backend.
    pub fn is_client_error(&self) -> bool {
        matches!(self, ProxyError::UnresolvedLanguage(_))
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ProxyError::ProtocolError(err.to_string())
        } else {
            ProxyError::RemoteUnavailable(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unresolved_language_names_the_key() {
        let err = ProxyError::UnresolvedLanguage("brainfuck".to_string());
        assert_eq!(err.to_string(), "unsupported language: brainfuck");
        assert!(err.is_client_error());
    }

    #[test]
    fn test_remote_errors_carry_underlying_message() {
        let err = ProxyError::RemoteUnavailable("connection refused".to_string());
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.is_client_error());
    }
}
