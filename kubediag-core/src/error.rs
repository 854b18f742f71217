//! Diagnostic error types
//!
//! Every fallible operation in the crate returns [`DiagResult`]. Nothing in
//! here terminates the process; callers decide how to surface a failure.

use std::time::Duration;
use thiserror::Error;

/// Errors raised while talking to the cluster or reshaping its documents
#[derive(Debug, Error)]
pub enum DiagError {
    /// Error from kube-rs client (transport, API status, exec upgrade)
    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    /// Exec channel failed after it was opened
    #[error("Exec error: {0}")]
    Exec(String),

    /// Remote command did not finish before its deadline
    #[error("Exec in {namespace}/{pod} timed out after {timeout:?}")]
    ExecTimeout {
        namespace: String,
        pod: String,
        timeout: Duration,
    },

    /// Command rejected before an exec channel was opened
    #[error("Invalid command: {0}")]
    InvalidCommand(String),

    /// Untyped document did not match the expected schema
    #[error("Decode error in {context}: {message}")]
    Decode { context: String, message: String },

    /// Invalid kubeconfig
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal system error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DiagError {
    /// Build a decode error for the named document
    pub fn decode(context: impl Into<String>, message: impl std::fmt::Display) -> Self {
        DiagError::Decode {
            context: context.into(),
            message: message.to_string(),
        }
    }

    /// True for errors produced while reshaping a document
    pub fn is_decode(&self) -> bool {
        matches!(self, DiagError::Decode { .. })
    }

    /// True when the API server answered 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, DiagError::Kube(kube::Error::Api(resp)) if resp.code == 404)
    }
}

/// Result type alias for diagnostic operations
pub type DiagResult<T> = std::result::Result<T, DiagError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_message() {
        let err = DiagError::decode("rediscluster status", "missing field `cluster`");
        assert!(err.is_decode());
        assert_eq!(
            err.to_string(),
            "Decode error in rediscluster status: missing field `cluster`"
        );
    }

    #[test]
    fn test_timeout_display() {
        let err = DiagError::ExecTimeout {
            namespace: "fed-redis-cluster".to_string(),
            pod: "redis-0".to_string(),
            timeout: Duration::from_secs(5),
        };
        assert!(err.to_string().contains("fed-redis-cluster/redis-0"));
        assert!(!err.is_decode());
        assert!(!err.is_not_found());
    }
}
