//! Error types for Skape.

use thiserror::Error;

/// Library-level error type for Skape operations.
#[derive(Error, Debug)]
pub enum SkapeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Remote API error (status {status}): {body}")]
    Remote { status: u16, body: String },

    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Timed out waiting for job {job_id}; the remote job may still complete and can be queried manually")]
    Timeout { job_id: String },

    #[error("Operation cancelled")]
    Cancelled,

    #[error("Job {job_id} ended without success: {state}")]
    JobFailed { job_id: String, state: String },

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl SkapeError {
    /// True when the poll loop should keep going after this error.
    ///
    /// Only per-tick query failures are retryable; configuration problems,
    /// cancellation, and terminal job states are not.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            SkapeError::Transport(_) | SkapeError::Remote { .. } | SkapeError::Protocol(_)
        )
    }
}

/// Result type alias for Skape operations.
pub type Result<T> = std::result::Result<T, SkapeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_classification() {
        assert!(SkapeError::Protocol("bad body".into()).is_transient());
        assert!(SkapeError::Remote {
            status: 500,
            body: "oops".into()
        }
        .is_transient());
        assert!(!SkapeError::Config("no key".into()).is_transient());
        assert!(!SkapeError::Cancelled.is_transient());
        assert!(!SkapeError::Timeout {
            job_id: "cgt-1".into()
        }
        .is_transient());
    }

    #[test]
    fn timeout_message_names_job() {
        let err = SkapeError::Timeout {
            job_id: "cgt-2024".into(),
        };
        assert!(err.to_string().contains("cgt-2024"));
    }
}
