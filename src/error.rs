//! Error types for the repair-status verifier.

use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Verification errors
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Assertion failed: {0}")]
    Assertion(String),

    #[error("Timed out after {elapsed:?} waiting for {description}")]
    Timeout {
        description: String,
        elapsed: Duration,
    },

    #[error("Output is not ASCII: invalid byte 0x{byte:02x} at offset {offset}")]
    Decode { byte: u8, offset: usize },

    #[error("Cannot partition output: {0}")]
    Partition(String),

    #[error("Failed to run {}: {source}", program.display())]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to render json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Feature file {path}:{line}: {message}")]
    Feature {
        path: String,
        line: usize,
        message: String,
    },

    #[error("Undefined step: {0}")]
    UndefinedStep(String),
}

impl VerifyError {
    /// Shorthand for a failed assertion.
    pub fn assertion(message: impl Into<String>) -> Self {
        VerifyError::Assertion(message.into())
    }
}

impl From<config::ConfigError> for VerifyError {
    fn from(err: config::ConfigError) -> Self {
        VerifyError::Config(err.to_string())
    }
}

/// Fail with an assertion error unless `cond` holds.
pub fn ensure(cond: bool, message: impl FnOnce() -> String) -> Result<(), VerifyError> {
    if cond {
        Ok(())
    } else {
        Err(VerifyError::Assertion(message()))
    }
}
