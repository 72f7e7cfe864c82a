//! Configuration System
//!
//! Layered configuration for the verifier: built-in defaults, the global
//! config file, workspace config files, then `ECCTOOL_VERIFY__*` environment
//! variables. Validated once after loading.

use crate::error::VerifyError;
use crate::logging::LoggingConfig;
use crate::output::Partition;
use crate::poll::PollPolicy;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;
pub use sources::global_file::global_config_path;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VerifierConfig {
    /// External tool under test
    #[serde(default)]
    pub ecctool: EcctoolConfig,

    /// Job-state polling
    #[serde(default)]
    pub poll: PollConfig,

    /// Output partitioning
    #[serde(default)]
    pub output: OutputConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the tool lives and how its status command is named.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EcctoolConfig {
    #[serde(default = "default_ecctool_path")]
    pub path: PathBuf,

    #[serde(default = "default_subcommand")]
    pub subcommand: String,
}

fn default_ecctool_path() -> PathBuf {
    PathBuf::from("ecctool")
}

fn default_subcommand() -> String {
    "repair-status".to_string()
}

impl Default for EcctoolConfig {
    fn default() -> Self {
        Self {
            path: default_ecctool_path(),
            subcommand: default_subcommand(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_interval_ms() -> u64 {
    1000
}

fn default_timeout_secs() -> u64 {
    150
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_ms: default_interval_ms(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl PollConfig {
    pub fn policy(&self) -> PollPolicy {
        PollPolicy {
            interval: Duration::from_millis(self.interval_ms),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub partition: Partition,
}

impl VerifierConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), VerifyError> {
        let mut errors = Vec::new();

        if self.ecctool.path.as_os_str().is_empty() {
            errors.push("ecctool.path cannot be empty".to_string());
        }
        if self.ecctool.subcommand.trim().is_empty() {
            errors.push("ecctool.subcommand cannot be empty".to_string());
        }
        if self.poll.interval_ms == 0 {
            errors.push("poll.interval_ms must be greater than zero".to_string());
        }
        if Duration::from_millis(self.poll.interval_ms) >= Duration::from_secs(self.poll.timeout_secs)
        {
            errors.push(format!(
                "poll.interval_ms ({}) must be shorter than poll.timeout_secs ({})",
                self.poll.interval_ms, self.poll.timeout_secs
            ));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(VerifyError::Config(format!(
                "Configuration validation failed:\n{}",
                errors.join("\n")
            )))
        }
    }
}
