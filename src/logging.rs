//! Logging System
//!
//! Structured logging using the `tracing` crate. Level, format, and
//! destination come from configuration, overridden by environment variables
//! and finally by CLI flags. Logs default to stderr so verification reports
//! on stdout stay machine-readable.

use crate::error::VerifyError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Registry};

/// Filter directive override (same syntax as `RUST_LOG`).
pub const LOG_ENV: &str = "ECCTOOL_VERIFY_LOG";
pub const LOG_FORMAT_ENV: &str = "ECCTOOL_VERIFY_LOG_FORMAT";
pub const LOG_OUTPUT_ENV: &str = "ECCTOOL_VERIFY_LOG_OUTPUT";

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Disable all logging when false
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output destination: stdout, stderr, file
    #[serde(default = "default_output")]
    pub output: String,

    /// Log file path (required when output is "file")
    #[serde(default)]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format, terminal outputs only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_output() -> String {
    "stderr".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: default_output(),
            file: None,
            color: default_true(),
            modules: HashMap::new(),
        }
    }
}

/// Log destination
#[derive(Debug, Clone, PartialEq, Eq)]
enum Destination {
    Stdout,
    Stderr,
    File(PathBuf),
}

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. CLI arguments (already folded into `config` by the binary)
/// 2. Environment variables (ECCTOOL_VERIFY_LOG, ECCTOOL_VERIFY_LOG_FORMAT, ...)
/// 3. Configuration file
/// 4. Defaults
pub fn init_logging(config: &LoggingConfig) -> Result<(), VerifyError> {
    if !config.enabled {
        return Ok(());
    }

    let filter = build_env_filter(config)?;
    let format = determine_format(config)?;
    let destination = determine_destination(config)?;
    let base_subscriber = Registry::default().with(filter);

    // Each arm needs its own concrete layer type, so the match spells them out.
    let json = format == "json";
    let installed = match destination {
        Destination::File(path) => {
            let file_writer = open_log_file(&path)?;
            if json {
                base_subscriber
                    .with(
                        fmt::layer()
                            .json()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_writer(std::sync::Mutex::new(file_writer)),
                    )
                    .try_init()
            } else {
                base_subscriber
                    .with(
                        fmt::layer()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_ansi(false)
                            .with_writer(std::sync::Mutex::new(file_writer)),
                    )
                    .try_init()
            }
        }
        Destination::Stdout => {
            if json {
                base_subscriber
                    .with(
                        fmt::layer()
                            .json()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_writer(std::io::stdout),
                    )
                    .try_init()
            } else {
                base_subscriber
                    .with(
                        fmt::layer()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_ansi(config.color)
                            .with_writer(std::io::stdout),
                    )
                    .try_init()
            }
        }
        Destination::Stderr => {
            if json {
                base_subscriber
                    .with(
                        fmt::layer()
                            .json()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_writer(std::io::stderr),
                    )
                    .try_init()
            } else {
                base_subscriber
                    .with(
                        fmt::layer()
                            .with_target(true)
                            .with_timer(ChronoUtc::rfc_3339())
                            .with_ansi(config.color)
                            .with_writer(std::io::stderr),
                    )
                    .try_init()
            }
        }
    };
    installed.map_err(|e| VerifyError::Config(format!("Failed to install log subscriber: {}", e)))
}

fn open_log_file(path: &Path) -> Result<std::fs::File, VerifyError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| {
            VerifyError::Config(format!("Failed to create log directory: {}", e))
        })?;
    }
    std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| {
            VerifyError::Config(format!("Failed to open log file {}: {}", path.display(), e))
        })
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, VerifyError> {
    if let Ok(filter) = EnvFilter::try_from_env(LOG_ENV) {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::new(&config.level);
    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| VerifyError::Config(format!("Invalid log directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Determine output format from environment or config
fn determine_format(config: &LoggingConfig) -> Result<String, VerifyError> {
    if let Ok(format) = std::env::var(LOG_FORMAT_ENV) {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    parse_format(&config.format)
}

fn parse_format(format: &str) -> Result<String, VerifyError> {
    if format != "json" && format != "text" {
        return Err(VerifyError::Config(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            format
        )));
    }
    Ok(format.to_string())
}

/// Determine the destination from environment or config
fn determine_destination(config: &LoggingConfig) -> Result<Destination, VerifyError> {
    let output = std::env::var(LOG_OUTPUT_ENV).unwrap_or_else(|_| config.output.clone());
    parse_destination(&output, config.file.as_ref())
}

fn parse_destination(output: &str, file: Option<&PathBuf>) -> Result<Destination, VerifyError> {
    match output {
        "stdout" => Ok(Destination::Stdout),
        "stderr" => Ok(Destination::Stderr),
        "file" => file.cloned().map(Destination::File).ok_or_else(|| {
            VerifyError::Config("Log output 'file' requires a log file path".to_string())
        }),
        _ => Err(VerifyError::Config(format!(
            "Invalid log output: {} (must be 'stdout', 'stderr', or 'file')",
            output
        ))),
    }
}
