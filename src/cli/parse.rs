//! CLI parse: clap types for ecctool-verify. No behavior; definitions only.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// ecctool-verify - check the output of `ecctool repair-status`
#[derive(Parser)]
#[command(name = "ecctool-verify")]
#[command(about = "Verify the output of the ecctool repair-status command")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Workspace root directory (searched for config/config.toml)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Path to the ecctool executable (overrides configuration)
    #[arg(long)]
    pub ecctool: Option<PathBuf>,

    /// Enable verbose logging (default: off)
    #[arg(long, default_value = "false")]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run scenarios from feature files
    Run {
        /// Feature files to run, in order
        #[arg(required = true)]
        features: Vec<PathBuf>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// List repair jobs and validate the table, summary, and row count
    List {
        /// Only jobs of this keyspace
        #[arg(long)]
        keyspace: Option<String>,
        /// Only jobs of this table (requires --keyspace, not combined with --limit)
        #[arg(long, requires = "keyspace", conflicts_with = "limit")]
        table: Option<String>,
        /// Maximum number of rows
        #[arg(long)]
        limit: Option<u32>,
        /// Output format (text or json)
        #[arg(long, default_value = "text")]
        format: String,
    },
    /// Show the job of KEYSPACE.TABLE and validate its detail view
    Show {
        /// Table as keyspace.table
        target: String,
        /// Token row limit passed to ecctool
        #[arg(long, default_value = "1")]
        limit: u32,
        /// Expect exactly this many token rows
        #[arg(long)]
        tokens: Option<usize>,
    },
    /// Wait for a job to complete or disappear
    Wait {
        /// Job id (UUID)
        id: String,
        /// Target state: completed or gone
        #[arg(long, default_value = "completed")]
        until: String,
        /// Override the configured timeout
        #[arg(long)]
        timeout_secs: Option<u64>,
    },
}
