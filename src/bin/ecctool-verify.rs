//! ecctool-verify CLI Binary
//!
//! Command-line interface for verifying `ecctool repair-status` output.

use clap::Parser;
use ecctool_verify::cli::{map_error, Cli, RunContext};
use ecctool_verify::config::ConfigLoader;
use ecctool_verify::logging::{init_logging, LoggingConfig, LOG_ENV};
use std::process;
use tracing::{error, info};

fn main() {
    let cli = Cli::parse();

    let logging_config = build_logging_config(&cli);
    if let Err(e) = init_logging(&logging_config) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(2);
    }

    info!("ecctool-verify starting");

    let context = match RunContext::new(cli.workspace.clone(), cli.config.clone(), cli.ecctool.clone())
    {
        Ok(ctx) => ctx,
        Err(e) => {
            error!("Error loading configuration: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(2);
        }
    };

    match context.execute(&cli.command) {
        Ok(output) => {
            println!("{}", output.text);
            if !output.success {
                info!("Verification failed");
                process::exit(1);
            }
            info!("Verification passed");
        }
        Err(e) => {
            error!("Command failed: {}", e);
            eprintln!("{}", map_error(&e));
            process::exit(1);
        }
    }
}

/// Build logging configuration from CLI args, environment, and config file.
/// Logging stays off unless `--verbose`, `--log-level` or the filter
/// environment variable asks for it.
fn build_logging_config(cli: &Cli) -> LoggingConfig {
    let mut config = if let Some(ref config_path) = cli.config {
        ConfigLoader::load_from_file(config_path)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    } else {
        ConfigLoader::load(&cli.workspace)
            .ok()
            .map(|c| c.logging)
            .unwrap_or_default()
    };

    let requested =
        cli.verbose || cli.log_level.is_some() || std::env::var_os(LOG_ENV).is_some();
    config.enabled = config.enabled && requested;

    if cli.verbose {
        config.level = "debug".to_string();
    }
    if let Some(ref level) = cli.log_level {
        config.level = level.clone();
    }
    if let Some(ref format) = cli.log_format {
        config.format = format.clone();
    }
    if let Some(ref output) = cli.log_output {
        config.output = output.clone();
    }
    if let Some(ref file) = cli.log_file {
        config.file = Some(file.clone());
        if cli.log_output.is_none() {
            config.output = "file".to_string();
        }
    }

    config
}
