//! CLI command-name contract for logging and routing.

use crate::cli::parse::Commands;

/// Command name string for log records (e.g. "run", "wait").
pub fn command_name(command: &Commands) -> &'static str {
    match command {
        Commands::Run { .. } => "run",
        Commands::List { .. } => "list",
        Commands::Show { .. } => "show",
        Commands::Wait { .. } => "wait",
    }
}

/// Split `keyspace.table` at the first dot.
pub fn split_target(target: &str) -> Option<(&str, &str)> {
    let (keyspace, table) = target.split_once('.')?;
    if keyspace.is_empty() || table.is_empty() {
        return None;
    }
    Some((keyspace, table))
}
