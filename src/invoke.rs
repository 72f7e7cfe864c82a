//! Process invocation for the external `ecctool` binary.
//!
//! Every call spawns one process, blocks until it exits, and hands back the
//! raw captured streams. Exit status is recorded for logging only; whether a
//! call "worked" is decided later from the text.

use crate::error::VerifyError;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Instant;
use tracing::{debug, trace};

/// Captured result of one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InvocationResult {
    pub stdout: Vec<u8>,
    pub stderr: Vec<u8>,
    /// Exit code, if the process exited normally.
    pub exit_code: Option<i32>,
}

impl InvocationResult {
    /// Result carrying only standard output (exit code 0).
    pub fn from_stdout(stdout: impl Into<Vec<u8>>) -> Self {
        Self {
            stdout: stdout.into(),
            stderr: Vec::new(),
            exit_code: Some(0),
        }
    }

    /// Standard output decoded strictly as ASCII.
    pub fn stdout_text(&self) -> Result<String, VerifyError> {
        decode_ascii(&self.stdout)
    }

    /// Standard error decoded strictly as ASCII.
    pub fn stderr_text(&self) -> Result<String, VerifyError> {
        decode_ascii(&self.stderr)
    }
}

/// Decode bytes as ASCII, failing on the first byte outside 0x00..=0x7f.
pub fn decode_ascii(bytes: &[u8]) -> Result<String, VerifyError> {
    if let Some(offset) = bytes.iter().position(|b| !b.is_ascii()) {
        return Err(VerifyError::Decode {
            byte: bytes[offset],
            offset,
        });
    }
    Ok(bytes.iter().map(|&b| b as char).collect())
}

/// Source of repair-status output.
///
/// The process-backed implementation is [`EcctoolCommand`]; tests plug in
/// scripted sources.
pub trait RepairStatusSource {
    /// Run `repair-status` with the given flags.
    fn repair_status(&self, params: &[String]) -> Result<InvocationResult, VerifyError>;

    /// Trigger an on-demand repair of `keyspace.table`.
    fn run_repair(&self, keyspace: &str, table: &str) -> Result<InvocationResult, VerifyError>;
}

/// Runs the real `ecctool` executable.
#[derive(Debug, Clone)]
pub struct EcctoolCommand {
    program: PathBuf,
    status_subcommand: String,
}

impl EcctoolCommand {
    pub fn new(program: impl Into<PathBuf>, status_subcommand: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            status_subcommand: status_subcommand.into(),
        }
    }

    /// Spawn the program with `args`, wait for it, and capture both streams.
    pub fn invoke(&self, args: &[String]) -> Result<InvocationResult, VerifyError> {
        debug!(program = %self.program.display(), ?args, "Invoking ecctool");
        let started = Instant::now();

        let output = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|source| VerifyError::Spawn {
                program: self.program.clone(),
                source,
            })?;

        let result = InvocationResult {
            stdout: output.stdout,
            stderr: output.stderr,
            exit_code: output.status.code(),
        };
        debug!(
            exit_code = ?result.exit_code,
            stdout_bytes = result.stdout.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ecctool finished"
        );
        if !result.stderr.is_empty() {
            trace!(stderr = %String::from_utf8_lossy(&result.stderr), "ecctool stderr");
        }
        Ok(result)
    }
}

impl RepairStatusSource for EcctoolCommand {
    fn repair_status(&self, params: &[String]) -> Result<InvocationResult, VerifyError> {
        let mut args = Vec::with_capacity(params.len() + 1);
        args.push(self.status_subcommand.clone());
        args.extend(params.iter().cloned());
        self.invoke(&args)
    }

    fn run_repair(&self, keyspace: &str, table: &str) -> Result<InvocationResult, VerifyError> {
        let args = [
            "run-repair".to_string(),
            "--keyspace".to_string(),
            keyspace.to_string(),
            "--table".to_string(),
            table.to_string(),
        ];
        self.invoke(&args)
    }
}

/// Build `repair-status` flags from the optional filters.
pub fn status_params(
    keyspace: Option<&str>,
    table: Option<&str>,
    id: Option<&str>,
    limit: Option<u32>,
) -> Vec<String> {
    let mut params = Vec::new();
    if let Some(id) = id {
        params.push("--id".to_string());
        params.push(id.to_string());
    }
    if let Some(keyspace) = keyspace {
        params.push("--keyspace".to_string());
        params.push(keyspace.to_string());
    }
    if let Some(table) = table {
        params.push("--table".to_string());
        params.push(table.to_string());
    }
    if let Some(limit) = limit {
        params.push("--limit".to_string());
        params.push(limit.to_string());
    }
    params
}
