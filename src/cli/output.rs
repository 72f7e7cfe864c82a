//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::VerifyError;

/// Map verification errors to a string for CLI output.
pub fn map_error(e: &VerifyError) -> String {
    match e {
        VerifyError::Spawn { program, .. } => format!(
            "{}\nSet --ecctool or [ecctool] path in the configuration to point at {}.",
            e,
            program.display()
        ),
        _ => e.to_string(),
    }
}

/// Text printed by a command and whether the command passed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    pub text: String,
    pub success: bool,
}

impl CommandOutput {
    pub fn passed(text: String) -> Self {
        Self {
            text,
            success: true,
        }
    }

    pub fn failed(text: String) -> Self {
        Self {
            text,
            success: false,
        }
    }
}
