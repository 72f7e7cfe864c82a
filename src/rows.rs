//! Row collection consumed by expected-row assertions.
//!
//! Rows behave as a multiset: each assertion removes at most one matching
//! row, in any order, so repeated checks never count the same row twice.

use crate::error::VerifyError;
use regex::Regex;
use serde::Serialize;
use std::fmt;

/// Trim `line` and collapse runs of spaces into one.
pub fn strip_and_collapse(line: &str) -> String {
    let mut out = String::with_capacity(line.len());
    let mut last_space = false;
    for c in line.trim().chars() {
        if c == ' ' {
            if !last_space {
                out.push(c);
            }
            last_space = true;
        } else {
            out.push(c);
            last_space = false;
        }
    }
    out
}

/// True for a line made of a single repeated border character, e.g. `-----`.
pub fn is_border_line(line: &str) -> bool {
    let line = line.trim();
    let mut chars = line.chars();
    match chars.next() {
        Some(first) if !first.is_alphanumeric() && !first.is_whitespace() && first != '|' => {
            chars.all(|c| c == first)
        }
        _ => false,
    }
}

/// Compile `pattern` so it only matches at the start of a row.
pub fn anchored(pattern: &str) -> Result<Regex, VerifyError> {
    Regex::new(&format!("^(?:{})", pattern))
        .map_err(|e| VerifyError::assertion(format!("Invalid row pattern '{}': {}", pattern, e)))
}

/// Unordered, consumable collection of output rows.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RowSet {
    rows: Vec<String>,
}

impl RowSet {
    pub fn new(rows: Vec<String>) -> Self {
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn as_slice(&self) -> &[String] {
        &self.rows
    }

    /// Remove and return the first row whose collapsed text matches `re`.
    pub fn take_matching(&mut self, re: &Regex) -> Option<String> {
        let idx = self
            .rows
            .iter()
            .position(|row| re.is_match(&strip_and_collapse(row)))?;
        Some(self.rows.remove(idx))
    }

    /// Remove one row matching `pattern`, failing if none remains.
    pub fn match_and_remove(&mut self, pattern: &str) -> Result<String, VerifyError> {
        let re = anchored(pattern)?;
        self.take_matching(&re)
            .ok_or_else(|| VerifyError::assertion(format!("{} not found in {}", pattern, self)))
    }

    /// Remove the single remaining row, which must be the closing border.
    pub fn remove_last_border(&mut self) -> Result<(), VerifyError> {
        if self.rows.len() != 1 {
            return Err(VerifyError::assertion(format!(
                "Expecting last element to be a table border in {}",
                self
            )));
        }
        if !is_border_line(&self.rows[0]) {
            return Err(VerifyError::assertion(format!(
                "Expecting last element to be a table border, got '{}'",
                self.rows[0]
            )));
        }
        self.rows.clear();
        Ok(())
    }
}

impl fmt::Display for RowSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.rows)
    }
}

impl From<Vec<String>> for RowSet {
    fn from(rows: Vec<String>) -> Self {
        RowSet::new(rows)
    }
}
