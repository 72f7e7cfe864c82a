//! Repair job vocabulary: status enumeration, job identifiers, and the
//! summary counters printed at the bottom of the list view.

use crate::error::VerifyError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use uuid::Uuid;

/// Canonical 8-4-4-4-12 hex UUID.
pub const ID_PATTERN: &str =
    r"[0-9a-fA-F]{8}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{4}-[0-9a-fA-F]{12}";

/// Alternation of every status literal.
pub const STATUS_PATTERN: &str = "(COMPLETED|IN_QUEUE|WARNING|ERROR)";

pub const SUMMARY_PATTERN: &str =
    r"Summary: (\d+) completed, (\d+) in queue, (\d+) warning, (\d+) error";

static ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(ID_PATTERN).expect("id pattern compiles"));
static SUMMARY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!("^{}", SUMMARY_PATTERN)).expect("summary pattern compiles")
});

/// Status of a repair job as reported by the tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RepairStatus {
    Completed,
    InQueue,
    Warning,
    Error,
}

impl RepairStatus {
    pub const ALL: [RepairStatus; 4] = [
        RepairStatus::Completed,
        RepairStatus::InQueue,
        RepairStatus::Warning,
        RepairStatus::Error,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            RepairStatus::Completed => "COMPLETED",
            RepairStatus::InQueue => "IN_QUEUE",
            RepairStatus::Warning => "WARNING",
            RepairStatus::Error => "ERROR",
        }
    }
}

impl fmt::Display for RepairStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RepairStatus {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RepairStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| VerifyError::assertion(format!("Faulty status '{}'", s)))
    }
}

/// Identifier of a repair job.
///
/// Keeps the text exactly as the tool printed it; that text is what gets
/// passed back on `--id`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct JobId {
    text: String,
    uuid: Uuid,
}

impl JobId {
    fn from_match(text: &str) -> Result<Self, VerifyError> {
        let uuid = Uuid::parse_str(text)
            .map_err(|e| VerifyError::assertion(format!("Faulty job id '{}': {}", text, e)))?;
        Ok(JobId {
            text: text.to_string(),
            uuid,
        })
    }

    /// Extract the first canonical UUID found anywhere in `text`.
    pub fn find_in(text: &str) -> Result<Self, VerifyError> {
        let found = ID_RE
            .find(text)
            .ok_or_else(|| VerifyError::assertion(format!("No job id found in '{}'", text)))?;
        Self::from_match(found.as_str())
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn uuid(&self) -> Uuid {
        self.uuid
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl FromStr for JobId {
    type Err = VerifyError;

    /// Only the canonical 8-4-4-4-12 form is accepted, in either case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match ID_RE.find(s) {
            Some(m) if m.start() == 0 && m.end() == s.len() => Self::from_match(s),
            _ => Err(VerifyError::assertion(format!("Faulty job id '{}'", s))),
        }
    }
}

impl TryFrom<String> for JobId {
    type Error = VerifyError;

    fn try_from(text: String) -> Result<Self, Self::Error> {
        text.parse()
    }
}

impl From<JobId> for String {
    fn from(id: JobId) -> Self {
        id.text
    }
}

/// Counters from the `Summary:` line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusSummary {
    pub completed: u64,
    pub in_queue: u64,
    pub warning: u64,
    pub error: u64,
}

impl StatusSummary {
    pub fn total(&self) -> u64 {
        self.completed + self.in_queue + self.warning + self.error
    }

    pub fn count(&self, status: RepairStatus) -> u64 {
        match status {
            RepairStatus::Completed => self.completed,
            RepairStatus::InQueue => self.in_queue,
            RepairStatus::Warning => self.warning,
            RepairStatus::Error => self.error,
        }
    }
}

impl FromStr for StatusSummary {
    type Err = VerifyError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let faulty = || VerifyError::assertion(format!("Faulty summary '{}'", line));
        let caps = SUMMARY_RE.captures(line).ok_or_else(faulty)?;
        let field = |i: usize| -> Result<u64, VerifyError> {
            caps.get(i)
                .and_then(|m| m.as_str().parse().ok())
                .ok_or_else(faulty)
        };
        Ok(StatusSummary {
            completed: field(1)?,
            in_queue: field(2)?,
            warning: field(3)?,
            error: field(4)?,
        })
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Summary: {} completed, {} in queue, {} warning, {} error",
            self.completed, self.in_queue, self.warning, self.error
        )
    }
}

/// One list-view row split into its cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairJobRow {
    pub id: JobId,
    pub keyspace: String,
    pub table: String,
    pub status: RepairStatus,
    pub repaired_pct: f64,
    pub completed_at: String,
    pub next_repair: String,
    pub recurring: String,
}

impl FromStr for RepairJobRow {
    type Err = VerifyError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let faulty = || VerifyError::assertion(format!("Faulty row '{}'", line));
        let inner = line
            .trim()
            .strip_prefix('|')
            .and_then(|l| l.strip_suffix('|'))
            .ok_or_else(faulty)?;
        let cells: Vec<&str> = inner.split('|').map(str::trim).collect();
        if cells.len() != 8 {
            return Err(faulty());
        }
        Ok(RepairJobRow {
            id: cells[0].parse()?,
            keyspace: cells[1].to_string(),
            table: cells[2].to_string(),
            status: cells[3].parse()?,
            repaired_pct: cells[4].parse().map_err(|_| faulty())?,
            completed_at: cells[5].to_string(),
            next_repair: cells[6].to_string(),
            recurring: cells[7].to_string(),
        })
    }
}
