//! Output partitioning: splits decoded tool output into the regions the
//! validators work on.

use crate::error::VerifyError;
use crate::invoke::{decode_ascii, InvocationResult};
use crate::rows::{is_border_line, strip_and_collapse, RowSet};
use serde::{Deserialize, Serialize};

/// How regions are located inside the output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Partition {
    /// Locate regions by table border lines.
    #[default]
    Markers,
    /// Slice at fixed line offsets.
    Fixed,
}

/// Standard output trimmed and split into lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOutput {
    lines: Vec<String>,
}

impl ParsedOutput {
    pub fn from_text(text: &str) -> Self {
        let trimmed = text.trim();
        let lines = trimmed
            .split('\n')
            .map(|line| line.trim_end_matches('\r').to_string())
            .collect();
        Self { lines }
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, VerifyError> {
        Ok(Self::from_text(&decode_ascii(bytes)?))
    }

    pub fn from_invocation(result: &InvocationResult) -> Result<Self, VerifyError> {
        Self::from_bytes(&result.stdout)
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// True if any line contains `marker` once runs of spaces are collapsed.
    pub fn contains_collapsed(&self, marker: &str) -> bool {
        self.lines
            .iter()
            .any(|line| strip_and_collapse(line).contains(marker))
    }
}

/// List-mode regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableView {
    pub header: Vec<String>,
    pub rows: RowSet,
    pub summary: Vec<String>,
}

impl TableView {
    pub fn partition(output: &ParsedOutput, mode: Partition) -> Result<Self, VerifyError> {
        match mode {
            Partition::Markers => Self::by_markers(output),
            Partition::Fixed => Ok(Self::by_offsets(output)),
        }
    }

    /// Header `[0:3]`, rows `[3:-1]`, summary `[-1:]`.
    pub fn by_offsets(output: &ParsedOutput) -> Self {
        let lines = output.lines();
        let n = lines.len();
        let header_end = n.min(3);
        let rows_end = n.saturating_sub(1).max(header_end);
        Self {
            header: lines[..header_end].to_vec(),
            rows: RowSet::new(lines[header_end..rows_end].to_vec()),
            summary: lines[n.saturating_sub(1)..].to_vec(),
        }
    }

    /// Header block framed by the first two borders, summary as the last line,
    /// rows in between with the closing border kept as the last row.
    pub fn by_markers(output: &ParsedOutput) -> Result<Self, VerifyError> {
        let lines = output.lines();
        let top = lines
            .iter()
            .position(|l| is_border_line(l))
            .ok_or_else(|| VerifyError::Partition(format!("no table border in {:?}", lines)))?;
        let header_end = top + 3;
        if header_end > lines.len() || !is_border_line(&lines[top + 2]) {
            return Err(VerifyError::Partition(format!(
                "table header is not framed by borders in {:?}",
                lines
            )));
        }
        let summary_idx = lines.len() - 1;
        if summary_idx < header_end {
            return Err(VerifyError::Partition(format!(
                "no summary after table header in {:?}",
                lines
            )));
        }
        Ok(Self {
            header: lines[top..header_end].to_vec(),
            rows: RowSet::new(lines[header_end..summary_idx].to_vec()),
            summary: vec![lines[summary_idx].clone()],
        })
    }
}

/// Single-job detail regions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DetailView {
    pub info: Vec<String>,
    pub header: Vec<String>,
    pub rows: RowSet,
}

impl DetailView {
    pub fn partition(output: &ParsedOutput, mode: Partition) -> Result<Self, VerifyError> {
        match mode {
            Partition::Markers => Self::by_markers(output),
            Partition::Fixed => Ok(Self::by_offsets(output)),
        }
    }

    /// Info `[0:7]`, header `[8:9]`, rows `[11:]`.
    pub fn by_offsets(output: &ParsedOutput) -> Self {
        let lines = output.lines();
        let slice = |from: usize, to: usize| {
            let from = from.min(lines.len());
            let to = to.min(lines.len());
            lines[from..to].to_vec()
        };
        Self {
            info: slice(0, 7),
            header: slice(8, 9),
            rows: RowSet::new(slice(11, lines.len())),
        }
    }

    /// Info runs up to the first blank or border line; the token table that
    /// follows is framed the same way as the list view.
    pub fn by_markers(output: &ParsedOutput) -> Result<Self, VerifyError> {
        let lines = output.lines();
        let info_end = lines
            .iter()
            .position(|l| l.trim().is_empty() || is_border_line(l))
            .unwrap_or(lines.len());
        let top = lines[info_end..]
            .iter()
            .position(|l| is_border_line(l))
            .map(|offset| info_end + offset)
            .ok_or_else(|| {
                VerifyError::Partition(format!("no token table border in {:?}", lines))
            })?;
        if top + 3 > lines.len() || !is_border_line(&lines[top + 2]) {
            return Err(VerifyError::Partition(format!(
                "token table header is not framed by borders in {:?}",
                lines
            )));
        }
        Ok(Self {
            info: lines[..info_end].to_vec(),
            header: vec![lines[top + 1].clone()],
            rows: RowSet::new(lines[top + 3..].to_vec()),
        })
    }
}
