//! Format checks over partitioned output regions.
//!
//! Every check returns `Err(VerifyError::Assertion)` carrying the offending
//! text; nothing is retried here.

use crate::error::{ensure, VerifyError};
use crate::rows::{anchored, is_border_line, strip_and_collapse, RowSet};
use crate::status::{JobId, StatusSummary, STATUS_PATTERN};
use regex::Regex;
use std::sync::LazyLock;

/// Header row of the list view, compared after collapsing spaces.
pub const TABLE_HEADER: &str =
    "| Id | Keyspace | Table | Status | Repaired(%) | Completed at | Next repair | Recurring |";

/// Wildcard accepted for keyspace and table in row patterns.
pub const ANY: &str = ".*";

static TOKEN_ROW_RE: LazyLock<Regex> =
    LazyLock::new(|| anchored(&token_row_pattern()).expect("token row pattern compiles"));

/// Pattern for one list-view row of `keyspace.table`.
///
/// Both names are interpolated verbatim, so [`ANY`] matches every row.
pub fn table_row_pattern(keyspace: &str, table: &str) -> String {
    format!(
        r"\| .* \| {} \| {} \| {} \| \d+[.]\d+ \| .* \| .* \|",
        keyspace, table, STATUS_PATTERN
    )
}

/// Pattern for one row of the token table in the detail view.
pub fn token_row_pattern() -> String {
    r"\| [-]?\d+ \| [-]?\d+ \| .* \| .* \| (True|False) \|".to_string()
}

/// Header block: border, `expected`, border.
pub fn validate_header(header: &[String], expected: &str) -> Result<(), VerifyError> {
    ensure(header.len() == 3, || {
        format!("Expecting a 3 line header, got {:?}", header)
    })?;
    ensure(is_border_line(&header[0]), || {
        format!("Faulty header border '{}'", header[0])
    })?;
    ensure(strip_and_collapse(&header[1]) == expected, || {
        format!("Faulty header '{}', expected '{}'", header[1], expected)
    })?;
    ensure(is_border_line(&header[2]), || {
        format!("Faulty header border '{}'", header[2])
    })
}

/// Consume one row for `keyspace.table`.
pub fn match_and_remove_row(
    rows: &mut RowSet,
    keyspace: &str,
    table: &str,
) -> Result<String, VerifyError> {
    rows.match_and_remove(&table_row_pattern(keyspace, table))
}

/// Only the closing border may remain; it is consumed.
pub fn validate_last_table_row(rows: &mut RowSet) -> Result<(), VerifyError> {
    rows.remove_last_border()
}

/// Exactly `limit` rows plus the closing border.
pub fn validate_row_count(rows: &mut RowSet, limit: usize) -> Result<(), VerifyError> {
    ensure(rows.len() == limit + 1, || {
        format!("Expecting only {} table element from {}", limit, rows)
    })?;
    for _ in 0..limit {
        match_and_remove_row(rows, ANY, ANY)?;
    }
    validate_last_table_row(rows)
}

/// Exactly one line, shaped like the summary.
pub fn validate_summary(summary: &[String]) -> Result<StatusSummary, VerifyError> {
    ensure(summary.len() == 1, || "Expecting only 1 row summary".to_string())?;
    summary[0].parse()
}

/// The seven labeled lines at the top of the detail view.
pub fn validate_detail_info(
    info: &[String],
    keyspace: &str,
    table: &str,
) -> Result<(), VerifyError> {
    ensure(info.len() == 7, || {
        format!("Expecting 7 job info lines, got {:?}", info)
    })?;
    let line = |i: usize| strip_and_collapse(&info[i]);
    let matches = |i: usize, pattern: &str| -> Result<bool, VerifyError> {
        Ok(anchored(pattern)?.is_match(&line(i)))
    };

    ensure(matches(0, "Id : .*")?, || format!("Faulty Id '{}'", info[0]))?;
    ensure(line(1) == format!("Keyspace : {}", keyspace), || {
        format!("Faulty keyspace '{}'", info[1])
    })?;
    ensure(line(2) == format!("Table : {}", table), || {
        format!("Faulty table '{}'", info[2])
    })?;
    ensure(matches(3, &format!("Status : {}", STATUS_PATTERN))?, || {
        format!("Faulty status '{}'", info[3])
    })?;
    ensure(matches(4, r"Repaired\(%\) : \d+[.]\d+")?, || {
        format!("Faulty repaired(%) '{}'", info[4])
    })?;
    ensure(matches(5, "Completed at : .*")?, || {
        format!("Faulty repaired at '{}'", info[5])
    })?;
    ensure(matches(6, "Next repair : .*")?, || {
        format!("Faulty next repair '{}'", info[6])
    })
}

/// Consume the first token row, wherever it sits.
pub fn remove_token_row(rows: &mut RowSet) -> Result<String, VerifyError> {
    rows.take_matching(&TOKEN_ROW_RE).ok_or_else(|| {
        VerifyError::assertion(format!("{} not found in {}", token_row_pattern(), rows))
    })
}

/// `count` token rows followed by the closing border.
pub fn validate_token_list(rows: &mut RowSet, count: usize) -> Result<(), VerifyError> {
    for _ in 0..count {
        remove_token_row(rows)?;
    }
    validate_last_table_row(rows)
}

/// First job id in `text`.
pub fn extract_job_id(text: &str) -> Result<JobId, VerifyError> {
    JobId::find_in(text)
}
