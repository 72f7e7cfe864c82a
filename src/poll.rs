//! Waiting for a repair job to reach a state.
//!
//! [`wait_until`] is a flat, fixed-interval poll bounded by wall-clock time.
//! No backoff; the only way out besides success is the deadline.

use crate::error::VerifyError;
use crate::invoke::{status_params, RepairStatusSource};
use crate::output::ParsedOutput;
use crate::status::JobId;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Printed by the tool once a job record no longer exists.
pub const JOB_NOT_FOUND_MARKER: &str = "Repair job not found";

/// Printed in the detail view of a finished job (after collapsing spaces).
pub const JOB_COMPLETED_MARKER: &str = "Status : COMPLETED";

/// Interval and deadline of a poll.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub timeout: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(1),
            timeout: Duration::from_secs(150),
        }
    }
}

/// Evaluate `predicate` every `policy.interval` until it holds or
/// `policy.timeout` of wall-clock time has passed.
///
/// Returns the time it took for the predicate to hold. Predicate errors abort
/// the wait immediately.
pub fn wait_until<F>(
    description: &str,
    policy: PollPolicy,
    mut predicate: F,
) -> Result<Duration, VerifyError>
where
    F: FnMut() -> Result<bool, VerifyError>,
{
    debug!(description, timeout = ?policy.timeout, interval = ?policy.interval, "Waiting");
    let started = Instant::now();
    let mut attempts: u64 = 0;
    loop {
        attempts += 1;
        if predicate()? {
            let elapsed = started.elapsed();
            info!(description, attempts, elapsed_ms = elapsed.as_millis() as u64, "Condition met");
            return Ok(elapsed);
        }
        thread::sleep(policy.interval);
        let elapsed = started.elapsed();
        if elapsed >= policy.timeout {
            warn!(description, attempts, "Timed out");
            return Err(VerifyError::Timeout {
                description: description.to_string(),
                elapsed,
            });
        }
    }
}

/// State a job is expected to converge to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobCondition {
    /// The job record is gone.
    #[serde(alias = "gone")]
    Disappeared,
    /// The job reports `COMPLETED`.
    Completed,
}

impl JobCondition {
    pub fn marker(self) -> &'static str {
        match self {
            JobCondition::Disappeared => JOB_NOT_FOUND_MARKER,
            JobCondition::Completed => JOB_COMPLETED_MARKER,
        }
    }

    pub fn is_met(self, output: &ParsedOutput) -> bool {
        output.contains_collapsed(self.marker())
    }
}

impl fmt::Display for JobCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobCondition::Disappeared => f.write_str("disappeared"),
            JobCondition::Completed => f.write_str("completed"),
        }
    }
}

impl FromStr for JobCondition {
    type Err = VerifyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "gone" | "disappeared" => Ok(JobCondition::Disappeared),
            "completed" => Ok(JobCondition::Completed),
            other => Err(VerifyError::Config(format!(
                "Unknown job condition '{}' (expected 'completed' or 'gone')",
                other
            ))),
        }
    }
}

/// Re-query job `id` until `condition` holds.
pub fn wait_for_job(
    source: &dyn RepairStatusSource,
    id: &JobId,
    condition: JobCondition,
    policy: PollPolicy,
) -> Result<Duration, VerifyError> {
    let params = status_params(None, None, Some(id.as_str()), Some(1));
    let description = format!("job {} to be {}", id, condition);
    wait_until(&description, policy, || {
        let result = source.repair_status(&params)?;
        let output = ParsedOutput::from_invocation(&result)?;
        Ok(condition.is_met(&output))
    })
}
