//! Scenario state and the step operations that drive `ecctool`.
//!
//! "When" steps invoke the tool and store the partitioned output on the
//! context; "then" steps validate (and consume) what is stored. Each scenario
//! starts from a fresh [`ScenarioContext`].

use crate::error::{ensure, VerifyError};
use crate::invoke::{status_params, RepairStatusSource};
use crate::output::{DetailView, ParsedOutput, Partition, TableView};
use crate::poll::{wait_for_job, JobCondition, PollPolicy};
use crate::rows::RowSet;
use crate::status::{JobId, StatusSummary};
use crate::validate;
use std::time::Duration;
use tracing::{debug, info};

/// Shared services for every step of a run.
pub struct StepEnv<'a> {
    pub source: &'a dyn RepairStatusSource,
    pub partition: Partition,
    pub poll: PollPolicy,
}

/// Per-scenario state carried between steps.
#[derive(Debug, Clone, Default)]
pub struct ScenarioContext {
    pub header: Vec<String>,
    pub rows: RowSet,
    pub summary: Vec<String>,
    pub table_info: Vec<String>,
    /// Body of the last repair trigger, searched for the job id.
    pub response: Option<String>,
}

impl ScenarioContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_response(&mut self, body: impl Into<String>) {
        self.response = Some(body.into());
    }

    fn store_table(&mut self, view: TableView) {
        self.header = view.header;
        self.rows = view.rows;
        self.summary = view.summary;
        self.table_info.clear();
    }

    fn store_detail(&mut self, view: DetailView) {
        self.table_info = view.info;
        self.header = view.header;
        self.rows = view.rows;
        self.summary.clear();
    }

    fn job_from_response(&self) -> Result<JobId, VerifyError> {
        let response = self
            .response
            .as_deref()
            .ok_or_else(|| VerifyError::assertion("No repair response recorded in this scenario"))?;
        validate::extract_job_id(response)
    }
}

fn run_status(env: &StepEnv<'_>, params: Vec<String>) -> Result<ParsedOutput, VerifyError> {
    let result = env.source.repair_status(&params)?;
    ParsedOutput::from_invocation(&result)
}

// When steps

/// List mode, optionally filtered by keyspace and limited.
pub fn list_tables(
    env: &StepEnv<'_>,
    ctx: &mut ScenarioContext,
    keyspace: Option<&str>,
    limit: Option<u32>,
) -> Result<(), VerifyError> {
    let parsed = run_status(env, status_params(keyspace, None, None, limit))?;
    ctx.store_table(TableView::partition(&parsed, env.partition)?);
    debug!(rows = ctx.rows.len(), "Listed tables");
    Ok(())
}

/// List mode filtered to one table.
pub fn list_jobs_for_table(
    env: &StepEnv<'_>,
    ctx: &mut ScenarioContext,
    keyspace: &str,
    table: &str,
) -> Result<(), VerifyError> {
    let parsed = run_status(env, status_params(Some(keyspace), Some(table), None, None))?;
    ctx.store_table(TableView::partition(&parsed, env.partition)?);
    Ok(())
}

/// Look up the job id of `keyspace.table`, then show that job in detail mode.
pub fn show_job(
    env: &StepEnv<'_>,
    ctx: &mut ScenarioContext,
    keyspace: &str,
    table: &str,
    limit: u32,
) -> Result<JobId, VerifyError> {
    let lookup = run_status(env, status_params(Some(keyspace), Some(table), None, None))?;
    let job_id = validate::extract_job_id(&lookup.lines().join("\n"))?;
    debug!(%job_id, keyspace, table, "Resolved job id");

    let parsed = run_status(env, status_params(None, None, Some(job_id.as_str()), Some(limit)))?;
    ctx.store_detail(DetailView::partition(&parsed, env.partition)?);
    Ok(job_id)
}

/// Trigger a repair and keep its output as the scenario's response body.
pub fn trigger_repair(
    env: &StepEnv<'_>,
    ctx: &mut ScenarioContext,
    keyspace: &str,
    table: &str,
) -> Result<(), VerifyError> {
    let result = env.source.run_repair(keyspace, table)?;
    let body = result.stdout_text()?;
    info!(keyspace, table, "Triggered repair");
    ctx.set_response(body);
    Ok(())
}

// Then steps

pub fn expect_valid_header(ctx: &ScenarioContext) -> Result<(), VerifyError> {
    validate::validate_header(&ctx.header, validate::TABLE_HEADER)
}

pub fn expect_row(ctx: &mut ScenarioContext, keyspace: &str, table: &str) -> Result<(), VerifyError> {
    validate::match_and_remove_row(&mut ctx.rows, keyspace, table).map(|_| ())
}

pub fn expect_no_more_rows(ctx: &mut ScenarioContext) -> Result<(), VerifyError> {
    validate::validate_last_table_row(&mut ctx.rows)
}

pub fn expect_row_count(ctx: &mut ScenarioContext, limit: usize) -> Result<(), VerifyError> {
    validate::validate_row_count(&mut ctx.rows, limit)
}

pub fn expect_summary(ctx: &ScenarioContext) -> Result<StatusSummary, VerifyError> {
    validate::validate_summary(&ctx.summary)
}

pub fn expect_detail_header(
    ctx: &ScenarioContext,
    keyspace: &str,
    table: &str,
) -> Result<(), VerifyError> {
    ensure(!ctx.table_info.is_empty(), || {
        "No job detail shown in this scenario".to_string()
    })?;
    validate::validate_detail_info(&ctx.table_info, keyspace, table)
}

pub fn expect_token_rows(ctx: &mut ScenarioContext, count: usize) -> Result<(), VerifyError> {
    validate::validate_token_list(&mut ctx.rows, count)
}

/// Poll the job named in the scenario's response until `condition` holds.
pub fn expect_job_reaches(
    env: &StepEnv<'_>,
    ctx: &ScenarioContext,
    condition: JobCondition,
) -> Result<Duration, VerifyError> {
    let job_id = ctx.job_from_response()?;
    wait_for_job(env.source, &job_id, condition, env.poll)
}
