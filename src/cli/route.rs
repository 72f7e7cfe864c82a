//! CLI route: single route table and run context. Dispatches to the scenario
//! operations and presentation.

use crate::config::{ConfigLoader, VerifierConfig};
use crate::error::{ensure, VerifyError};
use crate::feature::{load_feature, run_feature, RunReport, StepRegistry};
use crate::invoke::EcctoolCommand;
use crate::poll::{wait_for_job, JobCondition};
use crate::rows::is_border_line;
use crate::scenario::{self, ScenarioContext, StepEnv};
use crate::status::{JobId, RepairJobRow};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info};

use crate::cli::help::{command_name, split_target};
use crate::cli::output::CommandOutput;
use crate::cli::parse::Commands;
use crate::cli::presentation::{
    format_list_result_json, format_list_result_text, format_run_report_json,
    format_run_report_text, format_show_result, format_wait_result,
};

/// Runtime context for CLI execution: loaded configuration and the tool under test.
pub struct RunContext {
    workspace_root: PathBuf,
    config: VerifierConfig,
    ecctool: EcctoolCommand,
}

enum Format {
    Text,
    Json,
}

fn parse_format(format: &str) -> Result<Format, VerifyError> {
    match format {
        "text" => Ok(Format::Text),
        "json" => Ok(Format::Json),
        other => Err(VerifyError::Config(format!(
            "Unknown output format '{}' (expected 'text' or 'json')",
            other
        ))),
    }
}

impl RunContext {
    /// Create run context from workspace root, optional config path and
    /// optional executable override. Uses ConfigLoader only.
    pub fn new(
        workspace_root: PathBuf,
        config_path: Option<PathBuf>,
        ecctool_override: Option<PathBuf>,
    ) -> Result<Self, VerifyError> {
        let mut config = if let Some(ref cfg_path) = config_path {
            ConfigLoader::load_from_file(cfg_path)?
        } else {
            ConfigLoader::load(&workspace_root)?
        };
        if let Some(path) = ecctool_override {
            config.ecctool.path = path;
        }
        Ok(Self::from_config(workspace_root, config))
    }

    pub fn from_config(workspace_root: PathBuf, config: VerifierConfig) -> Self {
        let ecctool = EcctoolCommand::new(
            config.ecctool.path.clone(),
            config.ecctool.subcommand.clone(),
        );
        Self {
            workspace_root,
            config,
            ecctool,
        }
    }

    fn step_env(&self) -> StepEnv<'_> {
        StepEnv {
            source: &self.ecctool,
            partition: self.config.output.partition,
            poll: self.config.poll.policy(),
        }
    }

    /// Relative feature paths that do not exist as given are looked up in the workspace.
    fn resolve_feature(&self, path: &Path) -> PathBuf {
        if path.is_relative() && !path.exists() {
            let candidate = self.workspace_root.join(path);
            if candidate.exists() {
                return candidate;
            }
        }
        path.to_path_buf()
    }

    pub fn execute(&self, command: &Commands) -> Result<CommandOutput, VerifyError> {
        let started = Instant::now();
        info!(command = command_name(command), "Executing command");
        let result = self.execute_inner(command);
        debug!(
            command = command_name(command),
            ok = result.is_ok(),
            duration_ms = started.elapsed().as_millis() as u64,
            "Command finished"
        );
        result
    }

    fn execute_inner(&self, command: &Commands) -> Result<CommandOutput, VerifyError> {
        match command {
            Commands::Run { features, format } => self.handle_run(features, format),
            Commands::List {
                keyspace,
                table,
                limit,
                format,
            } => self.handle_list(keyspace.as_deref(), table.as_deref(), *limit, format),
            Commands::Show {
                target,
                limit,
                tokens,
            } => self.handle_show(target, *limit, *tokens),
            Commands::Wait {
                id,
                until,
                timeout_secs,
            } => self.handle_wait(id, until, *timeout_secs),
        }
    }

    fn handle_run(&self, features: &[PathBuf], format: &str) -> Result<CommandOutput, VerifyError> {
        let format = parse_format(format)?;
        let registry = StepRegistry::repair_status_steps()?;
        let env = self.step_env();

        let mut report = RunReport::new();
        for path in features {
            let feature = load_feature(&self.resolve_feature(path))?;
            report.features.push(run_feature(&feature, &registry, &env));
        }

        let text = match format {
            Format::Text => format_run_report_text(&report),
            Format::Json => format_run_report_json(&report)?,
        };
        Ok(if report.passed() {
            CommandOutput::passed(text)
        } else {
            CommandOutput::failed(text)
        })
    }

    fn handle_list(
        &self,
        keyspace: Option<&str>,
        table: Option<&str>,
        limit: Option<u32>,
        format: &str,
    ) -> Result<CommandOutput, VerifyError> {
        let format = parse_format(format)?;
        let env = self.step_env();
        let mut ctx = ScenarioContext::new();

        match (keyspace, table) {
            (Some(ks), Some(tbl)) => scenario::list_jobs_for_table(&env, &mut ctx, ks, tbl)?,
            _ => scenario::list_tables(&env, &mut ctx, keyspace, limit)?,
        }
        scenario::expect_valid_header(&ctx)?;

        let rows = ctx
            .rows
            .as_slice()
            .iter()
            .filter(|line| !is_border_line(line))
            .map(|line| line.parse::<RepairJobRow>())
            .collect::<Result<Vec<_>, _>>()?;
        if let Some(limit) = limit {
            ensure(rows.len() <= limit as usize, || {
                format!("Expecting at most {} rows, got {}", limit, rows.len())
            })?;
        }
        scenario::expect_row_count(&mut ctx, rows.len())?;
        let summary = scenario::expect_summary(&ctx)?;

        let text = match format {
            Format::Text => format_list_result_text(&rows, &summary),
            Format::Json => format_list_result_json(&rows, &summary)?,
        };
        Ok(CommandOutput::passed(text))
    }

    fn handle_show(
        &self,
        target: &str,
        limit: u32,
        tokens: Option<usize>,
    ) -> Result<CommandOutput, VerifyError> {
        let (keyspace, table) = split_target(target).ok_or_else(|| {
            VerifyError::Config(format!("Expected KEYSPACE.TABLE, got '{}'", target))
        })?;
        let env = self.step_env();
        let mut ctx = ScenarioContext::new();

        let job_id = scenario::show_job(&env, &mut ctx, keyspace, table, limit)?;
        scenario::expect_detail_header(&ctx, keyspace, table)?;
        if let Some(count) = tokens {
            scenario::expect_token_rows(&mut ctx, count)?;
        }
        Ok(CommandOutput::passed(format_show_result(
            &job_id,
            &ctx.table_info,
            tokens,
        )))
    }

    fn handle_wait(
        &self,
        id: &str,
        until: &str,
        timeout_secs: Option<u64>,
    ) -> Result<CommandOutput, VerifyError> {
        let job_id: JobId = id.parse()?;
        let condition: JobCondition = until.parse()?;
        let mut policy = self.config.poll.policy();
        if let Some(secs) = timeout_secs {
            policy.timeout = Duration::from_secs(secs);
        }

        let elapsed = wait_for_job(&self.ecctool, &job_id, condition, policy)?;
        Ok(CommandOutput::passed(format_wait_result(
            &job_id, condition, elapsed,
        )))
    }
}
