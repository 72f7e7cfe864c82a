//! CLI presentation: text and json formatters per command.

use crate::error::VerifyError;
use crate::feature::{Outcome, RunReport};
use crate::poll::JobCondition;
use crate::status::{JobId, RepairJobRow, StatusSummary};
use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use owo_colors::OwoColorize;
use serde_json::json;
use std::time::Duration;

fn to_json(value: &serde_json::Value) -> Result<String, VerifyError> {
    Ok(serde_json::to_string_pretty(value)?)
}

pub fn format_list_result_text(rows: &[RepairJobRow], summary: &StatusSummary) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec![
        "Id",
        "Keyspace",
        "Table",
        "Status",
        "Repaired(%)",
        "Completed at",
        "Next repair",
    ]);
    for row in rows {
        table.add_row(vec![
            row.id.to_string(),
            row.keyspace.clone(),
            row.table.clone(),
            row.status.to_string(),
            format!("{:.2}", row.repaired_pct),
            row.completed_at.clone(),
            row.next_repair.clone(),
        ]);
    }
    format!(
        "{}\n{}\n{} Output matches the repair-status format",
        table,
        summary,
        "OK".green()
    )
}

pub fn format_list_result_json(
    rows: &[RepairJobRow],
    summary: &StatusSummary,
) -> Result<String, VerifyError> {
    to_json(&json!({ "valid": true, "rows": rows, "summary": summary }))
}

pub fn format_show_result(job_id: &JobId, info: &[String], token_rows: Option<usize>) -> String {
    let mut lines = vec![format!("{} Job {} detail view is valid", "OK".green(), job_id)];
    lines.extend(info.iter().map(|l| format!("  {}", l.trim())));
    if let Some(count) = token_rows {
        lines.push(format!("  Token rows: {}", count));
    }
    lines.join("\n")
}

pub fn format_wait_result(job_id: &JobId, condition: JobCondition, elapsed: Duration) -> String {
    format!(
        "{} Job {} {} after {:.1}s",
        "OK".green(),
        job_id,
        condition,
        elapsed.as_secs_f64()
    )
}

fn outcome_label(outcome: Outcome) -> String {
    match outcome {
        Outcome::Passed => "passed".green().to_string(),
        Outcome::Failed => "failed".red().to_string(),
        Outcome::Undefined => "undefined".yellow().to_string(),
    }
}

pub fn format_run_report_text(report: &RunReport) -> String {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL);
    table.set_header(vec!["Feature", "Scenario", "Result", "Steps", "Time (ms)"]);
    for feature in &report.features {
        for scenario in &feature.scenarios {
            table.add_row(vec![
                feature.name.clone(),
                scenario.name.clone(),
                outcome_label(scenario.outcome),
                scenario.steps_run.to_string(),
                scenario.duration_ms.to_string(),
            ]);
        }
    }

    let mut out = table.to_string();
    let failures: Vec<_> = report
        .features
        .iter()
        .flat_map(|f| f.scenarios.iter().map(move |s| (f, s)))
        .filter(|(_, s)| s.outcome != Outcome::Passed)
        .collect();
    for (feature, scenario) in &failures {
        out.push_str(&format!(
            "\n\n{}:{} {}\n  {}\n  {}",
            feature.path,
            scenario.line,
            scenario.name.bold(),
            scenario.failed_step.as_deref().unwrap_or_default(),
            scenario.message.as_deref().unwrap_or_default()
        ));
    }
    out.push_str(&format!(
        "\n\n{} passed, {} failed, {} undefined",
        report.count(Outcome::Passed),
        report.count(Outcome::Failed),
        report.count(Outcome::Undefined)
    ));
    out
}

pub fn format_run_report_json(report: &RunReport) -> Result<String, VerifyError> {
    Ok(serde_json::to_string_pretty(report)?)
}
