//! Scenario operations against a real child process.

use super::fake_ecctool::{repair_status_fake, FakeEcctool, JOB_ID};
use super::test_utils::fixture;
use ecctool_verify::error::VerifyError;
use ecctool_verify::invoke::{EcctoolCommand, RepairStatusSource};
use ecctool_verify::output::Partition;
use ecctool_verify::poll::{wait_for_job, JobCondition, PollPolicy};
use ecctool_verify::scenario::{self, ScenarioContext, StepEnv};
use std::time::Duration;

fn quick_poll() -> PollPolicy {
    PollPolicy {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(500),
    }
}

fn command(fake: &FakeEcctool) -> EcctoolCommand {
    EcctoolCommand::new(fake.path(), "repair-status")
}

fn env(command: &EcctoolCommand, partition: Partition) -> StepEnv<'_> {
    StepEnv {
        source: command,
        partition,
        poll: quick_poll(),
    }
}

#[test]
fn test_list_all_tables_through_process() {
    let fake = repair_status_fake();
    let command = command(&fake);
    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();

    scenario::list_tables(&env, &mut ctx, None, None).unwrap();
    scenario::expect_valid_header(&ctx).unwrap();
    scenario::expect_row(&mut ctx, "ks2", "tbl1").unwrap();
    scenario::expect_row(&mut ctx, "ks1", "tbl1").unwrap();
    scenario::expect_row(&mut ctx, "ks1", "tbl2").unwrap();
    scenario::expect_no_more_rows(&mut ctx).unwrap();
    let summary = scenario::expect_summary(&ctx).unwrap();
    assert_eq!(summary.completed, 1);
    assert_eq!(summary.warning, 1);

    assert_eq!(fake.calls(), vec!["repair-status".to_string()]);
}

#[test]
fn test_same_row_cannot_be_matched_twice() {
    let fake = repair_status_fake();
    let command = command(&fake);
    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();

    scenario::list_jobs_for_table(&env, &mut ctx, "ks1", "tbl1").unwrap();
    scenario::expect_row(&mut ctx, "ks1", "tbl1").unwrap();
    let err = scenario::expect_row(&mut ctx, "ks1", "tbl1").unwrap_err();
    assert!(matches!(err, VerifyError::Assertion(_)));
}

#[test]
fn test_fixed_offsets_agree_with_markers_on_canonical_output() {
    let fake = repair_status_fake();
    let command = command(&fake);

    for partition in [Partition::Markers, Partition::Fixed] {
        let env = env(&command, partition);
        let mut ctx = ScenarioContext::new();
        scenario::list_tables(&env, &mut ctx, None, Some(2)).unwrap();
        scenario::expect_valid_header(&ctx).unwrap();
        scenario::expect_row_count(&mut ctx, 2).unwrap();
        scenario::expect_summary(&ctx).unwrap();
    }
}

#[test]
fn test_show_job_then_token_list() {
    let fake = repair_status_fake();
    let command = command(&fake);
    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();

    let id = scenario::show_job(&env, &mut ctx, "ks1", "tbl1", 1).unwrap();
    assert_eq!(id.to_string(), JOB_ID);
    scenario::expect_detail_header(&ctx, "ks1", "tbl1").unwrap();
    scenario::expect_token_rows(&mut ctx, 1).unwrap();

    let err = scenario::expect_detail_header(&ctx, "ks1", "tbl2").unwrap_err();
    assert!(err.to_string().contains("Faulty table"));
}

#[test]
fn test_unexpected_arguments_fail_validation_not_invocation() {
    let fake = FakeEcctool::new();
    let command = command(&fake);

    let result = command.repair_status(&["--keyspace".to_string(), "nope".to_string()]).unwrap();
    assert_eq!(result.exit_code, Some(3));
    assert!(result.stdout.is_empty());
    assert!(result.stderr_text().unwrap().contains("unexpected arguments"));

    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();
    let err = scenario::list_tables(&env, &mut ctx, Some("nope"), None).unwrap_err();
    assert!(matches!(err, VerifyError::Partition(_)));
}

#[test]
fn test_non_ascii_output_is_a_decode_error() {
    let fake = FakeEcctool::new();
    fake.respond(&["repair-status"], "Keyspace : k\u{e9}\n");
    let command = command(&fake);

    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();
    let err = scenario::list_tables(&env, &mut ctx, None, None).unwrap_err();
    assert!(matches!(err, VerifyError::Decode { .. }));
}

#[test]
fn test_wait_for_completion_polls_until_status_changes() {
    let fake = repair_status_fake();
    let command = command(&fake);

    let id = JOB_ID.parse().unwrap();
    wait_for_job(&command, &id, JobCondition::Completed, quick_poll()).unwrap();

    let by_id = format!("repair-status --id {} --limit 1", JOB_ID);
    let calls = fake.calls();
    assert_eq!(calls.len(), 2);
    assert!(calls.iter().all(|c| c == &by_id));
}

#[test]
fn test_wait_for_disappearance() {
    let fake = FakeEcctool::new();
    let by_id = ["repair-status", "--id", JOB_ID, "--limit", "1"];
    fake.respond_nth(&by_id, 1, &fixture("detail_in_queue.txt"));
    fake.respond_nth(&by_id, 2, &fixture("detail_completed.txt"));
    fake.respond(&by_id, "Repair job not found\n");
    let command = command(&fake);

    let id = JOB_ID.parse().unwrap();
    wait_for_job(&command, &id, JobCondition::Disappeared, quick_poll()).unwrap();
    assert_eq!(fake.calls().len(), 3);
}

#[test]
fn test_wait_times_out_when_job_never_completes() {
    let fake = FakeEcctool::new();
    let by_id = ["repair-status", "--id", JOB_ID, "--limit", "1"];
    fake.respond(&by_id, &fixture("detail_in_queue.txt"));
    let command = command(&fake);

    let policy = PollPolicy {
        interval: Duration::from_millis(10),
        timeout: Duration::from_millis(100),
    };
    let id = JOB_ID.parse().unwrap();
    let err = wait_for_job(&command, &id, JobCondition::Completed, policy).unwrap_err();
    match err {
        VerifyError::Timeout { elapsed, .. } => assert!(elapsed >= policy.timeout),
        other => panic!("expected timeout, got {:?}", other),
    }
}

#[test]
fn test_trigger_then_wait_uses_id_from_response() {
    let fake = repair_status_fake();
    let command = command(&fake);
    let env = env(&command, Partition::Markers);
    let mut ctx = ScenarioContext::new();

    scenario::trigger_repair(&env, &mut ctx, "ks1", "tbl1").unwrap();
    assert!(ctx.response.as_deref().unwrap().contains(JOB_ID));
    scenario::expect_job_reaches(&env, &ctx, JobCondition::Completed).unwrap();
}
