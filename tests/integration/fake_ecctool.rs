//! Scripted stand-in for the `ecctool` executable.

use super::test_utils::fixture;
use ecctool_verify::config::VerifierConfig;
use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::time::Duration;
use tempfile::TempDir;

const FAKE_ECCTOOL: &str = r#"#!/bin/sh
dir=$(dirname "$0")
key=$(printf '%s' "$*" | tr ' ' '_')
echo "$*" >> "$dir/calls.log"
count_file="$dir/count_$key"
n=0
[ -f "$count_file" ] && n=$(cat "$count_file")
n=$((n + 1))
echo "$n" > "$count_file"
if [ -f "$dir/responses/$key.$n" ]; then cat "$dir/responses/$key.$n"; exit 0; fi
if [ -f "$dir/responses/$key" ]; then cat "$dir/responses/$key"; exit 0; fi
echo "unexpected arguments: $*" >&2
exit 3
"#;

/// A freshly written script can briefly fail with ETXTBSY while a concurrently
/// forked test process still holds the write handle.
fn wait_until_executable(script: &Path) {
    for _ in 0..50 {
        match Command::new(script).arg("--ready").output() {
            Err(e) if e.raw_os_error() == Some(26) => {
                std::thread::sleep(Duration::from_millis(20));
            }
            _ => return,
        }
    }
}

/// Shell script answering by exact argument list from canned files.
///
/// A response registered for the n-th call of an argument list wins over the
/// default response for that list.
pub struct FakeEcctool {
    dir: TempDir,
}

impl FakeEcctool {
    pub fn new() -> Self {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("responses")).unwrap();
        let script = dir.path().join("ecctool");
        fs::write(&script, FAKE_ECCTOOL).unwrap();
        fs::set_permissions(&script, fs::Permissions::from_mode(0o755)).unwrap();
        wait_until_executable(&script);
        let _ = fs::remove_file(dir.path().join("calls.log"));
        Self { dir }
    }

    pub fn path(&self) -> PathBuf {
        self.dir.path().join("ecctool")
    }

    fn key(args: &[&str]) -> String {
        args.join("_")
    }

    pub fn respond(&self, args: &[&str], body: &str) {
        let file = self.dir.path().join("responses").join(Self::key(args));
        fs::write(file, body).unwrap();
    }

    pub fn respond_nth(&self, args: &[&str], call: usize, body: &str) {
        let file = self
            .dir
            .path()
            .join("responses")
            .join(format!("{}.{}", Self::key(args), call));
        fs::write(file, body).unwrap();
    }

    /// Argument lists received so far, one line per call.
    pub fn calls(&self) -> Vec<String> {
        fs::read_to_string(self.dir.path().join("calls.log"))
            .map(|log| log.lines().map(str::to_string).collect())
            .unwrap_or_default()
    }

    /// Config pointing at this script with a fast poll.
    pub fn config(&self) -> VerifierConfig {
        let mut config = VerifierConfig::default();
        config.ecctool.path = self.path();
        config.poll.interval_ms = 10;
        config.poll.timeout_secs = 1;
        config
    }
}

pub const JOB_ID: &str = "5a4b1c4e-8f3a-11e9-bc42-526af7764f64";

/// Fake answering every call the sample feature file makes.
pub fn repair_status_fake() -> FakeEcctool {
    let fake = FakeEcctool::new();
    fake.respond(&["repair-status"], &fixture("list_all.txt"));
    fake.respond(&["repair-status", "--limit", "2"], &fixture("list_limit_2.txt"));
    fake.respond(
        &["repair-status", "--keyspace", "ks1", "--table", "tbl1"],
        &fixture("list_ks1_tbl1.txt"),
    );
    let by_id = ["repair-status", "--id", JOB_ID, "--limit", "1"];
    fake.respond_nth(&by_id, 1, &fixture("detail_in_queue.txt"));
    fake.respond(&by_id, &fixture("detail_completed.txt"));
    fake.respond(
        &["run-repair", "--keyspace", "ks1", "--table", "tbl1"],
        &format!("Repair of ks1.tbl1 scheduled with id {}\n", JOB_ID),
    );
    fake
}
