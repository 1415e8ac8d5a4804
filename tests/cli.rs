//! Integration tests for top-level CLI behavior.

use std::path::{Path, PathBuf};
use std::process::{Command, Output, Stdio};

use serde_json::{json, Value};
use stagger::cassette::format::{Cassette, Interaction};

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("stagger_cli_{name}_{}", std::process::id()));
    let _ = std::fs::remove_dir_all(&dir);
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn run_stagger(dir: &Path, args: &[&str], env: &[(&str, &Path)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_stagger"));
    cmd.args(args).current_dir(dir).stdin(Stdio::null());
    for key in ["STAGGER_RECORD", "STAGGER_REPLAY", "STAGGER_CONFIG", "STAGGER_TRIGGER_LABEL"] {
        cmd.env_remove(key);
    }
    cmd.env("STAGGER_ARTIFACT_DIR", dir.join("artifacts"));
    for (key, value) in env {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run stagger binary")
}

fn write_cassette(dir: &Path, port: &str, calls: &[(&str, Value)]) {
    let cassette = Cassette {
        name: port.to_string(),
        recorded_at: "2025-01-01T00:00:00Z".parse().unwrap(),
        commit: "test".into(),
        interactions: calls
            .iter()
            .enumerate()
            .map(|(seq, (method, output))| Interaction {
                seq: u64::try_from(seq).unwrap(),
                port: port.to_string(),
                method: (*method).to_string(),
                input: json!({}),
                output: output.clone(),
            })
            .collect(),
    };
    cassette.save(&dir.join(format!("{port}.cassette.yaml"))).unwrap();
}

fn write_spec(dir: &Path) {
    std::fs::write(dir.join("feature.md"), "# Feature: CSV Export\n\nUsers export reports.\n")
        .unwrap();
}

fn issue_42() -> Value {
    json!({"ok": {
        "number": 42, "title": "Add export endpoint", "body": "Export as CSV",
        "labels": ["api"], "state": "CLOSED", "assignees": [], "comments": []
    }})
}

#[test]
fn help_lists_subcommands() {
    let dir = scratch("help");
    let output = run_stagger(&dir, &["--help"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success());
    for cmd in ["plan", "advance", "status", "validate"] {
        assert!(stdout.contains(cmd), "help mentions {cmd}");
    }
}

#[test]
fn unknown_subcommand_fails() {
    let dir = scratch("unknown");
    let output = run_stagger(&dir, &["deploy"], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("unrecognized subcommand"));
}

#[test]
fn validate_requires_issue_number() {
    let dir = scratch("validate_args");
    let output = run_stagger(&dir, &["validate"], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("ISSUE"));
}

#[test]
fn mock_dry_run_prints_and_saves_plan() {
    let dir = scratch("dry_run");
    write_spec(&dir);
    let output = run_stagger(&dir, &["plan", "feature.md", "--mock", "--dry-run"], &[]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Planned 5 task(s)"));
    assert!(stdout.contains("Update database schema for CSV Export"));
    assert!(stdout.contains("[human review]"));
    assert!(stdout.contains("Dry run"));

    let plan: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("artifacts/plan.json")).unwrap())
            .unwrap();
    assert_eq!(plan.as_array().unwrap().len(), 5);
    assert!(!dir.join("artifacts/rollout.json").exists());

    let status = run_stagger(&dir, &["status"], &[]);
    let stdout = String::from_utf8_lossy(&status.stdout);
    assert!(status.status.success());
    assert!(stdout.contains("STATE"));
    assert!(stdout.contains("not rolled out yet"));
}

#[test]
fn missing_spec_file_fails() {
    let dir = scratch("missing_spec");
    let output = run_stagger(&dir, &["plan", "nope.md", "--mock", "--dry-run"], &[]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to read spec nope.md"));
}

#[test]
fn replayed_rollout_creates_issues_and_triggers_first() {
    let dir = scratch("rollout");
    write_spec(&dir);
    let cassettes = dir.join("cassettes");
    std::fs::create_dir_all(&cassettes).unwrap();
    write_cassette(
        &cassettes,
        "tracker",
        &[
            ("create_issue", json!({"ok": 101})),
            ("add_label", json!({"ok": null})),
            ("create_issue", json!({"ok": 102})),
            ("create_issue", json!({"ok": 103})),
            ("create_issue", json!({"ok": 104})),
            ("create_issue", json!({"ok": 105})),
        ],
    );
    write_cassette(&cassettes, "clock", &[("now", json!("2025-06-01T09:00:00Z"))]);
    write_cassette(&cassettes, "id_gen", &[("generate_id", json!("run-abc"))]);

    let output = run_stagger(
        &dir,
        &["plan", "feature.md", "--mock", "--yes"],
        &[("STAGGER_REPLAY", cassettes.as_path())],
    );
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("created #101: Update database schema for CSV Export (triggered)"));
    assert!(stdout.contains("5 created, 0 failed, 0 skipped."));

    let record: Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("artifacts/rollout.json")).unwrap())
            .unwrap();
    assert_eq!(record["run_id"], "run-abc");
    assert_eq!(record["entries"]["1"]["state"], "triggered");
    assert_eq!(record["entries"]["2"]["state"], "created_untriggered");

    let status = run_stagger(&dir, &["status"], &[]);
    let stdout = String::from_utf8_lossy(&status.stdout);
    assert!(stdout.contains("#105"));
    assert!(stdout.contains("rollout run-abc"));
}

#[test]
fn replayed_validation_without_pr_needs_review() {
    let dir = scratch("validate_no_pr");
    let cassettes = dir.join("cassettes");
    std::fs::create_dir_all(&cassettes).unwrap();
    write_cassette(
        &cassettes,
        "tracker",
        &[
            ("view_issue", issue_42()),
            ("search_prs", json!({"ok": []})),
            ("comment_issue", json!({"ok": null})),
        ],
    );
    write_cassette(
        &cassettes,
        "llm",
        &[("complete", json!({"ok": {"text": "Status: pass\nLooks done.", "prompt_tokens": 10, "completion_tokens": 4}}))],
    );

    let output = run_stagger(&dir, &["validate", "42"], &[("STAGGER_REPLAY", cassettes.as_path())]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!output.status.success(), "needs review is not a pass");
    assert!(stdout.contains("Issue #42 (no PR): NEEDS_REVIEW"));

    let saved: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("artifacts/validation_42.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["status"], "needs_review");
    assert!(saved["pr_number"].is_null());
}

#[test]
fn replayed_validation_with_passing_pr_succeeds() {
    let dir = scratch("validate_pass");
    let cassettes = dir.join("cassettes");
    std::fs::create_dir_all(&cassettes).unwrap();
    write_cassette(
        &cassettes,
        "tracker",
        &[
            ("view_issue", issue_42()),
            ("search_prs", json!({"ok": [51, 60]})),
            ("view_pr", json!({"ok": {
                "number": 51, "title": "Export endpoint", "body": "closes #42",
                "files": ["src/export.rs"], "commits": ["add export"], "reviews": ["APPROVED"],
                "checks": [{"name": "build", "conclusion": "SUCCESS"}],
                "diff": "+fn export() {}"
            }})),
            ("comment_issue", json!({"ok": null})),
        ],
    );
    write_cassette(
        &cassettes,
        "llm",
        &[("complete", json!({"ok": {
            "text": "Status: pass\nAll criteria met.\n\n## Recommendations\n- Add a streaming test",
            "prompt_tokens": 120, "completion_tokens": 30
        }}))],
    );

    let output = run_stagger(&dir, &["validate", "42"], &[("STAGGER_REPLAY", cassettes.as_path())]);
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert!(stdout.contains("Issue #42 (PR #51): PASS"));
    assert!(stdout.contains("- Add a streaming test"));

    let saved: Value = serde_json::from_str(
        &std::fs::read_to_string(dir.join("artifacts/validation_42.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(saved["test_results"]["checks"]["build"], "SUCCESS");
}

#[test]
fn replay_dir_without_cassettes_fails() {
    let dir = scratch("empty_replay");
    let output = run_stagger(&dir, &["status"], &[("STAGGER_REPLAY", dir.join("none").as_path())]);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("No cassettes found"));
}
