//! Runs the `rlsrev` binary to check which stream each kind of output
//! goes to.
#![cfg(unix)]

use pretty_assertions::assert_eq;
use std::path::Path;
use std::process::{Command, Output};

fn rlsrev(config_dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_rlsrev"))
        .args(args)
        .env("LSREVRC", config_dir.join("missing.rc"))
        .env_remove("RLSREV_LOG")
        .env("NO_COLOR", "1")
        .output()
        .unwrap()
}

fn text(bytes: &[u8]) -> String {
    String::from_utf8_lossy(bytes).into_owned()
}

#[test]
fn failure_report_goes_to_stderr() {
    let dir = tempfile::tempdir().unwrap();
    let args = ["-vv", "--config", "ui.color=never"];
    let output = rlsrev(
        dir.path(),
        &[&args[..], &["-r", "/nonexistent/lsrev/repo"]].concat(),
    );
    assert_eq!(output.status.code(), Some(255));
    assert_eq!(text(&output.stdout), "");
    let stderr = text(&output.stderr);
    assert!(
        stderr.contains("abort: repository /nonexistent/lsrev/repo not found"),
        "{}",
        stderr
    );
    assert!(stderr.contains("-> exit 255"), "{}", stderr);
}

#[test]
fn disabled_trace_leaves_only_the_message() {
    let dir = tempfile::tempdir().unwrap();
    let output = rlsrev(
        dir.path(),
        &["-r", "/nonexistent/lsrev/repo", "--config", "trace.enabled=no"],
    );
    assert_eq!(output.status.code(), Some(255));
    assert_eq!(text(&output.stdout), "");
    assert_eq!(
        text(&output.stderr),
        "abort: repository /nonexistent/lsrev/repo not found\n"
    );
}

#[test]
fn rendered_context_is_the_only_stdout_output() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("build.sh");
    std::fs::write(&source, "set -e\nmake all-targets\nexit\n").unwrap();
    let output = rlsrev(
        dir.path(),
        &["-vv", "--show-context", "2", "main", source.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0));
    let stdout = text(&output.stdout);
    assert!(stdout.starts_with("main() at "), "{}", stdout);
    assert!(stdout.contains("make all-targets"), "{}", stdout);
    assert!(!text(&output.stderr).contains("make all-targets"));
}
