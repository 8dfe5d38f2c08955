#![cfg(unix)]

use std::io::{BufRead, BufReader};
use std::os::unix::process::ExitStatusExt;
use std::process::{Command, ExitStatus, Output, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use nix::sys::signal::{Signal, kill};
use nix::unistd::Pid;

fn retry() -> Command {
    Command::new(env!("CARGO_BIN_EXE_retry"))
}

fn run_in(dir: &std::path::Path, args: &[&str]) -> Output {
    retry()
        .args(args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .output()
        .expect("failed to run retry binary")
}

fn died_by(status: &ExitStatus, signal: Signal) -> bool {
    status.signal() == Some(signal as i32) || status.code() == Some(128 + signal as i32)
}

#[test]
fn success_passes_output_through() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_in(dir.path(), &["--", "echo", "asdf"]);

    assert_eq!(out.status.code(), Some(0));
    assert_eq!(String::from_utf8_lossy(&out.stdout), "asdf\n");
    assert_eq!(String::from_utf8_lossy(&out.stderr), "");
}

#[test]
fn success_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let marker = dir.path().join("runs");
    let script = format!("echo x >> '{}'", marker.display());

    for expected in 1..=2 {
        let out = run_in(dir.path(), &["-n", "5", "--", "sh", "-c", &script]);
        assert_eq!(out.status.code(), Some(0));
        let runs = std::fs::read_to_string(&marker).unwrap().lines().count();
        assert_eq!(runs, expected, "exactly one invocation per run");
    }
}

#[test]
fn failing_command_is_retried_then_exits_with_its_code() {
    let dir = tempfile::tempdir().unwrap();
    let direct = Command::new("ls")
        .arg("asdf")
        .current_dir(dir.path())
        .stderr(Stdio::null())
        .status()
        .unwrap();

    let out = run_in(dir.path(), &["-n", "3", "-t", "100", "--", "ls", "asdf"]);

    assert_eq!(out.status.code(), direct.code());
    assert_ne!(out.status.code(), Some(0));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    let errors = stderr.lines().filter(|l| l.contains("asdf")).count();
    assert_eq!(errors, 4, "stderr was: {stderr}");
}

#[test]
fn sigterm_kills_supervisor_and_child_promptly() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = retry()
        .args(["-n", "3", "-t", "1000", "--", "sleep", "10"])
        .current_dir(dir.path())
        .spawn()
        .unwrap();

    thread::sleep(Duration::from_millis(100));
    let started = Instant::now();
    kill(Pid::from_raw(child.id() as i32), Signal::SIGTERM).unwrap();
    let status = child.wait().unwrap();

    assert!(started.elapsed() < Duration::from_millis(900));
    assert!(died_by(&status, Signal::SIGTERM), "status: {status:?}");
}

#[test]
fn grandchild_signal_death_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let mut child = retry()
        .args([
            "-n",
            "1",
            "-t",
            "10",
            "--",
            "sh",
            "-c",
            "sleep 10 & echo $!; wait $!",
        ])
        .current_dir(dir.path())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();

    let stdout = child.stdout.take().unwrap();
    let mut killed = 0;
    for line in BufReader::new(stdout).lines() {
        let pid: i32 = line.unwrap().trim().parse().unwrap();
        assert!(pid > 0);
        kill(Pid::from_raw(pid), Signal::SIGTERM).unwrap();
        killed += 1;
    }
    let status = child.wait().unwrap();

    assert_eq!(killed, 2, "one grandchild per attempt");
    assert!(died_by(&status, Signal::SIGTERM), "status: {status:?}");
}

#[test]
fn child_signal_death_is_reraised() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_in(dir.path(), &["-n", "0", "--", "sh", "-c", "kill -TERM $$"]);
    assert!(died_by(&out.status, Signal::SIGTERM), "status: {:?}", out.status);
}

#[test]
fn unspawnable_command_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_in(
        dir.path(),
        &["-n", "2", "-t", "0", "--", "/definitely/not/a/real/program"],
    );

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("failed to spawn").count(), 1, "{stderr}");
}

#[test]
fn help_and_missing_command_print_usage() {
    let dir = tempfile::tempdir().unwrap();
    let cases: [&[&str]; 6] = [
        &["--help"],
        &["-h"],
        &[],
        &["-n", "3"],
        &["--", ""],
        &["-n", "3", "--", "", "ls"],
    ];
    for args in cases {
        let out = run_in(dir.path(), args);
        assert_eq!(out.status.code(), Some(0), "args: {args:?}");
        let stdout = String::from_utf8_lossy(&out.stdout);
        assert!(stdout.contains("Usage: retry"), "args: {args:?}: {stdout}");
        assert!(stdout.contains("retry -n 3 -t 100 -- ls asdf"));
    }
}

#[test]
fn invalid_timeouts_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_in(
        dir.path(),
        &["--min-timeout", "500", "--max-timeout", "100", "--", "true"],
    );
    assert_eq!(out.status.code(), Some(2));
    assert!(String::from_utf8_lossy(&out.stderr).contains("exceeds max timeout"));
}

#[test]
fn verbose_logs_to_stderr_only() {
    let dir = tempfile::tempdir().unwrap();
    let out = run_in(dir.path(), &["-v", "-n", "1", "-t", "0", "--", "sh", "-c", "exit 3"]);

    assert_eq!(out.status.code(), Some(3));
    assert!(out.stdout.is_empty());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert_eq!(stderr.matches("[starting]").count(), 2, "{stderr}");
    assert!(stderr.contains("[backoff]"));
    assert!(stderr.contains("[exhausted]"));
    assert!(stderr.contains("kind=attempt_non_zero_exit"));
}
