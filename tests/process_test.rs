#![cfg(unix)]

use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use encoding_rs::WINDOWS_1251;
use vcs_log::process::{ProcessRunner, RunnerConfig, SIGNALLED_EXIT_CODE};

/// Bytes written to each stream; far beyond any pipe buffer.
const FLOOD_BYTES: usize = 300 * 1024;

fn sh(script: &str) -> ProcessRunner {
    ProcessRunner::new(["sh", "-c", script])
}

#[test]
fn large_stderr_before_stdout_does_not_deadlock() {
    let script = format!(
        "head -c {FLOOD_BYTES} /dev/zero | tr '\\0' e >&2; head -c {FLOOD_BYTES} /dev/zero | tr '\\0' o"
    );
    let runner = sh(&script).with_config(RunnerConfig::default().with_buffer_sizes(1024, 512));

    let result = runner.execute();

    assert!(result.is_successful(), "{:?}", result.failure);
    assert_eq!(result.stdout.len(), FLOOD_BYTES);
    assert_eq!(result.stderr.len(), FLOOD_BYTES);
    assert!(result.stdout.bytes().all(|b| b == b'o'));
    assert!(result.stderr.bytes().all(|b| b == b'e'));
}

#[test]
fn kill_from_another_thread_stops_execution() {
    let runner = Arc::new(ProcessRunner::new(["sleep", "5"]));
    let started = Instant::now();

    let executing = {
        let runner = Arc::clone(&runner);
        thread::spawn(move || runner.execute())
    };

    let deadline = Instant::now() + Duration::from_secs(2);
    while !runner.is_running() && Instant::now() < deadline {
        thread::sleep(Duration::from_millis(5));
    }
    assert!(runner.is_running());
    assert!(runner.kill());

    let result = executing.join().unwrap();
    assert!(started.elapsed() < Duration::from_secs(4));
    assert!(result.failure.is_none());
    assert_eq!(result.exit_code, SIGNALLED_EXIT_CODE);
    assert!(!runner.is_running());
}

#[test]
fn runner_can_be_reused_after_completion() {
    let runner = sh("echo again");
    assert_eq!(runner.execute().stdout, "again\n");
    assert_eq!(runner.execute().stdout, "again\n");
}

#[test]
fn configured_charset_decodes_legacy_output() {
    // "Привет" in windows-1251
    let runner = sh("printf '\\317\\360\\350\\342\\345\\362'")
        .with_config(RunnerConfig::default().with_output_charset(WINDOWS_1251));

    assert_eq!(runner.execute().stdout, "Привет");
}

#[test]
fn overlapping_executions_on_one_runner_both_complete() {
    let runner = Arc::new(sh("sleep 0.5; echo done"));

    let first = {
        let runner = Arc::clone(&runner);
        thread::spawn(move || runner.execute())
    };
    thread::sleep(Duration::from_millis(100));
    let second = {
        let runner = Arc::clone(&runner);
        thread::spawn(move || runner.execute())
    };

    for result in [first.join().unwrap(), second.join().unwrap()] {
        assert!(result.failure.is_none(), "{:?}", result.failure);
        assert_eq!(result.exit_code, 0);
        assert_eq!(result.stdout, "done\n");
    }
    assert!(!runner.is_running());
}
