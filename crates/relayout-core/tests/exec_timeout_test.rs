// Relayout Process Runner Timeout
//
// A hook command that never exits is killed with its whole process group.

use relayout_core::{CommandSpec, ProcessRunner};
use std::time::{Duration, Instant};

#[test]
fn test_timeout_kills_process_group() {
    let mut spec = CommandSpec::from_command_line("sleep 30 & sleep 30; echo late", true);
    spec.timeout = Some(Duration::from_secs_f64(1.0));

    let started = Instant::now();
    let result = ProcessRunner::run(&spec);
    let elapsed = started.elapsed();

    assert!(result.processed);
    assert!(result.timed_out);
    assert_ne!(result.status, 0);
    assert!(!result.stdout_lossy().contains("late"));
    assert!(elapsed >= Duration::from_secs(1));
    // Timeout, grace period and reader shutdown, far below the sleeps
    assert!(elapsed < Duration::from_secs(10), "took {:?}", elapsed);
}

#[test]
fn test_fast_command_is_not_timed_out() {
    let mut spec = CommandSpec::from_command_line("echo ok", false);
    spec.timeout = Some(Duration::from_secs(5));

    let result = ProcessRunner::run(&spec);
    assert!(result.success());
    assert!(!result.timed_out);
    assert_eq!(result.stdout_lossy().trim(), "ok");
}
