//! SIGTERM through the process-level entry point.
//!
//! Own test binary: the signal reaches every subscription in the process.

#![cfg(unix)]

use std::process::Command;
use std::time::{Duration, Instant};

use procmain::config::RunMode;
use procmain::lifecycle::startup::run_to_completion;
use procmain::lifecycle::{ExitOutcome, LifecycleDriver};
use procmain::NativeSignal;

mod common;

use common::config_with_mode;

#[test]
fn test_sigterm_exits_promptly_despite_blocking_work() {
    let mut config = config_with_mode(RunMode::Interactive);
    config.run.shutdown_grace_ms = 100;
    let start = Instant::now();

    let outcome = run_to_completion(LifecycleDriver::new(config), || async {
        let status = Command::new("kill")
            .arg("-TERM")
            .arg(std::process::id().to_string())
            .status()
            .map_err(|e| e.to_string())?;
        assert!(status.success());
        let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(6))).await;
        Ok::<(), String>(())
    })
    .unwrap();

    assert_eq!(
        outcome,
        ExitOutcome::Terminated {
            signal: NativeSignal::Terminate
        }
    );
    assert_eq!(outcome.exit_code(), 143);
    assert!(
        start.elapsed() < Duration::from_secs(2),
        "took {:?}",
        start.elapsed()
    );
}
