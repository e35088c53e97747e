//! Delivery of a real OS signal to the running test process.
//!
//! Kept in its own test binary: a process-wide signal reaches every
//! subscription in the process, so it must not share one with other runs.

#![cfg(unix)]

use std::process::Command;

use procmain::config::RunMode;
use procmain::lifecycle::{ExitOutcome, LifecycleDriver};
use procmain::NativeSignal;

mod common;

use common::{config_with_mode, recording_handler, EventLog};

#[tokio::test]
async fn test_sigterm_from_os_stops_run() {
    let log = EventLog::new();
    let driver = LifecycleDriver::with_handler(
        config_with_mode(RunMode::Interactive),
        recording_handler(&log),
    );

    let app_log = log.clone();
    let outcome = driver
        .run(move || async move {
            app_log.record("ran");
            let status = Command::new("kill")
                .arg("-TERM")
                .arg(std::process::id().to_string())
                .status()
                .map_err(|e| e.to_string())?;
            assert!(status.success());
            std::future::pending::<()>().await;
            Ok::<(), String>(())
        })
        .await
        .unwrap();

    assert_eq!(
        outcome,
        ExitOutcome::Terminated {
            signal: NativeSignal::Terminate
        }
    );
    assert_eq!(log.events(), vec!["ran"]);
}
