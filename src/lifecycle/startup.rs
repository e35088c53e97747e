//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the Tokio runtime
//! - Hand the callback to the lifecycle driver
//! - Give shutdown subscribers a bounded grace period after a signal
//! - Map the run result to a process exit code
//!
//! # Design Decisions
//! - Fail fast: a runtime or signal installation error is fatal
//! - Callback errors are logged here, never retried
//! - After a stop, the runtime is shut down with a timeout so blocking work
//!   cannot hold the process open

use std::fmt::Display;
use std::future::Future;
use std::process::ExitCode;

use crate::config::Config;
use crate::lifecycle::driver::{ExitOutcome, LifecycleDriver, RunError};
use crate::lifecycle::LifecycleError;

/// Exit status used when the callback or the lifecycle machinery fails.
pub const FAILURE_EXIT_CODE: u8 = 1;

/// Run `f` as the process entry point and return the exit code for `main`.
pub fn run_main<F, Fut, E>(config: Config, f: F) -> ExitCode
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    run_main_with(LifecycleDriver::new(config), f)
}

/// Like [`run_main`], with a driver prepared by the caller.
///
/// Lets the application take `driver.shutdown()` or `driver.injector()`
/// before the run starts.
pub fn run_main_with<F, Fut, E>(driver: LifecycleDriver, f: F) -> ExitCode
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
    E: Display,
{
    exit_code_for(run_to_completion(driver, f))
}

/// Build a runtime, run the driver once and tear the runtime down.
///
/// When a signal stopped the run, shutdown subscribers get up to
/// `run.shutdown_grace_ms` to finish, and the runtime is then shut down with
/// the same limit. Blocking tasks still running after that are abandoned.
pub fn run_to_completion<F, Fut, E>(
    driver: LifecycleDriver,
    f: F,
) -> Result<ExitOutcome, RunError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let grace = driver.config().run.shutdown_grace();
    let shutdown = driver.shutdown().clone();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(LifecycleError::Runtime)?;

    let result = runtime.block_on(async {
        let result = driver.run(f).await;
        if shutdown.is_triggered() && shutdown.drain(grace).await {
            tracing::debug!("Shutdown subscribers finished");
        }
        result
    });

    match result {
        Ok(ExitOutcome::Success) => drop(runtime),
        _ => {
            runtime.shutdown_timeout(grace);
            tracing::debug!("Runtime shut down");
        }
    }
    result
}

/// Map a run result to a process exit code, logging failures.
pub fn exit_code_for<E: Display>(result: Result<ExitOutcome, RunError<E>>) -> ExitCode {
    match result {
        Ok(outcome) => outcome.into(),
        Err(RunError::App(e)) => {
            tracing::error!(error = %e, "Application failed");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
        Err(RunError::Lifecycle(e)) => {
            tracing::error!(error = %e, "Lifecycle failure");
            ExitCode::from(FAILURE_EXIT_CODE)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunMode;
    use crate::lifecycle::signals::NativeSignal;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn config_with(mode: RunMode, grace_ms: u64) -> Config {
        let mut config = Config::default();
        config.run.mode = mode;
        config.run.shutdown_grace_ms = grace_ms;
        config
    }

    #[test]
    fn test_success_runs_callback_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let outcome = run_to_completion(LifecycleDriver::new(Config::default()), move || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok::<(), String>(())
        })
        .unwrap();

        assert_eq!(outcome, ExitOutcome::Success);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_app_error_is_returned() {
        let driver = LifecycleDriver::new(config_with(RunMode::Detached, 100));

        let result = run_to_completion(driver, || async { Err::<(), _>("boom") });
        assert!(matches!(result, Err(RunError::App("boom"))));
    }

    #[test]
    fn test_blocking_work_does_not_hold_exit() {
        let driver = LifecycleDriver::new(config_with(RunMode::Interactive, 100));
        let injector = driver.injector();
        let start = Instant::now();

        let outcome = run_to_completion(driver, move || async move {
            injector.deliver(NativeSignal::Interrupt);
            let _ = tokio::task::spawn_blocking(|| std::thread::sleep(Duration::from_secs(5))).await;
            Ok::<(), String>(())
        })
        .unwrap();

        assert_eq!(outcome.exit_code(), 130);
        assert!(start.elapsed() < Duration::from_secs(2), "took {:?}", start.elapsed());
    }

    #[test]
    fn test_subscribers_drain_before_exit() {
        let driver = LifecycleDriver::new(config_with(RunMode::Interactive, 2_000));
        let injector = driver.injector();
        let shutdown = driver.shutdown().clone();
        let drained = Arc::new(AtomicBool::new(false));
        let flag = drained.clone();

        let outcome = run_to_completion(driver, move || async move {
            let mut notice = shutdown.subscribe();
            tokio::spawn(async move {
                let _ = notice.recv().await;
                tokio::time::sleep(Duration::from_millis(50)).await;
                flag.store(true, Ordering::SeqCst);
            });
            injector.deliver(NativeSignal::Interrupt);
            std::future::pending::<()>().await;
            Ok::<(), String>(())
        })
        .unwrap();

        assert!(matches!(outcome, ExitOutcome::Terminated { .. }));
        assert!(drained.load(Ordering::SeqCst));
    }
}
