//! Diagnostic state dumps for post-mortem analysis.
//!
//! # Responsibilities
//! - Define the hook invoked when an abort signal arrives
//! - Provide the default stack dump implementation
//! - Contain failures so capture never blocks termination

use std::io::Write;
use std::panic::{self, AssertUnwindSafe};

/// Dumps current process state so a forced termination can be diagnosed.
pub trait DiagnosticHook: Send + Sync {
    fn dump(&self);
}

impl<F> DiagnosticHook for F
where
    F: Fn() + Send + Sync,
{
    fn dump(&self) {
        self()
    }
}

/// Logs a backtrace of the handling thread together with runtime statistics.
#[derive(Debug, Clone, Copy, Default)]
pub struct StackDump;

impl DiagnosticHook for StackDump {
    fn dump(&self) {
        let backtrace = std::backtrace::Backtrace::force_capture();

        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                let metrics = handle.metrics();
                tracing::error!(
                    workers = metrics.num_workers(),
                    alive_tasks = metrics.num_alive_tasks(),
                    "Runtime state at abort"
                );
            }
            Err(_) => tracing::error!("Abort received outside of a runtime"),
        }
        tracing::error!(backtrace = %backtrace, "Stack dump");

        // Logs go to stdout; anything written directly by the runtime or a
        // panic goes to stderr. Both must be out before the process exits.
        let _ = std::io::stdout().flush();
        let _ = std::io::stderr().flush();
    }
}

/// Hook used when dumps are disabled in configuration.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDump;

impl DiagnosticHook for NoDump {
    fn dump(&self) {}
}

/// Run `hook`, swallowing a panic from it.
///
/// Returns false if the hook panicked.
pub fn dump_best_effort(hook: &dyn DiagnosticHook) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(|| hook.dump())) {
        Ok(()) => true,
        Err(_) => {
            tracing::warn!("Diagnostic dump panicked; continuing with termination");
            false
        }
    }
}
