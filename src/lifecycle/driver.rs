//! Process entry orchestration.
//!
//! The driver owns one application callback and one configuration. It runs
//! the callback exactly once under the selected strategy and turns the result
//! into a deterministic exit outcome.

use std::future::Future;
use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::Instrument;

use crate::config::Config;
use crate::lifecycle::delivery::SignalInjector;
use crate::lifecycle::handler::{PortableSignalAction, SignalHandler};
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::NativeSignal;
use crate::lifecycle::strategy::{platform_run, select_strategy, RunContext, RunStrategy};
use crate::lifecycle::LifecycleError;
use crate::observability::diagnostics::{DiagnosticHook, NoDump, StackDump};

/// How a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitOutcome {
    /// The callback returned normally.
    Success,
    /// A terminate or interrupt signal stopped the run.
    Terminated { signal: NativeSignal },
    /// An abort signal stopped the run after a diagnostic dump.
    Aborted { signal: NativeSignal },
}

impl ExitOutcome {
    pub(crate) fn from_verdict(signal: NativeSignal, action: PortableSignalAction) -> Self {
        match action {
            PortableSignalAction::AbortWithDiagnostic => ExitOutcome::Aborted { signal },
            _ => ExitOutcome::Terminated { signal },
        }
    }

    /// Process exit status: 0 on success, `128 + n` when stopped by signal `n`.
    pub fn exit_code(self) -> u8 {
        match self {
            ExitOutcome::Success => 0,
            ExitOutcome::Terminated { signal } | ExitOutcome::Aborted { signal } => {
                (128 + signal.number()) as u8
            }
        }
    }

    pub fn is_success(self) -> bool {
        self == ExitOutcome::Success
    }
}

impl From<ExitOutcome> for ExitCode {
    fn from(outcome: ExitOutcome) -> Self {
        ExitCode::from(outcome.exit_code())
    }
}

/// Failure of a run: either the lifecycle machinery or the callback itself.
#[derive(Debug, Error)]
pub enum RunError<E> {
    #[error(transparent)]
    Lifecycle(#[from] LifecycleError),

    /// The callback's own error, unchanged.
    #[error("application error: {0}")]
    App(E),
}

/// Runs one application callback with platform-appropriate signal handling.
pub struct LifecycleDriver {
    config: Config,
    handler: SignalHandler,
    shutdown: Shutdown,
    tx: mpsc::UnboundedSender<NativeSignal>,
    signals: mpsc::UnboundedReceiver<NativeSignal>,
}

impl LifecycleDriver {
    /// Create a driver for the host platform.
    ///
    /// The diagnostic hook is a stack dump unless disabled in `config`.
    pub fn new(config: Config) -> Self {
        let hook: Arc<dyn DiagnosticHook> = if config.diagnostics.dump_on_abort {
            Arc::new(StackDump)
        } else {
            Arc::new(NoDump)
        };
        Self::with_handler(config, SignalHandler::for_host(hook))
    }

    /// Create a driver with an explicit handler (platform variant and hook).
    pub fn with_handler(config: Config, handler: SignalHandler) -> Self {
        let (tx, signals) = mpsc::unbounded_channel();
        Self {
            config,
            handler,
            shutdown: Shutdown::new(),
            tx,
            signals,
        }
    }

    /// Handle for delivering signals from inside the process.
    ///
    /// Deliveries only take effect under the interactive strategy.
    pub fn injector(&self) -> SignalInjector {
        SignalInjector::new(self.tx.clone())
    }

    /// Coordinator fired when a signal stops the run.
    pub fn shutdown(&self) -> &Shutdown {
        &self.shutdown
    }

    /// Strategy `run` will use.
    pub fn strategy(&self) -> RunStrategy {
        select_strategy(&self.config)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Run `f` once and report how the run ended.
    ///
    /// Must be called from within a Tokio runtime. Consumes the driver, so a
    /// callback can never be run twice by the same driver.
    pub async fn run<F, Fut, E>(self, f: F) -> Result<ExitOutcome, RunError<E>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), E>>,
    {
        let LifecycleDriver {
            config,
            handler,
            shutdown,
            tx,
            signals,
        } = self;

        let strategy = select_strategy(&config);
        let span = tracing::info_span!(
            "invocation",
            id = %uuid::Uuid::new_v4(),
            strategy = %strategy,
        );

        async move {
            tracing::info!("Starting application");
            let ctx = RunContext {
                handler,
                tx,
                signals,
            };
            let result = platform_run(strategy, f, ctx).await;

            match &result {
                Ok(ExitOutcome::Success) => tracing::info!("Application finished"),
                Ok(ExitOutcome::Terminated { signal }) => {
                    shutdown.trigger(*signal);
                    tracing::info!(signal = %signal, "Application terminated by signal");
                }
                Ok(ExitOutcome::Aborted { signal }) => {
                    shutdown.trigger(*signal);
                    tracing::error!(signal = %signal, "Application aborted");
                    let _ = std::io::stdout().flush();
                    let _ = std::io::stderr().flush();
                }
                Err(RunError::Lifecycle(e)) => tracing::error!(error = %e, "Lifecycle failure"),
                Err(RunError::App(_)) => tracing::debug!("Application returned an error"),
            }
            result
        }
        .instrument(span)
        .await
    }
}

impl std::fmt::Debug for LifecycleDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifecycleDriver")
            .field("config", &self.config)
            .field("handler", &self.handler)
            .finish_non_exhaustive()
    }
}
