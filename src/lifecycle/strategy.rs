//! Run strategy selection and execution.
//!
//! # Responsibilities
//! - Decide between interactive and detached execution
//! - Interactive: subscribe to the catalog and route deliveries to the handler
//! - Detached: run the callback with default process termination only
//!
//! # Design Decisions
//! - Strategy is chosen once per run and never changes mid-run
//! - A terminating verdict drops the callback future; it is not polled again
//! - Signals queued before the callback returned still count

use std::future::Future;

use tokio::sync::mpsc;

use crate::config::{Config, RunMode};
use crate::lifecycle::delivery::SignalSubscription;
use crate::lifecycle::driver::{ExitOutcome, RunError};
use crate::lifecycle::handler::{PortableSignalAction, SignalHandler};
use crate::lifecycle::signals::NativeSignal;

/// How the callback is attached to its environment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStrategy {
    /// Terminal signals are subscribed and routed through the handler.
    Interactive,
    /// No signal path is installed.
    Detached,
}

impl std::fmt::Display for RunStrategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunStrategy::Interactive => f.write_str("interactive"),
            RunStrategy::Detached => f.write_str("detached"),
        }
    }
}

/// Pick the strategy for this process from configuration.
pub fn select_strategy(cfg: &Config) -> RunStrategy {
    match cfg.run.mode {
        RunMode::Interactive => RunStrategy::Interactive,
        RunMode::Detached => RunStrategy::Detached,
        RunMode::Auto => auto_strategy(),
    }
}

#[cfg(not(windows))]
fn auto_strategy() -> RunStrategy {
    RunStrategy::Interactive
}

// Services started by the service control manager have no console.
#[cfg(windows)]
fn auto_strategy() -> RunStrategy {
    use std::io::IsTerminal;

    if std::io::stdin().is_terminal() {
        RunStrategy::Interactive
    } else {
        RunStrategy::Detached
    }
}

/// Everything a strategy needs besides the callback.
pub(crate) struct RunContext {
    pub(crate) handler: SignalHandler,
    pub(crate) tx: mpsc::UnboundedSender<NativeSignal>,
    pub(crate) signals: mpsc::UnboundedReceiver<NativeSignal>,
}

/// Run `f` under `strategy`.
pub(crate) async fn platform_run<F, Fut, E>(
    strategy: RunStrategy,
    f: F,
    ctx: RunContext,
) -> Result<ExitOutcome, RunError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    match strategy {
        RunStrategy::Interactive => run_interactive(f, ctx).await,
        RunStrategy::Detached => run_detached(f).await,
    }
}

async fn run_interactive<F, Fut, E>(f: F, mut ctx: RunContext) -> Result<ExitOutcome, RunError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    let catalog = ctx.handler.terminal_signals();
    let _subscription = SignalSubscription::install(&catalog, ctx.tx.clone())?;

    let app = f();
    tokio::pin!(app);

    tokio::select! {
        biased;

        (sig, action) = next_verdict(&ctx.handler, &mut ctx.signals) => {
            Ok(ExitOutcome::from_verdict(sig, action))
        }
        result = &mut app => {
            result.map_err(RunError::App)?;
            // The callback may have finished in the same poll that queued a
            // signal; handle what is already there before declaring success.
            while let Ok(sig) = ctx.signals.try_recv() {
                let action = ctx.handler.dispatch(sig);
                if action.terminates() {
                    return Ok(ExitOutcome::from_verdict(sig, action));
                }
            }
            Ok(ExitOutcome::Success)
        }
    }
}

async fn run_detached<F, Fut, E>(f: F) -> Result<ExitOutcome, RunError<E>>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<(), E>>,
{
    f().await.map_err(RunError::App)?;
    Ok(ExitOutcome::Success)
}

/// Handle deliveries in order until one terminates the process.
async fn next_verdict(
    handler: &SignalHandler,
    signals: &mut mpsc::UnboundedReceiver<NativeSignal>,
) -> (NativeSignal, PortableSignalAction) {
    while let Some(sig) = signals.recv().await {
        let action = handler.dispatch(sig);
        if action.terminates() {
            return (sig, action);
        }
    }
    // All senders gone: nothing can terminate us anymore.
    std::future::pending().await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explicit_modes_win() {
        let mut cfg = Config::default();

        cfg.run.mode = RunMode::Interactive;
        assert_eq!(select_strategy(&cfg), RunStrategy::Interactive);

        cfg.run.mode = RunMode::Detached;
        assert_eq!(select_strategy(&cfg), RunStrategy::Detached);
    }

    #[cfg(unix)]
    #[test]
    fn test_auto_is_interactive_on_unix() {
        assert_eq!(select_strategy(&Config::default()), RunStrategy::Interactive);
    }

    #[test]
    fn test_strategy_is_stable() {
        let cfg = Config::default();
        assert_eq!(select_strategy(&cfg), select_strategy(&cfg));
    }
}
