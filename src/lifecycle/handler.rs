//! Mapping native signals to portable lifecycle actions.
//!
//! # Responsibilities
//! - Classify each delivered signal (terminate, abort, ignore, base)
//! - Run the diagnostic dump on abort before reporting the verdict
//! - Share one base policy across all platform variants
//!
//! # Design Decisions
//! - Platform variants only name their terminate and abort signals
//! - Everything else falls through to the base policy
//! - The dump is best-effort: a failing hook still yields termination

use std::sync::Arc;

use crate::lifecycle::signals::{terminal_signals_base, NativeSignal, SignalCatalog};
use crate::observability::diagnostics::{dump_best_effort, DiagnosticHook};

/// Portable meaning of a native signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortableSignalAction {
    /// Stop gracefully.
    Terminate,
    /// Dump diagnostic state, then stop.
    AbortWithDiagnostic,
    /// Keep running.
    Ignore,
    /// Not handled by the platform variant; ask the base policy.
    DelegateToBase,
}

impl PortableSignalAction {
    /// Whether this action ends the process.
    pub fn terminates(self) -> bool {
        matches!(
            self,
            PortableSignalAction::Terminate | PortableSignalAction::AbortWithDiagnostic
        )
    }
}

/// Base policy for signals common to every platform.
pub fn base_action(sig: NativeSignal) -> PortableSignalAction {
    match sig {
        NativeSignal::Interrupt => PortableSignalAction::Terminate,
        _ => PortableSignalAction::Ignore,
    }
}

/// Verdict of the base policy: true if the process should terminate.
pub fn handle_signal_base(sig: NativeSignal) -> bool {
    base_action(sig).terminates()
}

/// Signal vocabulary of one platform.
pub trait PlatformSignals: Send + Sync {
    /// Signal requesting graceful termination.
    fn terminate_signal(&self) -> NativeSignal;

    /// Signal requesting termination with a diagnostic dump.
    fn abort_signal(&self) -> NativeSignal;

    /// Platform entries appended after the base set.
    fn additional_signals(&self) -> Vec<NativeSignal> {
        vec![self.terminate_signal(), self.abort_signal()]
    }

    fn terminal_signals(&self) -> SignalCatalog {
        SignalCatalog::new(terminal_signals_base(), self.additional_signals())
    }

    /// Platform meaning of `sig`.
    ///
    /// The default names only the terminate and abort signals and delegates
    /// the rest. Variants may override it to return `Ignore` for a signal the
    /// base policy would otherwise act on.
    fn action_for(&self, sig: NativeSignal) -> PortableSignalAction {
        if sig == self.terminate_signal() {
            PortableSignalAction::Terminate
        } else if sig == self.abort_signal() {
            PortableSignalAction::AbortWithDiagnostic
        } else {
            PortableSignalAction::DelegateToBase
        }
    }
}

/// POSIX signals: SIGTERM stops, SIGABRT dumps and stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnixSignals;

impl PlatformSignals for UnixSignals {
    fn terminate_signal(&self) -> NativeSignal {
        NativeSignal::Terminate
    }

    fn abort_signal(&self) -> NativeSignal {
        NativeSignal::Abort
    }
}

/// Windows console events: closing the console stops, Ctrl-Break dumps and stops.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowsSignals;

impl PlatformSignals for WindowsSignals {
    fn terminate_signal(&self) -> NativeSignal {
        NativeSignal::CtrlClose
    }

    fn abort_signal(&self) -> NativeSignal {
        NativeSignal::CtrlBreak
    }
}

/// Platform variant for the build target.
#[cfg(not(windows))]
pub fn host_platform() -> Arc<dyn PlatformSignals> {
    Arc::new(UnixSignals)
}

/// Platform variant for the build target.
#[cfg(windows)]
pub fn host_platform() -> Arc<dyn PlatformSignals> {
    Arc::new(WindowsSignals)
}

/// Receives signal notifications and decides whether the process stops.
#[derive(Clone)]
pub struct SignalHandler {
    platform: Arc<dyn PlatformSignals>,
    diagnostics: Arc<dyn DiagnosticHook>,
}

impl SignalHandler {
    pub fn new(platform: Arc<dyn PlatformSignals>, diagnostics: Arc<dyn DiagnosticHook>) -> Self {
        Self {
            platform,
            diagnostics,
        }
    }

    /// Handler for the build target's platform.
    pub fn for_host(diagnostics: Arc<dyn DiagnosticHook>) -> Self {
        Self::new(host_platform(), diagnostics)
    }

    /// Catalog to subscribe to while interactive.
    pub fn terminal_signals(&self) -> SignalCatalog {
        self.platform.terminal_signals()
    }

    /// Classify `sig` without executing anything.
    ///
    /// Never returns `DelegateToBase`; delegation is resolved here.
    pub fn action_for(&self, sig: NativeSignal) -> PortableSignalAction {
        match self.platform.action_for(sig) {
            PortableSignalAction::DelegateToBase => base_action(sig),
            action => action,
        }
    }

    /// Execute the action for `sig` and return it.
    pub fn dispatch(&self, sig: NativeSignal) -> PortableSignalAction {
        match self.platform.action_for(sig) {
            PortableSignalAction::Terminate => {
                tracing::info!(signal = %sig, "Termination signal received");
                PortableSignalAction::Terminate
            }
            PortableSignalAction::AbortWithDiagnostic => {
                tracing::warn!(signal = %sig, "Abort signal received, dumping diagnostics");
                dump_best_effort(self.diagnostics.as_ref());
                PortableSignalAction::AbortWithDiagnostic
            }
            // Only reachable through a variant that overrides `action_for`.
            PortableSignalAction::Ignore => {
                tracing::debug!(signal = %sig, "Signal ignored by platform");
                PortableSignalAction::Ignore
            }
            PortableSignalAction::DelegateToBase => {
                if handle_signal_base(sig) {
                    tracing::info!(signal = %sig, "Interrupt received");
                    PortableSignalAction::Terminate
                } else {
                    tracing::debug!(signal = %sig, "Unrecognized signal, continuing");
                    PortableSignalAction::Ignore
                }
            }
        }
    }

    /// Handle `sig`; true means the process should terminate now.
    pub fn handle_signal(&self, sig: NativeSignal) -> bool {
        self.dispatch(sig).terminates()
    }
}

impl std::fmt::Debug for SignalHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignalHandler")
            .field("catalog", &self.terminal_signals())
            .finish_non_exhaustive()
    }
}
