//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Build runtime → LifecycleDriver::run → exit code
//!
//! Driver (driver.rs):
//!     select_strategy (strategy.rs)
//!     → interactive: install catalog (delivery.rs), run callback
//!     → detached: run callback
//!
//! Signals (signals.rs, handler.rs):
//!     Interrupt / terminate signal → graceful stop
//!     Abort signal → diagnostic dump, then stop
//!     Anything else → ignored
//! ```
//!
//! # Design Decisions
//! - Callback runs exactly once; the driver is consumed by `run`
//! - Platform signal vocabulary is selected at build time
//! - Signal deliveries flow through one channel, handled in order

use thiserror::Error;

pub mod delivery;
pub mod driver;
pub mod handler;
pub mod shutdown;
pub mod signals;
pub mod startup;
pub mod strategy;

pub use delivery::{SignalInjector, SignalSubscription};
pub use driver::{ExitOutcome, LifecycleDriver, RunError};
pub use handler::{
    base_action, handle_signal_base, host_platform, PlatformSignals, PortableSignalAction,
    SignalHandler, UnixSignals, WindowsSignals,
};
pub use shutdown::Shutdown;
pub use signals::{terminal_signals_base, NativeSignal, SignalCatalog};
pub use startup::{run_main, run_main_with, run_to_completion};
pub use strategy::{select_strategy, RunStrategy};

/// Errors raised by the lifecycle machinery itself.
#[derive(Debug, Error)]
pub enum LifecycleError {
    /// The OS refused a signal registration.
    #[error("failed to install handler for {signal}: {source}")]
    SignalInstall {
        signal: NativeSignal,
        #[source]
        source: std::io::Error,
    },

    /// The async runtime could not be built.
    #[error("failed to build runtime: {0}")]
    Runtime(#[source] std::io::Error),
}
