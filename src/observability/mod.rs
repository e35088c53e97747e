//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Lifecycle events
//!     → logging.rs (structured log events, invocation span)
//!
//! Abort signal
//!     → diagnostics.rs (stack dump + runtime state)
//! ```

pub mod diagnostics;
pub mod logging;

pub use diagnostics::{dump_best_effort, DiagnosticHook, NoDump, StackDump};
pub use logging::init_logging;
