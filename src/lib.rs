//! Cross-platform process entry point.
//!
//! Runs one application callback under a platform-appropriate signal policy:
//! terminate and interrupt signals stop the process, the abort signal dumps
//! diagnostics first, everything else is ignored.

pub mod config;
pub mod exe_path;
pub mod lifecycle;
pub mod observability;

pub use config::Config;
pub use exe_path::{exe_path, exe_path_from_path};
pub use lifecycle::{run_main, run_main_with, ExitOutcome, LifecycleDriver, NativeSignal, RunError, Shutdown};
