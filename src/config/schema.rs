//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from config files.
//! Every field has a default so an empty file is a valid configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Root configuration passed to the lifecycle driver.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Run strategy selection.
    pub run: RunConfig,

    /// Log level and output format.
    pub logging: LoggingConfig,

    /// Diagnostic dump settings.
    pub diagnostics: DiagnosticsConfig,
}

/// How the process attaches to its environment.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Let the platform decide.
    #[default]
    Auto,
    /// Always subscribe to terminal signals.
    Interactive,
    /// Never subscribe; rely on default process termination.
    Detached,
}

/// Run strategy configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub mode: RunMode,

    /// Time given to shutdown subscribers and blocking work after a signal
    /// stops the run, in milliseconds.
    pub shutdown_grace_ms: u64,
}

impl RunConfig {
    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            mode: RunMode::Auto,
            shutdown_grace_ms: 1_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human readable, for development.
    #[default]
    Pretty,
    /// One JSON object per line, for log aggregation.
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Filter directive (e.g., "info" or "procmain=debug").
    /// `RUST_LOG` takes precedence when set.
    pub level: String,

    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Diagnostic dump configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Dump a stack trace and runtime state when an abort signal arrives.
    pub dump_on_abort: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            dump_on_abort: true,
        }
    }
}
