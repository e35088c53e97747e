//! Native signal identifiers and the per-platform signal catalog.
//!
//! # Responsibilities
//! - Name the OS notifications this crate can subscribe to
//! - Build the ordered catalog of signals the process listens for
//!
//! # Design Decisions
//! - Base set is shared by every platform; platform entries are appended
//! - Duplicates are tolerated, delivery is idempotent
//! - Catalog is immutable once built

use std::fmt;

/// An OS-level notification the process may receive.
///
/// Unix signals and Windows console control events share one namespace so the
/// handler policy can be written once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NativeSignal {
    /// SIGINT, or Ctrl-C on Windows consoles.
    Interrupt,
    /// SIGTERM.
    Terminate,
    /// SIGABRT.
    Abort,
    /// SIGQUIT.
    Quit,
    /// SIGHUP.
    Hangup,
    /// Windows Ctrl-Break.
    CtrlBreak,
    /// Windows console window closed.
    CtrlClose,
    /// Windows system shutdown.
    CtrlShutdown,
}

impl NativeSignal {
    /// Conventional signal number, used to derive `128 + n` exit codes.
    ///
    /// Windows console events have no POSIX number; they borrow the number of
    /// the closest POSIX equivalent (`SIGBREAK` is 21 in the MSVC runtime).
    pub fn number(self) -> i32 {
        match self {
            NativeSignal::Hangup => 1,
            NativeSignal::Interrupt => 2,
            NativeSignal::Quit => 3,
            NativeSignal::Abort => 6,
            NativeSignal::Terminate => 15,
            NativeSignal::CtrlBreak => 21,
            NativeSignal::CtrlClose => 15,
            NativeSignal::CtrlShutdown => 15,
        }
    }

    /// Short conventional name, as it would appear in a process listing.
    pub fn name(self) -> &'static str {
        match self {
            NativeSignal::Interrupt => "SIGINT",
            NativeSignal::Terminate => "SIGTERM",
            NativeSignal::Abort => "SIGABRT",
            NativeSignal::Quit => "SIGQUIT",
            NativeSignal::Hangup => "SIGHUP",
            NativeSignal::CtrlBreak => "CTRL_BREAK",
            NativeSignal::CtrlClose => "CTRL_CLOSE",
            NativeSignal::CtrlShutdown => "CTRL_SHUTDOWN",
        }
    }
}

impl fmt::Display for NativeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Ordered set of signals the process subscribes to while interactive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalCatalog {
    signals: Vec<NativeSignal>,
}

impl SignalCatalog {
    /// Build a catalog from a base list followed by platform additions.
    pub fn new<I>(base: Vec<NativeSignal>, additions: I) -> Self
    where
        I: IntoIterator<Item = NativeSignal>,
    {
        let mut signals = base;
        signals.extend(additions);
        Self { signals }
    }

    /// Signals in catalog order.
    pub fn signals(&self) -> &[NativeSignal] {
        &self.signals
    }

    pub fn iter(&self) -> impl Iterator<Item = NativeSignal> + '_ {
        self.signals.iter().copied()
    }

    pub fn contains(&self, sig: NativeSignal) -> bool {
        self.signals.contains(&sig)
    }

    pub fn len(&self) -> usize {
        self.signals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.signals.is_empty()
    }

    /// Catalog entries with later duplicates removed, keeping first-seen order.
    ///
    /// Used when installing OS subscriptions: registering the same signal
    /// twice would only duplicate deliveries.
    pub fn distinct(&self) -> Vec<NativeSignal> {
        let mut seen = Vec::with_capacity(self.signals.len());
        for sig in self.iter() {
            if !seen.contains(&sig) {
                seen.push(sig);
            }
        }
        seen
    }
}

impl<'a> IntoIterator for &'a SignalCatalog {
    type Item = &'a NativeSignal;
    type IntoIter = std::slice::Iter<'a, NativeSignal>;

    fn into_iter(self) -> Self::IntoIter {
        self.signals.iter()
    }
}

/// Signals every platform listens for when attached to a terminal.
pub fn terminal_signals_base() -> Vec<NativeSignal> {
    vec![NativeSignal::Interrupt]
}
