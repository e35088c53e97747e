//! Delivery of native signals into the handling loop.
//!
//! # Data Flow
//! ```text
//! OS signal → forwarder task (one per catalog entry)
//!     → unbounded mpsc channel
//!     → handling loop (driver.rs) → SignalHandler
//!
//! SignalInjector → same channel (in-process delivery)
//! ```
//!
//! # Design Decisions
//! - Uses Tokio's signal streams, never a raw interrupt context
//! - One channel preserves per-occurrence ordering
//! - Forwarders are aborted when the subscription is dropped

use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::lifecycle::signals::{NativeSignal, SignalCatalog};
use crate::lifecycle::LifecycleError;

/// Handle for delivering a signal from inside the process.
#[derive(Debug, Clone)]
pub struct SignalInjector {
    tx: mpsc::UnboundedSender<NativeSignal>,
}

impl SignalInjector {
    pub(crate) fn new(tx: mpsc::UnboundedSender<NativeSignal>) -> Self {
        Self { tx }
    }

    /// Queue `sig` as if the OS had delivered it.
    ///
    /// Returns false once the run has ended and nothing listens anymore.
    pub fn deliver(&self, sig: NativeSignal) -> bool {
        self.tx.send(sig).is_ok()
    }
}

/// Active OS subscription for every signal in a catalog.
#[derive(Debug)]
pub struct SignalSubscription {
    forwarders: Vec<JoinHandle<()>>,
}

impl SignalSubscription {
    /// Register every distinct catalog entry with the OS and forward
    /// deliveries into `tx`.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn install(
        catalog: &SignalCatalog,
        tx: mpsc::UnboundedSender<NativeSignal>,
    ) -> Result<Self, LifecycleError> {
        let mut subscription = Self {
            forwarders: Vec::with_capacity(catalog.len()),
        };

        for sig in catalog.distinct() {
            // On error the partially built subscription is dropped, which
            // aborts the forwarders already spawned.
            let stream = os::listen(sig)
                .map_err(|source| LifecycleError::SignalInstall { signal: sig, source })?;
            subscription.forwarders.push(spawn_forwarder(sig, stream, tx.clone()));
        }

        tracing::debug!(
            signals = ?catalog.signals(),
            "Signal subscription installed"
        );
        Ok(subscription)
    }

    /// Number of signals with a live OS registration.
    pub fn len(&self) -> usize {
        self.forwarders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forwarders.is_empty()
    }
}

impl Drop for SignalSubscription {
    fn drop(&mut self) {
        for forwarder in &self.forwarders {
            forwarder.abort();
        }
        if !self.forwarders.is_empty() {
            tracing::debug!("Signal subscription removed");
        }
    }
}

fn spawn_forwarder(
    sig: NativeSignal,
    mut stream: os::SignalStream,
    tx: mpsc::UnboundedSender<NativeSignal>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while stream.recv().await.is_some() {
            tracing::trace!(signal = %sig, "Signal delivered");
            if tx.send(sig).is_err() {
                break;
            }
        }
    })
}

#[cfg(unix)]
mod os {
    use std::io;

    use tokio::signal::unix::{signal, Signal, SignalKind};

    use crate::lifecycle::signals::NativeSignal;

    pub(super) type SignalStream = Signal;

    const SIGABRT: i32 = 6;

    pub(super) fn listen(sig: NativeSignal) -> io::Result<SignalStream> {
        let kind = match sig {
            NativeSignal::Interrupt => SignalKind::interrupt(),
            NativeSignal::Terminate => SignalKind::terminate(),
            NativeSignal::Abort => SignalKind::from_raw(SIGABRT),
            NativeSignal::Quit => SignalKind::quit(),
            NativeSignal::Hangup => SignalKind::hangup(),
            NativeSignal::CtrlBreak | NativeSignal::CtrlClose | NativeSignal::CtrlShutdown => {
                return Err(io::Error::new(
                    io::ErrorKind::Unsupported,
                    format!("{sig} is a Windows console event"),
                ))
            }
        };
        signal(kind)
    }
}

#[cfg(windows)]
mod os {
    use std::io;

    use tokio::signal::windows;

    use crate::lifecycle::signals::NativeSignal;

    /// Unifies the distinct Tokio listener types for console events.
    pub(super) enum SignalStream {
        CtrlC(windows::CtrlC),
        CtrlBreak(windows::CtrlBreak),
        CtrlClose(windows::CtrlClose),
        CtrlShutdown(windows::CtrlShutdown),
    }

    impl SignalStream {
        pub(super) async fn recv(&mut self) -> Option<()> {
            match self {
                SignalStream::CtrlC(s) => s.recv().await,
                SignalStream::CtrlBreak(s) => s.recv().await,
                SignalStream::CtrlClose(s) => s.recv().await,
                SignalStream::CtrlShutdown(s) => s.recv().await,
            }
        }
    }

    pub(super) fn listen(sig: NativeSignal) -> io::Result<SignalStream> {
        match sig {
            NativeSignal::Interrupt => windows::ctrl_c().map(SignalStream::CtrlC),
            NativeSignal::CtrlBreak => windows::ctrl_break().map(SignalStream::CtrlBreak),
            NativeSignal::CtrlClose => windows::ctrl_close().map(SignalStream::CtrlClose),
            NativeSignal::CtrlShutdown => {
                windows::ctrl_shutdown().map(SignalStream::CtrlShutdown)
            }
            other => Err(io::Error::new(
                io::ErrorKind::Unsupported,
                format!("{other} has no Windows console equivalent"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_injector_feeds_channel_in_order() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let injector = SignalInjector::new(tx);

        assert!(injector.deliver(NativeSignal::Hangup));
        assert!(injector.deliver(NativeSignal::Terminate));

        assert_eq!(rx.recv().await, Some(NativeSignal::Hangup));
        assert_eq!(rx.recv().await, Some(NativeSignal::Terminate));

        drop(rx);
        assert!(!injector.deliver(NativeSignal::Interrupt));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_registers_distinct_signals() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let catalog = SignalCatalog::new(
            vec![NativeSignal::Hangup],
            [NativeSignal::Hangup, NativeSignal::Quit],
        );

        let subscription = SignalSubscription::install(&catalog, tx).unwrap();
        assert_eq!(subscription.len(), 2);
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_install_rejects_foreign_signal() {
        let (tx, _rx) = mpsc::unbounded_channel();
        let catalog = SignalCatalog::new(vec![NativeSignal::CtrlBreak], Vec::new());

        let err = SignalSubscription::install(&catalog, tx).unwrap_err();
        assert!(matches!(
            err,
            LifecycleError::SignalInstall {
                signal: NativeSignal::CtrlBreak,
                ..
            }
        ));
    }
}
