//! Shared utilities for lifecycle integration tests.

use std::sync::{Arc, Mutex};

use procmain::config::{Config, RunMode};
use procmain::lifecycle::{host_platform, SignalHandler};

/// Ordered record of what happened during a run.
#[allow(dead_code)]
#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<String>>>,
}

#[allow(dead_code)]
impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &str) {
        self.events.lock().unwrap().push(event.to_string());
    }

    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, event: &str) -> usize {
        self.events.lock().unwrap().iter().filter(|e| *e == event).count()
    }
}

/// Host platform handler whose diagnostic hook records "dump".
#[allow(dead_code)]
pub fn recording_handler(log: &EventLog) -> SignalHandler {
    let log = log.clone();
    SignalHandler::new(host_platform(), Arc::new(move || log.record("dump")))
}

#[allow(dead_code)]
pub fn config_with_mode(mode: RunMode) -> Config {
    let mut config = Config::default();
    config.run.mode = mode;
    config
}
