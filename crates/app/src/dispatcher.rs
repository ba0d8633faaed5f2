//! Named-signal dispatcher.
//!
//! Integrations use signals to fan a "something changed upstream" notice out
//! to every listener without knowing who they are. A signal carries no
//! payload; listeners re-read whatever state they mirror.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::broadcast;

const SIGNAL_CAPACITY: usize = 16;

/// Cheaply cloneable registry of named broadcast signals.
#[derive(Clone, Default)]
pub struct Dispatcher {
    signals: Arc<Mutex<HashMap<&'static str, broadcast::Sender<()>>>>,
}

impl Dispatcher {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe to `signal`, receiving every dispatch made after this call.
    #[must_use]
    pub fn connect(&self, signal: &'static str) -> broadcast::Receiver<()> {
        let mut signals = self
            .signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        signals
            .entry(signal)
            .or_insert_with(|| broadcast::channel(SIGNAL_CAPACITY).0)
            .subscribe()
    }

    /// Dispatch `signal`, returning how many listeners were notified.
    pub fn send(&self, signal: &'static str) -> usize {
        let signals = self
            .signals
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        let delivered = signals
            .get(signal)
            .and_then(|sender| sender.send(()).ok())
            .unwrap_or(0);
        tracing::trace!(signal, delivered, "signal dispatched");
        delivered
    }
}
