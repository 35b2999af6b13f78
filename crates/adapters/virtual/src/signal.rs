//! Virtual sample environment variable.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use plantrigger_app::ports::{SignalListener, SignalSource};
use plantrigger_domain::error::SignalError;
use plantrigger_domain::id::TriggerId;

/// An in-memory SEV.
///
/// [`set`](Self::set) stores the value and pushes it to every listener. The
/// listener list is snapshotted first, so listeners run without any lock of
/// this source held and may subscribe or unsubscribe from inside the callback.
pub struct VirtualSignal {
    name: String,
    value: Mutex<f64>,
    available: AtomicBool,
    listeners: Mutex<Vec<Arc<dyn SignalListener>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl VirtualSignal {
    #[must_use]
    pub fn new(name: impl Into<String>, initial: f64) -> Self {
        Self {
            name: name.into(),
            value: Mutex::new(initial),
            available: AtomicBool::new(true),
            listeners: Mutex::new(Vec::new()),
        }
    }

    /// Store `value` and notify the current listeners.
    pub fn set(&self, value: f64) {
        *lock(&self.value) = value;
        let listeners = lock(&self.listeners).clone();
        tracing::trace!(signal = %self.name, value, listeners = listeners.len(), "signal changed");
        for listener in listeners {
            listener.signal_changed(value);
        }
    }

    /// Simulate the device going offline (`read` fails) or coming back.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::Relaxed);
    }

    #[must_use]
    pub fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }
}

impl SignalSource for VirtualSignal {
    fn name(&self) -> &str {
        &self.name
    }

    fn read(&self) -> Result<f64, SignalError> {
        if !self.available.load(Ordering::Relaxed) {
            return Err(SignalError::Unavailable {
                name: self.name.clone(),
                reason: "simulated outage".to_string(),
            });
        }
        Ok(*lock(&self.value))
    }

    fn add_listener(&self, listener: Arc<dyn SignalListener>) {
        lock(&self.listeners).push(listener);
    }

    fn remove_listener(&self, trigger_id: TriggerId) {
        lock(&self.listeners).retain(|l| l.trigger_id() != trigger_id);
    }
}

impl std::fmt::Debug for VirtualSignal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VirtualSignal")
            .field("name", &self.name)
            .field("value", &*lock(&self.value))
            .field("listeners", &self.listener_count())
            .finish()
    }
}
