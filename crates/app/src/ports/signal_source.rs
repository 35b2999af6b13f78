//! Signal source port — the sample environment variable (SEV) a trigger watches.

use std::sync::Arc;

use plantrigger_domain::error::SignalError;
use plantrigger_domain::id::TriggerId;

/// Receives every new sample pushed by a [`SignalSource`].
///
/// Sources may call [`signal_changed`](Self::signal_changed) from any thread,
/// including several threads at once.
pub trait SignalListener: Send + Sync {
    /// Identity used by [`SignalSource::remove_listener`].
    fn trigger_id(&self) -> TriggerId;

    /// A new sample is available.
    fn signal_changed(&self, signal: f64);
}

/// A live scalar signal publisher.
///
/// Implementations must not hold an internal lock while calling
/// [`SignalListener::signal_changed`]; listeners are allowed to call back
/// into the source (for example to unsubscribe).
pub trait SignalSource: Send + Sync {
    /// Human-readable name, reported to the plan registrar on completion.
    fn name(&self) -> &str;

    /// Current (last known) value.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError`] when the underlying device cannot be read.
    fn read(&self) -> Result<f64, SignalError>;

    /// Start pushing samples to `listener`.
    fn add_listener(&self, listener: Arc<dyn SignalListener>);

    /// Stop pushing samples to the listener registered for `trigger_id`.
    /// Unknown ids are ignored.
    fn remove_listener(&self, trigger_id: TriggerId);
}
