//! Trigger event — the record of one firing and its dispatch outcome.

use serde::{Deserialize, Serialize};

use crate::id::{DispatchId, TriggerId};
use crate::time::Timestamp;

/// Emitted once per firing and delivered to the plan registrar on completion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerEvent {
    pub trigger_id: TriggerId,
    /// Signal value that caused the firing.
    pub signal: f64,
    /// Set only when the dispatcher produced an identifiable unit of work.
    pub dispatch_id: Option<DispatchId>,
    pub failed: bool,
    pub occurred_at: Timestamp,
}

impl TriggerEvent {
    /// A fresh, not yet dispatched, non-failed event.
    #[must_use]
    pub fn new(trigger_id: TriggerId, signal: f64) -> Self {
        Self {
            trigger_id,
            signal,
            dispatch_id: None,
            failed: false,
            occurred_at: crate::time::now(),
        }
    }

    pub fn set_dispatch_id(&mut self, id: DispatchId) {
        self.dispatch_id = Some(id);
    }

    pub fn mark_failed(&mut self) {
        self.failed = true;
    }
}
