//! Recording plan registrar — keeps every notification in arrival order.

use std::sync::{Mutex, MutexGuard, PoisonError};

use plantrigger_app::ports::PlanRegistrar;
use plantrigger_domain::event::TriggerEvent;
use plantrigger_domain::id::TriggerId;
use plantrigger_domain::trigger::TriggerDefinition;
use tokio::sync::watch;

/// One notification received from a trigger.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Occurred {
        trigger_id: TriggerId,
        trigger_name: String,
    },
    Complete {
        trigger_id: TriggerId,
        trigger_name: String,
        event: TriggerEvent,
        source_name: String,
    },
}

/// A [`PlanRegistrar`] that logs and records what it is told.
#[derive(Debug)]
pub struct RecordingRegistrar {
    records: Mutex<Vec<Record>>,
    completed: watch::Sender<usize>,
}

impl Default for RecordingRegistrar {
    fn default() -> Self {
        Self {
            records: Mutex::new(Vec::new()),
            completed: watch::Sender::new(0),
        }
    }
}

impl RecordingRegistrar {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn records_guard(&self) -> MutexGuard<'_, Vec<Record>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every notification so far, oldest first.
    #[must_use]
    pub fn records(&self) -> Vec<Record> {
        self.records_guard().clone()
    }

    /// Completed events, oldest first.
    #[must_use]
    pub fn completions(&self) -> Vec<TriggerEvent> {
        self.records_guard()
            .iter()
            .filter_map(|record| match record {
                Record::Complete { event, .. } => Some(event.clone()),
                Record::Occurred { .. } => None,
            })
            .collect()
    }

    #[must_use]
    pub fn completions_for(&self, trigger_id: TriggerId) -> Vec<TriggerEvent> {
        self.completions()
            .into_iter()
            .filter(|event| event.trigger_id == trigger_id)
            .collect()
    }

    #[must_use]
    pub fn failures(&self) -> Vec<TriggerEvent> {
        self.completions()
            .into_iter()
            .filter(|event| event.failed)
            .collect()
    }

    #[must_use]
    pub fn occurrences_for(&self, trigger_id: TriggerId) -> usize {
        self.records_guard()
            .iter()
            .filter(|record| {
                matches!(record, Record::Occurred { trigger_id: id, .. } if *id == trigger_id)
            })
            .count()
    }

    /// Resolve once at least `count` completions have been recorded.
    pub async fn wait_for_completions(&self, count: usize) {
        let mut completed = self.completed.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = completed.wait_for(|done| *done >= count).await;
    }
}

impl PlanRegistrar for RecordingRegistrar {
    fn trigger_occurred(&self, trigger: &TriggerDefinition) {
        tracing::info!(trigger = %trigger.name, payload = %trigger.payload, "trigger occurred");
        self.records_guard().push(Record::Occurred {
            trigger_id: trigger.id,
            trigger_name: trigger.name.clone(),
        });
    }

    fn trigger_complete(&self, trigger: &TriggerDefinition, event: TriggerEvent, source_name: &str) {
        if event.failed {
            tracing::warn!(
                trigger = %trigger.name,
                source = source_name,
                signal = event.signal,
                "trigger completed with a failed dispatch"
            );
        } else {
            tracing::info!(
                trigger = %trigger.name,
                source = source_name,
                signal = event.signal,
                dispatch_id = ?event.dispatch_id,
                "trigger complete"
            );
        }
        self.records_guard().push(Record::Complete {
            trigger_id: trigger.id,
            trigger_name: trigger.name.clone(),
            event,
            source_name: source_name.to_string(),
        });
        self.completed.send_modify(|done| *done += 1);
    }
}
