//! Plan registrar port — bookkeeping of trigger firings for the enclosing plan.

use plantrigger_domain::event::TriggerEvent;
use plantrigger_domain::trigger::TriggerDefinition;

/// Tracks which triggers fired and how their payloads went.
///
/// For a given firing, `trigger_occurred` is always called before
/// `trigger_complete`, and both are called from the trigger's dispatch
/// worker. Completions of different firings may arrive in any order
/// relative to other triggers.
pub trait PlanRegistrar: Send + Sync {
    /// The trigger fired; its payload is about to be dispatched.
    fn trigger_occurred(&self, trigger: &TriggerDefinition);

    /// Payload handling finished, successfully or not (`event.failed`).
    fn trigger_complete(&self, trigger: &TriggerDefinition, event: TriggerEvent, source_name: &str);
}
