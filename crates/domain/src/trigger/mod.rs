//! Trigger — a rule that watches a sample environment variable and
//! dispatches a [`Payload`] when its condition is met.
//!
//! A [`TriggerDefinition`] is the static, serializable description (name,
//! [`TriggerKind`], payload). The mutable evaluation state lives in a
//! [`Condition`] built from the kind; the runtime engine in the `app` crate
//! owns one of each.

mod condition;
mod kind;

pub use condition::{Condition, Repeating, SingleShot, SingleShotRelative};
pub use kind::TriggerKind;

use serde::{Deserialize, Serialize};

use crate::error::{PlanTriggerError, ValidationError};
use crate::id::TriggerId;
use crate::payload::Payload;

/// Static description of a trigger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TriggerDefinition {
    #[serde(default)]
    pub id: TriggerId,
    pub name: String,
    pub condition: TriggerKind,
    pub payload: Payload,
}

impl TriggerDefinition {
    /// Create a builder for constructing a [`TriggerDefinition`].
    #[must_use]
    pub fn builder() -> TriggerDefinitionBuilder {
        TriggerDefinitionBuilder::default()
    }

    /// Check domain invariants.
    ///
    /// # Errors
    ///
    /// Returns [`PlanTriggerError::Validation`] when:
    /// - `name` is blank ([`ValidationError::EmptyName`])
    /// - a condition parameter is unusable (see [`TriggerKind::validate`])
    pub fn validate(&self) -> Result<(), PlanTriggerError> {
        if self.name.trim().is_empty() {
            return Err(ValidationError::EmptyName.into());
        }
        self.condition.validate()?;
        Ok(())
    }

    /// Validate, then build the evaluation state for this trigger.
    ///
    /// # Errors
    ///
    /// Returns [`PlanTriggerError::Validation`] or
    /// [`PlanTriggerError::Numeric`] for unusable configuration.
    pub fn build_condition(&self) -> Result<Condition, PlanTriggerError> {
        self.validate()?;
        Ok(self.condition.build_condition()?)
    }
}

impl std::fmt::Display for TriggerDefinition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} [{} -> {}]", self.name, self.condition, self.payload)
    }
}

/// Step-by-step builder for [`TriggerDefinition`].
#[derive(Debug, Default)]
pub struct TriggerDefinitionBuilder {
    id: Option<TriggerId>,
    name: Option<String>,
    condition: Option<TriggerKind>,
    payload: Option<Payload>,
}

impl TriggerDefinitionBuilder {
    #[must_use]
    pub fn id(mut self, id: TriggerId) -> Self {
        self.id = Some(id);
        self
    }

    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    #[must_use]
    pub fn condition(mut self, condition: TriggerKind) -> Self {
        self.condition = Some(condition);
        self
    }

    #[must_use]
    pub fn payload(mut self, payload: Payload) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Consume the builder, validate, and return a [`TriggerDefinition`].
    ///
    /// A missing condition defaults to an exact single shot at zero and a
    /// missing payload to a parameterless `"noop"`.
    ///
    /// # Errors
    ///
    /// Returns [`PlanTriggerError::Validation`] if the name is missing or a
    /// condition parameter is unusable.
    pub fn build(self) -> Result<TriggerDefinition, PlanTriggerError> {
        let definition = TriggerDefinition {
            id: self.id.unwrap_or_default(),
            name: self.name.unwrap_or_default(),
            condition: self.condition.unwrap_or(TriggerKind::SingleShot {
                target: 0.0,
                tolerance: 0.0,
            }),
            payload: self
                .payload
                .unwrap_or_else(|| Payload::new("noop", serde_json::Value::Null)),
        };
        definition.validate()?;
        Ok(definition)
    }
}
