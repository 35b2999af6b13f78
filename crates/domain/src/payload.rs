//! Payload — the opaque unit of scientific work a trigger dispatches.

use serde::{Deserialize, Serialize};

/// Opaque work item handed to the payload dispatcher when a trigger fires.
///
/// The trigger engine never interprets it; `kind` and `parameters` only mean
/// something to the dispatcher. The [`Display`](std::fmt::Display) rendering
/// is used in diagnostics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Payload {
    /// Kind of work, e.g. `"scan"` or `"snapshot"`.
    pub kind: String,
    /// Free-form parameters understood by the dispatcher.
    #[serde(default)]
    pub parameters: serde_json::Value,
}

impl Payload {
    /// Create a payload of the given kind.
    #[must_use]
    pub fn new(kind: impl Into<String>, parameters: serde_json::Value) -> Self {
        Self {
            kind: kind.into(),
            parameters,
        }
    }
}

impl std::fmt::Display for Payload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.parameters.is_null() {
            f.write_str(&self.kind)
        } else {
            write!(f, "{}({})", self.kind, self.parameters)
        }
    }
}
