//! Common error types used across the workspace.
//!
//! Each concern gets its own typed error; [`PlanTriggerError`] aggregates the
//! ones that can surface from constructing or enabling a trigger via `#[from]`.

/// Top-level error for trigger construction and lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum PlanTriggerError {
    #[error("Validation error")]
    Validation(#[from] ValidationError),

    #[error("Numeric error")]
    Numeric(#[from] NumericError),

    #[error("Signal source error")]
    Signal(#[from] SignalError),
}

/// A trigger definition violates a domain invariant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    #[error("trigger name must not be empty")]
    EmptyName,

    #[error("{field} must be a finite number, got {value}")]
    NonFiniteParameter { field: &'static str, value: f64 },

    #[error("repeating interval must be greater than zero, got {interval}")]
    NonPositiveInterval { interval: f64 },
}

/// Decimal conversion or arithmetic failed.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum NumericError {
    #[error("{value} is not a finite number")]
    NonFinite { value: f64 },

    #[error("{value} cannot be represented as an exact decimal")]
    Unrepresentable { value: f64 },

    #[error("invalid interval: must be non-zero")]
    InvalidInterval,

    #[error("decimal arithmetic overflowed")]
    Overflow,
}

/// The sample environment variable could not be read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SignalError {
    #[error("signal source '{name}' is unavailable: {reason}")]
    Unavailable { name: String, reason: String },
}

/// Handing a payload to the dispatch service failed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DispatchError {
    #[error("payload rejected: {0}")]
    Rejected(String),

    #[error("payload execution failed: {0}")]
    Execution(String),

    #[error("payload dispatch panicked")]
    Panicked,
}
