//! Trigger kind — the serializable configuration of a trigger's policy.

use serde::{Deserialize, Serialize};

use crate::error::{NumericError, ValidationError};

use super::condition::{Condition, Repeating, SingleShot, SingleShotRelative};

/// Which policy decides when a trigger fires.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TriggerKind {
    /// Fires once when the signal is within `tolerance` of `target`.
    SingleShot { target: f64, tolerance: f64 },
    /// Fires once when the signal, relative to its value at enable time, is
    /// within `tolerance` of `target`.
    SingleShotRelative { target: f64, tolerance: f64 },
    /// Fires every time the signal moves `interval` away from the last firing.
    Repeating { interval: f64 },
}

impl TriggerKind {
    /// Check that every parameter is usable.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::NonFiniteParameter`] for NaN or infinite
    /// parameters and [`ValidationError::NonPositiveInterval`] for an interval
    /// that is zero or negative. Negative tolerances are accepted.
    pub fn validate(&self) -> Result<(), ValidationError> {
        match *self {
            Self::SingleShot { target, tolerance }
            | Self::SingleShotRelative { target, tolerance } => {
                finite("target", target)?;
                finite("tolerance", tolerance)
            }
            Self::Repeating { interval } => {
                finite("interval", interval)?;
                if interval <= 0.0 {
                    return Err(ValidationError::NonPositiveInterval { interval });
                }
                Ok(())
            }
        }
    }

    /// Build a fresh (armed) evaluation state for this kind.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if the parameters cannot be represented as
    /// exact decimals.
    pub fn build_condition(&self) -> Result<Condition, NumericError> {
        Ok(match *self {
            Self::SingleShot { target, tolerance } => {
                Condition::SingleShot(SingleShot::new(target, tolerance)?)
            }
            Self::SingleShotRelative { target, tolerance } => {
                Condition::SingleShotRelative(SingleShotRelative::new(target, tolerance)?)
            }
            Self::Repeating { interval } => Condition::Repeating(Repeating::new(interval)?),
        })
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ValidationError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ValidationError::NonFiniteParameter { field, value })
    }
}

impl std::fmt::Display for TriggerKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::SingleShot { target, tolerance } => {
                write!(f, "single_shot({target} ± {})", tolerance.abs())
            }
            Self::SingleShotRelative { target, tolerance } => {
                write!(f, "single_shot_relative(+{target} ± {})", tolerance.abs())
            }
            Self::Repeating { interval } => write!(f, "repeating(every {interval})"),
        }
    }
}
