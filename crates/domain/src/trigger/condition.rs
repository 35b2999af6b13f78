//! Condition — the per-kind evaluation state machine of a trigger.
//!
//! A condition is owned by exactly one trigger. It is re-armed with the
//! current signal every time the trigger is enabled and then fed one signal
//! at a time; `evaluate` returning `true` means "fire now".

use rust_decimal::Decimal;

use crate::error::NumericError;
use crate::numeric::{self, Window};

/// Evaluation state of a trigger, one variant per trigger kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    SingleShot(SingleShot),
    SingleShotRelative(SingleShotRelative),
    Repeating(Repeating),
}

impl Condition {
    /// Reset the state for a new enable cycle, given the signal read at
    /// enable time.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if `current_signal` is needed as a
    /// reference and is not a finite, representable number.
    pub fn arm(&mut self, current_signal: f64) -> Result<(), NumericError> {
        match self {
            Self::SingleShot(c) => {
                c.reset();
                Ok(())
            }
            Self::SingleShotRelative(c) => c.arm(current_signal),
            Self::Repeating(c) => c.arm(current_signal),
        }
    }

    /// Decide whether the trigger fires for `signal`.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if `signal` cannot be compared exactly.
    pub fn evaluate(&mut self, signal: f64) -> Result<bool, NumericError> {
        match self {
            Self::SingleShot(c) => c.evaluate_signal(signal),
            Self::SingleShotRelative(c) => c.evaluate(signal),
            Self::Repeating(c) => c.evaluate(signal),
        }
    }
}

/// Fires once when the signal enters `[target - |tolerance|, target + |tolerance|]`.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleShot {
    window: Window,
    has_triggered: bool,
}

impl SingleShot {
    /// # Errors
    ///
    /// Returns a [`NumericError`] if the window bounds cannot be built.
    pub fn new(target: f64, tolerance: f64) -> Result<Self, NumericError> {
        Ok(Self {
            window: Window::around(target, tolerance)?,
            has_triggered: false,
        })
    }

    #[must_use]
    pub fn window(&self) -> Window {
        self.window
    }

    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.has_triggered
    }

    pub fn reset(&mut self) {
        self.has_triggered = false;
    }

    /// Once fired, stays inert without looking at the probe again.
    pub fn evaluate(&mut self, probe: Decimal) -> bool {
        if self.has_triggered {
            return false;
        }
        if self.window.contains(probe) {
            self.has_triggered = true;
        }
        self.has_triggered
    }

    /// [`evaluate`](Self::evaluate) on a raw signal value.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if `signal` cannot be converted.
    pub fn evaluate_signal(&mut self, signal: f64) -> Result<bool, NumericError> {
        if self.has_triggered {
            return Ok(false);
        }
        Ok(self.evaluate(numeric::to_decimal(signal)?))
    }
}

/// Single shot on the signal relative to its value at enable time.
///
/// Typically watches a clock-like SEV: `target = 5` fires five units after
/// the trigger was enabled.
#[derive(Debug, Clone, PartialEq)]
pub struct SingleShotRelative {
    inner: SingleShot,
    reference: Decimal,
}

impl SingleShotRelative {
    /// # Errors
    ///
    /// Returns a [`NumericError`] if the window bounds cannot be built.
    pub fn new(target: f64, tolerance: f64) -> Result<Self, NumericError> {
        Ok(Self {
            inner: SingleShot::new(target, tolerance)?,
            reference: Decimal::ZERO,
        })
    }

    #[must_use]
    pub fn reference(&self) -> Decimal {
        self.reference
    }

    #[must_use]
    pub fn has_triggered(&self) -> bool {
        self.inner.has_triggered()
    }

    /// Record `current_signal` as the new reference and re-arm.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if `current_signal` cannot be converted;
    /// the previous state is left untouched in that case.
    pub fn arm(&mut self, current_signal: f64) -> Result<(), NumericError> {
        self.reference = numeric::to_decimal(current_signal)?;
        self.inner.reset();
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`NumericError`] if `signal` cannot be converted or the
    /// subtraction overflows.
    pub fn evaluate(&mut self, signal: f64) -> Result<bool, NumericError> {
        let relative = numeric::to_decimal(signal)?
            .checked_sub(self.reference)
            .ok_or(NumericError::Overflow)?;
        Ok(self.inner.evaluate(relative))
    }
}

/// Fires each time the signal has moved at least one `interval` away from
/// the value it last fired at. Never disarms itself.
#[derive(Debug, Clone, PartialEq)]
pub struct Repeating {
    interval: f64,
    last_firing_signal: f64,
}

impl Repeating {
    /// # Errors
    ///
    /// Returns [`NumericError::InvalidInterval`] unless `interval` is a
    /// positive, representable number.
    pub fn new(interval: f64) -> Result<Self, NumericError> {
        if numeric::to_decimal(interval)? <= Decimal::ZERO {
            return Err(NumericError::InvalidInterval);
        }
        Ok(Self {
            interval,
            last_firing_signal: 0.0,
        })
    }

    #[must_use]
    pub fn interval(&self) -> f64 {
        self.interval
    }

    #[must_use]
    pub fn last_firing_signal(&self) -> f64 {
        self.last_firing_signal
    }

    /// # Errors
    ///
    /// Returns a [`NumericError`] if `current_signal` is not finite.
    pub fn arm(&mut self, current_signal: f64) -> Result<(), NumericError> {
        numeric::to_decimal(current_signal)?;
        self.last_firing_signal = current_signal;
        Ok(())
    }

    /// # Errors
    ///
    /// Returns a [`NumericError`] if the interval ratio cannot be computed.
    pub fn evaluate(&mut self, signal: f64) -> Result<bool, NumericError> {
        if !numeric::intervals_crossed(signal, self.last_firing_signal, self.interval)? {
            return Ok(false);
        }
        self.last_firing_signal = signal;
        Ok(true)
    }
}
