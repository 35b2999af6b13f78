//! Decimal-safe comparison and subtraction for trigger decisions.
//!
//! Signals arrive as `f64`, but every threshold and interval decision is made
//! on exact base-10 decimals so that values such as `0.3 - 0.1` compare the
//! way an experimenter reads them. An `f64` is converted through its shortest
//! round-trip rendering (`0.1` becomes exactly `0.1`, not the binary
//! expansion `0.1000000000000000055...`).

use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};

use crate::error::NumericError;

/// Number of decimal places the interval ratio is rounded to before it is
/// compared against one.
pub const RATIO_SCALE: u32 = 5;

/// Convert a signal or configuration value to an exact decimal.
///
/// The conversion never rounds: a value whose shortest rendering needs more
/// than 28 fractional digits (e.g. `1e-30`) or whose magnitude exceeds the
/// decimal range (about `7.9e28`) is refused instead.
///
/// # Errors
///
/// Returns [`NumericError::NonFinite`] for NaN and infinities and
/// [`NumericError::Unrepresentable`] when the value has no exact decimal
/// counterpart.
pub fn to_decimal(value: f64) -> Result<Decimal, NumericError> {
    if !value.is_finite() {
        return Err(NumericError::NonFinite { value });
    }
    let text = value.to_string();
    let decimal = Decimal::from_str(&text)
        .map_err(|_| NumericError::Unrepresentable { value })?
        .normalize();
    // `from_str` rounds excess fractional digits away without reporting it.
    if significant_digits(&decimal.to_string()) != significant_digits(&text) {
        return Err(NumericError::Unrepresentable { value });
    }
    Ok(decimal)
}

/// Plain decimal text without trailing fractional zeros and without the sign
/// of a zero, so that `"1.50"`, `"1.5"` and `"-0"`/`"0"` compare equal.
fn significant_digits(text: &str) -> &str {
    let text = if text.contains('.') {
        text.trim_end_matches('0').trim_end_matches('.')
    } else {
        text
    };
    if text == "-0" { "0" } else { text }
}

/// Decimal subtraction `a - b`.
///
/// # Errors
///
/// Returns a [`NumericError`] if either operand cannot be converted or the
/// result overflows.
pub fn subtract(a: f64, b: f64) -> Result<Decimal, NumericError> {
    to_decimal(a)?
        .checked_sub(to_decimal(b)?)
        .ok_or(NumericError::Overflow)
}

/// `true` iff `lower <= value <= upper`, compared as exact decimals.
///
/// # Errors
///
/// Returns a [`NumericError`] if any argument cannot be converted.
pub fn within_inclusive(value: f64, lower: f64, upper: f64) -> Result<bool, NumericError> {
    let value = to_decimal(value)?;
    Ok(to_decimal(lower)? <= value && value <= to_decimal(upper)?)
}

/// `|current - last| / interval`, rounded half-up to [`RATIO_SCALE`] places.
///
/// # Errors
///
/// Returns [`NumericError::InvalidInterval`] for a zero interval, or another
/// [`NumericError`] if conversion or division fails.
pub fn interval_ratio(current: f64, last: f64, interval: f64) -> Result<Decimal, NumericError> {
    let interval = to_decimal(interval)?;
    if interval.is_zero() {
        return Err(NumericError::InvalidInterval);
    }
    let distance = subtract(current, last)?.abs();
    let ratio = distance
        .checked_div(interval)
        .ok_or(NumericError::Overflow)?;
    Ok(ratio.round_dp_with_strategy(RATIO_SCALE, RoundingStrategy::MidpointAwayFromZero))
}

/// `true` iff at least one whole `interval` separates `current` from `last`.
///
/// A rounded ratio of exactly `1.00000` counts as crossed.
///
/// # Errors
///
/// See [`interval_ratio`].
pub fn intervals_crossed(current: f64, last: f64, interval: f64) -> Result<bool, NumericError> {
    Ok(interval_ratio(current, last, interval)? >= Decimal::ONE)
}

/// Inclusive decimal window `[target - |tolerance|, target + |tolerance|]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Window {
    lower: Decimal,
    upper: Decimal,
}

impl Window {
    /// Build the window centred on `target`. A negative tolerance is
    /// normalized to its absolute value, so `lower <= upper` always holds.
    ///
    /// # Errors
    ///
    /// Returns a [`NumericError`] if either value cannot be converted or the
    /// bounds overflow.
    pub fn around(target: f64, tolerance: f64) -> Result<Self, NumericError> {
        let target = to_decimal(target)?;
        let tolerance = to_decimal(tolerance)?.abs();
        let lower = target
            .checked_sub(tolerance)
            .ok_or(NumericError::Overflow)?;
        let upper = target
            .checked_add(tolerance)
            .ok_or(NumericError::Overflow)?;
        Ok(Self { lower, upper })
    }

    #[must_use]
    pub fn lower(&self) -> Decimal {
        self.lower
    }

    #[must_use]
    pub fn upper(&self) -> Decimal {
        self.upper
    }

    /// Both ends are inside the window.
    #[must_use]
    pub fn contains(&self, value: Decimal) -> bool {
        self.lower <= value && value <= self.upper
    }
}

impl std::fmt::Display for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.lower, self.upper)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn should_convert_using_shortest_decimal_rendering() {
        assert_eq!(to_decimal(0.1).unwrap(), dec("0.1"));
        assert_eq!(to_decimal(-273.15).unwrap(), dec("-273.15"));
    }

    #[test]
    fn should_reject_non_finite_values() {
        assert_eq!(
            to_decimal(f64::INFINITY),
            Err(NumericError::NonFinite {
                value: f64::INFINITY
            })
        );
        assert!(matches!(
            to_decimal(f64::NAN),
            Err(NumericError::NonFinite { .. })
        ));
    }

    #[test]
    fn should_reject_values_outside_decimal_range() {
        assert_eq!(
            to_decimal(1e40),
            Err(NumericError::Unrepresentable { value: 1e40 })
        );
        assert_eq!(
            to_decimal(-1e29),
            Err(NumericError::Unrepresentable { value: -1e29 })
        );
    }

    #[test]
    fn should_reject_values_too_small_to_keep_exactly() {
        assert_eq!(
            to_decimal(1e-30),
            Err(NumericError::Unrepresentable { value: 1e-30 })
        );
        assert_eq!(
            to_decimal(1.234_567_890_123_4e-20),
            Err(NumericError::Unrepresentable {
                value: 1.234_567_890_123_4e-20
            })
        );
    }

    #[test]
    fn should_keep_values_at_the_edges_of_decimal_precision() {
        assert_eq!(to_decimal(1e-28).unwrap(), dec("0.0000000000000000000000000001"));
        assert_eq!(
            to_decimal(1e28).unwrap(),
            dec("10000000000000000000000000000")
        );
        assert_eq!(to_decimal(-0.0).unwrap(), Decimal::ZERO);
        assert_eq!(to_decimal(100.0).unwrap(), dec("100"));
    }

    #[test]
    fn should_not_match_zero_window_with_tiny_signal() {
        let window = Window::around(0.0, 0.0).unwrap();
        assert!(to_decimal(1e-30).is_err());
        assert!(window.contains(to_decimal(0.0).unwrap()));
        assert!(within_inclusive(1e-30, 0.0, 0.0).is_err());
    }

    #[test]
    fn should_subtract_without_binary_drift() {
        assert_ne!(0.3 - 0.1, 0.2);
        assert_eq!(subtract(0.3, 0.1).unwrap(), dec("0.2"));
    }

    #[test]
    fn should_include_both_window_ends() {
        assert!(within_inclusive(9.5, 9.5, 10.5).unwrap());
        assert!(within_inclusive(10.5, 9.5, 10.5).unwrap());
        assert!(within_inclusive(10.0, 9.5, 10.5).unwrap());
    }

    #[test]
    fn should_exclude_values_just_outside_window() {
        assert!(!within_inclusive(9.499_999_9, 9.5, 10.5).unwrap());
        assert!(!within_inclusive(10.500_000_1, 9.5, 10.5).unwrap());
    }

    #[test]
    fn should_build_window_from_target_and_tolerance() {
        let window = Window::around(10.0, 0.5).unwrap();
        assert_eq!(window.lower(), dec("9.5"));
        assert_eq!(window.upper(), dec("10.5"));
        assert!(window.contains(dec("9.5")));
        assert!(window.contains(dec("10.5")));
        assert!(!window.contains(dec("10.50001")));
        assert!(!window.contains(dec("9.49999")));
    }

    #[test]
    fn should_normalize_negative_tolerance() {
        let window = Window::around(10.0, -0.5).unwrap();
        assert_eq!(window, Window::around(10.0, 0.5).unwrap());
        assert!(window.lower() <= window.upper());
    }

    #[test]
    fn should_require_exact_match_for_zero_tolerance() {
        let window = Window::around(5.0, 0.0).unwrap();
        assert!(window.contains(dec("5")));
        assert!(!window.contains(dec("5.0000000001")));
        assert!(!window.contains(dec("4.9999999999")));
    }

    #[test]
    fn should_not_cross_interval_below_one_ratio() {
        assert!(!intervals_crossed(11.9, 10.0, 2.0).unwrap());
    }

    #[test]
    fn should_cross_interval_at_exactly_one_ratio() {
        assert_eq!(interval_ratio(12.0, 10.0, 2.0).unwrap(), dec("1.00000"));
        assert!(intervals_crossed(12.0, 10.0, 2.0).unwrap());
    }

    #[test]
    fn should_cross_interval_in_either_direction() {
        assert!(intervals_crossed(8.0, 10.0, 2.0).unwrap());
        assert!(!intervals_crossed(8.5, 10.0, 2.0).unwrap());
    }

    #[test]
    fn should_round_ratio_half_up_to_five_places() {
        // 0.999995 rounds up to 1.00000, 0.999994 rounds down to 0.99999.
        assert_eq!(interval_ratio(0.999_995, 0.0, 1.0).unwrap(), dec("1.00000"));
        assert!(intervals_crossed(0.999_995, 0.0, 1.0).unwrap());
        assert_eq!(interval_ratio(0.999_994, 0.0, 1.0).unwrap(), dec("0.99999"));
        assert!(!intervals_crossed(0.999_994, 0.0, 1.0).unwrap());
    }

    #[test]
    fn should_fail_fast_on_zero_interval() {
        assert_eq!(
            intervals_crossed(1.0, 0.0, 0.0),
            Err(NumericError::InvalidInterval)
        );
    }

    #[test]
    fn should_display_window_bounds() {
        let window = Window::around(1.5, 0.25).unwrap();
        assert_eq!(window.to_string(), "[1.25, 1.75]");
    }
}
