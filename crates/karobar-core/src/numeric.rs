//! # Numeric Coercion
//!
//! Safe conversion of user-entered numeric text to floats.
//!
//! ## Why Coercion Instead of Validation?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Entry screens recompute totals on EVERY keystroke.                     │
//! │                                                                         │
//! │  While a quantity field holds "", "1.", or "12x", the invoice must      │
//! │  still render a number. Failing the parse would leave the totals row    │
//! │  blank or stale mid-edit.                                               │
//! │                                                                         │
//! │  So invalid input silently becomes 0 - a deliberate fallback, not an    │
//! │  error. Hard invariants (rate caps, payable limits) are enforced        │
//! │  separately as typed ValidationErrors.                                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use karobar_core::numeric::{coerce, coerce_signed, round2};
//!
//! assert_eq!(coerce("12.5"), 12.5);
//! assert_eq!(coerce(""), 0.0);       // empty → 0
//! assert_eq!(coerce("abc"), 0.0);    // invalid → 0
//! assert_eq!(coerce("-3"), 0.0);     // quantities/rates are non-negative
//!
//! assert_eq!(coerce_signed("-3"), -3.0); // balances keep their sign
//! assert_eq!(round2(10.006), 10.01);
//! ```

// =============================================================================
// Coercion
// =============================================================================

/// Coerces user-entered text to a non-negative float.
///
/// ## Rules
/// - Leading/trailing whitespace is ignored
/// - Empty, unparseable, or non-finite input → `0.0`
/// - Negative input → `0.0` (quantities, rates, and percentages are
///   non-negative by definition)
pub fn coerce(raw: &str) -> f64 {
    let value = coerce_signed(raw);
    if value < 0.0 {
        0.0
    } else {
        value
    }
}

/// Coerces user-entered text to a signed float.
///
/// Used for fields where a negative value is meaningful - a negative
/// previous balance denotes a counterparty advance.
///
/// Empty, unparseable, or non-finite input → `0.0`.
pub fn coerce_signed(raw: &str) -> f64 {
    match raw.trim().parse::<f64>() {
        Ok(value) if value.is_finite() => value,
        _ => 0.0,
    }
}

/// Clamps an already-numeric value to the coercion domain.
///
/// Non-finite values (NaN, ±∞ from divisions upstream) become `0.0`.
pub fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

// =============================================================================
// Rounding
// =============================================================================

/// Rounds to 2 decimal places.
///
/// ## When to Round
/// Only at submission or display boundaries. Intermediate accumulation
/// (summing line amounts into a subtotal) runs at full precision so that
/// rounding error does not compound across lines.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coerce_valid_input() {
        assert_eq!(coerce("12.5"), 12.5);
        assert_eq!(coerce(" 7 "), 7.0);
        assert_eq!(coerce("0"), 0.0);
    }

    #[test]
    fn test_coerce_invalid_input_defaults_to_zero() {
        assert_eq!(coerce(""), 0.0);
        assert_eq!(coerce("   "), 0.0);
        assert_eq!(coerce("abc"), 0.0);
        assert_eq!(coerce("12x"), 0.0);
        assert_eq!(coerce("NaN"), 0.0);
        assert_eq!(coerce("inf"), 0.0);
    }

    #[test]
    fn test_coerce_rejects_negative() {
        assert_eq!(coerce("-3"), 0.0);
        assert_eq!(coerce("-0.01"), 0.0);
    }

    #[test]
    fn test_coerce_signed_keeps_sign() {
        assert_eq!(coerce_signed("-3"), -3.0);
        assert_eq!(coerce_signed("-1250.75"), -1250.75);
        assert_eq!(coerce_signed("garbage"), 0.0);
    }

    #[test]
    fn test_sanitize() {
        assert_eq!(sanitize(5.5), 5.5);
        assert_eq!(sanitize(-5.5), -5.5);
        assert_eq!(sanitize(f64::NAN), 0.0);
        assert_eq!(sanitize(f64::INFINITY), 0.0);
        assert_eq!(sanitize(f64::NEG_INFINITY), 0.0);
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(10.004), 10.0);
        assert_eq!(round2(10.006), 10.01);
        assert_eq!(round2(899.999), 900.0);
        assert_eq!(round2(0.125), 0.13);
    }
}
