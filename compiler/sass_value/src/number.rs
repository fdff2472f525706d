//! SassScript numbers: a floating-point magnitude with unit vectors.
//!
//! Units are two multisets, numerator and denominator. Every operation
//! cancels unit pairs that reduce to a dimensionless factor via the
//! conversion table. Arithmetic between two united numbers proceeds in
//! the left operand's units.

use std::fmt;

use smallvec::SmallVec;

use sass_diagnostic::{SassError, SassResult};

use crate::unit::{canonical_unit, conversion_factor};

/// Tolerance for integer detection and number equality.
pub const EPSILON: f64 = 1e-11;

/// Decimal digits kept when serializing a non-integer number.
pub const PRECISION: usize = 10;

/// A unit multiset. Numbers almost always carry zero or one unit.
pub type Units = SmallVec<[String; 1]>;

/// Whether two floats are equal within [`EPSILON`].
#[inline]
pub fn fuzzy_equals(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// A SassScript number.
#[derive(Clone, Debug)]
pub struct Number {
    pub value: f64,
    numerator_units: Units,
    denominator_units: Units,
    /// Original operands of a slash division, kept so the slash form can
    /// be serialized back out (`font: 12px/30px`).
    as_slash: Option<Box<(Number, Number)>>,
}

impl Number {
    /// A unitless number.
    pub fn unitless(value: f64) -> Self {
        Number {
            value,
            numerator_units: Units::new(),
            denominator_units: Units::new(),
            as_slash: None,
        }
    }

    /// A number with a single numerator unit.
    pub fn with_unit(value: f64, unit: impl Into<String>) -> Self {
        let mut units = Units::new();
        units.push(unit.into());
        Number {
            value,
            numerator_units: units,
            denominator_units: Units::new(),
            as_slash: None,
        }
    }

    /// A number with full unit vectors; cancels on construction.
    pub fn with_units(value: f64, numerator: Units, denominator: Units) -> Self {
        let mut number = Number {
            value,
            numerator_units: numerator,
            denominator_units: denominator,
            as_slash: None,
        };
        number.cancel_units();
        number
    }

    /// The numerator units.
    pub fn numerator_units(&self) -> &[String] {
        &self.numerator_units
    }

    /// The denominator units.
    pub fn denominator_units(&self) -> &[String] {
        &self.denominator_units
    }

    #[inline]
    pub fn is_unitless(&self) -> bool {
        self.numerator_units.is_empty() && self.denominator_units.is_empty()
    }

    #[inline]
    pub fn has_units(&self) -> bool {
        !self.is_unitless()
    }

    /// Whether the magnitude is an integer within [`EPSILON`].
    pub fn is_int(&self) -> bool {
        fuzzy_equals(self.value, self.value.round())
    }

    /// The magnitude as an integer, if it is one within [`EPSILON`].
    pub fn as_int(&self) -> Option<i64> {
        if self.is_int() {
            Some(self.value.round() as i64)
        } else {
            None
        }
    }

    /// The original slash-division operands, if this number was produced
    /// by one and nothing has touched it since.
    pub fn as_slash(&self) -> Option<&(Number, Number)> {
        self.as_slash.as_deref()
    }

    /// Mark this number as a slash division of `left` and `right`.
    #[must_use]
    pub fn with_slash(mut self, left: Number, right: Number) -> Self {
        self.as_slash = Some(Box::new((left, right)));
        self
    }

    /// A copy with the slash marker cleared; any arithmetic result calls
    /// this implicitly by rebuilding the number.
    #[must_use]
    pub fn without_slash(mut self) -> Self {
        self.as_slash = None;
        self
    }

    /// The unit suffix as written in errors and `inspect`: numerators
    /// joined by `*`, then `/` and the denominators.
    pub fn unit_string(&self) -> String {
        if self.is_unitless() {
            return String::new();
        }
        let mut out = self.numerator_units.join("*");
        if !self.denominator_units.is_empty() {
            if out.is_empty() {
                // A pure denominator reads like `ms^-1`.
                out.push_str(&format!("{}^-1", self.denominator_units.join("*")));
            } else {
                out.push('/');
                out.push_str(&self.denominator_units.join("*"));
            }
        }
        out
    }

    /// Convert `other`'s magnitude into this number's units.
    ///
    /// Returns `None` when the unit vectors cannot be paired off through
    /// the conversion table.
    pub fn coerce_value(&self, other: &Number) -> Option<f64> {
        let mut value = other.value;
        let mut remaining_num: Vec<&str> =
            other.numerator_units.iter().map(String::as_str).collect();
        let mut remaining_den: Vec<&str> =
            other.denominator_units.iter().map(String::as_str).collect();

        for unit in &self.numerator_units {
            let idx = remaining_num
                .iter()
                .position(|u| conversion_factor(u, unit).is_some())?;
            let factor = conversion_factor(remaining_num[idx], unit)?;
            value *= factor;
            remaining_num.swap_remove(idx);
        }
        for unit in &self.denominator_units {
            let idx = remaining_den
                .iter()
                .position(|u| conversion_factor(u, unit).is_some())?;
            let factor = conversion_factor(remaining_den[idx], unit)?;
            value /= factor;
            remaining_den.swap_remove(idx);
        }
        if remaining_num.is_empty() && remaining_den.is_empty() {
            Some(value)
        } else {
            None
        }
    }

    /// Whether this number's units can be converted to `other`'s.
    pub fn is_compatible_with(&self, other: &Number) -> bool {
        self.is_unitless() || other.is_unitless() || self.coerce_value(other).is_some()
    }

    /// Add, in this number's units (or the right's, when unitless).
    pub fn add(&self, other: &Number) -> SassResult<Number> {
        self.coerced_arithmetic(other, "+", |a, b| a + b)
    }

    /// Subtract, in this number's units.
    pub fn sub(&self, other: &Number) -> SassResult<Number> {
        self.coerced_arithmetic(other, "-", |a, b| a - b)
    }

    /// Multiply; unit vectors concatenate and cancel.
    pub fn mul(&self, other: &Number) -> Number {
        let mut numerator = self.numerator_units.clone();
        numerator.extend(other.numerator_units.iter().cloned());
        let mut denominator = self.denominator_units.clone();
        denominator.extend(other.denominator_units.iter().cloned());
        Number::with_units(self.value * other.value, numerator, denominator)
    }

    /// Divide; the divisor's units flip and cancel.
    pub fn div(&self, other: &Number) -> Number {
        let mut numerator = self.numerator_units.clone();
        numerator.extend(other.denominator_units.iter().cloned());
        let mut denominator = self.denominator_units.clone();
        denominator.extend(other.numerator_units.iter().cloned());
        Number::with_units(self.value / other.value, numerator, denominator)
    }

    /// Modulo carrying the left operand's unit; the result takes the sign
    /// of the divisor.
    pub fn rem(&self, other: &Number) -> SassResult<Number> {
        self.coerced_arithmetic(other, "%", |a, b| {
            if b == 0.0 {
                f64::NAN
            } else {
                a - b * (a / b).floor()
            }
        })
    }

    /// Compare after converting the right operand; errors on
    /// incompatible units.
    pub fn compare(&self, other: &Number) -> SassResult<std::cmp::Ordering> {
        let converted = self.coerce_for_comparison(other)?;
        Ok(self
            .value
            .partial_cmp(&converted)
            .unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Structural equality: unit structures must pair off, then the
    /// converted magnitudes must match within [`EPSILON`].
    pub fn equals(&self, other: &Number) -> bool {
        if self.is_unitless() != other.is_unitless() {
            return false;
        }
        match self.coerce_value(other) {
            Some(converted) => fuzzy_equals(self.value, converted),
            None => false,
        }
    }

    /// A canonical-form key for hashing: magnitude converted to
    /// class-canonical units plus sorted unit vectors.
    pub fn canonical_key(&self) -> (i64, Vec<String>, Vec<String>) {
        let mut value = self.value;
        let mut numerator: Vec<String> = Vec::with_capacity(self.numerator_units.len());
        for unit in &self.numerator_units {
            let canonical = canonical_unit(unit);
            if let Some(factor) = conversion_factor(unit, canonical) {
                value *= factor;
            }
            numerator.push(canonical.to_string());
        }
        let mut denominator: Vec<String> = Vec::with_capacity(self.denominator_units.len());
        for unit in &self.denominator_units {
            let canonical = canonical_unit(unit);
            if let Some(factor) = conversion_factor(unit, canonical) {
                value /= factor;
            }
            denominator.push(canonical.to_string());
        }
        numerator.sort_unstable();
        denominator.sort_unstable();
        ((value / EPSILON).round() as i64, numerator, denominator)
    }

    fn coerce_for_comparison(&self, other: &Number) -> SassResult<f64> {
        if self.is_unitless() || other.is_unitless() {
            return Ok(other.value);
        }
        self.coerce_value(other).ok_or_else(|| {
            SassError::no_span(format!(
                "Incompatible units {} and {}.",
                display_unit(other),
                display_unit(self),
            ))
        })
    }

    fn coerced_arithmetic(
        &self,
        other: &Number,
        _op: &str,
        f: impl Fn(f64, f64) -> f64,
    ) -> SassResult<Number> {
        if self.is_unitless() {
            return Ok(Number::with_units(
                f(self.value, other.value),
                other.numerator_units.clone(),
                other.denominator_units.clone(),
            ));
        }
        if other.is_unitless() {
            return Ok(Number::with_units(
                f(self.value, other.value),
                self.numerator_units.clone(),
                self.denominator_units.clone(),
            ));
        }
        let converted = self.coerce_value(other).ok_or_else(|| {
            SassError::no_span(format!(
                "Incompatible units {} and {}.",
                display_unit(self),
                display_unit(other),
            ))
        })?;
        Ok(Number::with_units(
            f(self.value, converted),
            self.numerator_units.clone(),
            self.denominator_units.clone(),
        ))
    }

    /// Remove numerator/denominator pairs that reduce to a dimensionless
    /// factor, folding the factor into the magnitude.
    fn cancel_units(&mut self) {
        let mut num_idx = 0;
        while num_idx < self.numerator_units.len() {
            let matched = self
                .denominator_units
                .iter()
                .position(|den| conversion_factor(&self.numerator_units[num_idx], den).is_some());
            if let Some(den_idx) = matched {
                if let Some(factor) =
                    conversion_factor(&self.numerator_units[num_idx], &self.denominator_units[den_idx])
                {
                    self.value *= factor;
                }
                self.numerator_units.remove(num_idx);
                self.denominator_units.remove(den_idx);
            } else {
                num_idx += 1;
            }
        }
    }
}

/// A unit rendering for error messages: the unit string, or the word
/// `no units`.
fn display_unit(number: &Number) -> String {
    if number.is_unitless() {
        "no units".to_string()
    } else {
        number.unit_string()
    }
}

/// Format a magnitude the way CSS output expects: integers without a
/// decimal point, otherwise up to [`PRECISION`] digits with trailing
/// zeros trimmed; negative zero collapses to zero. Compressed output
/// drops the leading zero of a pure fraction.
pub fn format_double(value: f64, compressed: bool) -> String {
    let value = if value == 0.0 { 0.0 } else { value };
    if fuzzy_equals(value, value.round()) && value.abs() < 1e15 {
        return format!("{}", value.round() as i64);
    }
    let mut text = format!("{value:.PRECISION$}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if compressed {
        if let Some(stripped) = text.strip_prefix("0.") {
            text = format!(".{stripped}");
        } else if let Some(stripped) = text.strip_prefix("-0.") {
            text = format!("-.{stripped}");
        }
    }
    text
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", format_double(self.value, false), self.unit_string())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn px(v: f64) -> Number {
        Number::with_unit(v, "px")
    }

    #[test]
    fn test_add_compatible_units() {
        let result = Number::with_unit(1.0, "in").add(&px(96.0)).unwrap();
        assert!(fuzzy_equals(result.value, 2.0));
        assert_eq!(result.unit_string(), "in");
    }

    #[test]
    fn test_add_incompatible_units() {
        let err = px(1.0).add(&Number::with_unit(1.0, "s")).unwrap_err();
        assert!(err.message.contains("Incompatible units"));
    }

    #[test]
    fn test_unitless_adopts_units() {
        let result = Number::unitless(1.0).add(&px(2.0)).unwrap();
        assert_eq!(result.unit_string(), "px");
        assert!(fuzzy_equals(result.value, 3.0));
    }

    #[test]
    fn test_multiplication_cancels() {
        // 4px * (3 per px) is dimensionless 12.
        let per_px = Number::with_units(3.0, Units::new(), {
            let mut units = Units::new();
            units.push("px".to_string());
            units
        });
        let result = px(4.0).mul(&per_px);
        assert!(result.is_unitless());
        assert!(fuzzy_equals(result.value, 12.0));
    }

    #[test]
    fn test_division_produces_ratio_units() {
        let result = px(10.0).div(&Number::with_unit(2.0, "s"));
        assert_eq!(result.unit_string(), "px/s");
        assert!(fuzzy_equals(result.value, 5.0));
    }

    #[test]
    fn test_cross_unit_cancellation_scales() {
        // 1in / 96px cancels to exactly 1.
        let result = Number::with_unit(1.0, "in").div(&px(96.0));
        assert!(result.is_unitless());
        assert!(fuzzy_equals(result.value, 1.0));
    }

    #[test]
    fn test_modulo_takes_divisor_sign() {
        let result = px(-5.0).rem(&px(3.0)).unwrap();
        assert!(fuzzy_equals(result.value, 1.0));
        assert_eq!(result.unit_string(), "px");
    }

    #[test]
    fn test_equality_converts() {
        assert!(Number::with_unit(1.0, "in").equals(&px(96.0)));
        assert!(!Number::unitless(1.0).equals(&px(1.0)));
        assert!(!px(1.0).equals(&Number::with_unit(1.0, "s")));
    }

    #[test]
    fn test_equal_numbers_share_canonical_key() {
        assert_eq!(
            Number::with_unit(1.0, "in").canonical_key(),
            px(96.0).canonical_key()
        );
    }

    #[test]
    fn test_addition_commutes_within_tolerance() {
        let a = Number::with_unit(0.1, "cm");
        let b = Number::with_unit(7.3, "mm");
        let ab = a.add(&b).unwrap();
        let ba = b.add(&a).unwrap();
        // Same magnitude, each in its left operand's units.
        assert!(ab.equals(&ba));
        let round_trip = ab.sub(&b).unwrap();
        assert!(round_trip.equals(&a));
    }

    #[test]
    fn test_format_double() {
        assert_eq!(format_double(3.0, false), "3");
        assert_eq!(format_double(2.5, false), "2.5");
        assert_eq!(format_double(1.0 / 3.0, false), "0.3333333333");
        assert_eq!(format_double(-0.0, false), "0");
        assert_eq!(format_double(0.5, true), ".5");
        assert_eq!(format_double(-0.5, true), "-.5");
    }

    #[test]
    fn test_integer_detection_tolerance() {
        assert!(Number::unitless(2.999_999_999_999_9).is_int());
        assert!(!Number::unitless(2.9).is_int());
        assert_eq!(Number::unitless(3.000_000_000_000_1).as_int(), Some(3));
    }
}
