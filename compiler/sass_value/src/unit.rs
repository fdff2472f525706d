//! The unit conversion table.
//!
//! Units convert within five compatibility classes: length, angle, time,
//! frequency, and resolution. Each class has a canonical unit; the factor
//! for a unit is how many canonical units one of it equals. The ratios
//! reproduce the CSS definitions (96px per inch, 2.54cm per inch, and so
//! on). A unit outside every class is symbolic: it only matches itself.

use std::f64::consts::PI;

/// Compatibility class of a convertible unit.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnitClass {
    Length,
    Angle,
    Time,
    Frequency,
    Resolution,
}

/// Canonical-unit factor for a known unit: `1 unit == factor canonical`.
///
/// Canonical units per class: `px`, `deg`, `ms`, `Hz`, `dpi`.
pub fn canonical_factor(unit: &str) -> Option<(UnitClass, f64)> {
    let entry = match unit {
        // Lengths, canonical px (96 per inch).
        "px" => (UnitClass::Length, 1.0),
        "in" => (UnitClass::Length, 96.0),
        "cm" => (UnitClass::Length, 96.0 / 2.54),
        "mm" => (UnitClass::Length, 96.0 / 25.4),
        "q" => (UnitClass::Length, 96.0 / 101.6),
        "pt" => (UnitClass::Length, 96.0 / 72.0),
        "pc" => (UnitClass::Length, 16.0),

        // Angles, canonical deg.
        "deg" => (UnitClass::Angle, 1.0),
        "grad" => (UnitClass::Angle, 360.0 / 400.0),
        "rad" => (UnitClass::Angle, 180.0 / PI),
        "turn" => (UnitClass::Angle, 360.0),

        // Time, canonical ms.
        "ms" => (UnitClass::Time, 1.0),
        "s" => (UnitClass::Time, 1000.0),

        // Frequency, canonical Hz.
        "Hz" | "hz" => (UnitClass::Frequency, 1.0),
        "kHz" | "khz" => (UnitClass::Frequency, 1000.0),

        // Resolution, canonical dpi.
        "dpi" => (UnitClass::Resolution, 1.0),
        "dpcm" => (UnitClass::Resolution, 2.54),
        "dppx" => (UnitClass::Resolution, 96.0),

        _ => return None,
    };
    Some(entry)
}

/// Multiplier converting a value in `from` units to `to` units, when the
/// two are the same unit or share a compatibility class.
pub fn conversion_factor(from: &str, to: &str) -> Option<f64> {
    if from == to {
        return Some(1.0);
    }
    let (from_class, from_factor) = canonical_factor(from)?;
    let (to_class, to_factor) = canonical_factor(to)?;
    if from_class != to_class {
        return None;
    }
    Some(from_factor / to_factor)
}

/// The canonical unit a known unit reduces to, for order-insensitive
/// number hashing and equality.
pub fn canonical_unit(unit: &str) -> &str {
    match canonical_factor(unit) {
        Some((UnitClass::Length, _)) => "px",
        Some((UnitClass::Angle, _)) => "deg",
        Some((UnitClass::Time, _)) => "ms",
        Some((UnitClass::Frequency, _)) => "Hz",
        Some((UnitClass::Resolution, _)) => "dpi",
        None => unit,
    }
}
