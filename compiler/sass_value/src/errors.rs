//! Centralized error constructors for the value algebra.
//!
//! Every user-visible message produced by values and operators is built
//! here, so wording stays in one place. Errors leave this crate without
//! spans; the evaluator attaches the span of the expression it was
//! evaluating.

use sass_diagnostic::SassError;

use crate::serialize::inspect;
use crate::Value;

/// Prefix a message with the argument name it concerns: `$list: ...`.
pub fn named(name: Option<&str>, message: String) -> SassError {
    match name {
        Some(name) => SassError::no_span(format!("${name}: {message}")),
        None => SassError::no_span(message),
    }
}

/// A typed-assertion failure: `$x: 3px is not a string.`
pub fn wrong_type(value: &Value, expected: &str, name: Option<&str>) -> SassError {
    named(name, format!("{} is not {expected}.", inspect(value)))
}

/// An undefined binary operation: `Undefined operation "1px * a".`
pub fn undefined_operation(left: &Value, op: &str, right: &Value) -> SassError {
    SassError::no_span(format!(
        "Undefined operation \"{} {op} {}\".",
        inspect(left),
        inspect(right)
    ))
}

/// An undefined unary operation: `Undefined operation "not #fff".`
pub fn undefined_unary(op: &str, operand: &Value) -> SassError {
    SassError::no_span(format!("Undefined operation \"{op}{}\".", inspect(operand)))
}

/// Calculations refuse ordinary arithmetic.
pub fn calculation_arithmetic(op: &str) -> SassError {
    SassError::no_span(format!(
        "The operator \"{op}\" is not supported for calculations; use math functions instead."
    ))
}

/// A value that cannot appear in CSS output.
pub fn not_a_css_value(value: &Value) -> SassError {
    SassError::no_span(format!("{} isn't a valid CSS value.", inspect(value)))
}
