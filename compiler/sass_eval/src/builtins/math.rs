//! The `sass:math` module.

use sass_diagnostic::{SassError, SassResult};
use sass_value::{Number, Value};

use crate::callable::Args;
use crate::evaluator::Evaluator;

pub fn div(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let left = args.get("number1")?;
    let right = args.get("number2")?;
    args.check_exhausted()?;
    let left = left.assert_number(Some("number1"))?;
    let right = right.assert_number(Some("number2"))?;
    Ok(Value::Number(left.div(right)))
}

pub fn percentage(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("number")?;
    args.check_exhausted()?;
    let number = value.assert_number(Some("number"))?;
    if number.has_units() {
        return Err(SassError::no_span(format!(
            "$number: Expected {number} to have no units."
        )));
    }
    Ok(Value::Number(Number::with_unit(number.value * 100.0, "%")))
}

pub fn round(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    unary_math(args, f64::round)
}

pub fn ceil(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    unary_math(args, f64::ceil)
}

pub fn floor(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    unary_math(args, f64::floor)
}

pub fn abs(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    unary_math(args, f64::abs)
}

pub fn min(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    extremum(args, std::cmp::Ordering::Less)
}

pub fn max(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    extremum(args, std::cmp::Ordering::Greater)
}

pub fn unit(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("number")?;
    args.check_exhausted()?;
    let number = value.assert_number(Some("number"))?;
    Ok(Value::quoted_string(number.unit_string()))
}

pub fn is_unitless(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("number")?;
    args.check_exhausted()?;
    Ok(Value::bool(
        value.assert_number(Some("number"))?.is_unitless(),
    ))
}

pub fn compatible(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let left = args.get("number1")?;
    let right = args.get("number2")?;
    args.check_exhausted()?;
    let left = left.assert_number(Some("number1"))?;
    let right = right.assert_number(Some("number2"))?;
    Ok(Value::bool(left.is_compatible_with(right)))
}

fn unary_math(args: &mut Args, f: fn(f64) -> f64) -> SassResult<Value> {
    let value = args.get("number")?;
    args.check_exhausted()?;
    let number = value.assert_number(Some("number"))?;
    Ok(Value::Number(Number::with_units(
        f(number.value),
        number.numerator_units().iter().cloned().collect(),
        number.denominator_units().iter().cloned().collect(),
    )))
}

fn extremum(args: &mut Args, keep: std::cmp::Ordering) -> SassResult<Value> {
    let (values, named) = args.take_rest();
    if let Some(name) = named.keys().next() {
        return Err(SassError::runtime(
            format!("No argument named ${name}."),
            args.span,
        ));
    }
    if values.is_empty() {
        return Err(SassError::runtime(
            "At least one argument must be passed.",
            args.span,
        ));
    }
    let mut best: Option<Number> = None;
    for value in &values {
        let number = value.assert_number(None)?;
        best = Some(match best {
            None => number.clone(),
            Some(current) => {
                if number.compare(&current)? == keep {
                    number.clone()
                } else {
                    current
                }
            }
        });
    }
    match best {
        Some(number) => Ok(Value::Number(number)),
        None => Err(SassError::runtime(
            "At least one argument must be passed.",
            args.span,
        )),
    }
}

/// Module-level constants.
pub fn variables() -> Vec<(&'static str, Value)> {
    vec![
        ("pi", Value::number(std::f64::consts::PI)),
        ("e", Value::number(std::f64::consts::E)),
    ]
}
