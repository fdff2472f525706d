//! Binary and unary operator dispatch.
//!
//! The value set is closed, so operators dispatch through one exhaustive
//! match instead of trait objects. Non-numeric combinations fall back to
//! the lexical string rules; calculations refuse arithmetic outright.

use std::cmp::Ordering;

use sass_ir::BinaryOp;
use sass_ir::UnaryOp;

use sass_diagnostic::SassResult;

use crate::errors;
use crate::serialize::{to_css, write_css};
use crate::value::{SassString, Value};
use crate::Number;

/// Evaluate a binary operation.
///
/// `or` and `and` are short-circuited by the evaluator before reaching
/// here; the non-lazy fallbacks below match their semantics for direct
/// callers.
pub fn evaluate_binary(op: BinaryOp, left: Value, right: Value) -> SassResult<Value> {
    match op {
        BinaryOp::Or => Ok(if left.is_truthy() { left } else { right }),
        BinaryOp::And => Ok(if left.is_truthy() { right } else { left }),
        BinaryOp::Eq => Ok(Value::bool(left == right)),
        BinaryOp::Ne => Ok(Value::bool(left != right)),
        BinaryOp::Lt => compare(op, &left, &right, |ord| ord == Ordering::Less),
        BinaryOp::Le => compare(op, &left, &right, |ord| ord != Ordering::Greater),
        BinaryOp::Gt => compare(op, &left, &right, |ord| ord == Ordering::Greater),
        BinaryOp::Ge => compare(op, &left, &right, |ord| ord != Ordering::Less),
        BinaryOp::Plus => plus(left, right),
        BinaryOp::Minus => minus(left, right),
        BinaryOp::Times => times(left, right),
        BinaryOp::Div => divide(left, right),
        BinaryOp::Mod => modulo(left, right),
    }
}

/// Evaluate a unary operation.
pub fn evaluate_unary(op: UnaryOp, operand: Value) -> SassResult<Value> {
    match (op, operand) {
        (UnaryOp::Not, operand) => Ok(Value::bool(!operand.is_truthy())),
        (UnaryOp::Plus, Value::Number(number)) => Ok(Value::Number(number.without_slash())),
        (UnaryOp::Minus, Value::Number(number)) => {
            let negated = Number::with_units(
                -number.value,
                number.numerator_units().iter().cloned().collect(),
                number.denominator_units().iter().cloned().collect(),
            );
            Ok(Value::Number(negated))
        }
        (UnaryOp::Plus, operand) => lexical_prefix("+", &operand),
        (UnaryOp::Minus, operand) => lexical_prefix("-", &operand),
        (UnaryOp::Div, operand) => lexical_prefix("/", &operand),
    }
}

fn compare(
    op: BinaryOp,
    left: &Value,
    right: &Value,
    test: impl Fn(Ordering) -> bool,
) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::bool(test(a.compare(b)?))),
        _ => Err(errors::undefined_operation(left, op.as_str(), right)),
    }
}

fn plus(left: Value, right: Value) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.add(&b)?)),
        (Value::Calculation(_), _) | (_, Value::Calculation(_)) => {
            Err(errors::calculation_arithmetic("+"))
        }
        (Value::String(string), right) => {
            let mut text = string.text;
            text.push_str(&stringify_operand(&right)?);
            Ok(Value::String(SassString {
                text,
                quoted: string.quoted,
            }))
        }
        (left, Value::String(string)) => {
            let mut text = stringify_operand(&left)?;
            text.push_str(&string.text);
            // The left operand decides quoting, and it is not a string.
            Ok(Value::unquoted_string(text))
        }
        (left, right) => {
            let mut text = stringify_operand(&left)?;
            text.push_str(&stringify_operand(&right)?);
            Ok(Value::unquoted_string(text))
        }
    }
}

fn minus(left: Value, right: Value) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.sub(&b)?)),
        (Value::Calculation(_), _) | (_, Value::Calculation(_)) => {
            Err(errors::calculation_arithmetic("-"))
        }
        (left, right) => {
            let text = format!(
                "{}-{}",
                stringify_operand(&left)?,
                stringify_operand(&right)?
            );
            Ok(Value::unquoted_string(text))
        }
    }
}

fn times(left: Value, right: Value) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.mul(&b))),
        (left, right) => Err(errors::undefined_operation(&left, "*", &right)),
    }
}

/// Slash division. The numeric result keeps its operands so the slash
/// form can serialize back out; the evaluator decides whether to warn
/// about the deprecated division reading.
fn divide(left: Value, right: Value) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => {
            let quotient = a.div(&b);
            Ok(Value::Number(quotient.with_slash(a, b)))
        }
        (Value::Calculation(_), _) | (_, Value::Calculation(_)) => {
            Err(errors::calculation_arithmetic("/"))
        }
        (left, right) => {
            let text = format!(
                "{}/{}",
                stringify_operand(&left)?,
                stringify_operand(&right)?
            );
            Ok(Value::unquoted_string(text))
        }
    }
}

fn modulo(left: Value, right: Value) -> SassResult<Value> {
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a.rem(&b)?)),
        (left, right) => Err(errors::undefined_operation(&left, "%", &right)),
    }
}

fn lexical_prefix(op: &str, operand: &Value) -> SassResult<Value> {
    let mut text = String::from(op);
    write_css(operand, &mut text, false)
        .map_err(|_| errors::undefined_unary(op, operand))?;
    Ok(Value::unquoted_string(text))
}

/// Serialize an operand for the string fallbacks. Null contributes
/// nothing; values with no CSS form keep their usual error.
fn stringify_operand(value: &Value) -> SassResult<String> {
    match value {
        Value::Null => Ok(String::new()),
        other => to_css(other, false),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::value::SassMap;
    use crate::SassList;
    use sass_ir::ListSeparator;
    use pretty_assertions::assert_eq;

    fn px(v: f64) -> Value {
        Value::Number(Number::with_unit(v, "px"))
    }

    fn unquoted(text: &str) -> Value {
        Value::unquoted_string(text)
    }

    #[test]
    fn test_plus_numbers() {
        let result = evaluate_binary(BinaryOp::Plus, px(1.0), px(2.0)).unwrap();
        assert_eq!(result, px(3.0));
    }

    #[test]
    fn test_plus_string_keeps_left_quoting() {
        let quoted = evaluate_binary(BinaryOp::Plus, Value::quoted_string("a"), px(1.0)).unwrap();
        match &quoted {
            Value::String(s) => {
                assert_eq!(s.text, "a1px");
                assert!(s.quoted);
            }
            other => panic!("expected string, got {other:?}"),
        }

        let unq = evaluate_binary(BinaryOp::Plus, px(1.0), Value::quoted_string("a")).unwrap();
        match &unq {
            Value::String(s) => {
                assert_eq!(s.text, "1pxa");
                assert!(!s.quoted);
            }
            other => panic!("expected string, got {other:?}"),
        }
    }

    #[test]
    fn test_plus_stringifies_other_combinations() {
        let result =
            evaluate_binary(BinaryOp::Plus, Value::bool(true), Value::bool(false)).unwrap();
        assert_eq!(result, unquoted("truefalse"));
    }

    #[test]
    fn test_minus_lexical() {
        let result = evaluate_binary(BinaryOp::Minus, unquoted("a"), unquoted("b")).unwrap();
        assert_eq!(result, unquoted("a-b"));
    }

    #[test]
    fn test_times_rejects_non_numbers() {
        let err = evaluate_binary(BinaryOp::Times, unquoted("a"), px(1.0)).unwrap_err();
        assert!(err.message.contains("Undefined operation"));
    }

    #[test]
    fn test_calculation_arithmetic_is_an_error() {
        let calc = Value::Calculation(crate::Calculation::new(
            "calc",
            vec![crate::CalcArg::Text("100% - 10px".to_string())],
        ));
        assert!(evaluate_binary(BinaryOp::Plus, calc.clone(), px(1.0)).is_err());
        assert!(evaluate_binary(BinaryOp::Minus, px(1.0), calc).is_err());
    }

    #[test]
    fn test_divide_marks_slash() {
        let result = evaluate_binary(BinaryOp::Div, px(12.0), px(30.0)).unwrap();
        match result {
            Value::Number(number) => {
                assert!(number.as_slash().is_some());
                assert!(number.is_unitless());
            }
            other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_divide_non_numbers_is_lexical() {
        let result = evaluate_binary(BinaryOp::Div, unquoted("a"), unquoted("b")).unwrap();
        assert_eq!(result, unquoted("a/b"));
    }

    #[test]
    fn test_comparisons_need_compatible_units() {
        let result = evaluate_binary(BinaryOp::Lt, px(1.0), px(2.0)).unwrap();
        assert_eq!(result, Value::bool(true));

        let err = evaluate_binary(
            BinaryOp::Lt,
            px(1.0),
            Value::Number(Number::with_unit(1.0, "s")),
        )
        .unwrap_err();
        assert!(err.message.contains("Incompatible units"));

        assert!(evaluate_binary(BinaryOp::Ge, unquoted("a"), px(1.0)).is_err());
    }

    #[test]
    fn test_equality_dispatch() {
        assert_eq!(
            evaluate_binary(
                BinaryOp::Eq,
                Value::list(vec![], ListSeparator::Undecided),
                Value::Map(SassMap::empty()),
            )
            .unwrap(),
            Value::bool(true)
        );
        assert_eq!(
            evaluate_binary(BinaryOp::Ne, px(1.0), px(2.0)).unwrap(),
            Value::bool(true)
        );
    }

    #[test]
    fn test_unary_on_numbers() {
        assert_eq!(evaluate_unary(UnaryOp::Minus, px(3.0)).unwrap(), px(-3.0));
        assert_eq!(evaluate_unary(UnaryOp::Plus, px(3.0)).unwrap(), px(3.0));
    }

    #[test]
    fn test_unary_lexical_prefix() {
        assert_eq!(
            evaluate_unary(UnaryOp::Minus, unquoted("a")).unwrap(),
            unquoted("-a")
        );
        assert_eq!(
            evaluate_unary(UnaryOp::Div, unquoted("a")).unwrap(),
            unquoted("/a")
        );
    }

    #[test]
    fn test_not_negates_truthiness() {
        assert_eq!(
            evaluate_unary(UnaryOp::Not, Value::Null).unwrap(),
            Value::bool(true)
        );
        assert_eq!(
            evaluate_unary(UnaryOp::Not, px(0.0)).unwrap(),
            Value::bool(false)
        );
    }

    #[test]
    fn test_nested_slash_list() {
        let list = Value::List(SassList::new(
            vec![px(1.0), px(2.0)],
            ListSeparator::Slash,
            false,
        ));
        assert_eq!(
            crate::serialize::to_css(&list, false).unwrap(),
            "1px / 2px"
        );
    }
}
