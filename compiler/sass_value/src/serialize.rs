//! Value serialization: CSS output and `inspect` debugging output.
//!
//! `to_css` is the strict form used when a value lands in a stylesheet:
//! nulls, maps, and function references are errors there. `inspect`
//! never fails and is what `meta.inspect`, `@debug`, and error messages
//! use.

use sass_ir::ListSeparator;

use sass_diagnostic::SassResult;

use crate::errors;
use crate::number::{format_double, Number};
use crate::value::{CalcArg, Calculation, SassList, Value};

/// Serialize a value for CSS output.
pub fn to_css(value: &Value, compressed: bool) -> SassResult<String> {
    let mut out = String::new();
    write_css(value, &mut out, compressed)?;
    Ok(out)
}

/// Serialize a value for CSS output into a buffer.
pub fn write_css(value: &Value, out: &mut String, compressed: bool) -> SassResult<()> {
    match value {
        Value::Null => Err(errors::not_a_css_value(value)),
        Value::Bool(b) => {
            out.push_str(if *b { "true" } else { "false" });
            Ok(())
        }
        Value::Number(number) => write_number(number, out, compressed),
        Value::Color(color) => {
            color.write_css(out, compressed);
            Ok(())
        }
        Value::String(string) => {
            if string.quoted {
                write_quoted(&string.text, out);
            } else {
                out.push_str(&string.text);
            }
            Ok(())
        }
        Value::List(list) => write_list(list, out, compressed),
        Value::ArgList(args) => write_list(
            &SassList::new(args.elements().to_vec(), args.separator(), false),
            out,
            compressed,
        ),
        Value::Calculation(calc) => {
            write_calculation(calc, out, compressed);
            Ok(())
        }
        Value::Map(_) | Value::Function(_) | Value::Mixin(_) => {
            Err(errors::not_a_css_value(value))
        }
    }
}

/// Serialize a value for debugging; never fails.
pub fn inspect(value: &Value) -> String {
    let mut out = String::new();
    write_inspect(value, &mut out);
    out
}

fn write_inspect(value: &Value, out: &mut String) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Bool(b) => out.push_str(if *b { "true" } else { "false" }),
        Value::Number(number) => {
            out.push_str(&format_double(number.value, false));
            out.push_str(&number.unit_string());
        }
        Value::Color(color) => color.write_css(out, false),
        Value::String(string) => {
            if string.quoted {
                write_quoted(&string.text, out);
            } else {
                out.push_str(&string.text);
            }
        }
        Value::List(list) => {
            if list.is_empty() && !list.is_bracketed() {
                out.push_str("()");
                return;
            }
            // A single-element comma list is only distinguishable as
            // `(1,)`, parens and trailing comma included.
            let lone_comma = list.len() == 1 && list.separator() == ListSeparator::Comma;
            let (open, close) = if list.is_bracketed() {
                ("[", "]")
            } else if lone_comma {
                ("(", ")")
            } else {
                ("", "")
            };
            out.push_str(open);
            for (idx, element) in list.elements().iter().enumerate() {
                if idx > 0 {
                    out.push_str(list.separator().as_css());
                }
                write_inspect(element, out);
            }
            if lone_comma {
                out.push(',');
            }
            out.push_str(close);
        }
        Value::ArgList(args) => {
            let list = SassList::new(args.elements().to_vec(), args.separator(), false);
            write_inspect(&Value::List(list), out);
        }
        Value::Map(map) => {
            out.push('(');
            for (idx, (key, value)) in map.entries().iter().enumerate() {
                if idx > 0 {
                    out.push_str(", ");
                }
                write_inspect(key, out);
                out.push_str(": ");
                write_inspect(value, out);
            }
            out.push(')');
        }
        Value::Calculation(calc) => write_calculation(calc, out, false),
        Value::Function(function) => {
            out.push_str(&format!("get-function(\"{}\")", function.name));
        }
        Value::Mixin(mixin) => {
            out.push_str(&format!("get-mixin(\"{}\")", mixin.name));
        }
    }
}

fn write_number(number: &Number, out: &mut String, compressed: bool) -> SassResult<()> {
    if let Some((left, right)) = number.as_slash() {
        write_number(left, out, compressed)?;
        out.push('/');
        return write_number(right, out, compressed);
    }
    if number.numerator_units().len() > 1 || !number.denominator_units().is_empty() {
        return Err(errors::not_a_css_value(&Value::Number(number.clone())));
    }
    out.push_str(&format_double(number.value, compressed));
    out.push_str(&number.unit_string());
    Ok(())
}

fn write_list(list: &SassList, out: &mut String, compressed: bool) -> SassResult<()> {
    if list.is_empty() && !list.is_bracketed() {
        return Err(errors::not_a_css_value(&Value::List(list.clone())));
    }
    let separator = match (list.separator(), compressed) {
        (ListSeparator::Comma, true) => ",",
        (ListSeparator::Slash, true) => "/",
        (sep, _) => sep.as_css(),
    };
    if list.is_bracketed() {
        out.push('[');
    }
    let mut first = true;
    for element in list.elements() {
        // Nulls vanish from CSS list output.
        if matches!(element, Value::Null) {
            continue;
        }
        if !first {
            out.push_str(separator);
        }
        first = false;
        write_css(element, out, compressed)?;
    }
    if list.is_bracketed() {
        out.push(']');
    }
    Ok(())
}

fn write_calculation(calc: &Calculation, out: &mut String, compressed: bool) {
    out.push_str(calc.name());
    out.push('(');
    for (idx, arg) in calc.args().iter().enumerate() {
        if idx > 0 {
            out.push_str(if compressed { "," } else { ", " });
        }
        write_calc_arg(arg, out, compressed);
    }
    out.push(')');
}

fn write_calc_arg(arg: &CalcArg, out: &mut String, compressed: bool) {
    match arg {
        CalcArg::Number(number) => {
            out.push_str(&format_double(number.value, compressed));
            out.push_str(&number.unit_string());
        }
        CalcArg::Text(text) => out.push_str(text),
        CalcArg::Operation { lhs, op, rhs } => {
            write_calc_arg(lhs, out, compressed);
            if compressed && (*op == "*" || *op == "/") {
                out.push_str(op);
            } else {
                out.push(' ');
                out.push_str(op);
                out.push(' ');
            }
            write_calc_arg(rhs, out, compressed);
        }
        CalcArg::Calc(nested) => write_calculation(nested, out, compressed),
    }
}

/// Quote a string, preferring double quotes, switching to single quotes
/// when the text contains a double quote but no single quote.
fn write_quoted(text: &str, out: &mut String) {
    let quote = if text.contains('"') && !text.contains('\'') {
        '\''
    } else {
        '"'
    };
    out.push(quote);
    for ch in text.chars() {
        if ch == quote || ch == '\\' {
            out.push('\\');
        }
        out.push(ch);
    }
    out.push(quote);
}
