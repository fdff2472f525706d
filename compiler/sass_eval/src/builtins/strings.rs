//! The `sass:string` module.
//!
//! Indexes here are sass-indexes over characters, 1-based with negative
//! wrap-around, like list indexes.

use sass_diagnostic::SassResult;
use sass_value::{SassString, Value};

use crate::callable::Args;
use crate::evaluator::Evaluator;

pub fn quote(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    Ok(Value::quoted_string(string.text.clone()))
}

pub fn unquote(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    Ok(Value::unquoted_string(string.text.clone()))
}

pub fn length(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    Ok(Value::number(string.text.chars().count() as f64))
}

pub fn insert(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    let insert = args.get("insert")?;
    let index = args.get("index")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    let insert = insert.assert_string(Some("insert"))?;
    let number = index.assert_number(Some("index"))?;
    let chars: Vec<char> = string.text.chars().collect();

    // Insertion points range one past both ends; negative counts from
    // the back, with -1 meaning "after the last character".
    let int = number.as_int().ok_or_else(|| {
        sass_value::errors::named(Some("index"), format!("{number} is not an int."))
    })?;
    let position = if int > 0 {
        ((int - 1) as usize).min(chars.len())
    } else if int == 0 {
        0
    } else {
        let back = int.unsigned_abs() as usize - 1;
        chars.len().saturating_sub(back)
    };

    let mut text: String = chars[..position].iter().collect();
    text.push_str(&insert.text);
    text.extend(&chars[position..]);
    Ok(Value::String(SassString {
        text,
        quoted: string.quoted,
    }))
}

pub fn index(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    let substring = args.get("substring")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    let substring = substring.assert_string(Some("substring"))?;
    match string.text.find(&substring.text) {
        Some(byte_idx) => {
            let char_idx = string.text[..byte_idx].chars().count();
            Ok(Value::number(char_idx as f64 + 1.0))
        }
        None => Ok(Value::Null),
    }
}

pub fn slice(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("string")?;
    let start = args.get("start-at")?;
    let end = args.get_or("end-at", Value::number(-1.0));
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    let chars: Vec<char> = string.text.chars().collect();
    let len = chars.len() as i64;

    let start = start
        .assert_number(Some("start-at"))?
        .as_int()
        .ok_or_else(|| sass_value::errors::named(Some("start-at"), "is not an int.".to_string()))?;
    let end = end
        .assert_number(Some("end-at"))?
        .as_int()
        .ok_or_else(|| sass_value::errors::named(Some("end-at"), "is not an int.".to_string()))?;

    // Clamp both bounds into range instead of erroring, matching the
    // forgiving slice semantics.
    let resolve = |idx: i64, default_for_zero: i64| -> i64 {
        if idx == 0 {
            default_for_zero
        } else if idx < 0 {
            (len + idx + 1).max(1)
        } else {
            idx.min(len)
        }
    };
    let start = resolve(start, 1);
    let end = resolve(end, 0);
    if end < start || len == 0 {
        return Ok(Value::String(SassString {
            text: String::new(),
            quoted: string.quoted,
        }));
    }
    let text: String = chars[(start - 1) as usize..end as usize].iter().collect();
    Ok(Value::String(SassString {
        text,
        quoted: string.quoted,
    }))
}

pub fn to_upper_case(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    case_map(args, |text| text.to_ascii_uppercase())
}

pub fn to_lower_case(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    case_map(args, |text| text.to_ascii_lowercase())
}

fn case_map(args: &mut Args, f: fn(&str) -> String) -> SassResult<Value> {
    let value = args.get("string")?;
    args.check_exhausted()?;
    let string = value.assert_string(Some("string"))?;
    Ok(Value::String(SassString {
        text: f(&string.text),
        quoted: string.quoted,
    }))
}
