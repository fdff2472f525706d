//! The `sass:list` module.

use sass_diagnostic::{SassError, SassResult};
use sass_ir::ListSeparator;
use sass_value::{SassList, Value};

use crate::callable::Args;
use crate::evaluator::Evaluator;

pub fn length(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    args.check_exhausted()?;
    Ok(Value::number(list.list_length() as f64))
}

pub fn nth(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    let index = args.get("n")?;
    args.check_exhausted()?;
    ev.warn_united_index(&index, "n", args.span);
    let elements = list.as_list();
    let idx = Value::sass_index_to_list_index(&index, elements.len(), Some("n"))?;
    Ok(elements[idx].clone())
}

pub fn set_nth(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    let index = args.get("n")?;
    let value = args.get("value")?;
    args.check_exhausted()?;
    ev.warn_united_index(&index, "n", args.span);
    let mut elements = list.as_list();
    let idx = Value::sass_index_to_list_index(&index, elements.len(), Some("n"))?;
    elements[idx] = value;
    Ok(Value::List(SassList::new(
        elements,
        resolved_separator(&list),
        list.has_brackets(),
    )))
}

pub fn join(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list1 = args.get("list1")?;
    let list2 = args.get("list2")?;
    let separator = args.get_or("separator", Value::unquoted_string("auto"));
    let bracketed = args.get_or("bracketed", Value::unquoted_string("auto"));
    args.check_exhausted()?;

    let separator = match separator_choice(&separator)? {
        Some(sep) => sep,
        None => {
            if list1.separator() != ListSeparator::Undecided || list1.list_length() > 1 {
                resolved_separator(&list1)
            } else if list2.separator() != ListSeparator::Undecided || list2.list_length() > 1 {
                resolved_separator(&list2)
            } else {
                ListSeparator::Space
            }
        }
    };
    let bracketed = match &bracketed {
        Value::String(s) if !s.quoted && s.text == "auto" => list1.has_brackets(),
        other => other.is_truthy(),
    };

    let mut elements = list1.as_list();
    elements.extend(list2.as_list());
    Ok(Value::List(SassList::new(elements, separator, bracketed)))
}

pub fn append(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    let value = args.get("val")?;
    let separator = args.get_or("separator", Value::unquoted_string("auto"));
    args.check_exhausted()?;

    let separator = match separator_choice(&separator)? {
        Some(sep) => sep,
        None => resolved_separator(&list),
    };
    let mut elements = list.as_list();
    elements.push(value);
    Ok(Value::List(SassList::new(
        elements,
        separator,
        list.has_brackets(),
    )))
}

pub fn index(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    let value = args.get("value")?;
    args.check_exhausted()?;
    let found = list
        .as_list()
        .iter()
        .position(|element| *element == value)
        .map(|idx| Value::number(idx as f64 + 1.0))
        .unwrap_or(Value::Null);
    Ok(found)
}

pub fn separator(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    args.check_exhausted()?;
    let name = match list.separator() {
        ListSeparator::Comma => "comma",
        ListSeparator::Slash => "slash",
        ListSeparator::Space | ListSeparator::Undecided => "space",
    };
    Ok(Value::unquoted_string(name))
}

pub fn is_bracketed(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let list = args.get("list")?;
    args.check_exhausted()?;
    Ok(Value::bool(list.has_brackets()))
}

pub fn zip(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let (lists, named) = args.take_rest();
    if let Some(name) = named.keys().next() {
        return Err(SassError::runtime(
            format!("No argument named ${name}."),
            args.span,
        ));
    }
    let lists: Vec<Vec<Value>> = lists.iter().map(Value::as_list).collect();
    let shortest = lists.iter().map(Vec::len).min().unwrap_or(0);
    let zipped = (0..shortest)
        .map(|idx| {
            Value::List(SassList::new(
                lists.iter().map(|list| list[idx].clone()).collect(),
                ListSeparator::Space,
                false,
            ))
        })
        .collect();
    Ok(Value::list(zipped, ListSeparator::Comma))
}

/// A concrete separator for a value, space when unobservable.
fn resolved_separator(value: &Value) -> ListSeparator {
    match value.separator() {
        ListSeparator::Undecided => ListSeparator::Space,
        sep => sep,
    }
}

/// Map the `$separator` argument to a separator; `auto` is `None`.
fn separator_choice(value: &Value) -> SassResult<Option<ListSeparator>> {
    let text = match value {
        Value::String(string) => string.text.as_str(),
        _ => {
            return Err(sass_value::errors::wrong_type(
                value,
                "a valid separator name",
                Some("separator"),
            ))
        }
    };
    match text {
        "auto" => Ok(None),
        "comma" => Ok(Some(ListSeparator::Comma)),
        "space" => Ok(Some(ListSeparator::Space)),
        "slash" => Ok(Some(ListSeparator::Slash)),
        _ => Err(SassError::no_span(format!(
            "$separator: Must be \"space\", \"comma\", \"slash\", or \"auto\", was \"{text}\"."
        ))),
    }
}
