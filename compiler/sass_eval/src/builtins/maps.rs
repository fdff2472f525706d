//! The `sass:map` module.

use sass_diagnostic::SassResult;
use sass_ir::ListSeparator;
use sass_value::Value;

use crate::callable::Args;
use crate::evaluator::Evaluator;

pub fn get(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    let key = args.get("key")?;
    let (rest, _named) = args.take_rest();

    let mut current = match map.get(&key) {
        Some(value) => value.clone(),
        None => return Ok(Value::Null),
    };
    for key in rest {
        let nested = match current.assert_map(None) {
            Ok(nested) => nested,
            Err(_) => return Ok(Value::Null),
        };
        current = match nested.get(&key) {
            Some(value) => value.clone(),
            None => return Ok(Value::Null),
        };
    }
    Ok(current)
}

pub fn has_key(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    let key = args.get("key")?;
    args.check_exhausted()?;
    Ok(Value::bool(map.contains_key(&key)))
}

pub fn merge(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map1 = args.get("map1")?.assert_map(Some("map1"))?;
    let map2 = args.get("map2")?.assert_map(Some("map2"))?;
    args.check_exhausted()?;
    let mut merged = map1;
    for (key, value) in map2.entries() {
        merged = merged.inserted(key.clone(), value.clone());
    }
    Ok(Value::Map(merged))
}

pub fn remove(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    let (keys, _named) = args.take_rest();
    let mut result = map;
    for key in &keys {
        result = result.removed(key);
    }
    Ok(Value::Map(result))
}

pub fn keys(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    args.check_exhausted()?;
    Ok(Value::list(
        map.entries().iter().map(|(key, _)| key.clone()).collect(),
        ListSeparator::Comma,
    ))
}

pub fn values(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    args.check_exhausted()?;
    Ok(Value::list(
        map.entries()
            .iter()
            .map(|(_, value)| value.clone())
            .collect(),
        ListSeparator::Comma,
    ))
}

pub fn set(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let map = args.get("map")?.assert_map(Some("map"))?;
    let key = args.get("key")?;
    let value = args.get("value")?;
    args.check_exhausted()?;
    Ok(Value::Map(map.inserted(key, value)))
}
