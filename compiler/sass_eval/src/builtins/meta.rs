//! The `sass:meta` module: reflection and `load-css`.

use sass_diagnostic::{Deprecation, SassError, SassResult};
use sass_ir::ListSeparator;
use sass_value::{inspect as inspect_value, SassMap, Value};

use crate::callable::Args;
use crate::evaluator::Evaluator;

/// `meta.load-css($url, $with: null)` — the only built-in mixin.
pub fn load_css(ev: &mut Evaluator, args: &mut Args) -> SassResult<()> {
    let url = args.get("url")?;
    let with = args.get_or("with", Value::Null);
    args.check_exhausted()?;
    let url = url.assert_string(Some("url"))?.text.clone();
    let config = match &with {
        Value::Null => None,
        other => Some(other.assert_map(Some("with"))?),
    };
    ev.load_css_into_output(&url, config, args.span)
}

pub fn type_of(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("value")?;
    args.check_exhausted()?;
    Ok(Value::unquoted_string(value.type_name()))
}

pub fn inspect(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("value")?;
    args.check_exhausted()?;
    Ok(Value::unquoted_string(inspect_value(&value)))
}

pub fn call(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let function = args.get("function")?;
    let (rest, named) = args.take_rest();
    let call_args = Args::new(
        rest,
        named,
        ListSeparator::Comma,
        args.span,
        true,
        false,
    )?;
    match &function {
        Value::Function(reference) => ev.apply_function_id(reference.id, call_args),
        Value::String(string) => {
            ev.warn_deprecation(
                Deprecation::CallString,
                format!(
                    "Passing a string to call() is deprecated; use call(get-function({})) instead.",
                    inspect_value(&function)
                ),
                args.span,
            );
            let id = ev.resolve_function(&string.text, None).ok_or_else(|| {
                SassError::runtime(format!("Function not found: {}", string.text), args.span)
            })?;
            ev.apply_function_id(id, call_args)
        }
        other => Err(sass_value::errors::wrong_type(
            other,
            "a function reference",
            Some("function"),
        )),
    }
}

pub fn get_function(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let name = args.get("name")?;
    let css = args.get_or("css", Value::bool(false));
    let module = args.get_or("module", Value::Null);
    args.check_exhausted()?;
    let name = name.assert_string(Some("name"))?.text.clone();
    if css.is_truthy() {
        // A plain-CSS function reference renders as a call.
        return Ok(Value::Function(sass_value::FunctionRef {
            id: ev.plain_css_function_id(&name),
            name,
        }));
    }
    let module = match &module {
        Value::Null => None,
        other => Some(other.assert_string(Some("module"))?.text.clone()),
    };
    let id = ev
        .resolve_function(&name, module.as_deref())
        .ok_or_else(|| SassError::runtime(format!("Function not found: {name}"), args.span))?;
    Ok(Value::Function(sass_value::FunctionRef { name, id }))
}

pub fn get_mixin(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let name = args.get("name")?;
    let module = args.get_or("module", Value::Null);
    args.check_exhausted()?;
    let name = name.assert_string(Some("name"))?.text.clone();
    let module = match &module {
        Value::Null => None,
        other => Some(other.assert_string(Some("module"))?.text.clone()),
    };
    let id = ev
        .resolve_mixin(&name, module.as_deref())
        .ok_or_else(|| SassError::runtime(format!("Mixin not found: {name}"), args.span))?;
    Ok(Value::Mixin(sass_value::MixinRef { name, id }))
}

pub fn keywords(_ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let value = args.get("args")?;
    args.check_exhausted()?;
    match &value {
        Value::ArgList(list) => {
            let entries = list
                .keywords()
                .iter()
                .map(|(name, value)| (Value::quoted_string(name.clone()), value.clone()))
                .collect();
            Ok(Value::Map(SassMap::new(entries)))
        }
        other => Err(sass_value::errors::wrong_type(
            other,
            "an argument list",
            Some("args"),
        )),
    }
}

pub fn module_variables(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let module = args.get("module")?;
    args.check_exhausted()?;
    let namespace = module.assert_string(Some("module"))?.text.clone();
    let module = ev.module_by_namespace(&namespace, args.span)?;
    let entries = sorted_entries(
        module
            .variables
            .iter()
            .map(|(name, value)| (name.clone(), value.clone())),
    );
    Ok(Value::Map(SassMap::new(entries)))
}

pub fn module_functions(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let module = args.get("module")?;
    args.check_exhausted()?;
    let namespace = module.assert_string(Some("module"))?.text.clone();
    let module = ev.module_by_namespace(&namespace, args.span)?;
    let entries = sorted_entries(module.functions.iter().map(|(name, id)| {
        (
            name.clone(),
            Value::Function(sass_value::FunctionRef {
                name: name.clone(),
                id: *id,
            }),
        )
    }));
    Ok(Value::Map(SassMap::new(entries)))
}

pub fn function_exists(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let name = args.get("name")?;
    let module = args.get_or("module", Value::Null);
    args.check_exhausted()?;
    let name = name.assert_string(Some("name"))?.text.clone();
    let module = match &module {
        Value::Null => None,
        other => Some(other.assert_string(Some("module"))?.text.clone()),
    };
    Ok(Value::bool(
        ev.resolve_function(&name, module.as_deref()).is_some(),
    ))
}

pub fn mixin_exists(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let name = args.get("name")?;
    let module = args.get_or("module", Value::Null);
    args.check_exhausted()?;
    let name = name.assert_string(Some("name"))?.text.clone();
    let module = match &module {
        Value::Null => None,
        other => Some(other.assert_string(Some("module"))?.text.clone()),
    };
    Ok(Value::bool(
        ev.resolve_mixin(&name, module.as_deref()).is_some(),
    ))
}

pub fn variable_exists(ev: &mut Evaluator, args: &mut Args) -> SassResult<Value> {
    let name = args.get("name")?;
    args.check_exhausted()?;
    let name = name.assert_string(Some("name"))?.text.clone();
    Ok(Value::bool(ev.variable_exists(&name)))
}

/// Deterministic iteration order for reflection maps.
fn sorted_entries(
    entries: impl Iterator<Item = (String, Value)>,
) -> Vec<(Value, Value)> {
    let mut collected: Vec<(String, Value)> = entries.collect();
    collected.sort_by(|(a, _), (b, _)| a.cmp(b));
    collected
        .into_iter()
        .map(|(name, value)| (Value::quoted_string(name), value))
        .collect()
}
