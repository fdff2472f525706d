//! The SassScript value variants.
//!
//! `Value` is a closed sum: the language's type set is fixed, so
//! behavior dispatches by exhaustive pattern match rather than trait
//! objects. Heavy payloads (list elements, map entries) sit behind `Arc`
//! so cloning a value is cheap; every value is immutable once built.

mod calculation;
mod list;
mod map;

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use rustc_hash::FxHasher;
use sass_ir::ListSeparator;

use sass_diagnostic::SassResult;

use crate::errors;
use crate::{Color, Number};

pub use calculation::{CalcArg, Calculation};
pub use list::{separators_match, SassList};
pub use map::SassMap;

/// A Sass string: text plus whether it is quoted.
#[derive(Clone, Debug)]
pub struct SassString {
    pub text: String,
    pub quoted: bool,
}

impl SassString {
    pub fn quoted(text: impl Into<String>) -> Self {
        SassString {
            text: text.into(),
            quoted: true,
        }
    }

    pub fn unquoted(text: impl Into<String>) -> Self {
        SassString {
            text: text.into(),
            quoted: false,
        }
    }

    /// Whether this is an unquoted CSS function call that shadowed
    /// built-ins must treat as numeric: `calc(...)`, `var(...)`,
    /// `env(...)`, `min(...)`, `max(...)`, `clamp(...)`.
    pub fn is_special_number(&self) -> bool {
        if self.quoted {
            return false;
        }
        let lower = self.text.to_ascii_lowercase();
        ["calc(", "var(", "env(", "min(", "max(", "clamp("]
            .iter()
            .any(|prefix| lower.starts_with(prefix))
    }
}

/// An opaque reference to a function definition.
///
/// The evaluator owns the definition in a per-compilation arena; values
/// carry only the index, so the value algebra stays free of evaluator
/// back-pointers.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionRef {
    pub name: String,
    pub id: u32,
}

/// An opaque reference to a mixin definition.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MixinRef {
    pub name: String,
    pub id: u32,
}

/// A rest-argument list: list elements plus trailing keywords.
#[derive(Clone, Debug)]
pub struct ArgList {
    elements: Arc<Vec<Value>>,
    separator: ListSeparator,
    keywords: Arc<Vec<(String, Value)>>,
}

impl ArgList {
    pub fn new(
        elements: Vec<Value>,
        separator: ListSeparator,
        keywords: Vec<(String, Value)>,
    ) -> Self {
        ArgList {
            elements: Arc::new(elements),
            separator,
            keywords: Arc::new(keywords),
        }
    }

    #[inline]
    pub fn elements(&self) -> &[Value] {
        &self.elements
    }

    #[inline]
    pub fn separator(&self) -> ListSeparator {
        self.separator
    }

    #[inline]
    pub fn keywords(&self) -> &[(String, Value)] {
        &self.keywords
    }
}

/// A SassScript value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The single null inhabitant; falsy.
    Null,
    /// `true` / `false`; only `false` and `Null` are falsy.
    Bool(bool),
    Number(Number),
    Color(Color),
    String(SassString),
    List(SassList),
    Map(SassMap),
    Calculation(Calculation),
    Function(FunctionRef),
    Mixin(MixinRef),
    ArgList(ArgList),
}

// Factory methods

impl Value {
    pub const TRUE: Value = Value::Bool(true);
    pub const FALSE: Value = Value::Bool(false);

    /// A unitless number.
    #[inline]
    pub fn number(value: f64) -> Self {
        Value::Number(Number::unitless(value))
    }

    /// A quoted string.
    #[inline]
    pub fn quoted_string(text: impl Into<String>) -> Self {
        Value::String(SassString::quoted(text))
    }

    /// An unquoted string.
    #[inline]
    pub fn unquoted_string(text: impl Into<String>) -> Self {
        Value::String(SassString::unquoted(text))
    }

    /// A bool as a value.
    #[inline]
    pub fn bool(value: bool) -> Self {
        Value::Bool(value)
    }

    /// An unbracketed list.
    #[inline]
    pub fn list(elements: Vec<Value>, separator: ListSeparator) -> Self {
        Value::List(SassList::new(elements, separator, false))
    }
}

// Classification

impl Value {
    /// The user-facing type name, as reported by `meta.type-of` and used
    /// in assertion errors.
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::Color(_) => "color",
            Value::String(_) => "string",
            Value::Map(_) => "map",
            Value::Calculation(_) => "calculation",
            Value::Function(_) => "function",
            Value::Mixin(_) => "mixin",
            Value::List(_) | Value::ArgList(_) => "list",
        }
    }

    /// Everything except `false` and `null` is truthy.
    #[inline]
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Value::Null | Value::Bool(false))
    }

    /// The value viewed as a list: lists are themselves, a map is its
    /// pair list, anything else is a single-element list.
    pub fn as_list(&self) -> Vec<Value> {
        match self {
            Value::List(list) => list.elements().to_vec(),
            Value::ArgList(args) => args.elements().to_vec(),
            Value::Map(map) => map.as_pair_values(),
            other => vec![other.clone()],
        }
    }

    /// The separator this value reports from `list.separator`.
    pub fn separator(&self) -> ListSeparator {
        match self {
            Value::List(list) => list.separator(),
            Value::ArgList(args) => args.separator(),
            Value::Map(_) => ListSeparator::Comma,
            _ => ListSeparator::Space,
        }
    }

    /// Whether `list.is-bracketed` reports true.
    pub fn has_brackets(&self) -> bool {
        matches!(self, Value::List(list) if list.is_bracketed())
    }

    /// The length this value reports from `list.length`.
    pub fn list_length(&self) -> usize {
        match self {
            Value::List(list) => list.len(),
            Value::ArgList(args) => args.elements().len(),
            Value::Map(map) => map.len(),
            _ => 1,
        }
    }
}

// Typed assertions

impl Value {
    /// Assert this is a number; `name` tags the error with the argument
    /// it came from.
    pub fn assert_number(&self, name: Option<&str>) -> SassResult<&Number> {
        match self {
            Value::Number(number) => Ok(number),
            other => Err(errors::wrong_type(other, "a number", name)),
        }
    }

    /// Assert this is a string.
    pub fn assert_string(&self, name: Option<&str>) -> SassResult<&SassString> {
        match self {
            Value::String(string) => Ok(string),
            other => Err(errors::wrong_type(other, "a string", name)),
        }
    }

    /// Assert this is a color.
    pub fn assert_color(&self, name: Option<&str>) -> SassResult<&Color> {
        match self {
            Value::Color(color) => Ok(color),
            other => Err(errors::wrong_type(other, "a color", name)),
        }
    }

    /// Assert this is a map. The empty list is the empty map, and so is
    /// an argument list carrying neither elements nor keywords.
    pub fn assert_map(&self, name: Option<&str>) -> SassResult<SassMap> {
        match self {
            Value::Map(map) => Ok(map.clone()),
            Value::List(list) if list.is_empty() => Ok(SassMap::empty()),
            Value::ArgList(args) if args.elements().is_empty() && args.keywords().is_empty() => {
                Ok(SassMap::empty())
            }
            other => Err(errors::wrong_type(other, "a map", name)),
        }
    }

    /// Assert this is a boolean.
    pub fn assert_bool(&self, name: Option<&str>) -> SassResult<bool> {
        match self {
            Value::Bool(value) => Ok(*value),
            other => Err(errors::wrong_type(other, "a boolean", name)),
        }
    }

    /// Assert this is a function reference.
    pub fn assert_function(&self, name: Option<&str>) -> SassResult<&FunctionRef> {
        match self {
            Value::Function(function) => Ok(function),
            other => Err(errors::wrong_type(other, "a function reference", name)),
        }
    }

    /// Assert this is a mixin reference.
    pub fn assert_mixin(&self, name: Option<&str>) -> SassResult<&MixinRef> {
        match self {
            Value::Mixin(mixin) => Ok(mixin),
            other => Err(errors::wrong_type(other, "a mixin reference", name)),
        }
    }

    /// Translate a 1-based, possibly negative sass index into a 0-based
    /// element index for a list of `length` elements.
    ///
    /// Zero is invalid; `|index| > length` is invalid. Callers decide
    /// whether a united index warrants a deprecation warning before
    /// calling.
    pub fn sass_index_to_list_index(
        index: &Value,
        length: usize,
        name: Option<&str>,
    ) -> SassResult<usize> {
        let number = index.assert_number(name)?;
        let int = number
            .as_int()
            .ok_or_else(|| errors::named(name, format!("{} is not an int.", number)))?;
        if int == 0 {
            return Err(errors::named(name, "List index may not be 0.".to_string()));
        }
        if int.unsigned_abs() as usize > length {
            return Err(errors::named(
                name,
                format!("Invalid index {int} for a list with {length} elements."),
            ));
        }
        if int < 0 {
            Ok(length - int.unsigned_abs() as usize)
        } else {
            Ok(int as usize - 1)
        }
    }

    /// Coerce this value into a selector string.
    ///
    /// Valid shapes: a string; a comma list whose elements are strings or
    /// space lists of strings; a space list of strings.
    pub fn assert_selector(&self, name: Option<&str>) -> SassResult<String> {
        self.selector_text()
            .ok_or_else(|| errors::wrong_type(self, "a valid selector", name))
    }

    fn selector_text(&self) -> Option<String> {
        match self {
            Value::String(string) => Some(string.text.clone()),
            Value::List(list) if !list.is_empty() => {
                let mut parts = Vec::with_capacity(list.len());
                match list.separator() {
                    ListSeparator::Comma => {
                        for element in list.elements() {
                            parts.push(element.complex_selector_text()?);
                        }
                        Some(parts.join(", "))
                    }
                    ListSeparator::Space | ListSeparator::Undecided => {
                        for element in list.elements() {
                            match element {
                                Value::String(string) => parts.push(string.text.clone()),
                                _ => return None,
                            }
                        }
                        Some(parts.join(" "))
                    }
                    ListSeparator::Slash => None,
                }
            }
            _ => None,
        }
    }

    fn complex_selector_text(&self) -> Option<String> {
        match self {
            Value::String(string) => Some(string.text.clone()),
            Value::List(list)
                if matches!(
                    list.separator(),
                    ListSeparator::Space | ListSeparator::Undecided
                ) && !list.is_empty() =>
            {
                let mut parts = Vec::with_capacity(list.len());
                for element in list.elements() {
                    match element {
                        Value::String(string) => parts.push(string.text.clone()),
                        _ => return None,
                    }
                }
                Some(parts.join(" "))
            }
            _ => None,
        }
    }
}

// Equality

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.equals(b),
            (Value::Color(a), Value::Color(b)) => a.equals(b),
            // Quoting does not affect string equality.
            (Value::String(a), Value::String(b)) => a.text == b.text,
            (Value::Calculation(a), Value::Calculation(b)) => a == b,
            (Value::Function(a), Value::Function(b)) => a == b,
            (Value::Mixin(a), Value::Mixin(b)) => a == b,
            (Value::List(a), Value::List(b)) => a.equals(b),
            (Value::Map(a), Value::Map(b)) => a.equals(b),
            // The empty list and the empty map are the same value.
            (Value::List(list), Value::Map(map)) | (Value::Map(map), Value::List(list)) => {
                list.is_empty() && map.is_empty()
            }
            (Value::ArgList(a), Value::ArgList(b)) => {
                arglist_as_list(a).equals(&arglist_as_list(b))
            }
            (Value::ArgList(args), Value::List(list))
            | (Value::List(list), Value::ArgList(args)) => arglist_as_list(args).equals(list),
            // An argument list is its list part, so the empty-list /
            // empty-map identity applies to it too.
            (Value::ArgList(args), Value::Map(map))
            | (Value::Map(map), Value::ArgList(args)) => {
                args.elements().is_empty() && map.is_empty()
            }
            _ => false,
        }
    }
}

impl Eq for Value {}

fn arglist_as_list(args: &ArgList) -> SassList {
    SassList::new(args.elements().to_vec(), args.separator(), false)
}

// Hashing, consistent with equality

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        match self {
            Value::Null => state.write_u8(0),
            Value::Bool(value) => {
                state.write_u8(1);
                value.hash(state);
            }
            Value::Number(number) => {
                state.write_u8(2);
                number.canonical_key().hash(state);
            }
            Value::Color(color) => {
                state.write_u8(3);
                color.canonical_key().hash(state);
            }
            Value::String(string) => {
                state.write_u8(4);
                string.text.hash(state);
            }
            Value::Calculation(calc) => {
                state.write_u8(5);
                calc.name().hash(state);
                state.write_usize(calc.args().len());
            }
            Value::Function(function) => {
                state.write_u8(6);
                function.hash(state);
            }
            Value::Mixin(mixin) => {
                state.write_u8(7);
                mixin.hash(state);
            }
            Value::List(list) => hash_list(list, state),
            Value::ArgList(args) => hash_list(&arglist_as_list(args), state),
            Value::Map(map) => {
                if map.is_empty() {
                    // Must collide with the empty list.
                    hash_list(&SassList::empty(), state);
                } else {
                    state.write_u8(9);
                    state.write_usize(map.len());
                    // Order-insensitive: XOR of independent entry hashes.
                    let mut acc = 0u64;
                    for entry in map.entries() {
                        let mut hasher = FxHasher::default();
                        entry.hash(&mut hasher);
                        acc ^= hasher.finish();
                    }
                    state.write_u64(acc);
                }
            }
        }
    }
}

fn hash_list<H: Hasher>(list: &SassList, state: &mut H) {
    state.write_u8(8);
    list.is_bracketed().hash(state);
    // Separator is unobservable at length <= 1 and must not split hashes.
    if list.len() > 1 {
        std::mem::discriminant(&list.separator()).hash(state);
    }
    state.write_usize(list.len());
    for element in list.elements() {
        element.hash(state);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests;
