//! The callable arena and evaluated call arguments.
//!
//! Mixin and function definitions live in one per-compilation arena;
//! values and scopes refer to them by index, never by pointer, so
//! closures and module namespaces stay cycle-free.

use rustc_hash::FxHashMap;
use sass_diagnostic::{SassError, SassResult};
use sass_ir::{ArgumentDeclaration, ListSeparator, SourceUrl, Span, Stmt};
use sass_value::Value;

use crate::environment::{LocalScope, Scope};
use crate::evaluator::Evaluator;

/// A user-defined mixin or function body with its captured context.
///
/// Bodies run in their definition module: the captured scope chain plus
/// the namespaces and `as *` modules visible where they were defined.
pub struct UserCallable {
    pub name: String,
    pub arguments: ArgumentDeclaration,
    pub body: Vec<Stmt>,
    /// The module scope of the defining module.
    pub global: LocalScope<Scope>,
    /// The innermost scope at the definition site.
    pub captured: LocalScope<Scope>,
    /// `@use` namespaces visible at the definition site.
    pub namespaces: FxHashMap<String, std::sync::Arc<crate::module::Module>>,
    /// `@use ... as *` modules visible at the definition site.
    pub globals: Vec<std::sync::Arc<crate::module::Module>>,
    /// The defining stylesheet, for error frames.
    pub url: Option<SourceUrl>,
}

/// A built-in function implementation.
pub type BuiltinFn = fn(&mut Evaluator, &mut Args) -> SassResult<Value>;

/// A built-in mixin implementation (CSS-producing).
pub type BuiltinMixinFn = fn(&mut Evaluator, &mut Args) -> SassResult<()>;

/// A host function supplied through the `functions` option.
pub type HostFn = std::sync::Arc<dyn Fn(&[Value]) -> SassResult<Value> + Send + Sync>;

/// One entry in the callable arena.
///
/// User callables sit behind `Rc` so dispatch can clone a handle out of
/// the arena without copying bodies.
#[derive(Clone)]
pub enum Callable {
    UserFunction(std::rc::Rc<UserCallable>),
    UserMixin(std::rc::Rc<UserCallable>),
    BuiltinFunction(&'static str, BuiltinFn),
    BuiltinMixin(&'static str, BuiltinMixinFn),
    HostFunction(String, HostFn),
}

impl Callable {
    /// The name used in error frames and `inspect`.
    pub fn name(&self) -> &str {
        match self {
            Callable::UserFunction(callable) | Callable::UserMixin(callable) => &callable.name,
            Callable::BuiltinFunction(name, _) | Callable::BuiltinMixin(name, _) => name,
            Callable::HostFunction(name, _) => name,
        }
    }
}

/// Fully evaluated call-site arguments.
///
/// Rest arguments are already expanded: list elements into
/// `positional`, map/keyword entries into `named`. A keyword-rest
/// without a rest list is rejected at construction; nothing downstream
/// needs to handle that shape.
#[derive(Debug)]
pub struct Args {
    positional: Vec<Value>,
    named: FxHashMap<String, Value>,
    /// Separator of the rest argument list, surfaced by
    /// `meta.keywords`-style reflection and rest re-packing.
    pub separator: ListSeparator,
    pub span: Span,
    taken: usize,
}

impl Args {
    pub fn new(
        positional: Vec<Value>,
        named: FxHashMap<String, Value>,
        separator: ListSeparator,
        span: Span,
        had_rest: bool,
        had_keyword_rest: bool,
    ) -> SassResult<Self> {
        if had_keyword_rest && !had_rest {
            return Err(SassError::runtime(
                "A keyword rest argument requires a rest argument.",
                span,
            ));
        }
        Ok(Args {
            positional,
            named,
            separator,
            span,
            taken: 0,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.positional.len() + self.named.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The next required argument, by position or by name.
    pub fn get(&mut self, name: &str) -> SassResult<Value> {
        self.get_optional(name)
            .ok_or_else(|| SassError::runtime(format!("Missing argument ${name}."), self.span))
    }

    /// The next optional argument, by position or by name.
    pub fn get_optional(&mut self, name: &str) -> Option<Value> {
        if let Some(value) = self.named.remove(name) {
            return Some(value);
        }
        if self.taken < self.positional.len() {
            let value = self.positional[self.taken].clone();
            self.taken += 1;
            return Some(value);
        }
        None
    }

    /// An optional argument defaulting to a given value.
    pub fn get_or(&mut self, name: &str, default: Value) -> Value {
        self.get_optional(name).unwrap_or(default)
    }

    /// Everything not yet taken, as (positionals, named).
    pub fn take_rest(&mut self) -> (Vec<Value>, FxHashMap<String, Value>) {
        let rest = self.positional.split_off(self.taken.min(self.positional.len()));
        let named = std::mem::take(&mut self.named);
        (rest, named)
    }

    /// Fail if anything was passed that no parameter accepted.
    pub fn check_exhausted(&self) -> SassResult<()> {
        if self.taken < self.positional.len() {
            return Err(SassError::runtime(
                format!(
                    "Only {} positional argument(s) allowed, but {} passed.",
                    self.taken,
                    self.positional.len()
                ),
                self.span,
            ));
        }
        if let Some(name) = self.named.keys().next() {
            return Err(SassError::runtime(
                format!("No argument named ${name}."),
                self.span,
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_rest_requires_rest() {
        let err = Args::new(
            Vec::new(),
            FxHashMap::default(),
            ListSeparator::Comma,
            Span::DUMMY,
            false,
            true,
        )
        .unwrap_err();
        assert!(err.message.contains("keyword rest argument"));
    }

    #[test]
    fn test_positional_then_named() {
        let mut named = FxHashMap::default();
        named.insert("b".to_string(), Value::number(2.0));
        let mut args = Args::new(
            vec![Value::number(1.0)],
            named,
            ListSeparator::Comma,
            Span::DUMMY,
            false,
            false,
        )
        .unwrap();

        assert_eq!(args.get("a").unwrap(), Value::number(1.0));
        assert_eq!(args.get("b").unwrap(), Value::number(2.0));
        assert!(args.get("c").is_err());
        assert!(args.check_exhausted().is_ok());
    }

    #[test]
    fn test_unknown_named_argument_rejected() {
        let mut named = FxHashMap::default();
        named.insert("mystery".to_string(), Value::number(1.0));
        let args = Args::new(
            Vec::new(),
            named,
            ListSeparator::Comma,
            Span::DUMMY,
            false,
            false,
        )
        .unwrap();
        let err = args.check_exhausted().unwrap_err();
        assert!(err.message.contains("$mystery"));
    }
}
