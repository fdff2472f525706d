//! Evaluated modules, configuration, and the extension store.

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use sass_css::CssTree;
use sass_diagnostic::{SassError, SassResult};
use sass_ir::{SourceUrl, Span};
use sass_value::Value;

/// The result of evaluating one canonical source: a frozen namespace,
/// the module's own CSS, and handles to the modules it loaded.
///
/// Modules reference each other only through these `Arc` handles taken
/// from completed cache slots; nothing points back, so the graph (which
/// may be cyclic under `@import`) never forms ownership cycles.
pub struct Module {
    pub url: SourceUrl,
    /// Public variables, including forwarded ones.
    pub variables: FxHashMap<String, Value>,
    /// Public mixins, as callable-arena indices.
    pub mixins: FxHashMap<String, u32>,
    /// Public functions, as callable-arena indices.
    pub functions: FxHashMap<String, u32>,
    /// This module's own CSS, dependencies excluded.
    pub css: CssTree,
    /// Modules loaded via `@use`/`@forward`, in load order; their CSS
    /// precedes this module's in combined output.
    pub dependencies: Vec<Arc<Module>>,
    /// `@extend`s recorded while evaluating this module.
    pub extensions: ExtensionStore,
}

impl Module {
    /// Collect this module's CSS together with its dependencies', each
    /// module once, dependencies first (post-order).
    pub fn combined_css(&self) -> CssTree {
        let mut seen = FxHashSet::default();
        let mut out = CssTree::new();
        self.collect_css(&mut seen, &mut out);
        out
    }

    fn collect_css(&self, seen: &mut FxHashSet<SourceUrl>, out: &mut CssTree) {
        if !seen.insert(self.url.clone()) {
            return;
        }
        for dependency in &self.dependencies {
            dependency.collect_css(seen, out);
        }
        out.extend_from(&self.css);
    }
}

/// A member name is module-private when it starts with `-` or `_`.
pub fn is_private_member(name: &str) -> bool {
    name.starts_with('-') || name.starts_with('_')
}

/// The state of one canonical URL in the module cache.
///
/// `InProgress` is installed before the source is fetched; it is both
/// the cycle detector and the mutual-exclusion point that guarantees
/// at-most-once evaluation per canonical URL.
pub enum ModuleSlot {
    InProgress,
    Complete(Arc<Module>),
    Failed(SassError),
}

/// One configured variable: the value and where it was set.
#[derive(Clone, Debug)]
pub struct ConfiguredValue {
    pub value: Value,
    pub span: Span,
}

#[derive(Debug, Default)]
struct ConfigurationInner {
    values: FxHashMap<String, ConfiguredValue>,
    used: FxHashSet<String>,
}

/// The `with (...)` bindings passed to a module load.
///
/// Consumed exactly once: every entry must be taken by some `!default`
/// declaration (directly or through `@forward`) before evaluation of
/// the configured module finishes. Cloning shares the underlying store,
/// so a `take` inside a forwarded module marks the `@use` site's entry
/// consumed too. `@forward` layers a child configuration over its
/// parent; delegated lookups re-apply the forward prefix the downstream
/// writer used.
#[derive(Clone, Debug, Default)]
pub struct Configuration {
    inner: std::rc::Rc<std::cell::RefCell<ConfigurationInner>>,
    parent: Option<Box<Configuration>>,
    /// Prefix under which the parent configuration addressed this
    /// module's variables (`as prefix-*` on the forward rule).
    parent_prefix: Option<String>,
}

impl Configuration {
    pub fn new() -> Self {
        Configuration::default()
    }

    /// A configuration layered over `parent` for a `@forward` rule.
    pub fn forwarded(parent: Configuration, prefix: Option<String>) -> Self {
        Configuration {
            inner: std::rc::Rc::default(),
            parent: Some(Box::new(parent)),
            parent_prefix: prefix,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.inner.borrow().values.is_empty()
            && self.parent.as_ref().map_or(true, |parent| parent.is_empty())
    }

    /// Add a binding unless one exists; `@forward ... with (... !default)`.
    pub fn insert_guarded(&mut self, name: &str, value: Value, span: Span) {
        self.inner
            .borrow_mut()
            .values
            .entry(name.to_string())
            .or_insert(ConfiguredValue { value, span });
    }

    /// Add or replace a binding (an explicit `with` clause).
    pub fn insert(&mut self, name: &str, value: Value, span: Span) {
        self.inner
            .borrow_mut()
            .values
            .insert(name.to_string(), ConfiguredValue { value, span });
    }

    /// Take the configured value for a `!default` declaration, marking
    /// it used at whichever layer supplied it.
    pub fn take(&mut self, name: &str) -> Option<Value> {
        {
            let mut inner = self.inner.borrow_mut();
            if let Some(entry) = inner.values.get(name) {
                let value = entry.value.clone();
                inner.used.insert(name.to_string());
                return Some(value);
            }
        }
        let parent = self.parent.as_mut()?;
        let outer_name = match &self.parent_prefix {
            Some(prefix) => format!("{prefix}{name}"),
            None => name.to_string(),
        };
        parent.take(&outer_name)
    }

    /// After the configured module finishes: every entry of THIS layer
    /// must have been taken by some `!default` declaration. Parent
    /// layers are checked at their own load sites.
    pub fn check_consumed(&self) -> SassResult<()> {
        let inner = self.inner.borrow();
        for (name, entry) in &inner.values {
            if !inner.used.contains(name) {
                return Err(SassError::runtime(
                    format!("This variable was not declared with !default: ${name}."),
                    entry.span,
                ));
            }
        }
        Ok(())
    }
}

/// One recorded `@extend`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Extension {
    /// The selector being extended, as written.
    pub target: String,
    /// The selector of the rule containing the `@extend`.
    pub extender: String,
    pub optional: bool,
    pub span: Span,
}

/// Recorded `@extend` relationships for one module.
///
/// Selector rewriting lives in the selector subsystem; the evaluator's
/// responsibility ends at validating and recording the relationships.
#[derive(Clone, Debug, Default)]
pub struct ExtensionStore {
    extensions: Vec<Extension>,
}

impl ExtensionStore {
    pub fn new() -> Self {
        ExtensionStore::default()
    }

    pub fn record(&mut self, extension: Extension) {
        self.extensions.push(extension);
    }

    pub fn extensions(&self) -> &[Extension] {
        &self.extensions
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_configuration_consumed_check() {
        let mut config = Configuration::new();
        config.insert("a", Value::number(1.0), Span::new(0, 4));
        config.insert("b", Value::number(2.0), Span::new(5, 9));

        assert_eq!(config.take("a"), Some(Value::number(1.0)));
        let err = config.check_consumed().unwrap_err();
        assert!(err.message.contains("$b"));

        assert_eq!(config.take("b"), Some(Value::number(2.0)));
        assert!(config.check_consumed().is_ok());
    }

    #[test]
    fn test_guarded_insert_does_not_override() {
        let mut config = Configuration::new();
        config.insert("a", Value::number(1.0), Span::DUMMY);
        config.insert_guarded("a", Value::number(9.0), Span::DUMMY);
        assert_eq!(config.take("a"), Some(Value::number(1.0)));
    }

    #[test]
    fn test_private_member_names() {
        assert!(is_private_member("-secret"));
        assert!(is_private_member("_secret"));
        assert!(!is_private_member("public"));
    }
}
