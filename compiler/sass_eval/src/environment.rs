//! Lexical environments.
//!
//! A scope stack over reference-counted scopes. Variables, mixins, and
//! functions occupy independent name tables, matching the language's
//! three member namespaces. Mixin and function entries are indices into
//! the per-compilation callable arena, not back-pointers.

use std::cell::RefCell;
use std::fmt;
use std::ops::Deref;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use sass_value::Value;

/// A single-threaded reference-counted scope handle.
///
/// Wraps `Rc<RefCell<T>>`; evaluation is cooperatively single-threaded
/// per compilation, so `Rc` suffices and stays cheap.
#[repr(transparent)]
pub struct LocalScope<T>(Rc<RefCell<T>>);

impl<T> LocalScope<T> {
    #[inline]
    pub fn new(value: T) -> Self {
        LocalScope(Rc::new(RefCell::new(value)))
    }

    #[inline]
    pub fn borrow(&self) -> std::cell::Ref<'_, T> {
        self.0.borrow()
    }

    #[inline]
    pub fn borrow_mut(&self) -> std::cell::RefMut<'_, T> {
        self.0.borrow_mut()
    }
}

impl<T> Clone for LocalScope<T> {
    #[inline]
    fn clone(&self) -> Self {
        LocalScope(Rc::clone(&self.0))
    }
}

impl<T: fmt::Debug> fmt::Debug for LocalScope<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("LocalScope").field(&self.0).finish()
    }
}

impl<T> Deref for LocalScope<T> {
    type Target = RefCell<T>;

    #[inline]
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// One lexical scope: three member tables plus a parent link.
#[derive(Debug, Default)]
pub struct Scope {
    variables: FxHashMap<String, Value>,
    mixins: FxHashMap<String, u32>,
    functions: FxHashMap<String, u32>,
    parent: Option<LocalScope<Scope>>,
}

impl Scope {
    pub fn new() -> Self {
        Scope::default()
    }

    pub fn with_parent(parent: LocalScope<Scope>) -> Self {
        Scope {
            parent: Some(parent),
            ..Scope::default()
        }
    }

    fn lookup_variable(&self, name: &str) -> Option<Value> {
        if let Some(value) = self.variables.get(name) {
            return Some(value.clone());
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup_variable(name))
    }

    fn lookup_mixin(&self, name: &str) -> Option<u32> {
        if let Some(id) = self.mixins.get(name) {
            return Some(*id);
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup_mixin(name))
    }

    fn lookup_function(&self, name: &str) -> Option<u32> {
        if let Some(id) = self.functions.get(name) {
            return Some(*id);
        }
        self.parent
            .as_ref()
            .and_then(|parent| parent.borrow().lookup_function(name))
    }

    /// Reassign in the innermost scope already defining `name`.
    fn assign_existing(&mut self, name: &str, value: &Value) -> bool {
        if let Some(slot) = self.variables.get_mut(name) {
            *slot = value.clone();
            return true;
        }
        match &self.parent {
            Some(parent) => parent.borrow_mut().assign_existing(name, value),
            None => false,
        }
    }
}

/// The environment for one module evaluation.
///
/// The bottom scope is the module's global scope; block statements push
/// and pop above it. Closures capture the innermost scope handle, which
/// keeps the whole parent chain alive.
pub struct Environment {
    scopes: Vec<LocalScope<Scope>>,
    global: LocalScope<Scope>,
}

impl Environment {
    pub fn new() -> Self {
        let global = LocalScope::new(Scope::new());
        Environment {
            scopes: vec![global.clone()],
            global,
        }
    }

    /// An environment rooted at a captured scope, sharing `global`.
    ///
    /// Used to execute mixin and function bodies in their definition
    /// scope chain.
    pub fn for_closure(global: LocalScope<Scope>, captured: LocalScope<Scope>) -> Self {
        Environment {
            scopes: vec![captured],
            global,
        }
    }

    /// Whether the innermost scope is the module scope.
    #[inline]
    pub fn at_module_scope(&self) -> bool {
        self.scopes.len() == 1
    }

    /// The module-scope handle.
    pub fn global_scope(&self) -> LocalScope<Scope> {
        self.global.clone()
    }

    /// The innermost scope handle (closure capture).
    pub fn capture(&self) -> LocalScope<Scope> {
        self.current().clone()
    }

    pub fn push_scope(&mut self) {
        let parent = self.current().clone();
        self.scopes.push(LocalScope::new(Scope::with_parent(parent)));
    }

    pub fn pop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    fn current(&self) -> &LocalScope<Scope> {
        self.scopes.last().unwrap_or(&self.global)
    }

    pub fn get_variable(&self, name: &str) -> Option<Value> {
        self.current().borrow().lookup_variable(name)
    }

    pub fn get_mixin(&self, name: &str) -> Option<u32> {
        self.current().borrow().lookup_mixin(name)
    }

    pub fn get_function(&self, name: &str) -> Option<u32> {
        self.current().borrow().lookup_function(name)
    }

    /// `$name: value`: reassigns the innermost existing binding, or
    /// declares in the current scope.
    pub fn set_variable(&mut self, name: &str, value: Value) {
        let current = self.current().clone();
        if current.borrow_mut().assign_existing(name, &value) {
            return;
        }
        current
            .borrow_mut()
            .variables
            .insert(name.to_string(), value);
    }

    /// `!global` assignment: module scope only, and only when the name
    /// already exists there.
    pub fn set_global_variable(&mut self, name: &str, value: Value) -> bool {
        let mut global = self.global.borrow_mut();
        if global.variables.contains_key(name) {
            global.variables.insert(name.to_string(), value);
            true
        } else {
            false
        }
    }

    /// Declare a variable at module scope unconditionally (used for
    /// configured and forwarded values).
    pub fn declare_global_variable(&mut self, name: &str, value: Value) {
        self.global
            .borrow_mut()
            .variables
            .insert(name.to_string(), value);
    }

    /// Whether the module scope currently defines `name`.
    pub fn has_global_variable(&self, name: &str) -> bool {
        self.global.borrow().variables.contains_key(name)
    }

    pub fn set_mixin(&mut self, name: &str, id: u32) {
        self.current()
            .borrow_mut()
            .mixins
            .insert(name.to_string(), id);
    }

    pub fn set_function(&mut self, name: &str, id: u32) {
        self.current()
            .borrow_mut()
            .functions
            .insert(name.to_string(), id);
    }

    /// Snapshot the module scope's three tables (module completion).
    pub fn module_members(
        &self,
    ) -> (
        FxHashMap<String, Value>,
        FxHashMap<String, u32>,
        FxHashMap<String, u32>,
    ) {
        let global = self.global.borrow();
        (
            global.variables.clone(),
            global.mixins.clone(),
            global.functions.clone(),
        )
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_assignment_prefers_outer_binding() {
        let mut env = Environment::new();
        env.set_variable("x", Value::number(1.0));
        env.push_scope();
        // No shadowing: assignment writes the existing outer binding.
        env.set_variable("x", Value::number(2.0));
        env.pop_scope();
        assert_eq!(env.get_variable("x"), Some(Value::number(2.0)));
    }

    #[test]
    fn test_block_local_declaration_disappears() {
        let mut env = Environment::new();
        env.push_scope();
        env.set_variable("local", Value::number(1.0));
        assert!(env.get_variable("local").is_some());
        env.pop_scope();
        assert!(env.get_variable("local").is_none());
    }

    #[test]
    fn test_global_assignment_requires_existing() {
        let mut env = Environment::new();
        env.push_scope();
        assert!(!env.set_global_variable("fresh", Value::number(1.0)));
        env.declare_global_variable("fresh", Value::Null);
        assert!(env.set_global_variable("fresh", Value::number(1.0)));
        env.pop_scope();
        assert_eq!(env.get_variable("fresh"), Some(Value::number(1.0)));
    }

    #[test]
    fn test_member_namespaces_are_independent() {
        let mut env = Environment::new();
        env.set_variable("frame", Value::number(1.0));
        env.set_mixin("frame", 7);
        env.set_function("frame", 9);
        assert_eq!(env.get_variable("frame"), Some(Value::number(1.0)));
        assert_eq!(env.get_mixin("frame"), Some(7));
        assert_eq!(env.get_function("frame"), Some(9));
    }

    #[test]
    fn test_closure_shares_global() {
        let mut env = Environment::new();
        env.set_variable("x", Value::number(1.0));
        let captured = env.capture();
        let closure = Environment::for_closure(env.global_scope(), captured);
        assert_eq!(closure.get_variable("x"), Some(Value::number(1.0)));
    }
}
