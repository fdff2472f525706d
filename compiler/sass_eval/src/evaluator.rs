//! The evaluator: walks parsed stylesheets, builds CSS trees, and
//! orchestrates module loading.
//!
//! # Architecture
//!
//! One `Evaluator` exists per compilation. It owns:
//!
//! - the resolver chain and the module cache (`ModuleSlot`s keyed by
//!   canonical URL — the `InProgress` transition happens before any
//!   source fetch, making it both the cycle detector and the
//!   at-most-once guard);
//! - the callable arena (mixins and functions by index);
//! - a stack of module frames, one per module currently evaluating;
//! - the ordered `loaded_urls` record.
//!
//! CSS building separates every block into declarations (which stay in
//! the enclosing rule) and hoisted statements (nested rules and
//! at-rules, emitted after it).

use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};
use sass_css::{CssStmt, CssTree};
use sass_diagnostic::{Deprecation, SassError, SassResult, WarnDispatcher};
use sass_ir::{
    module_namespace, ArgumentDeclaration, ArgumentInvocation, BinaryOp, ContentBlock, Expr,
    ImportArg, Interpolation, InterpolationPart, ListSeparator, SourceUrl, Span, Stmt, Stylesheet,
    Syntax, UseNamespace,
};
use sass_resolve::{Resolution, ResolverChain};
use sass_value::{
    evaluate_binary, evaluate_unary, inspect, to_css, ArgList, CalcArg, Calculation, Color,
    Number, SassList, SassMap, SassString, Value,
};

use crate::builtins;
use crate::callable::{Args, Callable, HostFn, UserCallable};
use crate::environment::{Environment, LocalScope, Scope};
use crate::module::{
    is_private_member, Configuration, Extension, ExtensionStore, Module, ModuleSlot,
};

/// CSS output of one block: declarations stay in the enclosing rule,
/// everything else is emitted after it.
#[derive(Default)]
struct BlockOut {
    decls: Vec<CssStmt>,
    hoisted: Vec<CssStmt>,
}

/// Per-module evaluation state.
struct ModuleFrame {
    url: Option<SourceUrl>,
    importer: Option<usize>,
    env: Environment,
    namespaces: FxHashMap<String, Arc<Module>>,
    /// Modules used `as *`.
    globals: Vec<Arc<Module>>,
    dependencies: Vec<Arc<Module>>,
    config: Configuration,
    extensions: ExtensionStore,
    forwarded_variables: FxHashMap<String, Value>,
    forwarded_mixins: FxHashMap<String, u32>,
    forwarded_functions: FxHashMap<String, u32>,
}

/// A content block captured at an `@include` site, with everything the
/// block needs to run where it was written.
struct ContentClosure {
    block: ContentBlock,
    global: LocalScope<Scope>,
    captured: LocalScope<Scope>,
    namespaces: FxHashMap<String, Arc<Module>>,
    globals: Vec<Arc<Module>>,
    /// Content-stack depth at capture; the block sees only closures
    /// below this when it runs.
    depth: usize,
}

pub struct Evaluator {
    chain: ResolverChain,
    slots: FxHashMap<SourceUrl, ModuleSlot>,
    loaded_urls: Vec<SourceUrl>,
    loaded_set: FxHashSet<SourceUrl>,
    callables: Vec<Callable>,
    global_functions: FxHashMap<String, u32>,
    global_mixins: FxHashMap<String, u32>,
    builtin_modules: FxHashMap<String, Arc<Module>>,
    plain_css_fns: FxHashMap<String, u32>,
    dispatcher: WarnDispatcher,
    frames: Vec<ModuleFrame>,
    content_stack: Vec<Option<ContentClosure>>,
    selector_stack: Vec<String>,
    declaration_prefix: Vec<String>,
    active_imports: FxHashSet<SourceUrl>,
    /// Depth of bodied at-rules being visited; bare declarations are
    /// legal inside them (`@font-face`).
    at_rule_depth: usize,
    /// CSS produced by built-in mixins (`meta.load-css`), drained into
    /// the include site's output.
    pending_css: Vec<CssStmt>,
}

/// Sass identifiers treat `-` and `_` as the same character.
fn norm(name: &str) -> String {
    name.replace('_', "-")
}

impl Evaluator {
    pub fn new(chain: ResolverChain, dispatcher: WarnDispatcher) -> Self {
        let mut evaluator = Evaluator {
            chain,
            slots: FxHashMap::default(),
            loaded_urls: Vec::new(),
            loaded_set: FxHashSet::default(),
            callables: Vec::new(),
            global_functions: FxHashMap::default(),
            global_mixins: FxHashMap::default(),
            builtin_modules: FxHashMap::default(),
            plain_css_fns: FxHashMap::default(),
            dispatcher,
            frames: Vec::new(),
            content_stack: Vec::new(),
            selector_stack: Vec::new(),
            declaration_prefix: Vec::new(),
            active_imports: FxHashSet::default(),
            at_rule_depth: 0,
            pending_css: Vec::new(),
        };
        for (name, f) in builtins::GLOBAL_FUNCTIONS {
            let id = evaluator.add_callable(Callable::BuiltinFunction(name, *f));
            evaluator.global_functions.insert((*name).to_string(), id);
        }
        evaluator
    }

    /// Register a host function from the `functions` option.
    pub fn register_host_function(&mut self, name: &str, function: HostFn) {
        let id = self.add_callable(Callable::HostFunction(norm(name), function));
        self.global_functions.insert(norm(name), id);
    }

    /// The ordered set of canonical URLs loaded so far.
    pub fn loaded_urls(&self) -> &[SourceUrl] {
        &self.loaded_urls
    }

    /// Compile the entry stylesheet to its combined CSS tree.
    pub fn compile_entry(
        &mut self,
        contents: &str,
        syntax: Syntax,
        url: Option<SourceUrl>,
        importer: Option<usize>,
    ) -> SassResult<CssTree> {
        if let Some(url) = &url {
            self.record_loaded(url);
            self.slots.insert(url.clone(), ModuleSlot::InProgress);
        }
        let stylesheet = sass_parse::parse(contents, syntax, url.as_ref())?;
        self.push_frame(url.clone(), importer, Configuration::new());
        let visited = self.visit_root(&stylesheet);
        let frame = self.pop_frame();
        let root = visited.map_err(|err| match &frame.url {
            Some(url) => err.with_url(url),
            None => err,
        })?;
        let module = Arc::new(Self::build_module(frame, root));
        if let Some(url) = &url {
            self.slots
                .insert(url.clone(), ModuleSlot::Complete(module.clone()));
        }
        Ok(module.combined_css())
    }

    // Frames

    fn push_frame(&mut self, url: Option<SourceUrl>, importer: Option<usize>, config: Configuration) {
        self.frames.push(ModuleFrame {
            url,
            importer,
            env: Environment::new(),
            namespaces: FxHashMap::default(),
            globals: Vec::new(),
            dependencies: Vec::new(),
            config,
            extensions: ExtensionStore::new(),
            forwarded_variables: FxHashMap::default(),
            forwarded_mixins: FxHashMap::default(),
            forwarded_functions: FxHashMap::default(),
        });
    }

    fn pop_frame(&mut self) -> ModuleFrame {
        match self.frames.pop() {
            Some(frame) => frame,
            None => unreachable!("module frame stack underflow"),
        }
    }

    fn frame(&self) -> &ModuleFrame {
        match self.frames.last() {
            Some(frame) => frame,
            None => unreachable!("no active module frame"),
        }
    }

    fn frame_mut(&mut self) -> &mut ModuleFrame {
        match self.frames.last_mut() {
            Some(frame) => frame,
            None => unreachable!("no active module frame"),
        }
    }

    fn build_module(frame: ModuleFrame, root: Vec<CssStmt>) -> Module {
        let (own_variables, own_mixins, own_functions) = frame.env.module_members();
        let mut variables = frame.forwarded_variables;
        let mut mixins = frame.forwarded_mixins;
        let mut functions = frame.forwarded_functions;
        for (name, value) in own_variables {
            if !is_private_member(&name) {
                variables.insert(name, value);
            }
        }
        for (name, id) in own_mixins {
            if !is_private_member(&name) {
                mixins.insert(name, id);
            }
        }
        for (name, id) in own_functions {
            if !is_private_member(&name) {
                functions.insert(name, id);
            }
        }
        let url = frame
            .url
            .unwrap_or_else(|| match SourceUrl::parse("internal:entry") {
                Ok(url) => url,
                Err(_) => unreachable!("static URL parses"),
            });
        Module {
            url,
            variables,
            mixins,
            functions,
            css: CssTree { statements: root },
            dependencies: frame.dependencies,
            extensions: frame.extensions,
        }
    }

    fn add_callable(&mut self, callable: Callable) -> u32 {
        self.callables.push(callable);
        (self.callables.len() - 1) as u32
    }

    fn record_loaded(&mut self, url: &SourceUrl) {
        if self.loaded_set.insert(url.clone()) {
            self.loaded_urls.push(url.clone());
        }
    }

    fn current_base(&self) -> Option<(usize, SourceUrl)> {
        let frame = self.frame();
        match (&frame.importer, &frame.url) {
            (Some(importer), Some(url)) => Some((*importer, url.clone())),
            _ => None,
        }
    }

    // Warnings

    pub(crate) fn warn_deprecation(
        &mut self,
        deprecation: Deprecation,
        message: impl Into<String>,
        span: Span,
    ) {
        let url = self.frame().url.clone();
        self.dispatcher
            .warn_deprecated(deprecation, message, Some(span), url.as_ref());
    }

    /// Deprecation for unit-bearing sass indexes.
    pub(crate) fn warn_united_index(&mut self, index: &Value, name: &str, span: Span) {
        if let Value::Number(number) = index {
            if number.has_units() {
                self.warn_deprecation(
                    Deprecation::FunctionUnits,
                    format!(
                        "${name}: Passing a number with unit {} is deprecated.",
                        number.unit_string()
                    ),
                    span,
                );
            }
        }
    }

    // Module loading

    /// The `@use`/`@forward`/`meta.load-css` load protocol.
    fn load_module(
        &mut self,
        reference: &str,
        config: Configuration,
        span: Span,
    ) -> SassResult<Arc<Module>> {
        if let Some(name) = reference.strip_prefix("sass:") {
            if !config.is_empty() {
                return Err(SassError::runtime(
                    "Built-in modules can't be configured.",
                    span,
                ));
            }
            return self.builtin_module_by_name(name, span);
        }

        let base = self.current_base();
        let resolution = self
            .chain
            .canonicalize(reference, base.as_ref().map(|(idx, url)| (*idx, url)), false)
            .map_err(|err| err.with_span(span))?
            .ok_or_else(|| ResolverChain::unresolved().with_span(span))?;
        self.record_loaded(&resolution.url);

        if let Some(slot) = self.slots.get(&resolution.url) {
            return match slot {
                ModuleSlot::Complete(module) => {
                    let module = module.clone();
                    if config.is_empty() {
                        Ok(module)
                    } else {
                        Err(SassError::runtime(
                            format!(
                                "{} was already loaded, so it can't be configured using \"with\".",
                                resolution.url
                            ),
                            span,
                        ))
                    }
                }
                ModuleSlot::InProgress => Err(SassError::cycle(format!(
                    "Module loop: {} is already being loaded.",
                    resolution.url
                ))
                .with_span(span)),
                ModuleSlot::Failed(err) => Err(err.clone()),
            };
        }

        // The mutual-exclusion point: the slot is claimed before the
        // first fetch, so re-entrant and concurrent loads of this URL
        // observe InProgress instead of starting a second evaluation.
        self.slots
            .insert(resolution.url.clone(), ModuleSlot::InProgress);
        tracing::debug!(url = %resolution.url, "module slot in progress");
        match self.evaluate_loaded_module(&resolution, config.clone()) {
            Ok(module) => {
                self.slots
                    .insert(resolution.url.clone(), ModuleSlot::Complete(module.clone()));
                config.check_consumed()?;
                Ok(module)
            }
            Err(err) => {
                self.slots
                    .insert(resolution.url.clone(), ModuleSlot::Failed(err.clone()));
                Err(err)
            }
        }
    }

    fn evaluate_loaded_module(
        &mut self,
        resolution: &Resolution,
        config: Configuration,
    ) -> SassResult<Arc<Module>> {
        let source = self.chain.load(resolution)?;
        let stylesheet =
            sass_parse::parse(&source.contents, source.syntax, Some(&resolution.url))?;
        self.push_frame(Some(resolution.url.clone()), Some(resolution.importer), config);
        let visited = self.visit_root(&stylesheet);
        let frame = self.pop_frame();
        let root = visited.map_err(|err| err.with_url(&resolution.url))?;
        Ok(Arc::new(Self::build_module(frame, root)))
    }

    fn builtin_module_by_name(&mut self, name: &str, span: Span) -> SassResult<Arc<Module>> {
        if let Some(module) = self.builtin_modules.get(name) {
            return Ok(module.clone());
        }
        let def = builtins::module(name).ok_or_else(|| {
            SassError::runtime(
                format!("There's no built-in module named \"sass:{name}\"."),
                span,
            )
        })?;
        let mut functions = FxHashMap::default();
        for (fn_name, f) in def.functions {
            let id = self.add_callable(Callable::BuiltinFunction(fn_name, *f));
            functions.insert((*fn_name).to_string(), id);
        }
        let mut mixins = FxHashMap::default();
        for (mixin_name, f) in def.mixins {
            let id = self.add_callable(Callable::BuiltinMixin(mixin_name, *f));
            mixins.insert((*mixin_name).to_string(), id);
        }
        let variables = (def.variables)()
            .into_iter()
            .map(|(var_name, value)| (var_name.to_string(), value))
            .collect();
        let url = SourceUrl::parse(&format!("sass:{name}"))
            .map_err(|err| SassError::runtime(err.to_string(), span))?;
        let module = Arc::new(Module {
            url,
            variables,
            mixins,
            functions,
            css: CssTree::new(),
            dependencies: Vec::new(),
            extensions: ExtensionStore::new(),
        });
        self.builtin_modules
            .insert(name.to_string(), module.clone());
        Ok(module)
    }

    /// `meta.load-css`: load (and evaluate at most once) a module, then
    /// splice its combined CSS at the include site.
    pub(crate) fn load_css_into_output(
        &mut self,
        url: &str,
        with: Option<SassMap>,
        span: Span,
    ) -> SassResult<()> {
        let mut config = Configuration::new();
        if let Some(map) = with {
            for (key, value) in map.entries() {
                let name = key.assert_string(Some("with"))?;
                config.insert(&norm(&name.text), value.clone(), span);
            }
        }
        let module = self.load_module(url, config, span)?;
        let combined = module.combined_css();
        self.pending_css.extend(combined.statements);
        Ok(())
    }

    // Root visiting

    fn visit_root(&mut self, stylesheet: &Stylesheet) -> SassResult<Vec<CssStmt>> {
        let mut out = BlockOut::default();
        for stmt in &stylesheet.statements {
            self.visit_stmt(stmt, &mut out)?;
        }
        debug_assert!(out.decls.is_empty(), "declarations cannot appear at root");
        Ok(out.hoisted)
    }

    fn visit_children(&mut self, stmts: &[Stmt], new_scope: bool) -> SassResult<BlockOut> {
        let mut out = BlockOut::default();
        self.visit_children_into(stmts, new_scope, &mut out)?;
        Ok(out)
    }

    fn visit_children_into(
        &mut self,
        stmts: &[Stmt],
        new_scope: bool,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        if new_scope {
            self.frame_mut().env.push_scope();
        }
        let mut result = Ok(());
        for stmt in stmts {
            result = self.visit_stmt(stmt, out);
            if result.is_err() {
                break;
            }
        }
        if new_scope {
            self.frame_mut().env.pop_scope();
        }
        result
    }

    // Statements

    fn visit_stmt(&mut self, stmt: &Stmt, out: &mut BlockOut) -> SassResult<()> {
        match stmt {
            Stmt::StyleRule {
                selector,
                body,
                span,
            } => self.visit_style_rule(selector, body, *span, out),
            Stmt::Declaration {
                name,
                value,
                body,
                span,
            } => self.visit_declaration(name, value.as_ref(), body, *span, out),
            Stmt::VariableDecl {
                name,
                namespace,
                value,
                default,
                global,
                span,
            } => self.visit_variable_decl(name, namespace.as_deref(), value, *default, *global, *span),
            Stmt::Use(rule) => self.visit_use(rule),
            Stmt::Forward(rule) => self.visit_forward(rule),
            Stmt::Import(rule) => self.visit_import(rule, out),
            Stmt::MixinDecl {
                name,
                arguments,
                body,
                span: _,
            } => {
                self.define_callable(name, arguments, body, true);
                Ok(())
            }
            Stmt::FunctionDecl {
                name,
                arguments,
                body,
                span: _,
            } => {
                self.define_callable(name, arguments, body, false);
                Ok(())
            }
            Stmt::Include {
                name,
                namespace,
                arguments,
                content,
                span,
            } => self.visit_include(name, namespace.as_deref(), arguments, content.as_ref(), *span, out),
            Stmt::Content { arguments, span } => self.visit_content(arguments, *span, out),
            Stmt::Return { span, .. } => Err(SassError::runtime(
                "@return may only be used within a function.",
                *span,
            )),
            Stmt::If {
                clauses,
                else_body,
                ..
            } => {
                for clause in clauses {
                    if self.visit_expr(&clause.condition)?.is_truthy() {
                        return self.visit_children_into(&clause.body, true, out);
                    }
                }
                if let Some(body) = else_body {
                    return self.visit_children_into(body, true, out);
                }
                Ok(())
            }
            Stmt::Each {
                variables,
                list,
                body,
                ..
            } => self.visit_each(variables, list, body, out),
            Stmt::For {
                variable,
                from,
                to,
                inclusive,
                body,
                span,
            } => self.visit_for(variable, from, to, *inclusive, body, *span, out),
            Stmt::While {
                condition, body, ..
            } => {
                while self.visit_expr(condition)?.is_truthy() {
                    self.visit_children_into(body, true, out)?;
                }
                Ok(())
            }
            Stmt::Warn { expr, span } => {
                let value = self.visit_expr(expr)?;
                let message = match &value {
                    Value::String(string) => string.text.clone(),
                    other => inspect(other),
                };
                let url = self.frame().url.clone();
                self.dispatcher.warn(message, Some(*span), url.as_ref());
                Ok(())
            }
            Stmt::Error { expr, span } => {
                let value = self.visit_expr(expr)?;
                Err(SassError::runtime(inspect(&value), *span))
            }
            Stmt::Debug { expr, span } => {
                let value = self.visit_expr(expr)?;
                let url = self.frame().url.clone();
                self.dispatcher
                    .debug(&inspect(&value), *span, url.as_ref());
                Ok(())
            }
            Stmt::Extend {
                selector,
                optional,
                span,
            } => {
                let target = self.interpolate(selector)?;
                let extender = match self.selector_stack.last() {
                    Some(current) => current.clone(),
                    None => {
                        return Err(SassError::runtime(
                            "@extend may only be used within style rules.",
                            *span,
                        ))
                    }
                };
                self.frame_mut().extensions.record(Extension {
                    target,
                    extender,
                    optional: *optional,
                    span: *span,
                });
                Ok(())
            }
            Stmt::AtRule {
                name,
                prelude,
                body,
                span,
            } => self.visit_at_rule(name, prelude.as_ref(), body.as_deref(), *span, out),
            Stmt::LoudComment { text, .. } => {
                let text = self.interpolate(text)?;
                if self.selector_stack.is_empty() {
                    out.hoisted.push(CssStmt::Comment { text });
                } else {
                    out.decls.push(CssStmt::Comment { text });
                }
                Ok(())
            }
        }
    }

    fn visit_style_rule(
        &mut self,
        selector: &Interpolation,
        body: &[Stmt],
        _span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let raw = self.interpolate(selector)?;
        let resolved = self.resolve_selector(&raw);
        self.selector_stack.push(resolved.clone());
        let inner = self.visit_children(body, true);
        self.selector_stack.pop();
        let inner = inner?;
        out.hoisted.push(CssStmt::Rule {
            selector: resolved,
            body: inner.decls,
        });
        out.hoisted.extend(inner.hoisted);
        Ok(())
    }

    /// Join a written selector onto the enclosing selector: `&` splices
    /// the parent, anything else nests beneath it. Comma lists cross.
    fn resolve_selector(&self, raw: &str) -> String {
        let raw = normalize_selector(raw);
        let Some(parent) = self.selector_stack.last() else {
            return raw;
        };
        let mut joined = Vec::new();
        for parent_part in parent.split(',') {
            let parent_part = parent_part.trim();
            for child_part in raw.split(',') {
                let child_part = child_part.trim();
                if child_part.contains('&') {
                    joined.push(child_part.replace('&', parent_part));
                } else {
                    joined.push(format!("{parent_part} {child_part}"));
                }
            }
        }
        joined.join(", ")
    }

    fn visit_declaration(
        &mut self,
        name: &Interpolation,
        value: Option<&Expr>,
        body: &[Stmt],
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        if self.selector_stack.is_empty() && self.at_rule_depth == 0 {
            return Err(SassError::runtime(
                "Declarations may only be used within style rules.",
                span,
            ));
        }
        let name_text = self.interpolate(name)?;
        let full_name = match self.declaration_prefix.last() {
            Some(prefix) => format!("{prefix}-{name_text}"),
            None => name_text,
        };
        let custom = full_name.starts_with("--");

        if let Some(expr) = value {
            let value = self.visit_expr(expr)?;
            let skip = match &value {
                Value::Null => true,
                Value::String(string) if !custom && !string.quoted && string.text.is_empty() => {
                    true
                }
                _ => false,
            };
            if custom && skip {
                return Err(SassError::runtime(
                    "Custom property values may not be empty.",
                    span,
                ));
            }
            if !skip {
                out.decls.push(CssStmt::Declaration {
                    name: full_name.clone(),
                    value,
                    custom,
                });
            }
        }

        if !body.is_empty() {
            self.declaration_prefix.push(full_name);
            let result = self.visit_children_into(body, true, out);
            self.declaration_prefix.pop();
            result?;
        }
        Ok(())
    }

    fn visit_variable_decl(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        value: &Expr,
        default: bool,
        global: bool,
        span: Span,
    ) -> SassResult<()> {
        let name = norm(name);
        if let Some(namespace) = namespace {
            return Err(SassError::runtime(
                format!(
                    "Module variables are read-only from the outside; \
                     {namespace}.${name} may not be reassigned."
                ),
                span,
            ));
        }

        if default {
            if self.frame().env.at_module_scope() {
                if let Some(configured) = self.frame_mut().config.take(&name) {
                    self.frame_mut().env.declare_global_variable(&name, configured);
                    return Ok(());
                }
            }
            let existing = self.frame().env.get_variable(&name);
            if !matches!(existing, None | Some(Value::Null)) {
                return Ok(());
            }
            let value = self.visit_expr(value)?;
            self.frame_mut().env.set_variable(&name, value);
            return Ok(());
        }

        let value = self.visit_expr(value)?;
        if global && !self.frame().env.at_module_scope() {
            if !self.frame_mut().env.set_global_variable(&name, value) {
                return Err(SassError::runtime(
                    format!(
                        "!global assignments may not declare new variables; \
                         ${name} is not defined at the module root."
                    ),
                    span,
                ));
            }
            return Ok(());
        }
        self.frame_mut().env.set_variable(&name, value);
        Ok(())
    }

    fn visit_use(&mut self, rule: &sass_ir::UseRule) -> SassResult<()> {
        let mut config = Configuration::new();
        for entry in &rule.configuration {
            let value = self.visit_expr(&entry.value)?;
            config.insert(&norm(&entry.name), value, entry.span);
        }
        let module = self.load_module(&rule.url, config, rule.span)?;
        self.frame_mut().dependencies.push(module.clone());

        match &rule.namespace {
            UseNamespace::Global => {
                self.frame_mut().globals.push(module);
            }
            namespace => {
                let name = match namespace {
                    UseNamespace::Named(name) => norm(name),
                    _ => norm(module_namespace(&rule.url)),
                };
                if self.frame().namespaces.contains_key(&name) {
                    return Err(SassError::runtime(
                        format!("There's already a module with namespace \"{name}\"."),
                        rule.span,
                    ));
                }
                self.frame_mut().namespaces.insert(name, module);
            }
        }
        Ok(())
    }

    fn visit_forward(&mut self, rule: &sass_ir::ForwardRule) -> SassResult<()> {
        let parent_config = self.frame().config.clone();
        let mut config = Configuration::forwarded(parent_config, rule.prefix.clone());
        for entry in &rule.configuration {
            let value = self.visit_expr(&entry.value)?;
            if entry.guarded {
                config.insert_guarded(&norm(&entry.name), value, entry.span);
            } else {
                config.insert(&norm(&entry.name), value, entry.span);
            }
        }
        let module = self.load_module(&rule.url, config, rule.span)?;
        self.frame_mut().dependencies.push(module.clone());

        let prefix = rule.prefix.as_deref().unwrap_or("");
        for (name, value) in &module.variables {
            let visible = rule
                .visibility
                .as_ref()
                .map_or(true, |filter| filter.allows_variable(name));
            if visible {
                self.frame_mut()
                    .forwarded_variables
                    .insert(format!("{prefix}{name}"), value.clone());
            }
        }
        for (name, id) in &module.mixins {
            let visible = rule
                .visibility
                .as_ref()
                .map_or(true, |filter| filter.allows_member(name));
            if visible {
                self.frame_mut()
                    .forwarded_mixins
                    .insert(format!("{prefix}{name}"), *id);
            }
        }
        for (name, id) in &module.functions {
            let visible = rule
                .visibility
                .as_ref()
                .map_or(true, |filter| filter.allows_member(name));
            if visible {
                self.frame_mut()
                    .forwarded_functions
                    .insert(format!("{prefix}{name}"), *id);
            }
        }
        Ok(())
    }

    fn visit_import(&mut self, rule: &sass_ir::ImportRule, out: &mut BlockOut) -> SassResult<()> {
        for import in &rule.imports {
            match import {
                ImportArg::Static { contents, span: _ } => {
                    let prelude = self.interpolate(contents)?;
                    out.hoisted.push(CssStmt::AtRule {
                        name: "import".to_string(),
                        prelude,
                        body: None,
                    });
                }
                ImportArg::Dynamic { url, span } => {
                    self.import_inline(url, *span, out)?;
                }
            }
        }
        Ok(())
    }

    /// Legacy `@import`: evaluate the target in the current module
    /// context, merging members and CSS as though its text were pasted
    /// at the import site. A cycle observes whatever has been defined
    /// so far and is otherwise skipped.
    fn import_inline(&mut self, url: &str, span: Span, out: &mut BlockOut) -> SassResult<()> {
        self.warn_deprecation(
            Deprecation::Import,
            "@import rules are deprecated; use @use and @forward instead.",
            span,
        );
        let base = self.current_base();
        let resolution = self
            .chain
            .canonicalize(url, base.as_ref().map(|(idx, url)| (*idx, url)), true)
            .map_err(|err| err.with_span(span))?
            .ok_or_else(|| ResolverChain::unresolved().with_span(span))?;
        self.record_loaded(&resolution.url);
        if self.active_imports.contains(&resolution.url) {
            return Ok(());
        }

        let source = self.chain.load(&resolution).map_err(|err| err.with_span(span))?;
        let stylesheet =
            sass_parse::parse(&source.contents, source.syntax, Some(&resolution.url))?;
        self.active_imports.insert(resolution.url.clone());

        // The imported file's own references resolve against it, while
        // everything it defines lands in the importing module.
        let saved_url = self.frame().url.clone();
        let saved_importer = self.frame().importer;
        self.frame_mut().url = Some(resolution.url.clone());
        self.frame_mut().importer = Some(resolution.importer);
        let result = self.visit_children_into(&stylesheet.statements, false, out);
        self.frame_mut().url = saved_url;
        self.frame_mut().importer = saved_importer;

        self.active_imports.remove(&resolution.url);
        result
    }

    fn define_callable(
        &mut self,
        name: &str,
        arguments: &ArgumentDeclaration,
        body: &[Stmt],
        mixin: bool,
    ) {
        let name = norm(name);
        let frame = self.frame();
        let callable = UserCallable {
            name: name.clone(),
            arguments: arguments.clone(),
            body: body.to_vec(),
            global: frame.env.global_scope(),
            captured: frame.env.capture(),
            namespaces: frame.namespaces.clone(),
            globals: frame.globals.clone(),
            url: frame.url.clone(),
        };
        let id = if mixin {
            self.add_callable(Callable::UserMixin(std::rc::Rc::new(callable)))
        } else {
            self.add_callable(Callable::UserFunction(std::rc::Rc::new(callable)))
        };
        if mixin {
            self.frame_mut().env.set_mixin(&name, id);
        } else {
            self.frame_mut().env.set_function(&name, id);
        }
    }

    fn visit_include(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        arguments: &ArgumentInvocation,
        content: Option<&ContentBlock>,
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let name = norm(name);
        let id = self.resolve_mixin(&name, namespace).ok_or_else(|| {
            SassError::runtime(format!("Undefined mixin {name}."), span)
        })?;
        let args = self.evaluate_invocation(arguments)?;
        self.apply_mixin_id(id, args, content, span, out)
    }

    fn apply_mixin_id(
        &mut self,
        id: u32,
        args: Args,
        content: Option<&ContentBlock>,
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let callable = self.callables[id as usize].clone();
        match callable {
            Callable::UserMixin(mixin) => {
                let closure = content.map(|block| ContentClosure {
                    block: block.clone(),
                    global: self.frame().env.global_scope(),
                    captured: self.frame().env.capture(),
                    namespaces: self.frame().namespaces.clone(),
                    globals: self.frame().globals.clone(),
                    depth: self.content_stack.len(),
                });
                self.content_stack.push(closure);
                let result = self.run_callable_body(&mixin, args, span, out);
                self.content_stack.pop();
                result.map_err(|mut err| {
                    err.push_frame(format!("mixin {}", mixin.name), span, mixin.url.as_ref());
                    err
                })
            }
            Callable::BuiltinMixin(_, f) => {
                let mut args = args;
                f(self, &mut args).map_err(|err| err.with_span(span))?;
                out.hoisted.append(&mut self.pending_css);
                Ok(())
            }
            other => Err(SassError::runtime(
                format!("{} is a function, not a mixin.", other.name()),
                span,
            )),
        }
    }

    /// Swap the frame into a callable's definition context, run `f`,
    /// swap back.
    fn in_callable_context<T>(
        &mut self,
        global: LocalScope<Scope>,
        captured: LocalScope<Scope>,
        namespaces: FxHashMap<String, Arc<Module>>,
        globals: Vec<Arc<Module>>,
        f: impl FnOnce(&mut Self) -> SassResult<T>,
    ) -> SassResult<T> {
        let mut env = Environment::for_closure(global, captured);
        env.push_scope();
        let frame = self.frame_mut();
        let saved_env = std::mem::replace(&mut frame.env, env);
        let saved_namespaces = std::mem::replace(&mut frame.namespaces, namespaces);
        let saved_globals = std::mem::replace(&mut frame.globals, globals);
        let result = f(self);
        let frame = self.frame_mut();
        frame.env = saved_env;
        frame.namespaces = saved_namespaces;
        frame.globals = saved_globals;
        result
    }

    /// Run a user mixin body (CSS-producing) in its definition context.
    fn run_callable_body(
        &mut self,
        callable: &UserCallable,
        args: Args,
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let arguments = callable.arguments.clone();
        let body = callable.body.clone();
        self.in_callable_context(
            callable.global.clone(),
            callable.captured.clone(),
            callable.namespaces.clone(),
            callable.globals.clone(),
            |ev| {
                ev.bind_user_arguments(&arguments, args, span)?;
                ev.visit_children_into(&body, false, out)
            },
        )
    }

    fn visit_content(
        &mut self,
        arguments: &ArgumentInvocation,
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let closure = match self.content_stack.last() {
            Some(Some(closure)) => ContentClosure {
                block: closure.block.clone(),
                global: closure.global.clone(),
                captured: closure.captured.clone(),
                namespaces: closure.namespaces.clone(),
                globals: closure.globals.clone(),
                depth: closure.depth,
            },
            // No content block passed: @content produces nothing.
            _ => return Ok(()),
        };
        let args = self.evaluate_invocation(arguments)?;
        // The block sees only the closures that were visible where it
        // was written.
        let tail = self.content_stack.split_off(closure.depth);
        let result = self.in_callable_context(
            closure.global,
            closure.captured,
            closure.namespaces,
            closure.globals,
            |ev| {
                ev.bind_user_arguments(&closure.block.arguments, args, span)?;
                ev.visit_children_into(&closure.block.body, false, out)
            },
        );
        self.content_stack.extend(tail);
        result
    }

    // Calls

    fn evaluate_invocation(&mut self, invocation: &ArgumentInvocation) -> SassResult<Args> {
        let mut positional = Vec::with_capacity(invocation.positional.len());
        for expr in &invocation.positional {
            positional.push(self.visit_expr(expr)?);
        }
        let mut named = FxHashMap::default();
        for (name, expr) in &invocation.named {
            named.insert(norm(name), self.visit_expr(expr)?);
        }
        let mut separator = ListSeparator::Comma;
        let had_rest = invocation.rest.is_some();
        if let Some(rest) = &invocation.rest {
            match self.visit_expr(rest)? {
                Value::ArgList(list) => {
                    separator = list.separator();
                    positional.extend(list.elements().iter().cloned());
                    for (name, value) in list.keywords() {
                        named.insert(norm(name), value.clone());
                    }
                }
                Value::Map(map) => add_named_from_map(&map, &mut named, invocation.span)?,
                Value::List(list) => {
                    separator = list.separator();
                    positional.extend(list.elements().iter().cloned());
                }
                other => positional.push(other),
            }
        }
        let had_keyword_rest = invocation.keyword_rest.is_some();
        if let Some(keyword_rest) = &invocation.keyword_rest {
            let value = self.visit_expr(keyword_rest)?;
            let map = value
                .assert_map(None)
                .map_err(|err| err.with_span(invocation.span))?;
            add_named_from_map(&map, &mut named, invocation.span)?;
        }
        Args::new(
            positional,
            named,
            separator,
            invocation.span,
            had_rest,
            had_keyword_rest,
        )
    }

    /// Bind evaluated arguments into the current (callee) scope.
    /// Defaults evaluate progressively in that scope, so later defaults
    /// see earlier parameters.
    fn bind_user_arguments(
        &mut self,
        declaration: &ArgumentDeclaration,
        mut args: Args,
        span: Span,
    ) -> SassResult<()> {
        for parameter in &declaration.parameters {
            let name = norm(&parameter.name);
            match args.get_optional(&name) {
                Some(value) => self.frame_mut().env.set_variable(&name, value),
                None => match &parameter.default {
                    Some(default) => {
                        let value = self.visit_expr(default)?;
                        self.frame_mut().env.set_variable(&name, value);
                    }
                    None => {
                        return Err(SassError::runtime(
                            format!("Missing argument ${name}."),
                            span,
                        ))
                    }
                },
            }
        }
        if let Some(rest_name) = &declaration.rest {
            let (rest, named) = args.take_rest();
            let mut keywords: Vec<(String, Value)> = named.into_iter().collect();
            keywords.sort_by(|(a, _), (b, _)| a.cmp(b));
            let arglist = ArgList::new(rest, args.separator, keywords);
            self.frame_mut()
                .env
                .set_variable(&norm(rest_name), Value::ArgList(arglist));
        } else {
            args.check_exhausted().map_err(|err| err.with_span(span))?;
        }
        Ok(())
    }

    pub(crate) fn apply_function_id(&mut self, id: u32, args: Args) -> SassResult<Value> {
        let callable = self.callables[id as usize].clone();
        let span = args.span;
        match callable {
            Callable::UserFunction(function) => {
                let arguments = function.arguments.clone();
                let body = function.body.clone();
                let result = self.in_callable_context(
                    function.global.clone(),
                    function.captured.clone(),
                    function.namespaces.clone(),
                    function.globals.clone(),
                    |ev| {
                        ev.bind_user_arguments(&arguments, args, span)?;
                        ev.exec_stmts_for_value(&body)
                    },
                );
                match result {
                    Ok(Some(value)) => Ok(value),
                    Ok(None) => Err(SassError::runtime(
                        format!("Function {} finished without @return.", function.name),
                        span,
                    )),
                    Err(mut err) => {
                        err.push_frame(
                            format!("function {}", function.name),
                            span,
                            function.url.as_ref(),
                        );
                        Err(err)
                    }
                }
            }
            Callable::BuiltinFunction(_, f) => {
                let mut args = args;
                f(self, &mut args).map_err(|err| err.with_span(span))
            }
            Callable::HostFunction(_, f) => {
                let mut args = args;
                let (positional, named) = args.take_rest();
                if let Some(name) = named.keys().next() {
                    return Err(SassError::runtime(
                        format!("No argument named ${name}."),
                        span,
                    ));
                }
                f(&positional).map_err(|err| err.with_span(span))
            }
            other => Err(SassError::runtime(
                format!("{} is a mixin, not a function.", other.name()),
                span,
            )),
        }
    }

    // Function-context statement execution (`@function` bodies)

    fn exec_stmts_for_value(&mut self, stmts: &[Stmt]) -> SassResult<Option<Value>> {
        for stmt in stmts {
            match stmt {
                Stmt::Return { value, .. } => return Ok(Some(self.visit_expr(value)?)),
                Stmt::VariableDecl {
                    name,
                    namespace,
                    value,
                    default,
                    global,
                    span,
                } => {
                    self.visit_variable_decl(
                        name,
                        namespace.as_deref(),
                        value,
                        *default,
                        *global,
                        *span,
                    )?;
                }
                Stmt::If {
                    clauses, else_body, ..
                } => {
                    let mut chosen: Option<&[Stmt]> = None;
                    for clause in clauses {
                        if self.visit_expr(&clause.condition)?.is_truthy() {
                            chosen = Some(&clause.body);
                            break;
                        }
                    }
                    let chosen = chosen.or(else_body.as_deref());
                    if let Some(body) = chosen {
                        if let Some(value) = self.exec_block_for_value(body)? {
                            return Ok(Some(value));
                        }
                    }
                }
                Stmt::Each {
                    variables, list, body, ..
                } => {
                    let elements = self.visit_expr(list)?.as_list();
                    self.frame_mut().env.push_scope();
                    for element in &elements {
                        self.bind_each(variables, element);
                        match self.exec_stmts_for_value(body) {
                            Ok(None) => {}
                            other => {
                                self.frame_mut().env.pop_scope();
                                return other;
                            }
                        }
                    }
                    self.frame_mut().env.pop_scope();
                }
                Stmt::For {
                    variable,
                    from,
                    to,
                    inclusive,
                    body,
                    span,
                } => {
                    let (values, units) = self.for_bounds(from, to, *inclusive, *span)?;
                    let name = norm(variable);
                    self.frame_mut().env.push_scope();
                    for value in values {
                        let number = match &units {
                            Some(unit) => Number::with_unit(value, unit.clone()),
                            None => Number::unitless(value),
                        };
                        self.frame_mut()
                            .env
                            .set_variable(&name, Value::Number(number));
                        match self.exec_stmts_for_value(body) {
                            Ok(None) => {}
                            other => {
                                self.frame_mut().env.pop_scope();
                                return other;
                            }
                        }
                    }
                    self.frame_mut().env.pop_scope();
                }
                Stmt::While {
                    condition, body, ..
                } => {
                    while self.visit_expr(condition)?.is_truthy() {
                        if let Some(value) = self.exec_block_for_value(body)? {
                            return Ok(Some(value));
                        }
                    }
                }
                Stmt::Warn { expr, span } => {
                    let value = self.visit_expr(expr)?;
                    let message = match &value {
                        Value::String(string) => string.text.clone(),
                        other => inspect(other),
                    };
                    let url = self.frame().url.clone();
                    self.dispatcher.warn(message, Some(*span), url.as_ref());
                }
                Stmt::Debug { expr, span } => {
                    let value = self.visit_expr(expr)?;
                    let url = self.frame().url.clone();
                    self.dispatcher.debug(&inspect(&value), *span, url.as_ref());
                }
                Stmt::Error { expr, span } => {
                    let value = self.visit_expr(expr)?;
                    return Err(SassError::runtime(inspect(&value), *span));
                }
                Stmt::FunctionDecl {
                    name,
                    arguments,
                    body,
                    ..
                } => self.define_callable(name, arguments, body, false),
                Stmt::MixinDecl {
                    name,
                    arguments,
                    body,
                    ..
                } => self.define_callable(name, arguments, body, true),
                other => {
                    return Err(SassError::runtime(
                        "This at-rule is not allowed here.",
                        other.span(),
                    ))
                }
            }
        }
        Ok(None)
    }

    fn exec_block_for_value(&mut self, stmts: &[Stmt]) -> SassResult<Option<Value>> {
        self.frame_mut().env.push_scope();
        let result = self.exec_stmts_for_value(stmts);
        self.frame_mut().env.pop_scope();
        result
    }

    // Loops (CSS context)

    fn visit_each(
        &mut self,
        variables: &[String],
        list: &Expr,
        body: &[Stmt],
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let elements = self.visit_expr(list)?.as_list();
        self.frame_mut().env.push_scope();
        let mut result = Ok(());
        for element in &elements {
            self.bind_each(variables, element);
            result = self.visit_children_into(body, false, out);
            if result.is_err() {
                break;
            }
        }
        self.frame_mut().env.pop_scope();
        result
    }

    fn bind_each(&mut self, variables: &[String], element: &Value) {
        if let [single] = variables {
            let name = norm(single);
            self.frame_mut().env.set_variable(&name, element.clone());
            return;
        }
        let parts = element.as_list();
        for (idx, variable) in variables.iter().enumerate() {
            let value = parts.get(idx).cloned().unwrap_or(Value::Null);
            self.frame_mut().env.set_variable(&norm(variable), value);
        }
    }

    fn visit_for(
        &mut self,
        variable: &str,
        from: &Expr,
        to: &Expr,
        inclusive: bool,
        body: &[Stmt],
        span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let (values, units) = self.for_bounds(from, to, inclusive, span)?;
        let name = norm(variable);
        self.frame_mut().env.push_scope();
        let mut result = Ok(());
        for value in values {
            let number = match &units {
                Some(unit) => Number::with_unit(value, unit.clone()),
                None => Number::unitless(value),
            };
            self.frame_mut()
                .env
                .set_variable(&name, Value::Number(number));
            result = self.visit_children_into(body, false, out);
            if result.is_err() {
                break;
            }
        }
        self.frame_mut().env.pop_scope();
        result
    }

    /// Integer bound sequence for `@for`, in the `from` operand's unit.
    /// Descending ranges count down; `through` includes the end bound.
    fn for_bounds(
        &mut self,
        from: &Expr,
        to: &Expr,
        inclusive: bool,
        span: Span,
    ) -> SassResult<(Vec<f64>, Option<String>)> {
        let from_value = self.visit_expr(from)?;
        let to_value = self.visit_expr(to)?;
        let from_number = from_value
            .assert_number(Some("from"))
            .map_err(|err| err.with_span(span))?;
        let to_number = to_value
            .assert_number(Some("to"))
            .map_err(|err| err.with_span(span))?;

        let to_converted = if from_number.is_unitless() || to_number.is_unitless() {
            to_number.value
        } else {
            from_number.coerce_value(to_number).ok_or_else(|| {
                SassError::runtime(
                    format!(
                        "Incompatible units {} and {}.",
                        from_number.unit_string(),
                        to_number.unit_string()
                    ),
                    span,
                )
            })?
        };
        let start = from_number
            .as_int()
            .ok_or_else(|| SassError::runtime(format!("{from_number} is not an int."), span))?;
        let end = Number::unitless(to_converted)
            .as_int()
            .ok_or_else(|| SassError::runtime(format!("{to_number} is not an int."), span))?;

        let mut values = Vec::new();
        if start <= end {
            let stop = if inclusive { end + 1 } else { end };
            for value in start..stop {
                values.push(value as f64);
            }
        } else {
            let stop = if inclusive { end - 1 } else { end };
            let mut value = start;
            while value > stop {
                values.push(value as f64);
                value -= 1;
            }
        }
        let units = from_number.numerator_units().first().cloned();
        Ok((values, units))
    }

    // At-rules

    fn visit_at_rule(
        &mut self,
        name: &Interpolation,
        prelude: Option<&Interpolation>,
        body: Option<&[Stmt]>,
        _span: Span,
        out: &mut BlockOut,
    ) -> SassResult<()> {
        let name_text = self.interpolate(name)?;
        let prelude_text = match prelude {
            Some(prelude) => self.interpolate(prelude)?,
            None => String::new(),
        };
        match body {
            None => {
                out.hoisted.push(CssStmt::AtRule {
                    name: name_text,
                    prelude: prelude_text,
                    body: None,
                });
                Ok(())
            }
            Some(stmts) => {
                self.at_rule_depth += 1;
                let inner = self.visit_children(stmts, true);
                self.at_rule_depth -= 1;
                let inner = inner?;
                let mut content = Vec::new();
                if !inner.decls.is_empty() {
                    match self.selector_stack.last() {
                        // Inside a style rule the declarations re-wrap
                        // under the enclosing selector (`a { @media ...`).
                        Some(selector) => content.push(CssStmt::Rule {
                            selector: selector.clone(),
                            body: inner.decls,
                        }),
                        // `@font-face` and friends carry bare
                        // declarations.
                        None => content.extend(inner.decls),
                    }
                }
                content.extend(inner.hoisted);
                out.hoisted.push(CssStmt::AtRule {
                    name: name_text,
                    prelude: prelude_text,
                    body: Some(content),
                });
                Ok(())
            }
        }
    }

    // Expressions

    pub(crate) fn visit_expr(&mut self, expr: &Expr) -> SassResult<Value> {
        match expr {
            Expr::Null(_) => Ok(Value::Null),
            Expr::Boolean(value, _) => Ok(Value::bool(*value)),
            Expr::Number { value, unit, .. } => Ok(match unit {
                Some(unit) => Value::Number(Number::with_unit(*value, unit.clone())),
                None => Value::number(*value),
            }),
            Expr::Color {
                red,
                green,
                blue,
                alpha,
                ..
            } => Ok(Value::Color(Color::from_rgba(
                f64::from(*red),
                f64::from(*green),
                f64::from(*blue),
                *alpha,
            ))),
            Expr::String {
                contents, quoted, ..
            } => {
                let text = self.interpolate(contents)?;
                Ok(Value::String(SassString {
                    text,
                    quoted: *quoted,
                }))
            }
            Expr::Variable {
                name,
                namespace,
                span,
            } => self.lookup_variable(name, namespace.as_deref(), *span),
            Expr::List {
                elements,
                separator,
                brackets,
                ..
            } => {
                let mut values = Vec::with_capacity(elements.len());
                for element in elements {
                    values.push(self.visit_expr(element)?);
                }
                Ok(Value::List(SassList::new(values, *separator, *brackets)))
            }
            Expr::Map { pairs, span } => {
                let mut entries: Vec<(Value, Value)> = Vec::with_capacity(pairs.len());
                for (key_expr, value_expr) in pairs {
                    let key = self.visit_expr(key_expr)?;
                    if entries.iter().any(|(existing, _)| *existing == key) {
                        return Err(SassError::runtime(
                            format!("Duplicate key {}.", inspect(&key)),
                            *span,
                        ));
                    }
                    let value = self.visit_expr(value_expr)?;
                    entries.push((key, value));
                }
                Ok(Value::Map(SassMap::new(entries)))
            }
            Expr::Paren(inner, span) => {
                let value = self.visit_expr(inner)?;
                match value {
                    Value::Number(number) if number.as_slash().is_some() => {
                        self.warn_slash_division(*span);
                        Ok(Value::Number(number.without_slash()))
                    }
                    other => Ok(other),
                }
            }
            Expr::UnaryOp { op, operand, span } => {
                let value = self.visit_expr(operand)?;
                evaluate_unary(*op, value).map_err(|err| err.with_span(*span))
            }
            Expr::BinaryOp {
                op,
                left,
                right,
                span,
            } => self.visit_binary(*op, left, right, *span),
            Expr::FunctionCall {
                name,
                namespace,
                args,
                span,
            } => self.visit_function_call(name, namespace.as_deref(), args, *span),
            Expr::InterpolatedFunction {
                name,
                arguments,
                span: _,
            } => {
                let name_text = self.interpolate(name)?;
                let args_text = self.interpolate(arguments)?;
                let lower = name_text.to_ascii_lowercase();
                if matches!(lower.as_str(), "calc" | "clamp") && args_text.len() >= 2 {
                    // The raw text includes the outer parens.
                    let inner = &args_text[1..args_text.len() - 1];
                    return Ok(Value::Calculation(Calculation::new(
                        lower,
                        vec![CalcArg::Text(inner.to_string())],
                    )));
                }
                Ok(Value::unquoted_string(format!("{name_text}{args_text}")))
            }
        }
    }

    fn visit_binary(
        &mut self,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
        span: Span,
    ) -> SassResult<Value> {
        match op {
            BinaryOp::And => {
                let left = self.visit_expr(left)?;
                if left.is_truthy() {
                    self.visit_expr(right)
                } else {
                    Ok(left)
                }
            }
            BinaryOp::Or => {
                let left = self.visit_expr(left)?;
                if left.is_truthy() {
                    Ok(left)
                } else {
                    self.visit_expr(right)
                }
            }
            BinaryOp::Div => {
                let slash_form = slash_safe(left) && slash_safe(right);
                let left = self.visit_expr(left)?;
                let right = self.visit_expr(right)?;
                let result = evaluate_binary(op, left, right)
                    .map_err(|err| err.with_span(span))?;
                match result {
                    Value::Number(number) if number.as_slash().is_some() && !slash_form => {
                        // Division was meant: the slash rendering is
                        // dropped and the deprecated reading reported.
                        self.warn_slash_division(span);
                        Ok(Value::Number(number.without_slash()))
                    }
                    other => Ok(other),
                }
            }
            _ => {
                let left = self.visit_expr(left)?;
                let right = self.visit_expr(right)?;
                evaluate_binary(op, left, right).map_err(|err| err.with_span(span))
            }
        }
    }

    fn warn_slash_division(&mut self, span: Span) {
        self.warn_deprecation(
            Deprecation::SlashDiv,
            "Using / for division is deprecated; use math.div instead.",
            span,
        );
    }

    fn lookup_variable(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        span: Span,
    ) -> SassResult<Value> {
        let name = norm(name);
        if let Some(namespace) = namespace {
            let module = self.module_by_namespace(&norm(namespace), span)?;
            return module.variables.get(&name).cloned().ok_or_else(|| {
                SassError::runtime(
                    format!("Undefined variable {namespace}.${name}."),
                    span,
                )
            });
        }
        if let Some(value) = self.frame().env.get_variable(&name) {
            return Ok(value);
        }
        for module in self.frame().globals.iter().rev() {
            if let Some(value) = module.variables.get(&name) {
                return Ok(value.clone());
            }
        }
        Err(SassError::runtime(
            format!("Undefined variable ${name}."),
            span,
        ))
    }

    fn visit_function_call(
        &mut self,
        name: &str,
        namespace: Option<&str>,
        invocation: &ArgumentInvocation,
        span: Span,
    ) -> SassResult<Value> {
        let normalized = norm(name);
        // if() is a special form: only the selected branch evaluates.
        if namespace.is_none() && normalized == "if" {
            if invocation.positional.len() != 3
                || !invocation.named.is_empty()
                || invocation.rest.is_some()
            {
                return Err(SassError::runtime(
                    "if() expects exactly three positional arguments.",
                    span,
                ));
            }
            let condition = self.visit_expr(&invocation.positional[0])?;
            let branch = if condition.is_truthy() {
                &invocation.positional[1]
            } else {
                &invocation.positional[2]
            };
            return self.visit_expr(branch);
        }

        match self.resolve_function(&normalized, namespace) {
            Some(id) => {
                let args = self.evaluate_invocation(invocation)?;
                self.apply_function_id(id, args)
                    .map_err(|err| err.with_span(span))
            }
            None => {
                if let Some(namespace) = namespace {
                    return Err(SassError::runtime(
                        format!("Undefined function {namespace}.{name}."),
                        span,
                    ));
                }
                // An unknown plain-CSS-looking function renders as a
                // CSS function call.
                if !invocation.named.is_empty() || invocation.keyword_rest.is_some() {
                    return Err(SassError::runtime(
                        "Plain CSS functions don't support keyword arguments.",
                        span,
                    ));
                }
                let mut rendered = Vec::with_capacity(invocation.positional.len());
                for expr in &invocation.positional {
                    let value = self.visit_expr(expr)?;
                    rendered.push(to_css(&value, false).map_err(|err| err.with_span(span))?);
                }
                if let Some(rest) = &invocation.rest {
                    for value in self.visit_expr(rest)?.as_list() {
                        rendered.push(to_css(&value, false).map_err(|err| err.with_span(span))?);
                    }
                }
                Ok(Value::unquoted_string(format!(
                    "{name}({})",
                    rendered.join(", ")
                )))
            }
        }
    }

    // Member resolution shared with the `sass:meta` built-ins

    pub(crate) fn resolve_function(&self, name: &str, namespace: Option<&str>) -> Option<u32> {
        let name = norm(name);
        match namespace {
            Some(namespace) => self
                .frame()
                .namespaces
                .get(&norm(namespace))
                .and_then(|module| module.functions.get(&name).copied()),
            None => self
                .frame()
                .env
                .get_function(&name)
                .or_else(|| {
                    self.frame()
                        .globals
                        .iter()
                        .rev()
                        .find_map(|module| module.functions.get(&name).copied())
                })
                .or_else(|| self.global_functions.get(&name).copied()),
        }
    }

    pub(crate) fn resolve_mixin(&self, name: &str, namespace: Option<&str>) -> Option<u32> {
        let name = norm(name);
        match namespace {
            Some(namespace) => self
                .frame()
                .namespaces
                .get(&norm(namespace))
                .and_then(|module| module.mixins.get(&name).copied()),
            None => self
                .frame()
                .env
                .get_mixin(&name)
                .or_else(|| {
                    self.frame()
                        .globals
                        .iter()
                        .rev()
                        .find_map(|module| module.mixins.get(&name).copied())
                })
                .or_else(|| self.global_mixins.get(&name).copied()),
        }
    }

    pub(crate) fn module_by_namespace(
        &self,
        namespace: &str,
        span: Span,
    ) -> SassResult<Arc<Module>> {
        self.frame()
            .namespaces
            .get(&norm(namespace))
            .cloned()
            .ok_or_else(|| {
                SassError::runtime(
                    format!("There is no module with the namespace \"{namespace}\"."),
                    span,
                )
            })
    }

    pub(crate) fn variable_exists(&self, name: &str) -> bool {
        let name = norm(name);
        self.frame().env.get_variable(&name).is_some()
            || self
                .frame()
                .globals
                .iter()
                .any(|module| module.variables.contains_key(&name))
    }

    /// A callable that renders as a plain CSS function call, for
    /// `meta.get-function($css: true)`.
    pub(crate) fn plain_css_function_id(&mut self, name: &str) -> u32 {
        if let Some(id) = self.plain_css_fns.get(name) {
            return *id;
        }
        let rendered_name = name.to_string();
        let f: HostFn = Arc::new(move |args: &[Value]| {
            let mut parts = Vec::with_capacity(args.len());
            for value in args {
                parts.push(to_css(value, false)?);
            }
            Ok(Value::unquoted_string(format!(
                "{rendered_name}({})",
                parts.join(", ")
            )))
        });
        let id = self.add_callable(Callable::HostFunction(name.to_string(), f));
        self.plain_css_fns.insert(name.to_string(), id);
        id
    }

    // Interpolation

    pub(crate) fn interpolate(&mut self, interpolation: &Interpolation) -> SassResult<String> {
        let mut out = String::new();
        for part in &interpolation.parts {
            match part {
                InterpolationPart::Text(text) => out.push_str(text),
                InterpolationPart::Expr(expr) => {
                    let value = self.visit_expr(expr)?;
                    out.push_str(
                        &serialize_interpolated(&value)
                            .map_err(|err| err.with_span(expr.span()))?,
                    );
                }
            }
        }
        Ok(out)
    }
}

/// Rest-map expansion: every key must be a string naming an argument.
fn add_named_from_map(
    map: &SassMap,
    named: &mut FxHashMap<String, Value>,
    span: Span,
) -> SassResult<()> {
    for (key, value) in map.entries() {
        match key {
            Value::String(string) => {
                named.insert(norm(&string.text), value.clone());
            }
            other => {
                return Err(SassError::runtime(
                    format!(
                        "Variable keyword argument map must have string keys; {} is not a string.",
                        inspect(other)
                    ),
                    span,
                ))
            }
        }
    }
    Ok(())
}

/// Interpolated values render like CSS, except strings drop their
/// quotes and null contributes nothing.
fn serialize_interpolated(value: &Value) -> SassResult<String> {
    match value {
        Value::String(string) => Ok(string.text.clone()),
        Value::Null => Ok(String::new()),
        other => to_css(other, false),
    }
}

/// Whether a division operand keeps the slash rendering: number and
/// variable literals do (`font: 12px/30px`, `$a/$b`), anything computed
/// forces real division.
fn slash_safe(expr: &Expr) -> bool {
    match expr {
        Expr::Number { .. } | Expr::Variable { .. } => true,
        Expr::BinaryOp {
            op: BinaryOp::Div,
            left,
            right,
            ..
        } => slash_safe(left) && slash_safe(right),
        _ => false,
    }
}

/// Collapse selector whitespace (newlines, runs of spaces) to single
/// spaces.
fn normalize_selector(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
