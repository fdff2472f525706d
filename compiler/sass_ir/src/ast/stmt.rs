//! Stylesheet statement nodes.

use rustc_hash::FxHashSet;

use crate::{ArgumentDeclaration, ArgumentInvocation, Expr, Interpolation, Span};

/// A parsed stylesheet.
#[derive(Clone, Debug, PartialEq)]
pub struct Stylesheet {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

/// A statement in a stylesheet or a nested block.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// A style rule: selector plus nested body.
    StyleRule {
        selector: Interpolation,
        body: Vec<Stmt>,
        span: Span,
    },
    /// A property declaration. `body` is non-empty for nested property
    /// blocks (`font: { family: serif; }`).
    Declaration {
        name: Interpolation,
        value: Option<Expr>,
        body: Vec<Stmt>,
        span: Span,
    },
    /// `$name: value` with optional `!default` / `!global` flags and an
    /// optional `namespace.$name` target.
    VariableDecl {
        name: String,
        namespace: Option<String>,
        value: Expr,
        default: bool,
        global: bool,
        span: Span,
    },
    Use(UseRule),
    Forward(ForwardRule),
    Import(ImportRule),
    MixinDecl {
        name: String,
        arguments: ArgumentDeclaration,
        body: Vec<Stmt>,
        span: Span,
    },
    Include {
        name: String,
        namespace: Option<String>,
        arguments: ArgumentInvocation,
        /// The `using (...)` parameters and block body of a trailing
        /// content block.
        content: Option<ContentBlock>,
        span: Span,
    },
    /// `@content` inside a mixin body.
    Content {
        arguments: ArgumentInvocation,
        span: Span,
    },
    FunctionDecl {
        name: String,
        arguments: ArgumentDeclaration,
        body: Vec<Stmt>,
        span: Span,
    },
    Return {
        value: Expr,
        span: Span,
    },
    /// `@if` / `@else if` chain with an optional final `@else`.
    If {
        clauses: Vec<IfClause>,
        else_body: Option<Vec<Stmt>>,
        span: Span,
    },
    Each {
        /// Destructuring targets, names without `$`.
        variables: Vec<String>,
        list: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    For {
        variable: String,
        from: Expr,
        to: Expr,
        /// `through` includes the end bound, `to` excludes it.
        inclusive: bool,
        body: Vec<Stmt>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Vec<Stmt>,
        span: Span,
    },
    Warn {
        expr: Expr,
        span: Span,
    },
    Error {
        expr: Expr,
        span: Span,
    },
    Debug {
        expr: Expr,
        span: Span,
    },
    /// `@extend selector` with an optional `!optional` flag.
    Extend {
        selector: Interpolation,
        optional: bool,
        span: Span,
    },
    /// Any other at-rule (`@media`, `@supports`, `@font-face`, ...),
    /// passed through with its prelude and optional body.
    AtRule {
        name: Interpolation,
        prelude: Option<Interpolation>,
        body: Option<Vec<Stmt>>,
        span: Span,
    },
    /// `/* ... */` comment retained in the output.
    LoudComment {
        text: Interpolation,
        span: Span,
    },
}

/// One `@if` or `@else if` arm.
#[derive(Clone, Debug, PartialEq)]
pub struct IfClause {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// A content block trailing an `@include`.
#[derive(Clone, Debug, PartialEq)]
pub struct ContentBlock {
    /// `using ($params...)` declaration; empty when absent.
    pub arguments: ArgumentDeclaration,
    pub body: Vec<Stmt>,
    pub span: Span,
}

/// How a `@use` rule names its module.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UseNamespace {
    /// Derived from the URL's basename.
    Default,
    /// `as name`.
    Named(String),
    /// `as *` — members land in the current module's root.
    Global,
}

/// A variable set in a `with (...)` clause.
#[derive(Clone, Debug, PartialEq)]
pub struct ConfiguredVariable {
    /// Name without the `$`.
    pub name: String,
    pub value: Expr,
    /// `!default` flag, only legal in `@forward ... with`.
    pub guarded: bool,
    pub span: Span,
}

/// `@use "url" as ns with (...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct UseRule {
    pub url: String,
    pub namespace: UseNamespace,
    pub configuration: Vec<ConfiguredVariable>,
    pub span: Span,
}

/// `show` / `hide` member filters on a `@forward` rule.
///
/// Variable names (written with `$`) and mixin/function names are
/// independent sets, matching the two member namespaces they filter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ForwardVisibility {
    /// True for `show`, false for `hide`.
    pub show: bool,
    /// Filtered variable names, without the `$`.
    pub variables: FxHashSet<String>,
    /// Filtered mixin and function names.
    pub members: FxHashSet<String>,
}

impl ForwardVisibility {
    /// Whether a variable of this name passes the filter.
    pub fn allows_variable(&self, name: &str) -> bool {
        self.variables.contains(name) == self.show
    }

    /// Whether a mixin or function of this name passes the filter.
    pub fn allows_member(&self, name: &str) -> bool {
        self.members.contains(name) == self.show
    }
}

/// `@forward "url" as prefix-* show ... with (...)`.
#[derive(Clone, Debug, PartialEq)]
pub struct ForwardRule {
    pub url: String,
    /// `as prefix-*` member prefix.
    pub prefix: Option<String>,
    pub visibility: Option<ForwardVisibility>,
    pub configuration: Vec<ConfiguredVariable>,
    pub span: Span,
}

/// One target of an `@import` rule.
#[derive(Clone, Debug, PartialEq)]
pub enum ImportArg {
    /// A Sass import, resolved and merged at evaluation time.
    Dynamic { url: String, span: Span },
    /// A plain-CSS import (`url(...)`, a `.css` URL, or one with media
    /// queries), emitted verbatim.
    Static { contents: Interpolation, span: Span },
}

/// `@import "a", "b"`.
#[derive(Clone, Debug, PartialEq)]
pub struct ImportRule {
    pub imports: Vec<ImportArg>,
    pub span: Span,
}

impl Stmt {
    /// The source span of this statement.
    pub fn span(&self) -> Span {
        match self {
            Stmt::StyleRule { span, .. }
            | Stmt::Declaration { span, .. }
            | Stmt::VariableDecl { span, .. }
            | Stmt::MixinDecl { span, .. }
            | Stmt::Include { span, .. }
            | Stmt::Content { span, .. }
            | Stmt::FunctionDecl { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Each { span, .. }
            | Stmt::For { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Warn { span, .. }
            | Stmt::Error { span, .. }
            | Stmt::Debug { span, .. }
            | Stmt::Extend { span, .. }
            | Stmt::AtRule { span, .. }
            | Stmt::LoudComment { span, .. } => *span,
            Stmt::Use(rule) => rule.span,
            Stmt::Forward(rule) => rule.span,
            Stmt::Import(rule) => rule.span,
        }
    }
}
