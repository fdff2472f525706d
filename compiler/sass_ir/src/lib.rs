//! Sass IR - Syntax tree, spans, and source identifiers for the Sass
//! compiler.
//!
//! This crate is the shared vocabulary of the compiler: byte-offset
//! [`Span`]s, canonical [`SourceUrl`] identifiers, the [`Syntax`] kinds,
//! and the stylesheet AST produced by `sass_parse` and walked by
//! `sass_eval`.

mod ast;
mod span;
mod syntax;
mod url;

pub use ast::{
    ArgumentDeclaration, ArgumentInvocation, BinaryOp, ConfiguredVariable, ContentBlock, Expr,
    ForwardRule, ForwardVisibility, IfClause, ImportArg, ImportRule, Interpolation,
    InterpolationPart, ListSeparator, Parameter, Stmt, Stylesheet, UnaryOp, UseNamespace, UseRule,
};
pub use span::Span;
pub use syntax::{StylesheetSource, Syntax};
pub use url::{has_scheme, module_namespace, SourceUrl, UrlError};
