//! The CSS output tree.
//!
//! The evaluator builds this tree; nesting has already been resolved by
//! then, so a style rule's body holds declarations and comments, and
//! only at-rules (`@media`, `@supports`) still contain rules.

use sass_value::Value;

/// A statement in the CSS output.
#[derive(Clone, Debug, PartialEq)]
pub enum CssStmt {
    /// A style rule with a finished selector.
    Rule {
        selector: String,
        body: Vec<CssStmt>,
    },
    /// An at-rule; `body: None` means it ends with a semicolon.
    AtRule {
        name: String,
        prelude: String,
        body: Option<Vec<CssStmt>>,
    },
    /// A property declaration.
    Declaration {
        name: String,
        value: Value,
        /// Custom properties (`--x`) serialize their value verbatim and
        /// survive with empty-ish values.
        custom: bool,
    },
    /// A loud comment, including its delimiters.
    Comment { text: String },
}

impl CssStmt {
    /// Whether this statement produces no output and can be dropped:
    /// rules and bodied at-rules with nothing visible inside.
    pub fn is_invisible(&self) -> bool {
        match self {
            CssStmt::Rule { body, .. } => body.iter().all(CssStmt::is_invisible),
            CssStmt::AtRule {
                body: Some(body), ..
            } => body.iter().all(CssStmt::is_invisible),
            CssStmt::AtRule { body: None, .. }
            | CssStmt::Declaration { .. }
            | CssStmt::Comment { .. } => false,
        }
    }
}

/// The root of a stylesheet's CSS output.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CssTree {
    pub statements: Vec<CssStmt>,
}

impl CssTree {
    pub fn new() -> Self {
        CssTree::default()
    }

    /// Append another tree's statements (used by `@import` merging and
    /// `meta.load-css` splicing).
    pub fn extend_from(&mut self, other: &CssTree) {
        self.statements.extend(other.statements.iter().cloned());
    }
}
