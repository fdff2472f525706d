//! Interpolated text: alternating literal runs and `#{...}` expressions.

use crate::{Expr, Span};

/// One segment of an interpolation.
#[derive(Clone, Debug, PartialEq)]
pub enum InterpolationPart {
    /// Literal text copied through verbatim.
    Text(String),
    /// An embedded `#{...}` expression.
    Expr(Expr),
}

/// Interpolated text, as it appears in selectors, identifiers, quoted
/// strings, and at-rule preludes.
#[derive(Clone, Debug, PartialEq)]
pub struct Interpolation {
    pub parts: Vec<InterpolationPart>,
    pub span: Span,
}

impl Interpolation {
    /// An interpolation consisting of one literal run.
    pub fn plain(text: impl Into<String>, span: Span) -> Self {
        Interpolation {
            parts: vec![InterpolationPart::Text(text.into())],
            span,
        }
    }

    /// An empty interpolation.
    pub fn empty(span: Span) -> Self {
        Interpolation { parts: Vec::new(), span }
    }

    /// If this interpolation has no expression segments, its literal text.
    pub fn as_plain(&self) -> Option<&str> {
        match self.parts.as_slice() {
            [] => Some(""),
            [InterpolationPart::Text(text)] => Some(text),
            _ => None,
        }
    }

    /// Whether any segment is an expression.
    pub fn is_dynamic(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, InterpolationPart::Expr(_)))
    }

    /// Append a literal run, merging with a trailing text segment.
    pub fn push_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        if let Some(InterpolationPart::Text(last)) = self.parts.last_mut() {
            last.push_str(text);
        } else {
            self.parts.push(InterpolationPart::Text(text.to_string()));
        }
    }

    /// Append an expression segment.
    pub fn push_expr(&mut self, expr: Expr) {
        self.parts.push(InterpolationPart::Expr(expr));
    }
}
