//! The compilation error carrier.
//!
//! One error type flows out of every phase. The kind distinguishes the
//! observable failure classes; the trace accumulates mixin and function
//! frames as the error propagates out of the evaluator.

use std::fmt;

use sass_ir::{SourceUrl, Span, UrlError};

/// Result alias used at every crate boundary.
pub type SassResult<T> = Result<T, SassError>;

/// The observable class of a compilation failure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Syntactically invalid input.
    Parse,
    /// User-visible SassScript failure: type, unit, index, arity,
    /// unknown member.
    Runtime,
    /// No importer claimed a reference, or a claimed load failed.
    Resolver,
    /// A `@use`/`@forward` loop.
    Cycle,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorKind::Parse => f.write_str("parse error"),
            ErrorKind::Runtime => f.write_str("error"),
            ErrorKind::Resolver => f.write_str("error"),
            ErrorKind::Cycle => f.write_str("error"),
        }
    }
}

/// One frame of the Sass stack trace: the mixin or function being
/// executed and where it was entered.
#[derive(Clone, Debug, PartialEq)]
pub struct TraceFrame {
    /// `mixin corner` / `function scale` / `@import`.
    pub name: String,
    pub span: Span,
    pub url: Option<SourceUrl>,
}

/// A compilation failure.
#[derive(Clone, Debug, PartialEq)]
pub struct SassError {
    pub kind: ErrorKind,
    pub message: String,
    /// Where in the source the failure was observed.
    pub span: Option<Span>,
    /// The stylesheet the span points into.
    pub url: Option<SourceUrl>,
    /// Innermost frame first.
    pub trace: Vec<TraceFrame>,
}

impl SassError {
    /// A parse error at a span.
    pub fn parse(message: impl Into<String>, span: Span) -> Self {
        SassError {
            kind: ErrorKind::Parse,
            message: message.into(),
            span: Some(span),
            url: None,
            trace: Vec::new(),
        }
    }

    /// A runtime SassScript error at a span.
    pub fn runtime(message: impl Into<String>, span: Span) -> Self {
        SassError {
            kind: ErrorKind::Runtime,
            message: message.into(),
            span: Some(span),
            url: None,
            trace: Vec::new(),
        }
    }

    /// A runtime error with no useful span (value-algebra assertions
    /// pick up a span as they propagate).
    pub fn no_span(message: impl Into<String>) -> Self {
        SassError {
            kind: ErrorKind::Runtime,
            message: message.into(),
            span: None,
            url: None,
            trace: Vec::new(),
        }
    }

    /// A resolver failure.
    pub fn resolver(message: impl Into<String>) -> Self {
        SassError {
            kind: ErrorKind::Resolver,
            message: message.into(),
            span: None,
            url: None,
            trace: Vec::new(),
        }
    }

    /// A module cycle.
    pub fn cycle(message: impl Into<String>) -> Self {
        SassError {
            kind: ErrorKind::Cycle,
            message: message.into(),
            span: None,
            url: None,
            trace: Vec::new(),
        }
    }

    /// Attach a span if none is present yet.
    #[must_use]
    pub fn with_span(mut self, span: Span) -> Self {
        if self.span.is_none() {
            self.span = Some(span);
        }
        self
    }

    /// Attach the owning stylesheet if none is present yet.
    #[must_use]
    pub fn with_url(mut self, url: &SourceUrl) -> Self {
        if self.url.is_none() {
            self.url = Some(url.clone());
        }
        self
    }

    /// Push a trace frame; frames accumulate innermost-first.
    pub fn push_frame(&mut self, name: impl Into<String>, span: Span, url: Option<&SourceUrl>) {
        self.trace.push(TraceFrame {
            name: name.into(),
            span,
            url: url.cloned(),
        });
    }
}

impl From<UrlError> for SassError {
    fn from(err: UrlError) -> Self {
        SassError::resolver(err.to_string())
    }
}

impl fmt::Display for SassError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind, self.message)?;
        if let Some(url) = &self.url {
            write!(f, "\n  {url}")?;
            if let Some(span) = self.span {
                write!(f, " {}..{}", span.start, span.end)?;
            }
        }
        for frame in &self.trace {
            write!(f, "\n  from {}", frame.name)?;
        }
        Ok(())
    }
}

impl std::error::Error for SassError {}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_trace_accumulates_innermost_first() {
        let mut err = SassError::runtime("1px + 1s is incompatible", Span::new(4, 12));
        err.push_frame("function scale", Span::new(30, 44), None);
        err.push_frame("mixin frame", Span::new(60, 72), None);
        assert_eq!(err.trace[0].name, "function scale");
        assert_eq!(err.trace[1].name, "mixin frame");
    }

    #[test]
    fn test_with_span_keeps_existing() {
        let err = SassError::runtime("boom", Span::new(1, 2)).with_span(Span::new(9, 10));
        assert_eq!(err.span, Some(Span::new(1, 2)));
    }
}
