//! The public compilation error.

use sass_diagnostic::{excerpt, SassError};

/// A failed compilation.
///
/// `formatted` is the user-facing rendering: the message, a caret
/// excerpt when the failing source is available, and the Sass stack
/// trace innermost-first. The structured error stays accessible for
/// programmatic callers.
#[derive(Debug, thiserror::Error)]
#[error("{formatted}")]
pub struct CompileError {
    pub formatted: String,
    #[source]
    pub inner: SassError,
}

impl CompileError {
    /// Format an error, excerpting `entry_source` when the failure
    /// points into the entry stylesheet (or into an unnamed one).
    pub(crate) fn new(
        inner: SassError,
        entry_source: Option<&str>,
        entry_url: Option<&sass_ir::SourceUrl>,
    ) -> Self {
        let mut formatted = format!("Error: {}", inner.message);
        if let (Some(span), Some(source)) = (inner.span, entry_source) {
            let in_entry = match (&inner.url, entry_url) {
                (None, _) => true,
                (Some(url), Some(entry)) => url == entry,
                (Some(_), None) => false,
            };
            if in_entry {
                formatted.push('\n');
                formatted.push_str(&excerpt(source, span));
            }
        }
        if let Some(url) = &inner.url {
            formatted.push_str(&format!("\n  {url}"));
        }
        for frame in &inner.trace {
            formatted.push_str(&format!("\n  from {}", frame.name));
            if let Some(url) = &frame.url {
                formatted.push_str(&format!(" ({url})"));
            }
        }
        CompileError { formatted, inner }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use sass_ir::Span;

    #[test]
    fn test_formatted_includes_excerpt_and_trace() {
        let mut inner = SassError::runtime("Undefined variable $x.", Span::new(7, 9));
        inner.push_frame("mixin frame", Span::new(20, 30), None);
        let error = CompileError::new(inner, Some("a { b: $x; }"), None);
        assert!(error.formatted.starts_with("Error: Undefined variable $x."));
        assert!(error.formatted.contains("a { b: $x; }"));
        assert!(error.formatted.contains('^'));
        assert!(error.formatted.contains("from mixin frame"));
    }
}
