//! Caret-highlighted source excerpts.
//!
//! Turns a span plus the source text into the excerpt block printed under
//! error messages:
//!
//! ```text
//!   ,
//! 3 | a { b: 1px + 1s; }
//!   |        ^^^^^^^^^
//!   '
//! ```

use sass_ir::Span;

/// 1-based line and column for a byte offset.
pub fn line_col(source: &str, offset: u32) -> (usize, usize) {
    let offset = (offset as usize).min(source.len());
    let mut line = 1;
    let mut line_start = 0;
    for (idx, byte) in source.bytes().enumerate().take(offset) {
        if byte == b'\n' {
            line += 1;
            line_start = idx + 1;
        }
    }
    let col = source[line_start..offset].chars().count() + 1;
    (line, col)
}

/// Render the excerpt block for a span.
///
/// Multi-line spans are clipped to their first line; the caret run covers
/// at least one column so zero-width spans still point somewhere.
pub fn excerpt(source: &str, span: Span) -> String {
    let start = (span.start as usize).min(source.len());
    let line_start = source[..start].rfind('\n').map_or(0, |idx| idx + 1);
    let line_end = source[start..]
        .find('\n')
        .map_or(source.len(), |idx| start + idx);
    let line_text = &source[line_start..line_end];

    let (line, col) = line_col(source, span.start);
    let span_len = (span.len() as usize).max(1);
    let caret_len = span_len.min(line_end.saturating_sub(start).max(1));

    let gutter_width = line.to_string().len();
    let pad = " ".repeat(gutter_width);
    let mut out = String::new();
    out.push_str(&format!("{pad} ,\n"));
    out.push_str(&format!("{line} | {line_text}\n"));
    out.push_str(&format!("{pad} | {}{}\n", " ".repeat(col - 1), "^".repeat(caret_len)));
    out.push_str(&format!("{pad} '"));
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_line_col() {
        let source = "a {\n  b: c;\n}\n";
        assert_eq!(line_col(source, 0), (1, 1));
        assert_eq!(line_col(source, 4), (2, 1));
        assert_eq!(line_col(source, 6), (2, 3));
    }

    #[test]
    fn test_excerpt_single_line() {
        let source = "a { b: oops; }";
        let block = excerpt(source, Span::new(7, 11));
        assert_eq!(
            block,
            "  ,\n1 | a { b: oops; }\n  |        ^^^^\n  '"
        );
    }

    #[test]
    fn test_excerpt_zero_width_span() {
        let block = excerpt("a {", Span::new(3, 3));
        assert!(block.contains('^'));
    }
}
