//! The indented syntax front end.
//!
//! The indented syntax differs from SCSS only in how blocks and
//! statement ends are written: indentation instead of braces, newlines
//! instead of semicolons. This pass rewrites an indented source into the
//! equivalent SCSS text, which then flows through the one statement
//! grammar. Offsets shift relative to the original, which is the price
//! of a single grammar; the rewritten text stays line-aligned so line
//! numbers in errors survive.

use sass_diagnostic::{SassError, SassResult};
use sass_ir::Span;

/// Rewrite indented-syntax source into SCSS.
pub fn to_scss(source: &str) -> SassResult<String> {
    let mut out = String::with_capacity(source.len() + source.len() / 8);
    let mut indents: Vec<usize> = vec![0];
    let mut pending_line: Option<String> = None;
    let mut offset = 0usize;

    for raw_line in source.split('\n') {
        let line_start = offset;
        offset += raw_line.len() + 1;
        let line = raw_line.trim_end_matches('\r');
        let trimmed = line.trim_start();
        if trimmed.is_empty() {
            continue;
        }
        let indent = line.len() - trimmed.len();

        let indentation = &line[..indent];
        if indentation.contains('\t') && indentation.contains(' ') {
            return Err(SassError::parse(
                "Tabs and spaces may not be mixed for indentation.",
                Span::from_range(line_start..line_start + indent),
            ));
        }

        let current = *indents.last().unwrap_or(&0);
        if indent > current {
            // The held line opens a block.
            match pending_line.take() {
                Some(header) => {
                    out.push_str(&header);
                    out.push_str(" {\n");
                }
                None => {
                    return Err(SassError::parse(
                        "Indentation increased without a new block.",
                        Span::from_range(line_start..line_start + indent),
                    ));
                }
            }
            indents.push(indent);
        } else {
            // The held line was a complete statement.
            if let Some(statement) = pending_line.take() {
                out.push_str(&statement);
                terminate_statement(&mut out, &statement);
            }
            while indent < *indents.last().unwrap_or(&0) {
                indents.pop();
                out.push_str("}\n");
            }
            if indent != *indents.last().unwrap_or(&0) {
                return Err(SassError::parse(
                    "Inconsistent indentation.",
                    Span::from_range(line_start..line_start + indent),
                ));
            }
        }
        pending_line = Some(trimmed.to_string());
    }

    if let Some(statement) = pending_line.take() {
        out.push_str(&statement);
        terminate_statement(&mut out, &statement);
    }
    while indents.len() > 1 {
        indents.pop();
        out.push_str("}\n");
    }
    Ok(out)
}

/// Comments carry no semicolon; everything else becomes `stmt;`.
fn terminate_statement(out: &mut String, statement: &str) {
    if statement.starts_with("//") || statement.starts_with("/*") {
        out.push('\n');
    } else {
        out.push_str(";\n");
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_simple_rule() {
        let scss = to_scss("a\n  b: c\n").unwrap();
        assert_eq!(scss, "a {\nb: c;\n}\n");
    }

    #[test]
    fn test_nested_rules() {
        let scss = to_scss("a\n  b: c\n  d\n    e: f\ng\n  h: i\n").unwrap();
        assert_eq!(scss, "a {\nb: c;\nd {\ne: f;\n}\n}\ng {\nh: i;\n}\n");
    }

    #[test]
    fn test_directives_terminate() {
        let scss = to_scss("@use \"other\"\na\n  b: c\n").unwrap();
        assert_eq!(scss, "@use \"other\";\na {\nb: c;\n}\n");
    }

    #[test]
    fn test_inconsistent_dedent_errors() {
        assert!(to_scss("a\n    b: c\n  d: e\n").is_err());
    }

    #[test]
    fn test_blank_lines_ignored() {
        let scss = to_scss("a\n\n  b: c\n").unwrap();
        assert_eq!(scss, "a {\nb: c;\n}\n");
    }
}
