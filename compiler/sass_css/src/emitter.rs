//! Rendering the CSS tree to text.
//!
//! Two styles: expanded (2-space indentation, one declaration per line,
//! blank line between top-level statements) and compressed (everything
//! on one line, separators minimized, comments dropped unless `/*!`).
//!
//! After rendering, the charset policy runs: when the output contains a
//! non-ASCII code point and the `charset` option is on, expanded output
//! gains a leading `@charset "UTF-8";` and compressed output a UTF-8
//! BOM. With `charset` off neither is emitted.

use sass_diagnostic::SassResult;
use sass_value::{to_css, Value};

use crate::tree::{CssStmt, CssTree};

/// CSS output style.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum OutputStyle {
    #[default]
    Expanded,
    Compressed,
}

impl OutputStyle {
    #[inline]
    pub fn is_compressed(self) -> bool {
        matches!(self, OutputStyle::Compressed)
    }
}

/// Render a tree to its final text, applying the charset policy.
pub fn render(tree: &CssTree, style: OutputStyle, charset: bool) -> SassResult<String> {
    let mut emitter = Emitter::new(style);
    emitter.tree(tree)?;
    let mut out = emitter.finish();
    if charset && !out.is_ascii() {
        match style {
            OutputStyle::Expanded => out.insert_str(0, "@charset \"UTF-8\";\n"),
            OutputStyle::Compressed => out.insert(0, '\u{feff}'),
        }
    }
    Ok(out)
}

struct Emitter {
    style: OutputStyle,
    out: String,
    indent: usize,
}

impl Emitter {
    fn new(style: OutputStyle) -> Self {
        Emitter {
            style,
            out: String::new(),
            indent: 0,
        }
    }

    fn finish(self) -> String {
        self.out
    }

    fn tree(&mut self, tree: &CssTree) -> SassResult<()> {
        let mut first = true;
        for stmt in &tree.statements {
            if stmt.is_invisible() {
                continue;
            }
            if self.style.is_compressed() {
                if matches!(stmt, CssStmt::Comment { text } if !text.starts_with("/*!")) {
                    continue;
                }
            } else if !first {
                // Blank line between top-level statements.
                self.out.push_str("\n\n");
            }
            self.stmt(stmt)?;
            first = false;
        }
        Ok(())
    }

    fn stmt(&mut self, stmt: &CssStmt) -> SassResult<()> {
        match stmt {
            CssStmt::Rule { selector, body } => self.rule(selector, body),
            CssStmt::AtRule {
                name,
                prelude,
                body,
            } => self.at_rule(name, prelude, body.as_deref()),
            CssStmt::Declaration {
                name,
                value,
                custom,
            } => self.declaration(name, value, *custom),
            CssStmt::Comment { text } => {
                self.write_indent();
                self.out.push_str(text);
                Ok(())
            }
        }
    }

    fn rule(&mut self, selector: &str, body: &[CssStmt]) -> SassResult<()> {
        self.write_indent();
        if self.style.is_compressed() {
            self.out.push_str(&selector.replace(", ", ","));
            self.out.push('{');
        } else {
            self.out.push_str(selector);
            self.out.push_str(" {");
        }
        self.block_body(body)?;
        self.close_block();
        Ok(())
    }

    fn at_rule(&mut self, name: &str, prelude: &str, body: Option<&[CssStmt]>) -> SassResult<()> {
        self.write_indent();
        self.out.push('@');
        self.out.push_str(name);
        if !prelude.is_empty() {
            self.out.push(' ');
            self.out.push_str(prelude);
        }
        match body {
            None => {
                self.out.push(';');
                Ok(())
            }
            Some(body) => {
                if self.style.is_compressed() {
                    self.out.push('{');
                } else {
                    self.out.push_str(" {");
                }
                self.block_body(body)?;
                self.close_block();
                Ok(())
            }
        }
    }

    fn block_body(&mut self, body: &[CssStmt]) -> SassResult<()> {
        self.indent += 1;
        let mut wrote_any = false;
        for child in body {
            if child.is_invisible() {
                continue;
            }
            if self.style.is_compressed() {
                if matches!(child, CssStmt::Comment { text } if !text.starts_with("/*!")) {
                    continue;
                }
                if wrote_any {
                    self.out.push(';');
                }
            } else {
                self.out.push('\n');
            }
            self.stmt(child)?;
            wrote_any = true;
        }
        self.indent -= 1;
        Ok(())
    }

    fn close_block(&mut self) {
        if self.style.is_compressed() {
            self.out.push('}');
        } else {
            self.out.push('\n');
            self.write_indent();
            self.out.push('}');
        }
    }

    fn declaration(&mut self, name: &str, value: &Value, custom: bool) -> SassResult<()> {
        self.write_indent();
        self.out.push_str(name);
        self.out.push(':');
        let text = if custom {
            match value {
                Value::String(string) => string.text.clone(),
                other => to_css(other, self.style.is_compressed())?,
            }
        } else {
            to_css(value, self.style.is_compressed())?
        };
        if !self.style.is_compressed() && !text.is_empty() {
            self.out.push(' ');
        }
        self.out.push_str(&text);
        if !self.style.is_compressed() {
            self.out.push(';');
        }
        Ok(())
    }

    fn write_indent(&mut self) {
        if !self.style.is_compressed() {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn decl(name: &str, text: &str) -> CssStmt {
        CssStmt::Declaration {
            name: name.to_string(),
            value: Value::unquoted_string(text),
            custom: false,
        }
    }

    fn rule(selector: &str, body: Vec<CssStmt>) -> CssStmt {
        CssStmt::Rule {
            selector: selector.to_string(),
            body,
        }
    }

    #[test]
    fn test_expanded_single_rule() {
        let tree = CssTree {
            statements: vec![rule("a", vec![decl("b", "c")])],
        };
        assert_eq!(
            render(&tree, OutputStyle::Expanded, true).unwrap(),
            "a {\n  b: c;\n}"
        );
    }

    #[test]
    fn test_expanded_blank_line_between_rules() {
        let tree = CssTree {
            statements: vec![
                rule("a", vec![decl("b", "c")]),
                rule("d", vec![decl("e", "f")]),
            ],
        };
        assert_eq!(
            render(&tree, OutputStyle::Expanded, true).unwrap(),
            "a {\n  b: c;\n}\n\nd {\n  e: f;\n}"
        );
    }

    #[test]
    fn test_compressed() {
        let tree = CssTree {
            statements: vec![
                rule("a, b", vec![decl("c", "d"), decl("e", "f")]),
                rule("g", vec![decl("h", "i")]),
            ],
        };
        assert_eq!(
            render(&tree, OutputStyle::Compressed, true).unwrap(),
            "a,b{c:d;e:f}g{h:i}"
        );
    }

    #[test]
    fn test_empty_rule_dropped() {
        let tree = CssTree {
            statements: vec![rule("a", vec![]), rule("b", vec![decl("c", "d")])],
        };
        assert_eq!(
            render(&tree, OutputStyle::Expanded, true).unwrap(),
            "b {\n  c: d;\n}"
        );
    }

    #[test]
    fn test_nested_at_rule() {
        let tree = CssTree {
            statements: vec![CssStmt::AtRule {
                name: "media".to_string(),
                prelude: "screen".to_string(),
                body: Some(vec![rule("a", vec![decl("b", "c")])]),
            }],
        };
        assert_eq!(
            render(&tree, OutputStyle::Expanded, true).unwrap(),
            "@media screen {\n  a {\n    b: c;\n  }\n}"
        );
    }

    #[test]
    fn test_bodiless_at_rule() {
        let tree = CssTree {
            statements: vec![CssStmt::AtRule {
                name: "import".to_string(),
                prelude: "\"theme.css\"".to_string(),
                body: None,
            }],
        };
        assert_eq!(
            render(&tree, OutputStyle::Expanded, true).unwrap(),
            "@import \"theme.css\";"
        );
    }

    #[test]
    fn test_charset_policy() {
        let tree = CssTree {
            statements: vec![rule("a", vec![decl("b", "👭")])],
        };
        let expanded = render(&tree, OutputStyle::Expanded, true).unwrap();
        assert!(expanded.starts_with("@charset \"UTF-8\";\n"));

        let compressed = render(&tree, OutputStyle::Compressed, true).unwrap();
        assert!(compressed.starts_with('\u{feff}'));

        let opted_out = render(&tree, OutputStyle::Expanded, false).unwrap();
        assert!(opted_out.starts_with("a {"));
        let compressed_out = render(&tree, OutputStyle::Compressed, false).unwrap();
        assert!(compressed_out.starts_with("a{"));
    }

    #[test]
    fn test_ascii_output_never_gets_charset() {
        let tree = CssTree {
            statements: vec![rule("a", vec![decl("b", "c")])],
        };
        let out = render(&tree, OutputStyle::Expanded, true).unwrap();
        assert!(!out.contains("@charset"));
    }

    #[test]
    fn test_compressed_drops_plain_comments() {
        let tree = CssTree {
            statements: vec![
                CssStmt::Comment {
                    text: "/* gone */".to_string(),
                },
                CssStmt::Comment {
                    text: "/*! kept */".to_string(),
                },
            ],
        };
        assert_eq!(
            render(&tree, OutputStyle::Compressed, true).unwrap(),
            "/*! kept */"
        );
    }
}
