//! The statement grammar, shared by the SCSS and plain-CSS syntaxes.
//!
//! Statement dispatch looks at the first byte: `@` for at-rules, `$` for
//! variable declarations, `/*` for loud comments. Anything else is
//! either a style rule or a declaration, decided by a balanced scan to
//! the first of `;`, `{`, or `}` at depth zero.

use sass_diagnostic::{SassError, SassResult};
use sass_ir::{
    ArgumentDeclaration, ConfiguredVariable, ContentBlock, Expr, ForwardRule, ForwardVisibility,
    IfClause, ImportArg, ImportRule, Interpolation, Parameter, Span, Stmt, Stylesheet,
    UseNamespace, UseRule,
};

use crate::scanner::Scanner;

/// Recursive-descent parser over one source.
pub struct Parser<'a> {
    pub(crate) scanner: Scanner<'a>,
    pub(crate) plain_css: bool,
}

/// What the balanced lookahead decided a statement is.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Shape {
    Declaration,
    StyleRule,
    NestedProperty,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str, plain_css: bool) -> Self {
        Parser {
            scanner: Scanner::new(source),
            plain_css,
        }
    }

    /// Whitespace plus comments, as skipped inside expressions.
    pub(crate) fn ws(&mut self) -> SassResult<()> {
        self.scanner.skip_whitespace_and_comments()
    }

    /// Parse the whole stylesheet.
    pub fn parse_stylesheet(&mut self) -> SassResult<Stylesheet> {
        let start = self.scanner.position();
        let statements = self.statement_sequence(false, false)?;
        Ok(Stylesheet {
            statements,
            span: self.scanner.span_from(start),
        })
    }

    /// A run of statements, either a block body (stops at `}`) or the
    /// top level (stops at end of input).
    fn statement_sequence(&mut self, in_block: bool, until_brace: bool) -> SassResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            self.scanner.skip_whitespace();
            if self.scanner.matches("/*") {
                statements.push(self.loud_comment()?);
                continue;
            }
            match self.scanner.peek() {
                None => {
                    if until_brace {
                        return Err(self.scanner.error("expected \"}\""));
                    }
                    return Ok(statements);
                }
                Some(b'}') if until_brace => {
                    self.scanner.bump();
                    return Ok(statements);
                }
                Some(b'}') => {
                    return Err(self.scanner.error("unmatched \"}\""));
                }
                Some(b';') => {
                    self.scanner.bump();
                }
                _ => {
                    if let Some(stmt) = self.statement(in_block)? {
                        statements.push(stmt);
                    }
                }
            }
        }
    }

    /// A `{ ... }` block body.
    fn block(&mut self, in_block: bool) -> SassResult<Vec<Stmt>> {
        self.ws()?;
        self.scanner.expect(b'{')?;
        self.statement_sequence(in_block, true)
    }

    fn statement(&mut self, in_block: bool) -> SassResult<Option<Stmt>> {
        match self.scanner.peek() {
            Some(b'@') => self.at_rule(in_block),
            Some(b'$') => {
                let stmt = self.variable_declaration(None)?;
                self.expect_statement_end()?;
                Ok(Some(stmt))
            }
            _ => {
                // `ns.$var: value` assignment.
                if self.scanner.looking_at_identifier() && !self.plain_css {
                    let save = self.scanner.position();
                    if let Ok(namespace) = self.scanner.scan_identifier() {
                        let namespace = namespace.to_string();
                        if self.scanner.matches(".$") {
                            self.scanner.bump();
                            let stmt = self.variable_declaration(Some(namespace))?;
                            self.expect_statement_end()?;
                            return Ok(Some(stmt));
                        }
                    }
                    self.scanner.set_position(save);
                }
                self.style_rule_or_declaration(in_block).map(Some)
            }
        }
    }

    // Comments

    fn loud_comment(&mut self) -> SassResult<Stmt> {
        let start = self.scanner.position();
        debug_assert!(self.scanner.matches("/*"));
        self.scanner.bump();
        self.scanner.bump();
        let mut text = Interpolation::plain("/*", Span::DUMMY);
        loop {
            match self.scanner.peek() {
                None => return Err(self.scanner.error("unterminated comment")),
                Some(b'*') if self.scanner.peek_at(1) == Some(b'/') => {
                    self.scanner.bump();
                    self.scanner.bump();
                    text.push_text("*/");
                    break;
                }
                Some(b'#') if self.scanner.peek_at(1) == Some(b'{') => {
                    text.push_expr(self.single_interpolation()?);
                }
                _ => {
                    if let Some(ch) = self.scanner.bump() {
                        text.push_text(&ch.to_string());
                    }
                }
            }
        }
        text.span = self.scanner.span_from(start);
        Ok(Stmt::LoudComment {
            text,
            span: self.scanner.span_from(start),
        })
    }

    // Variable declarations

    fn variable_declaration(&mut self, namespace: Option<String>) -> SassResult<Stmt> {
        let start = self.scanner.position();
        if self.plain_css {
            return Err(self
                .scanner
                .error("Sass variables aren't allowed in plain CSS."));
        }
        self.scanner.expect(b'$')?;
        let name = self.scanner.scan_variable_name()?.to_string();
        self.ws()?;
        self.scanner.expect(b':')?;
        self.ws()?;
        let value = self.expression()?;
        let mut default = false;
        let mut global = false;
        loop {
            self.ws()?;
            if self.scanner.eat_str("!default") {
                default = true;
            } else if self.scanner.eat_str("!global") {
                global = true;
            } else {
                break;
            }
        }
        Ok(Stmt::VariableDecl {
            name,
            namespace,
            value,
            default,
            global,
            span: self.scanner.span_from(start),
        })
    }

    // At-rules

    fn at_rule(&mut self, in_block: bool) -> SassResult<Option<Stmt>> {
        let start = self.scanner.position();
        self.scanner.expect(b'@')?;
        let name = self.scanner.scan_identifier()?.to_string();
        if self.plain_css && !is_plain_css_at_rule(&name) {
            return Err(SassError::parse(
                format!("@{name} isn't allowed in plain CSS."),
                self.scanner.span_from(start),
            ));
        }
        match name.as_str() {
            "use" => self.use_rule(start).map(Some),
            "forward" => self.forward_rule(start).map(Some),
            "import" => self.import_rule(start).map(Some),
            "mixin" => self.mixin_declaration(start).map(Some),
            "include" => self.include_rule(start).map(Some),
            "content" => self.content_rule(start).map(Some),
            "function" => self.function_declaration(start).map(Some),
            "return" => {
                self.ws()?;
                let value = self.expression()?;
                self.expect_statement_end()?;
                Ok(Some(Stmt::Return {
                    value,
                    span: self.scanner.span_from(start),
                }))
            }
            "if" => self.if_rule(start).map(Some),
            "else" => Err(SassError::parse(
                "@else without a matching @if",
                self.scanner.span_from(start),
            )),
            "each" => self.each_rule(start, in_block).map(Some),
            "for" => self.for_rule(start, in_block).map(Some),
            "while" => self.while_rule(start, in_block).map(Some),
            "warn" | "error" | "debug" => {
                self.ws()?;
                let expr = self.expression()?;
                self.expect_statement_end()?;
                let span = self.scanner.span_from(start);
                Ok(Some(match name.as_str() {
                    "warn" => Stmt::Warn { expr, span },
                    "error" => Stmt::Error { expr, span },
                    _ => Stmt::Debug { expr, span },
                }))
            }
            "extend" => self.extend_rule(start).map(Some),
            "charset" => {
                // The input encoding is already decided; the rule is
                // consumed and dropped.
                self.ws()?;
                let _ = self.quoted_string_interpolation()?;
                self.expect_statement_end()?;
                Ok(None)
            }
            _ => self.generic_at_rule(name, start, in_block).map(Some),
        }
    }

    fn quoted_url_string(&mut self) -> SassResult<String> {
        self.ws()?;
        let contents = self.quoted_string_interpolation()?;
        match contents.as_plain() {
            Some(url) => Ok(url.to_string()),
            None => Err(self
                .scanner
                .error("Interpolation isn't allowed in module URLs.")),
        }
    }

    fn use_rule(&mut self, start: usize) -> SassResult<Stmt> {
        let url = self.quoted_url_string()?;
        self.ws()?;
        let mut namespace = UseNamespace::Default;
        if self.eat_keyword("as") {
            self.ws()?;
            if self.scanner.eat(b'*') {
                namespace = UseNamespace::Global;
            } else {
                namespace = UseNamespace::Named(self.scanner.scan_identifier()?.to_string());
            }
            self.ws()?;
        }
        let configuration = if self.eat_keyword("with") {
            self.configuration(false)?
        } else {
            Vec::new()
        };
        self.expect_statement_end()?;
        Ok(Stmt::Use(UseRule {
            url,
            namespace,
            configuration,
            span: self.scanner.span_from(start),
        }))
    }

    fn forward_rule(&mut self, start: usize) -> SassResult<Stmt> {
        let url = self.quoted_url_string()?;
        self.ws()?;
        let mut prefix = None;
        if self.eat_keyword("as") {
            self.ws()?;
            let text = self.scanner.scan_identifier()?.to_string();
            self.scanner.expect(b'*')?;
            prefix = Some(text);
            self.ws()?;
        }
        let mut visibility = None;
        let show = self.eat_keyword("show");
        if show || self.eat_keyword("hide") {
            let mut variables = member_set();
            let mut members = member_set();
            loop {
                self.ws()?;
                if self.scanner.eat(b'$') {
                    variables.insert(self.scanner.scan_variable_name()?.to_string());
                } else {
                    members.insert(self.scanner.scan_identifier()?.to_string());
                }
                self.ws()?;
                if !self.scanner.eat(b',') {
                    break;
                }
            }
            visibility = Some(ForwardVisibility {
                show,
                variables,
                members,
            });
            self.ws()?;
        }
        let configuration = if self.eat_keyword("with") {
            self.configuration(true)?
        } else {
            Vec::new()
        };
        self.expect_statement_end()?;
        Ok(Stmt::Forward(ForwardRule {
            url,
            prefix,
            visibility,
            configuration,
            span: self.scanner.span_from(start),
        }))
    }

    /// `with ($a: 1, $b: 2 !default)`.
    fn configuration(&mut self, allow_guarded: bool) -> SassResult<Vec<ConfiguredVariable>> {
        self.ws()?;
        self.scanner.expect(b'(')?;
        let mut entries: Vec<ConfiguredVariable> = Vec::new();
        loop {
            self.ws()?;
            if self.scanner.eat(b')') {
                break;
            }
            let entry_start = self.scanner.position();
            self.scanner.expect(b'$')?;
            let name = self.scanner.scan_variable_name()?.to_string();
            self.ws()?;
            self.scanner.expect(b':')?;
            self.ws()?;
            let value = self.space_list_for_config()?;
            self.ws()?;
            let guarded = allow_guarded && self.scanner.eat_str("!default");
            if entries.iter().any(|existing| existing.name == name) {
                return Err(SassError::parse(
                    format!("The variable ${name} was configured twice."),
                    self.scanner.span_from(entry_start),
                ));
            }
            entries.push(ConfiguredVariable {
                name,
                value,
                guarded,
                span: self.scanner.span_from(entry_start),
            });
            self.ws()?;
            if !self.scanner.eat(b',') {
                self.scanner.expect(b')')?;
                break;
            }
        }
        Ok(entries)
    }

    fn import_rule(&mut self, start: usize) -> SassResult<Stmt> {
        let args_start = self.scanner.position();
        let mut imports = Vec::new();
        loop {
            self.ws()?;
            let arg_start = self.scanner.position();
            if self.scanner.matches("url(") {
                let raw = self.raw_interpolation_until(&[b',', b';', b'}'])?;
                imports.push(ImportArg::Static {
                    contents: raw,
                    span: self.scanner.span_from(arg_start),
                });
            } else {
                let contents = self.quoted_string_interpolation()?;
                let span = self.scanner.span_from(arg_start);
                match contents.as_plain() {
                    Some(url) if !is_plain_css_import(url) && !self.plain_css => {
                        imports.push(ImportArg::Dynamic {
                            url: url.to_string(),
                            span,
                        });
                    }
                    _ => {
                        // Rebuild the quoted form for the CSS output.
                        let mut rendered = Interpolation::plain("\"", Span::DUMMY);
                        rendered.parts.extend(contents.parts);
                        rendered.push_text("\"");
                        rendered.span = span;
                        imports.push(ImportArg::Static {
                            contents: rendered,
                            span,
                        });
                    }
                }
            }
            self.ws()?;
            if !self.scanner.eat(b',') {
                break;
            }
        }
        self.ws()?;
        if !matches!(self.scanner.peek(), None | Some(b';' | b'}')) {
            // Trailing media queries turn the whole rule static.
            self.scanner.set_position(args_start);
            let contents = self.raw_interpolation_until(&[b';', b'}'])?;
            let span = self.scanner.span_from(start);
            self.expect_statement_end()?;
            return Ok(Stmt::Import(ImportRule {
                imports: vec![ImportArg::Static { contents, span }],
                span,
            }));
        }
        self.expect_statement_end()?;
        Ok(Stmt::Import(ImportRule {
            imports,
            span: self.scanner.span_from(start),
        }))
    }

    fn mixin_declaration(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let name = self.scanner.scan_identifier()?.to_string();
        let arguments = if self.scanner.peek() == Some(b'(') {
            self.argument_declaration()?
        } else {
            ArgumentDeclaration::empty(self.scanner.here())
        };
        let body = self.block(true)?;
        Ok(Stmt::MixinDecl {
            name,
            arguments,
            body,
            span: self.scanner.span_from(start),
        })
    }

    fn include_rule(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let first = self.scanner.scan_identifier()?.to_string();
        let (namespace, name) = if self.scanner.eat(b'.') {
            (Some(first), self.scanner.scan_identifier()?.to_string())
        } else {
            (None, first)
        };
        let arguments = if self.scanner.peek() == Some(b'(') {
            self.argument_invocation()?
        } else {
            sass_ir::ArgumentInvocation::empty(self.scanner.here())
        };
        self.ws()?;
        let mut content = None;
        let using = self.eat_keyword("using");
        if using || self.scanner.peek() == Some(b'{') {
            let content_start = self.scanner.position();
            let content_args = if using {
                self.ws()?;
                self.argument_declaration()?
            } else {
                ArgumentDeclaration::empty(self.scanner.here())
            };
            let body = self.block(true)?;
            content = Some(ContentBlock {
                arguments: content_args,
                body,
                span: self.scanner.span_from(content_start),
            });
        } else {
            self.expect_statement_end()?;
        }
        Ok(Stmt::Include {
            name,
            namespace,
            arguments,
            content,
            span: self.scanner.span_from(start),
        })
    }

    fn content_rule(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let arguments = if self.scanner.peek() == Some(b'(') {
            self.argument_invocation()?
        } else {
            sass_ir::ArgumentInvocation::empty(self.scanner.here())
        };
        self.expect_statement_end()?;
        Ok(Stmt::Content {
            arguments,
            span: self.scanner.span_from(start),
        })
    }

    fn function_declaration(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let name = self.scanner.scan_identifier()?.to_string();
        let arguments = self.argument_declaration()?;
        let body = self.block(false)?;
        Ok(Stmt::FunctionDecl {
            name,
            arguments,
            body,
            span: self.scanner.span_from(start),
        })
    }

    /// `($a, $b: default, $rest...)`.
    fn argument_declaration(&mut self) -> SassResult<ArgumentDeclaration> {
        let start = self.scanner.position();
        self.scanner.expect(b'(')?;
        let mut declaration = ArgumentDeclaration::empty(Span::DUMMY);
        loop {
            self.ws()?;
            if self.scanner.eat(b')') {
                break;
            }
            let param_start = self.scanner.position();
            self.scanner.expect(b'$')?;
            let name = self.scanner.scan_variable_name()?.to_string();
            self.ws()?;
            if self.scanner.eat_str("...") {
                declaration.rest = Some(name);
                self.ws()?;
                self.scanner.expect(b')')?;
                break;
            }
            let default = if self.scanner.eat(b':') {
                self.ws()?;
                Some(self.space_list_for_config()?)
            } else {
                None
            };
            declaration.parameters.push(Parameter {
                name,
                default,
                span: self.scanner.span_from(param_start),
            });
            self.ws()?;
            if !self.scanner.eat(b',') {
                self.scanner.expect(b')')?;
                break;
            }
        }
        declaration.span = self.scanner.span_from(start);
        Ok(declaration)
    }

    fn if_rule(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let condition = self.expression()?;
        let body = self.block(true)?;
        let mut clauses = vec![IfClause {
            condition,
            body,
            span: self.scanner.span_from(start),
        }];
        let mut else_body = None;
        loop {
            let save = self.scanner.position();
            self.scanner.skip_whitespace();
            if !self.scanner.eat_str("@else") {
                self.scanner.set_position(save);
                break;
            }
            self.ws()?;
            if self.eat_keyword("if") {
                let clause_start = self.scanner.position();
                self.ws()?;
                let condition = self.expression()?;
                let body = self.block(true)?;
                clauses.push(IfClause {
                    condition,
                    body,
                    span: self.scanner.span_from(clause_start),
                });
            } else {
                else_body = Some(self.block(true)?);
                break;
            }
        }
        Ok(Stmt::If {
            clauses,
            else_body,
            span: self.scanner.span_from(start),
        })
    }

    fn each_rule(&mut self, start: usize, _in_block: bool) -> SassResult<Stmt> {
        self.ws()?;
        let mut variables = Vec::new();
        loop {
            self.scanner.expect(b'$')?;
            variables.push(self.scanner.scan_variable_name()?.to_string());
            self.ws()?;
            if !self.scanner.eat(b',') {
                break;
            }
            self.ws()?;
        }
        if !self.eat_keyword("in") {
            return Err(self.scanner.error("expected \"in\""));
        }
        self.ws()?;
        let list = self.expression()?;
        let body = self.block(true)?;
        Ok(Stmt::Each {
            variables,
            list,
            body,
            span: self.scanner.span_from(start),
        })
    }

    fn for_rule(&mut self, start: usize, _in_block: bool) -> SassResult<Stmt> {
        self.ws()?;
        self.scanner.expect(b'$')?;
        let variable = self.scanner.scan_variable_name()?.to_string();
        self.ws()?;
        if !self.eat_keyword("from") {
            return Err(self.scanner.error("expected \"from\""));
        }
        self.ws()?;
        let from = self.bound_expression()?;
        self.ws()?;
        let inclusive = if self.eat_keyword("through") {
            true
        } else if self.eat_keyword("to") {
            false
        } else {
            return Err(self.scanner.error("expected \"to\" or \"through\""));
        };
        self.ws()?;
        let to = self.bound_expression()?;
        let body = self.block(true)?;
        Ok(Stmt::For {
            variable,
            from,
            to,
            inclusive,
            body,
            span: self.scanner.span_from(start),
        })
    }

    fn while_rule(&mut self, start: usize, _in_block: bool) -> SassResult<Stmt> {
        self.ws()?;
        let condition = self.expression()?;
        let body = self.block(true)?;
        Ok(Stmt::While {
            condition,
            body,
            span: self.scanner.span_from(start),
        })
    }

    fn extend_rule(&mut self, start: usize) -> SassResult<Stmt> {
        self.ws()?;
        let mut selector = self.raw_interpolation_until(&[b';', b'}', b'{'])?;
        let mut optional = false;
        if let Some(sass_ir::InterpolationPart::Text(text)) = selector.parts.last_mut() {
            if let Some(stripped) = text.trim_end().strip_suffix("!optional") {
                optional = true;
                *text = stripped.trim_end().to_string();
            }
        }
        self.expect_statement_end()?;
        Ok(Stmt::Extend {
            selector,
            optional,
            span: self.scanner.span_from(start),
        })
    }

    fn generic_at_rule(
        &mut self,
        name: String,
        start: usize,
        in_block: bool,
    ) -> SassResult<Stmt> {
        self.scanner.skip_whitespace();
        let prelude = trim_interpolation(self.raw_interpolation_until(&[b';', b'{', b'}'])?);
        let prelude = if prelude.parts.is_empty() {
            None
        } else {
            Some(prelude)
        };
        let body = if self.scanner.peek() == Some(b'{') {
            Some(self.block(in_block)?)
        } else {
            self.expect_statement_end()?;
            None
        };
        Ok(Stmt::AtRule {
            name: Interpolation::plain(name, self.scanner.span_from(start)),
            prelude,
            body,
            span: self.scanner.span_from(start),
        })
    }

    // Style rules and declarations

    fn style_rule_or_declaration(&mut self, in_block: bool) -> SassResult<Stmt> {
        let shape = if in_block {
            self.lookahead_shape()
        } else {
            Shape::StyleRule
        };
        match shape {
            Shape::StyleRule => self.style_rule(),
            Shape::Declaration => self.declaration(false),
            Shape::NestedProperty => self.declaration(true),
        }
    }

    fn style_rule(&mut self) -> SassResult<Stmt> {
        let start = self.scanner.position();
        let mut selector = self.raw_interpolation_until(&[b'{', b';', b'}'])?;
        if let Some(sass_ir::InterpolationPart::Text(text)) = selector.parts.last_mut() {
            let trimmed = text.trim_end().to_string();
            *text = trimmed;
        }
        if selector.parts.is_empty() {
            return Err(self.scanner.error("expected selector"));
        }
        let body = self.block(true)?;
        Ok(Stmt::StyleRule {
            selector,
            body,
            span: self.scanner.span_from(start),
        })
    }

    fn declaration(&mut self, nested_only: bool) -> SassResult<Stmt> {
        let start = self.scanner.position();
        let custom = self.scanner.matches("--");
        let name = self.interpolated_identifier()?;
        self.ws()?;
        self.scanner.expect(b':')?;

        if custom {
            let value = self.raw_interpolation_until(&[b';', b'}'])?;
            self.expect_statement_end()?;
            return Ok(Stmt::Declaration {
                name,
                value: Some(Expr::String {
                    contents: trim_interpolation(value),
                    quoted: false,
                    span: self.scanner.span_from(start),
                }),
                body: Vec::new(),
                span: self.scanner.span_from(start),
            });
        }

        self.ws()?;
        if nested_only || self.scanner.peek() == Some(b'{') {
            let body = self.block(true)?;
            return Ok(Stmt::Declaration {
                name,
                value: None,
                body,
                span: self.scanner.span_from(start),
            });
        }

        let value = if self.plain_css {
            let raw = self.raw_interpolation_until(&[b';', b'}'])?;
            Expr::String {
                contents: trim_interpolation(raw),
                quoted: false,
                span: self.scanner.span_from(start),
            }
        } else {
            self.expression()?
        };
        self.expect_statement_end()?;
        Ok(Stmt::Declaration {
            name,
            value: Some(value),
            body: Vec::new(),
            span: self.scanner.span_from(start),
        })
    }

    /// An identifier with interpolation segments, as used for
    /// declaration names.
    fn interpolated_identifier(&mut self) -> SassResult<Interpolation> {
        let start = self.scanner.position();
        let mut contents = Interpolation::empty(Span::DUMMY);
        if self.scanner.eat_str("--") {
            contents.push_text("--");
        }
        loop {
            match self.scanner.peek() {
                Some(b'#') if self.scanner.peek_at(1) == Some(b'{') => {
                    contents.push_expr(self.single_interpolation()?);
                }
                Some(byte) if Scanner::is_ident_byte(byte) => {
                    if let Some(ch) = self.scanner.bump() {
                        contents.push_text(&ch.to_string());
                    }
                }
                _ => break,
            }
        }
        if contents.parts.is_empty() {
            return Err(self.scanner.error("expected identifier"));
        }
        contents.span = self.scanner.span_from(start);
        Ok(contents)
    }

    /// Raw text with live `#{}`, stopping (without consuming) at any of
    /// `stops` at depth zero. Quotes and balanced brackets are respected.
    pub(crate) fn raw_interpolation_until(
        &mut self,
        stops: &[u8],
    ) -> SassResult<Interpolation> {
        let start = self.scanner.position();
        let mut contents = Interpolation::empty(Span::DUMMY);
        let mut depth = 0usize;
        loop {
            match self.scanner.peek() {
                None => break,
                Some(byte) if depth == 0 && stops.contains(&byte) => break,
                Some(b'#') if self.scanner.peek_at(1) == Some(b'{') => {
                    contents.push_expr(self.single_interpolation()?);
                }
                Some(b'(') | Some(b'[') => {
                    depth += 1;
                    if let Some(ch) = self.scanner.bump() {
                        contents.push_text(&ch.to_string());
                    }
                }
                Some(b')') | Some(b']') => {
                    depth = depth.saturating_sub(1);
                    if let Some(ch) = self.scanner.bump() {
                        contents.push_text(&ch.to_string());
                    }
                }
                Some(b'"') | Some(b'\'') => {
                    let quoted = self.quoted_string_interpolation()?;
                    // Re-render the quoted text verbatim.
                    contents.push_text("\"");
                    for part in quoted.parts {
                        match part {
                            sass_ir::InterpolationPart::Text(text) => contents.push_text(&text),
                            expr @ sass_ir::InterpolationPart::Expr(_) => {
                                contents.parts.push(expr);
                            }
                        }
                    }
                    contents.push_text("\"");
                }
                _ => {
                    if let Some(ch) = self.scanner.bump() {
                        contents.push_text(&ch.to_string());
                    }
                }
            }
        }
        contents.span = self.scanner.span_from(start);
        Ok(contents)
    }

    /// Decide declaration vs. style rule vs. nested property block by a
    /// balanced scan to the first `;`, `{`, or `}` at depth zero.
    fn lookahead_shape(&self) -> Shape {
        let source = self.scanner.source().as_bytes();
        let mut pos = self.scanner.position();
        let mut depth = 0usize;
        let mut colon_at: Option<usize> = None;
        let mut quote: Option<u8> = None;
        while let Some(&byte) = source.get(pos) {
            if let Some(q) = quote {
                if byte == b'\\' {
                    pos += 1;
                } else if byte == q {
                    quote = None;
                }
                pos += 1;
                continue;
            }
            match byte {
                b'"' | b'\'' => quote = Some(byte),
                b'(' | b'[' => depth += 1,
                b')' | b']' => depth = depth.saturating_sub(1),
                b'#' if source.get(pos + 1) == Some(&b'{') => {
                    depth += 1;
                    pos += 1;
                }
                b'}' if depth > 0 => depth -= 1,
                b';' | b'}' if depth == 0 => return Shape::Declaration,
                b'{' if depth == 0 => {
                    return match colon_at {
                        Some(colon)
                            if source[colon + 1..pos]
                                .iter()
                                .all(|b| b.is_ascii_whitespace()) =>
                        {
                            Shape::NestedProperty
                        }
                        _ => Shape::StyleRule,
                    };
                }
                b':' if depth == 0 && colon_at.is_none() => {
                    colon_at = Some(pos);
                }
                _ => {}
            }
            pos += 1;
        }
        Shape::Declaration
    }

    /// A configuration or default value: a space list, so the argument
    /// comma is never crossed.
    fn space_list_for_config(&mut self) -> SassResult<Expr> {
        self.space_list_expression()
    }

    /// The `from`/`to` bounds of `@for`: operator expressions without
    /// space-list collection, so the `to`/`through` keyword terminates.
    fn bound_expression(&mut self) -> SassResult<Expr> {
        self.or_expression()
    }

    fn expect_statement_end(&mut self) -> SassResult<()> {
        self.ws()?;
        match self.scanner.peek() {
            None | Some(b'}') => Ok(()),
            Some(b';') => {
                self.scanner.bump();
                Ok(())
            }
            _ => Err(self.scanner.error("expected \";\"")),
        }
    }
}

fn member_set() -> rustc_hash::FxHashSet<String> {
    rustc_hash::FxHashSet::default()
}

/// Whether an `@import` URL stays a plain-CSS import.
fn is_plain_css_import(url: &str) -> bool {
    url.ends_with(".css")
        || url.starts_with("http://")
        || url.starts_with("https://")
        || url.starts_with("//")
}

fn is_plain_css_at_rule(name: &str) -> bool {
    !matches!(
        name,
        "use" | "forward" | "mixin" | "include" | "function" | "return" | "if" | "else" | "each"
            | "for" | "while" | "warn" | "debug" | "extend" | "content"
    )
}

/// Trim surrounding whitespace from an interpolation's literal edges.
fn trim_interpolation(mut interpolation: Interpolation) -> Interpolation {
    if let Some(sass_ir::InterpolationPart::Text(text)) = interpolation.parts.first_mut() {
        *text = text.trim_start().to_string();
    }
    if let Some(sass_ir::InterpolationPart::Text(text)) = interpolation.parts.last_mut() {
        *text = text.trim_end().to_string();
    }
    interpolation
        .parts
        .retain(|part| !matches!(part, sass_ir::InterpolationPart::Text(text) if text.is_empty()));
    interpolation
}
