//! The SassScript expression grammar.
//!
//! Precedence, loosest to tightest: comma lists, space lists, `or`,
//! `and`, `not`, equality, relational, additive, multiplicative, unary,
//! primary. Operators bind tighter than space separation, so
//! `1 + 2 3px` is the list `(3, 3px)`.

use sass_diagnostic::{SassError, SassResult};
use sass_ir::{
    ArgumentInvocation, BinaryOp, Expr, Interpolation, ListSeparator, Span, UnaryOp,
};

use crate::parser::Parser;
use crate::scanner::Scanner;

impl<'a> Parser<'a> {
    /// A full expression, including top-level comma lists.
    pub(crate) fn expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let first = self.space_list_expression()?;
        self.ws()?;
        if self.scanner.peek() != Some(b',') {
            return Ok(first);
        }
        let mut elements = vec![first];
        while self.scanner.eat(b',') {
            self.ws()?;
            if !self.looking_at_expression() {
                break;
            }
            elements.push(self.space_list_expression()?);
            self.ws()?;
        }
        Ok(Expr::List {
            elements,
            separator: ListSeparator::Comma,
            brackets: false,
            span: self.scanner.span_from(start),
        })
    }

    /// One comma-list element: a space list of operator expressions.
    pub(crate) fn space_list_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let first = self.or_expression()?;
        self.ws()?;
        if !self.looking_at_expression() {
            return Ok(first);
        }
        let mut elements = vec![first];
        loop {
            elements.push(self.or_expression()?);
            self.ws()?;
            if !self.looking_at_expression() {
                break;
            }
        }
        Ok(Expr::List {
            elements,
            separator: ListSeparator::Space,
            brackets: false,
            span: self.scanner.span_from(start),
        })
    }

    pub(crate) fn or_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.and_expression()?;
        loop {
            self.ws()?;
            if !self.eat_keyword("or") {
                return Ok(left);
            }
            self.ws()?;
            let right = self.and_expression()?;
            left = binary(BinaryOp::Or, left, right, self.scanner.span_from(start));
        }
    }

    fn and_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.not_expression()?;
        loop {
            self.ws()?;
            if !self.eat_keyword("and") {
                return Ok(left);
            }
            self.ws()?;
            let right = self.not_expression()?;
            left = binary(BinaryOp::And, left, right, self.scanner.span_from(start));
        }
    }

    fn not_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        if self.eat_keyword("not") {
            self.ws()?;
            let operand = self.not_expression()?;
            return Ok(Expr::UnaryOp {
                op: UnaryOp::Not,
                operand: Box::new(operand),
                span: self.scanner.span_from(start),
            });
        }
        self.equality_expression()
    }

    fn equality_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.relational_expression()?;
        loop {
            self.ws()?;
            let op = if self.scanner.eat_str("==") {
                BinaryOp::Eq
            } else if self.scanner.eat_str("!=") {
                BinaryOp::Ne
            } else {
                return Ok(left);
            };
            self.ws()?;
            let right = self.relational_expression()?;
            left = binary(op, left, right, self.scanner.span_from(start));
        }
    }

    fn relational_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.additive_expression()?;
        loop {
            self.ws()?;
            let op = if self.scanner.eat_str("<=") {
                BinaryOp::Le
            } else if self.scanner.eat_str(">=") {
                BinaryOp::Ge
            } else if self.scanner.peek() == Some(b'<') {
                self.scanner.eat(b'<');
                BinaryOp::Lt
            } else if self.scanner.peek() == Some(b'>') {
                self.scanner.eat(b'>');
                BinaryOp::Gt
            } else {
                return Ok(left);
            };
            self.ws()?;
            let right = self.additive_expression()?;
            left = binary(op, left, right, self.scanner.span_from(start));
        }
    }

    fn additive_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.multiplicative_expression()?;
        loop {
            let before_ws = self.scanner.position();
            self.ws()?;
            let had_ws = self.scanner.position() > before_ws;
            let op = match self.scanner.peek() {
                Some(b'+') => BinaryOp::Plus,
                Some(b'-') => BinaryOp::Minus,
                _ => return Ok(left),
            };
            // `1 -2` is the space list (1, -2): whitespace before the
            // sign but none after marks a unary sign, not subtraction.
            let after = self.scanner.peek_at(1);
            let unary_shaped = had_ws
                && !matches!(after, Some(b' ' | b'\t' | b'\n' | b'\r'))
                && after.is_some();
            if unary_shaped {
                return Ok(left);
            }
            // `-foo` is an identifier, not subtraction of `foo`.
            if op == BinaryOp::Minus
                && !had_ws
                && matches!(after, Some(next) if Scanner::is_ident_start(next))
                && !matches!(&left, Expr::Number { .. } | Expr::Variable { .. } | Expr::Paren(..) | Expr::FunctionCall { .. })
            {
                return Ok(left);
            }
            self.scanner.bump();
            self.ws()?;
            let right = self.multiplicative_expression()?;
            left = binary(op, left, right, self.scanner.span_from(start));
        }
    }

    fn multiplicative_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let mut left = self.unary_expression()?;
        loop {
            self.ws()?;
            let op = match self.scanner.peek() {
                Some(b'*') => BinaryOp::Times,
                Some(b'/') => BinaryOp::Div,
                Some(b'%') => BinaryOp::Mod,
                _ => return Ok(left),
            };
            self.scanner.bump();
            self.ws()?;
            let right = self.unary_expression()?;
            left = binary(op, left, right, self.scanner.span_from(start));
        }
    }

    fn unary_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let op = match self.scanner.peek() {
            Some(b'+') if !matches!(self.scanner.peek_at(1), Some(b) if b.is_ascii_digit() || b == b'.') => {
                Some(UnaryOp::Plus)
            }
            Some(b'-') => {
                // A sign directly on a number is part of the literal; an
                // identifier start means `-name`.
                match self.scanner.peek_at(1) {
                    Some(b) if b.is_ascii_digit() || b == b'.' => None,
                    Some(b) if Scanner::is_ident_start(b) || b == b'-' => None,
                    _ => Some(UnaryOp::Minus),
                }
            }
            Some(b'/') => Some(UnaryOp::Div),
            _ => None,
        };
        if let Some(op) = op {
            self.scanner.bump();
            self.ws()?;
            let operand = self.unary_expression()?;
            return Ok(Expr::UnaryOp {
                op,
                operand: Box::new(operand),
                span: self.scanner.span_from(start),
            });
        }
        self.primary_expression()
    }

    fn primary_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        match self.scanner.peek() {
            Some(b'(') => self.paren_or_map(),
            Some(b'[') => self.bracketed_list(),
            Some(b'$') => self.variable_expression(None),
            Some(b'"') | Some(b'\'') => self.quoted_string_expression(),
            Some(b'#') => {
                if self.scanner.peek_at(1) == Some(b'{') {
                    self.identifier_like_expression()
                } else {
                    self.hex_color_expression()
                }
            }
            Some(b'!') => self.important_expression(),
            Some(b'+') | Some(b'-') | Some(b'.') => self.number_or_identifier(),
            Some(byte) if byte.is_ascii_digit() => self.number_expression(),
            Some(byte) if Scanner::is_ident_start(byte) => self.identifier_like_expression(),
            _ => Err(self
                .scanner
                .error(format!("expected expression at offset {start}"))),
        }
    }

    fn number_or_identifier(&mut self) -> SassResult<Expr> {
        match self.scanner.peek() {
            Some(b'-') => match self.scanner.peek_at(1) {
                Some(b) if b.is_ascii_digit() || b == b'.' => self.number_expression(),
                _ => self.identifier_like_expression(),
            },
            _ => self.number_expression(),
        }
    }

    fn number_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let negative = self.scanner.eat(b'-');
        if !negative {
            self.scanner.eat(b'+');
        }
        let mut saw_digit = false;
        while matches!(self.scanner.peek(), Some(b) if b.is_ascii_digit()) {
            self.scanner.bump();
            saw_digit = true;
        }
        if self.scanner.peek() == Some(b'.')
            && matches!(self.scanner.peek_at(1), Some(b) if b.is_ascii_digit())
        {
            self.scanner.bump();
            while matches!(self.scanner.peek(), Some(b) if b.is_ascii_digit()) {
                self.scanner.bump();
                saw_digit = true;
            }
        }
        if !saw_digit {
            return Err(self.scanner.error("expected number"));
        }
        if matches!(self.scanner.peek(), Some(b'e' | b'E'))
            && matches!(
                self.scanner.peek_at(1),
                Some(b) if b.is_ascii_digit() || b == b'+' || b == b'-'
            )
        {
            self.scanner.bump();
            self.scanner.eat(b'+');
            self.scanner.eat(b'-');
            while matches!(self.scanner.peek(), Some(b) if b.is_ascii_digit()) {
                self.scanner.bump();
            }
        }
        let text = self.scanner.slice_from(start);
        let value: f64 = text
            .parse()
            .map_err(|_| self.scanner.error(format!("invalid number \"{text}\"")))?;

        let unit = if self.scanner.eat(b'%') {
            Some("%".to_string())
        } else if self.scanner.looking_at_identifier() {
            Some(self.scanner.scan_identifier()?.to_string())
        } else {
            None
        };
        Ok(Expr::Number {
            value,
            unit,
            span: self.scanner.span_from(start),
        })
    }

    fn hex_color_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        self.scanner.expect(b'#')?;
        let digits_start = self.scanner.position();
        while matches!(self.scanner.peek(), Some(b) if b.is_ascii_hexdigit()) {
            self.scanner.bump();
        }
        let digits = self.scanner.slice_from(digits_start);
        let span = self.scanner.span_from(start);
        let (red, green, blue, alpha) = match digits.len() {
            3 | 4 => {
                let channel = |idx: usize| {
                    let value = u8::from_str_radix(&digits[idx..=idx], 16).unwrap_or(0);
                    value * 17
                };
                let alpha = if digits.len() == 4 {
                    f64::from(u8::from_str_radix(&digits[3..4], 16).unwrap_or(0) * 17) / 255.0
                } else {
                    1.0
                };
                (channel(0), channel(1), channel(2), alpha)
            }
            6 | 8 => {
                let channel =
                    |idx: usize| u8::from_str_radix(&digits[idx..idx + 2], 16).unwrap_or(0);
                let alpha = if digits.len() == 8 {
                    f64::from(channel(6)) / 255.0
                } else {
                    1.0
                };
                (channel(0), channel(2), channel(4), alpha)
            }
            _ => {
                return Err(SassError::parse("expected hex digits after \"#\"", span));
            }
        };
        Ok(Expr::Color {
            red,
            green,
            blue,
            alpha,
            span,
        })
    }

    fn important_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        self.scanner.expect(b'!')?;
        self.ws()?;
        let word = self.scanner.scan_identifier()?;
        if !word.eq_ignore_ascii_case("important") {
            return Err(self.scanner.error(format!("expected \"important\", found \"{word}\"")));
        }
        Ok(Expr::String {
            contents: Interpolation::plain("!important", self.scanner.span_from(start)),
            quoted: false,
            span: self.scanner.span_from(start),
        })
    }

    fn variable_expression(&mut self, namespace: Option<String>) -> SassResult<Expr> {
        let start = self.scanner.position();
        self.scanner.expect(b'$')?;
        let name = self.scanner.scan_variable_name()?.to_string();
        if self.plain_css {
            return Err(SassError::parse(
                "Sass variables aren't allowed in plain CSS.",
                self.scanner.span_from(start),
            ));
        }
        Ok(Expr::Variable {
            name,
            namespace,
            span: self.scanner.span_from(start),
        })
    }

    fn quoted_string_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        let contents = self.quoted_string_interpolation()?;
        Ok(Expr::String {
            contents,
            quoted: true,
            span: self.scanner.span_from(start),
        })
    }

    /// The body of a quoted string, with escapes and `#{}` handled.
    pub(crate) fn quoted_string_interpolation(&mut self) -> SassResult<Interpolation> {
        let start = self.scanner.position();
        let quote = match self.scanner.peek() {
            Some(q @ (b'"' | b'\'')) => q,
            _ => return Err(self.scanner.error("expected string")),
        };
        self.scanner.bump();
        let mut contents = Interpolation::empty(Span::DUMMY);
        let mut buffer = String::new();
        loop {
            match self.scanner.peek() {
                None => return Err(self.scanner.error("unterminated string")),
                Some(b) if b == quote => {
                    self.scanner.bump();
                    break;
                }
                Some(b'\\') => {
                    self.scanner.bump();
                    match self.scanner.bump() {
                        Some(escaped) => buffer.push(escaped),
                        None => return Err(self.scanner.error("unterminated string")),
                    }
                }
                Some(b'#') if self.scanner.peek_at(1) == Some(b'{') => {
                    contents.push_text(&buffer);
                    buffer.clear();
                    contents.push_expr(self.single_interpolation()?);
                }
                _ => {
                    if let Some(ch) = self.scanner.bump() {
                        buffer.push(ch);
                    }
                }
            }
        }
        contents.push_text(&buffer);
        contents.span = self.scanner.span_from(start);
        Ok(contents)
    }

    /// `#{ expression }`.
    pub(crate) fn single_interpolation(&mut self) -> SassResult<Expr> {
        self.scanner.expect(b'#')?;
        self.scanner.expect(b'{')?;
        self.ws()?;
        let expr = self.expression()?;
        self.ws()?;
        self.scanner.expect(b'}')?;
        Ok(expr)
    }

    /// An identifier-shaped expression: keyword literal, function call,
    /// namespaced member, or an (interpolated) unquoted string.
    fn identifier_like_expression(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();

        // Plain identifier run first; interpolation may extend it below.
        let plain = if self.scanner.looking_at_identifier() {
            Some(self.scanner.scan_identifier()?.to_string())
        } else {
            None
        };

        if let Some(ref word) = plain {
            let span = self.scanner.span_from(start);
            // Keyword literals, unless something identifier-ish follows.
            let followed_by_more = matches!(self.scanner.peek(), Some(b'#'))
                || self.scanner.peek() == Some(b'(')
                || self.scanner.peek() == Some(b'.');
            if !followed_by_more {
                match word.as_str() {
                    "true" => return Ok(Expr::Boolean(true, span)),
                    "false" => return Ok(Expr::Boolean(false, span)),
                    "null" => return Ok(Expr::Null(span)),
                    _ => {}
                }
            }

            // Namespaced member: `ns.$var` or `ns.fn(...)`.
            if self.scanner.peek() == Some(b'.') && !self.plain_css {
                match self.scanner.peek_at(1) {
                    Some(b'$') => {
                        self.scanner.bump();
                        return self.variable_expression(Some(word.clone()));
                    }
                    Some(next) if Scanner::is_ident_start(next) => {
                        let dot = self.scanner.position();
                        self.scanner.bump();
                        let member = self.scanner.scan_identifier()?.to_string();
                        if self.scanner.peek() == Some(b'(') {
                            let args = self.argument_invocation()?;
                            return Ok(Expr::FunctionCall {
                                name: member,
                                namespace: Some(word.clone()),
                                args,
                                span: self.scanner.span_from(start),
                            });
                        }
                        // Not a call: back out of the dot; the identifier
                        // stands alone (e.g. a dotted keyframe name).
                        self.scanner.set_position(dot);
                    }
                    _ => {}
                }
            }

            // Function calls.
            if self.scanner.peek() == Some(b'(') {
                if is_raw_css_function(word) {
                    let arguments = self.raw_paren_interpolation()?;
                    return Ok(Expr::InterpolatedFunction {
                        name: Interpolation::plain(word.clone(), span),
                        arguments,
                        span: self.scanner.span_from(start),
                    });
                }
                if !self.plain_css {
                    let args = self.argument_invocation()?;
                    return Ok(Expr::FunctionCall {
                        name: word.clone(),
                        namespace: None,
                        args,
                        span: self.scanner.span_from(start),
                    });
                }
                // Plain CSS: any function is raw text.
                let arguments = self.raw_paren_interpolation()?;
                return Ok(Expr::InterpolatedFunction {
                    name: Interpolation::plain(word.clone(), span),
                    arguments,
                    span: self.scanner.span_from(start),
                });
            }
        }

        // Unquoted string, possibly interpolated: `foo#{$x}-bar`.
        let mut contents = Interpolation::empty(Span::DUMMY);
        if let Some(word) = plain {
            contents.push_text(&word);
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
            return Err(self.scanner.error("expected expression"));
        }
        contents.span = self.scanner.span_from(start);
        Ok(Expr::String {
            contents,
            quoted: false,
            span: self.scanner.span_from(start),
        })
    }

    /// Balanced raw text inside parentheses, `#{}` still live. Consumes
    /// the opening and closing parens; the parens are kept in the text.
    fn raw_paren_interpolation(&mut self) -> SassResult<Interpolation> {
        let start = self.scanner.position();
        self.scanner.expect(b'(')?;
        let mut contents = Interpolation::plain("(", Span::DUMMY);
        let mut depth = 1usize;
        loop {
            match self.scanner.peek() {
                None => return Err(self.scanner.error("expected \")\"")),
                Some(b'#') if self.scanner.peek_at(1) == Some(b'{') => {
                    contents.push_expr(self.single_interpolation()?);
                }
                Some(b'(') => {
                    depth += 1;
                    self.scanner.bump();
                    contents.push_text("(");
                }
                Some(b')') => {
                    depth -= 1;
                    self.scanner.bump();
                    contents.push_text(")");
                    if depth == 0 {
                        break;
                    }
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

    fn paren_or_map(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        self.scanner.expect(b'(')?;
        self.ws()?;
        if self.scanner.eat(b')') {
            return Ok(Expr::List {
                elements: Vec::new(),
                separator: ListSeparator::Undecided,
                brackets: false,
                span: self.scanner.span_from(start),
            });
        }
        let first = self.space_list_expression()?;
        self.ws()?;

        if self.scanner.eat(b':') {
            self.ws()?;
            let mut pairs = vec![(first, self.space_list_expression()?)];
            self.ws()?;
            while self.scanner.eat(b',') {
                self.ws()?;
                if self.scanner.peek() == Some(b')') {
                    break;
                }
                let key = self.space_list_expression()?;
                self.ws()?;
                self.scanner.expect(b':')?;
                self.ws()?;
                pairs.push((key, self.space_list_expression()?));
                self.ws()?;
            }
            self.scanner.expect(b')')?;
            return Ok(Expr::Map {
                pairs,
                span: self.scanner.span_from(start),
            });
        }

        if self.scanner.eat(b',') {
            let mut elements = vec![first];
            loop {
                self.ws()?;
                if self.scanner.peek() == Some(b')') {
                    break;
                }
                elements.push(self.space_list_expression()?);
                self.ws()?;
                if !self.scanner.eat(b',') {
                    break;
                }
            }
            self.scanner.expect(b')')?;
            return Ok(Expr::List {
                elements,
                separator: ListSeparator::Comma,
                brackets: false,
                span: self.scanner.span_from(start),
            });
        }

        self.scanner.expect(b')')?;
        Ok(Expr::Paren(
            Box::new(first),
            self.scanner.span_from(start),
        ))
    }

    fn bracketed_list(&mut self) -> SassResult<Expr> {
        let start = self.scanner.position();
        self.scanner.expect(b'[')?;
        self.ws()?;
        if self.scanner.eat(b']') {
            return Ok(Expr::List {
                elements: Vec::new(),
                separator: ListSeparator::Undecided,
                brackets: true,
                span: self.scanner.span_from(start),
            });
        }
        let inner = self.expression()?;
        self.ws()?;
        self.scanner.expect(b']')?;
        let span = self.scanner.span_from(start);
        Ok(match inner {
            Expr::List {
                elements,
                separator,
                brackets: false,
                ..
            } => Expr::List {
                elements,
                separator,
                brackets: true,
                span,
            },
            single => Expr::List {
                elements: vec![single],
                separator: ListSeparator::Undecided,
                brackets: true,
                span,
            },
        })
    }

    /// Call-site arguments: positionals, `$name: value` keywords, and
    /// `...` rest / keyword-rest.
    pub(crate) fn argument_invocation(&mut self) -> SassResult<ArgumentInvocation> {
        let start = self.scanner.position();
        self.scanner.expect(b'(')?;
        let mut invocation = ArgumentInvocation::empty(Span::DUMMY);
        loop {
            self.ws()?;
            if self.scanner.eat(b')') {
                break;
            }
            // Named argument: `$name: value` (speculative).
            if self.scanner.peek() == Some(b'$') {
                let save = self.scanner.position();
                self.scanner.bump();
                let name = self.scanner.scan_variable_name()?.to_string();
                self.ws()?;
                if self.scanner.eat(b':') {
                    self.ws()?;
                    let value = self.space_list_expression()?;
                    invocation.named.push((name, value));
                    self.ws()?;
                    if !self.scanner.eat(b',') {
                        self.scanner.expect(b')')?;
                        break;
                    }
                    continue;
                }
                self.scanner.set_position(save);
            }
            let value = self.space_list_expression()?;
            self.ws()?;
            if self.scanner.eat_str("...") {
                if invocation.rest.is_none() {
                    invocation.rest = Some(Box::new(value));
                } else {
                    invocation.keyword_rest = Some(Box::new(value));
                }
                self.ws()?;
                if !self.scanner.eat(b',') {
                    self.scanner.expect(b')')?;
                    break;
                }
                continue;
            }
            invocation.positional.push(value);
            self.ws()?;
            if !self.scanner.eat(b',') {
                self.scanner.expect(b')')?;
                break;
            }
        }
        invocation.span = self.scanner.span_from(start);
        Ok(invocation)
    }

    /// Whether the next byte can begin an expression.
    pub(crate) fn looking_at_expression(&self) -> bool {
        match self.scanner.peek() {
            None => false,
            Some(byte) => match byte {
                b'$' | b'(' | b'[' | b'"' | b'\'' => true,
                b'#' => true,
                b'.' => matches!(self.scanner.peek_at(1), Some(b) if b.is_ascii_digit()),
                b'+' | b'-' => matches!(
                    self.scanner.peek_at(1),
                    Some(b) if b.is_ascii_digit() || b == b'.' || Scanner::is_ident_start(b) || b == b'-'
                ),
                b'!' => self.scanner.matches("!i") || self.scanner.matches("!I"),
                _ => byte.is_ascii_digit() || Scanner::is_ident_start(byte),
            },
        }
    }

    /// Keyword operator (`and`, `or`, `not`) at an identifier boundary.
    pub(crate) fn eat_keyword(&mut self, word: &str) -> bool {
        if !self.scanner.matches(word) {
            return false;
        }
        let end = self.scanner.position() + word.len();
        let boundary = self
            .scanner
            .source()
            .as_bytes()
            .get(end)
            .map_or(true, |&b| !Scanner::is_ident_byte(b));
        if boundary {
            let _ = self.scanner.eat_str(word);
            true
        } else {
            false
        }
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr, span: Span) -> Expr {
    Expr::BinaryOp {
        op,
        left: Box::new(left),
        right: Box::new(right),
        span,
    }
}

/// CSS functions whose arguments are never SassScript: kept as raw text
/// (with interpolation) and rebuilt at evaluation time.
fn is_raw_css_function(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    matches!(
        lower.as_str(),
        "calc" | "var" | "env" | "clamp" | "url" | "counter" | "counters" | "expression"
    )
}
