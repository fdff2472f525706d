//! SassScript expression nodes.

use crate::{ArgumentInvocation, Interpolation, Span};

/// Separator between list elements.
///
/// `Undecided` marks single-element and empty lists whose separator has
/// not been observed; it adopts the context's separator when
/// concatenated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ListSeparator {
    Space,
    Comma,
    Slash,
    Undecided,
}

impl ListSeparator {
    /// The textual separator used when serializing.
    pub fn as_css(self) -> &'static str {
        match self {
            ListSeparator::Space | ListSeparator::Undecided => " ",
            ListSeparator::Comma => ", ",
            ListSeparator::Slash => " / ",
        }
    }
}

/// Binary SassScript operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Plus,
    Minus,
    Times,
    Div,
    Mod,
}

impl BinaryOp {
    /// The operator as written in source, used in lexical fallbacks and
    /// error messages.
    pub fn as_str(self) -> &'static str {
        match self {
            BinaryOp::Or => "or",
            BinaryOp::And => "and",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Times => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "%",
        }
    }
}

/// Unary SassScript operators.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Div,
    Not,
}

/// A SassScript expression.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    Null(Span),
    Boolean(bool, Span),
    Number {
        value: f64,
        /// Unit as written (`px`, `%`), if any.
        unit: Option<String>,
        span: Span,
    },
    /// Hex color literal, already split into channels.
    Color {
        red: u8,
        green: u8,
        blue: u8,
        alpha: f64,
        span: Span,
    },
    /// Quoted or unquoted string, possibly interpolated.
    String {
        contents: Interpolation,
        quoted: bool,
        span: Span,
    },
    Variable {
        name: String,
        namespace: Option<String>,
        span: Span,
    },
    List {
        elements: Vec<Expr>,
        separator: ListSeparator,
        brackets: bool,
        span: Span,
    },
    Map {
        pairs: Vec<(Expr, Expr)>,
        span: Span,
    },
    /// Parenthesized expression; parens matter for slash division.
    Paren(Box<Expr>, Span),
    UnaryOp {
        op: UnaryOp,
        operand: Box<Expr>,
        span: Span,
    },
    BinaryOp {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
        span: Span,
    },
    FunctionCall {
        name: String,
        namespace: Option<String>,
        args: ArgumentInvocation,
        span: Span,
    },
    /// A CSS function whose name is interpolated (`url(...)`, vendor
    /// functions); serialized rather than invoked.
    InterpolatedFunction {
        name: Interpolation,
        arguments: Interpolation,
        span: Span,
    },
}

impl Expr {
    /// The source span of this expression.
    pub fn span(&self) -> Span {
        match self {
            Expr::Null(span)
            | Expr::Boolean(_, span)
            | Expr::Number { span, .. }
            | Expr::Color { span, .. }
            | Expr::String { span, .. }
            | Expr::Variable { span, .. }
            | Expr::List { span, .. }
            | Expr::Map { span, .. }
            | Expr::Paren(_, span)
            | Expr::UnaryOp { span, .. }
            | Expr::BinaryOp { span, .. }
            | Expr::FunctionCall { span, .. }
            | Expr::InterpolatedFunction { span, .. } => *span,
        }
    }
}
