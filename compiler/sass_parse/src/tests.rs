//! Parser tests across the statement and expression grammars.

#![allow(clippy::unwrap_used)]

use pretty_assertions::assert_eq;
use sass_ir::{
    BinaryOp, Expr, ImportArg, ListSeparator, Stmt, Syntax, UseNamespace,
};

use crate::parse;

fn parse_scss(source: &str) -> Vec<Stmt> {
    parse(source, Syntax::Scss, None).unwrap().statements
}

fn parse_value(source: &str) -> Expr {
    let sheet = parse_scss(&format!("a {{ b: {source}; }}"));
    match &sheet[0] {
        Stmt::StyleRule { body, .. } => match &body[0] {
            Stmt::Declaration { value: Some(value), .. } => value.clone(),
            other => panic!("expected declaration, got {other:?}"),
        },
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_style_rule_with_declaration() {
    let stmts = parse_scss("a { b: c; }");
    match &stmts[0] {
        Stmt::StyleRule { selector, body, .. } => {
            assert_eq!(selector.as_plain(), Some("a"));
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_nested_style_rules() {
    let stmts = parse_scss("a { b { c: d; } }");
    match &stmts[0] {
        Stmt::StyleRule { body, .. } => {
            assert!(matches!(&body[0], Stmt::StyleRule { .. }));
        }
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_pseudo_selector_is_a_rule() {
    let stmts = parse_scss("a { &:hover { b: c; } }");
    match &stmts[0] {
        Stmt::StyleRule { body, .. } => match &body[0] {
            Stmt::StyleRule { selector, .. } => {
                assert_eq!(selector.as_plain(), Some("&:hover"));
            }
            other => panic!("expected nested rule, got {other:?}"),
        },
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_nested_property_block() {
    let stmts = parse_scss("a { font: { family: serif; } }");
    match &stmts[0] {
        Stmt::StyleRule { body, .. } => match &body[0] {
            Stmt::Declaration { value, body, .. } => {
                assert!(value.is_none());
                assert_eq!(body.len(), 1);
            }
            other => panic!("expected nested property, got {other:?}"),
        },
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_variable_declaration_flags() {
    let stmts = parse_scss("$x: 1 !default;\n$y: 2 !global;");
    match &stmts[0] {
        Stmt::VariableDecl { name, default, global, .. } => {
            assert_eq!(name, "x");
            assert!(*default);
            assert!(!*global);
        }
        other => panic!("expected variable, got {other:?}"),
    }
    match &stmts[1] {
        Stmt::VariableDecl { global, .. } => assert!(*global),
        other => panic!("expected variable, got {other:?}"),
    }
}

#[test]
fn test_use_rule_forms() {
    let stmts = parse_scss(
        "@use \"a/b\";\n@use \"c\" as d;\n@use \"e\" as *;\n@use \"f\" with ($g: 1);",
    );
    match &stmts[0] {
        Stmt::Use(rule) => {
            assert_eq!(rule.url, "a/b");
            assert_eq!(rule.namespace, UseNamespace::Default);
        }
        other => panic!("expected use, got {other:?}"),
    }
    match &stmts[1] {
        Stmt::Use(rule) => assert_eq!(rule.namespace, UseNamespace::Named("d".to_string())),
        other => panic!("expected use, got {other:?}"),
    }
    match &stmts[2] {
        Stmt::Use(rule) => assert_eq!(rule.namespace, UseNamespace::Global),
        other => panic!("expected use, got {other:?}"),
    }
    match &stmts[3] {
        Stmt::Use(rule) => {
            assert_eq!(rule.configuration.len(), 1);
            assert_eq!(rule.configuration[0].name, "g");
        }
        other => panic!("expected use, got {other:?}"),
    }
}

#[test]
fn test_forward_rule_filters() {
    let stmts = parse_scss("@forward \"src/list\" as list-* show $spacing, corner;");
    match &stmts[0] {
        Stmt::Forward(rule) => {
            assert_eq!(rule.prefix.as_deref(), Some("list-"));
            let visibility = rule.visibility.as_ref().unwrap();
            assert!(visibility.show);
            assert!(visibility.allows_variable("spacing"));
            assert!(visibility.allows_member("corner"));
            assert!(!visibility.allows_member("other"));
        }
        other => panic!("expected forward, got {other:?}"),
    }
}

#[test]
fn test_import_static_and_dynamic() {
    let stmts = parse_scss("@import \"theme.css\", \"partial\";");
    match &stmts[0] {
        Stmt::Import(rule) => {
            assert!(matches!(&rule.imports[0], ImportArg::Static { .. }));
            assert!(
                matches!(&rule.imports[1], ImportArg::Dynamic { url, .. } if url == "partial")
            );
        }
        other => panic!("expected import, got {other:?}"),
    }
}

#[test]
fn test_mixin_include_with_content() {
    let stmts = parse_scss(
        "@mixin frame($width: 1px) { border: $width; @content; }\n\
         a { @include frame(2px) { color: red; } }",
    );
    match &stmts[0] {
        Stmt::MixinDecl { name, arguments, body, .. } => {
            assert_eq!(name, "frame");
            assert_eq!(arguments.parameters.len(), 1);
            assert!(matches!(body[1], Stmt::Content { .. }));
        }
        other => panic!("expected mixin, got {other:?}"),
    }
    match &stmts[1] {
        Stmt::StyleRule { body, .. } => match &body[0] {
            Stmt::Include { name, content, arguments, .. } => {
                assert_eq!(name, "frame");
                assert_eq!(arguments.positional.len(), 1);
                assert!(content.is_some());
            }
            other => panic!("expected include, got {other:?}"),
        },
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_function_declaration() {
    let stmts = parse_scss("@function double($x) { @return $x * 2; }");
    match &stmts[0] {
        Stmt::FunctionDecl { name, body, .. } => {
            assert_eq!(name, "double");
            assert!(matches!(&body[0], Stmt::Return { .. }));
        }
        other => panic!("expected function, got {other:?}"),
    }
}

#[test]
fn test_control_flow() {
    let stmts = parse_scss(
        "@if $a == 1 { a: b; } @else if $a == 2 { c: d; } @else { e: f; }\n\
         @each $x, $y in $pairs { g: h; }\n\
         @for $i from 1 through 3 { i: j; }\n\
         @while $k < 10 { l: m; }",
    );
    match &stmts[0] {
        Stmt::If { clauses, else_body, .. } => {
            assert_eq!(clauses.len(), 2);
            assert!(else_body.is_some());
        }
        other => panic!("expected if, got {other:?}"),
    }
    match &stmts[1] {
        Stmt::Each { variables, .. } => assert_eq!(variables, &["x", "y"]),
        other => panic!("expected each, got {other:?}"),
    }
    match &stmts[2] {
        Stmt::For { inclusive, .. } => assert!(*inclusive),
        other => panic!("expected for, got {other:?}"),
    }
    assert!(matches!(&stmts[3], Stmt::While { .. }));
}

#[test]
fn test_generic_at_rule_passthrough() {
    let stmts = parse_scss("@media screen and (min-width: 100px) { a { b: c; } }");
    match &stmts[0] {
        Stmt::AtRule { name, prelude, body, .. } => {
            assert_eq!(name.as_plain(), Some("media"));
            assert_eq!(
                prelude.as_ref().unwrap().as_plain(),
                Some("screen and (min-width: 100px)")
            );
            assert!(body.is_some());
        }
        other => panic!("expected at-rule, got {other:?}"),
    }
}

#[test]
fn test_number_with_unit() {
    match parse_value("12.5px") {
        Expr::Number { value, unit, .. } => {
            assert!((value - 12.5).abs() < 1e-9);
            assert_eq!(unit.as_deref(), Some("px"));
        }
        other => panic!("expected number, got {other:?}"),
    }
    match parse_value("50%") {
        Expr::Number { unit, .. } => assert_eq!(unit.as_deref(), Some("%")),
        other => panic!("expected number, got {other:?}"),
    }
}

#[test]
fn test_binary_precedence() {
    match parse_value("1 + 2 * 3") {
        Expr::BinaryOp { op: BinaryOp::Plus, right, .. } => {
            assert!(matches!(*right, Expr::BinaryOp { op: BinaryOp::Times, .. }));
        }
        other => panic!("expected plus, got {other:?}"),
    }
}

#[test]
fn test_space_list_vs_subtraction() {
    // `1 -2` is a two-element space list; `1 - 2` is subtraction.
    match parse_value("1 -2") {
        Expr::List { elements, separator, .. } => {
            assert_eq!(elements.len(), 2);
            assert_eq!(separator, ListSeparator::Space);
        }
        other => panic!("expected list, got {other:?}"),
    }
    assert!(matches!(
        parse_value("1 - 2"),
        Expr::BinaryOp { op: BinaryOp::Minus, .. }
    ));
    assert!(matches!(
        parse_value("1-2"),
        Expr::BinaryOp { op: BinaryOp::Minus, .. }
    ));
}

#[test]
fn test_comma_list_and_map() {
    match parse_value("1, 2, 3") {
        Expr::List { elements, separator, .. } => {
            assert_eq!(elements.len(), 3);
            assert_eq!(separator, ListSeparator::Comma);
        }
        other => panic!("expected list, got {other:?}"),
    }
    match parse_value("(a: 1, b: 2)") {
        Expr::Map { pairs, .. } => assert_eq!(pairs.len(), 2),
        other => panic!("expected map, got {other:?}"),
    }
}

#[test]
fn test_bracketed_list() {
    match parse_value("[a b]") {
        Expr::List { brackets, elements, .. } => {
            assert!(brackets);
            assert_eq!(elements.len(), 2);
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_hex_colors() {
    match parse_value("#ff0000") {
        Expr::Color { red, green, blue, .. } => {
            assert_eq!((red, green, blue), (255, 0, 0));
        }
        other => panic!("expected color, got {other:?}"),
    }
    match parse_value("#f00") {
        Expr::Color { red, .. } => assert_eq!(red, 255),
        other => panic!("expected color, got {other:?}"),
    }
}

#[test]
fn test_interpolation_in_string() {
    match parse_value("\"a #{$x} b\"") {
        Expr::String { contents, quoted, .. } => {
            assert!(quoted);
            assert!(contents.is_dynamic());
        }
        other => panic!("expected string, got {other:?}"),
    }
}

#[test]
fn test_namespaced_members() {
    match parse_value("colors.$primary") {
        Expr::Variable { name, namespace, .. } => {
            assert_eq!(name, "primary");
            assert_eq!(namespace.as_deref(), Some("colors"));
        }
        other => panic!("expected variable, got {other:?}"),
    }
    match parse_value("math.div(1, 2)") {
        Expr::FunctionCall { name, namespace, args, .. } => {
            assert_eq!(name, "div");
            assert_eq!(namespace.as_deref(), Some("math"));
            assert_eq!(args.positional.len(), 2);
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_calc_stays_raw() {
    match parse_value("calc(100% - #{$x})") {
        Expr::InterpolatedFunction { name, arguments, .. } => {
            assert_eq!(name.as_plain(), Some("calc"));
            assert!(arguments.is_dynamic());
        }
        other => panic!("expected raw function, got {other:?}"),
    }
}

#[test]
fn test_named_and_rest_arguments() {
    match parse_value("frob($a, $b: 2, $rest...)") {
        Expr::FunctionCall { args, .. } => {
            assert_eq!(args.positional.len(), 1);
            assert_eq!(args.named.len(), 1);
            assert!(args.rest.is_some());
        }
        other => panic!("expected call, got {other:?}"),
    }
}

#[test]
fn test_important() {
    match parse_value("red !important") {
        Expr::List { elements, .. } => {
            assert!(matches!(
                &elements[1],
                Expr::String { quoted: false, contents, .. }
                    if contents.as_plain() == Some("!important")
            ));
        }
        other => panic!("expected list, got {other:?}"),
    }
}

#[test]
fn test_plain_css_rejects_sass() {
    assert!(parse("a { b: $x; }", Syntax::Css, None).is_err());
    assert!(parse("@mixin m { }", Syntax::Css, None).is_err());
    assert!(parse("a { b: c; }", Syntax::Css, None).is_ok());
}

#[test]
fn test_indented_syntax_end_to_end() {
    let sheet = parse("a\n  b: c\n", Syntax::Indented, None).unwrap();
    match &sheet.statements[0] {
        Stmt::StyleRule { selector, body, .. } => {
            assert_eq!(selector.as_plain(), Some("a"));
            assert_eq!(body.len(), 1);
        }
        other => panic!("expected style rule, got {other:?}"),
    }
}

#[test]
fn test_parse_error_has_span() {
    let err = parse("a { b: ; }", Syntax::Scss, None).unwrap_err();
    assert_eq!(err.kind, sass_diagnostic::ErrorKind::Parse);
    assert!(err.span.is_some());
}

#[test]
fn test_loud_comment_kept() {
    let stmts = parse_scss("/* keep */ a { b: c; }");
    assert!(matches!(&stmts[0], Stmt::LoudComment { .. }));
}

#[test]
fn test_extend_optional() {
    let stmts = parse_scss("a { @extend .b !optional; }");
    match &stmts[0] {
        Stmt::StyleRule { body, .. } => match &body[0] {
            Stmt::Extend { selector, optional, .. } => {
                assert_eq!(selector.as_plain(), Some(".b"));
                assert!(*optional);
            }
            other => panic!("expected extend, got {other:?}"),
        },
        other => panic!("expected rule, got {other:?}"),
    }
}
