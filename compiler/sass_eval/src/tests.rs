//! End-to-end evaluator tests over an in-memory importer.

#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use pretty_assertions::assert_eq;
use rustc_hash::{FxHashMap, FxHashSet};
use sass_css::{render, OutputStyle};
use sass_diagnostic::{buffer_logger, SassResult, WarnDispatcher};
use sass_ir::{SourceUrl, Syntax};
use sass_resolve::{
    CanonicalizeContext, ChainImporter, Importer, ImporterResult, ResolverChain,
};

use crate::Evaluator;

/// Importer over a name → contents map, canonicalizing to `mem:` URLs.
struct MemoryImporter {
    files: FxHashMap<String, String>,
    loads: Arc<AtomicUsize>,
}

impl MemoryImporter {
    fn new(files: &[(&str, &str)]) -> Self {
        MemoryImporter {
            files: files
                .iter()
                .map(|(name, contents)| ((*name).to_string(), (*contents).to_string()))
                .collect(),
            loads: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Importer for MemoryImporter {
    fn canonicalize(
        &self,
        reference: &str,
        _context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>> {
        let name = reference.strip_prefix("mem:").unwrap_or(reference);
        if self.files.contains_key(name) {
            return Ok(Some(SourceUrl::parse(&format!("mem:{name}"))?));
        }
        Ok(None)
    }

    fn load(&self, url: &SourceUrl) -> SassResult<Option<ImporterResult>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(self.files.get(url.path()).map(|contents| ImporterResult {
            contents: contents.clone(),
            syntax: Syntax::Scss,
            source_map_url: None,
        }))
    }
}

fn compile_with(files: &[(&str, &str)], entry: &str) -> String {
    try_compile(files, entry).unwrap()
}

fn try_compile(files: &[(&str, &str)], entry: &str) -> SassResult<String> {
    let importer = MemoryImporter::new(files);
    let chain = ResolverChain::new(vec![ChainImporter::from(importer)], vec![], None);
    let (_buffer, logger) = buffer_logger();
    let dispatcher = WarnDispatcher::new(logger, FxHashSet::default());
    let mut evaluator = Evaluator::new(chain, dispatcher);
    let tree = evaluator.compile_entry(entry, Syntax::Scss, None, None)?;
    render(&tree, OutputStyle::Expanded, true)
}

fn compile(entry: &str) -> String {
    compile_with(&[], entry)
}

#[test]
fn test_plain_rule() {
    assert_eq!(compile("a { b: c; }"), "a {\n  b: c;\n}");
}

#[test]
fn test_variables_and_arithmetic() {
    assert_eq!(
        compile("$w: 10px;\na { width: $w + 5px; }"),
        "a {\n  width: 15px;\n}"
    );
}

#[test]
fn test_nested_rules_and_parent_selector() {
    assert_eq!(
        compile("a { color: red; b { color: blue; } &:hover { color: green; } }"),
        "a {\n  color: red;\n}\n\na b {\n  color: blue;\n}\n\na:hover {\n  color: green;\n}"
    );
}

#[test]
fn test_null_declarations_vanish() {
    assert_eq!(compile("a { b: null; c: d; }"), "a {\n  c: d;\n}");
}

#[test]
fn test_interpolation_in_selector_and_value() {
    assert_eq!(
        compile("$side: left;\na { margin-#{$side}: 1px; b: \"#{$side}\"; }"),
        "a {\n  margin-left: 1px;\n  b: \"left\";\n}"
    );
}

#[test]
fn test_mixin_with_content_block() {
    let source = "\
@mixin frame($width: 1px) {\n  border: $width;\n  @content;\n}\n\
a { @include frame(2px) { color: red; } }";
    assert_eq!(
        compile(source),
        "a {\n  border: 2px;\n  color: red;\n}"
    );
}

#[test]
fn test_function_and_return() {
    let source = "\
@function double($x) { @return $x * 2; }\n\
a { width: double(4px); }";
    assert_eq!(compile(source), "a {\n  width: 8px;\n}");
}

#[test]
fn test_control_flow() {
    let source = "\
a {\n  @if 1 == 2 { b: wrong; } @else { b: right; }\n\
  @each $i in 1 2 { c-#{$i}: $i; }\n\
  @for $i from 1 through 2 { d-#{$i}: $i; }\n}";
    assert_eq!(
        compile(source),
        "a {\n  b: right;\n  c-1: 1;\n  c-2: 2;\n  d-1: 1;\n  d-2: 2;\n}"
    );
}

#[test]
fn test_use_with_namespace() {
    let files = [(
        "corners",
        "$radius: 3px !default;\n@mixin rounded { border-radius: $radius; }",
    )];
    assert_eq!(
        compile_with(&files, "@use \"corners\";\na { @include corners.rounded; }"),
        "a {\n  border-radius: 3px;\n}"
    );
}

#[test]
fn test_use_with_configuration() {
    let files = [("corners", "$radius: 3px !default;\na { r: $radius; }")];
    assert_eq!(
        compile_with(&files, "@use \"corners\" with ($radius: 9px);"),
        "a {\n  r: 9px;\n}"
    );
}

#[test]
fn test_configuring_non_default_errors() {
    let files = [("corners", "$radius: 3px;")];
    let err = try_compile(&files, "@use \"corners\" with ($radius: 9px);").unwrap_err();
    assert!(err.message.contains("!default"));
}

#[test]
fn test_module_loaded_once() {
    let files = [
        ("shared", "a { b: c; }"),
        ("left", "@use \"shared\";"),
        ("right", "@use \"shared\";"),
    ];
    let importer = MemoryImporter::new(&files);
    let loads = importer.loads.clone();
    let chain = ResolverChain::new(vec![ChainImporter::from(importer)], vec![], None);
    let (_buffer, logger) = buffer_logger();
    let dispatcher = WarnDispatcher::new(logger, FxHashSet::default());
    let mut evaluator = Evaluator::new(chain, dispatcher);
    let tree = evaluator
        .compile_entry("@use \"left\";\n@use \"right\";", Syntax::Scss, None, None)
        .unwrap();
    let css = render(&tree, OutputStyle::Expanded, true).unwrap();
    // shared's CSS appears once, and shared was fetched exactly once.
    assert_eq!(css, "a {\n  b: c;\n}");
    assert_eq!(loads.load(Ordering::SeqCst), 3);
    assert_eq!(evaluator.loaded_urls().len(), 3);
}

#[test]
fn test_use_cycle_is_an_error() {
    let files = [("a", "@use \"b\";"), ("b", "@use \"a\";")];
    let err = try_compile(&files, "@use \"a\";").unwrap_err();
    assert_eq!(err.kind, sass_diagnostic::ErrorKind::Cycle);
}

#[test]
fn test_forward_reexports() {
    let files = [
        ("theme", "$spacing: 4px !default;\n@function gap() { @return $spacing; }"),
        ("api", "@forward \"theme\" as theme-*;"),
    ];
    assert_eq!(
        compile_with(
            &files,
            "@use \"api\";\na { margin: api.theme-gap(); pad: api.$theme-spacing; }"
        ),
        "a {\n  margin: 4px;\n  pad: 4px;\n}"
    );
}

#[test]
fn test_forward_hide_filters_members() {
    let files = [
        ("theme", "$visible: 1;\n$hidden: 2;"),
        ("api", "@forward \"theme\" hide $hidden;"),
    ];
    assert_eq!(
        compile_with(&files, "@use \"api\";\na { b: api.$visible; }"),
        "a {\n  b: 1;\n}"
    );
    let err = try_compile(
        &[
            ("theme", "$visible: 1;\n$hidden: 2;"),
            ("api", "@forward \"theme\" hide $hidden;"),
        ],
        "@use \"api\";\na { b: api.$hidden; }",
    )
    .unwrap_err();
    assert!(err.message.contains("Undefined variable"));
}

#[test]
fn test_import_merges_into_scope() {
    let files = [("legacy", "$color: teal;\nb { c: d; }")];
    assert_eq!(
        compile_with(&files, "@import \"legacy\";\na { color: $color; }"),
        "b {\n  c: d;\n}\n\na {\n  color: teal;\n}"
    );
}

#[test]
fn test_import_cycle_tolerated() {
    let files = [("a", "@import \"b\";\nx { y: a; }"), ("b", "@import \"a\";")];
    // The cycle resolves to the partially evaluated view: no error.
    let css = compile_with(&files, "@import \"a\";");
    assert_eq!(css, "x {\n  y: a;\n}");
}

#[test]
fn test_load_css_splices_at_call_site() {
    let files = [("other", "c { d: e; }")];
    let source = "@use \"sass:meta\";\na { b: c; }\n@include meta.load-css(\"other\");";
    assert_eq!(
        compile_with(&files, source),
        "a {\n  b: c;\n}\n\nc {\n  d: e;\n}"
    );
}

#[test]
fn test_builtin_modules() {
    let source = "\
@use \"sass:list\";\n@use \"sass:map\";\n@use \"sass:math\";\n\
$m: (a: 1, b: 2);\n\
a {\n  n: list.nth(10px 20px, 2);\n  g: map.get($m, b);\n  d: math.div(10, 4);\n}";
    assert_eq!(
        compile(source),
        "a {\n  n: 20px;\n  g: 2;\n  d: 2.5;\n}"
    );
}

#[test]
fn test_global_function_names() {
    assert_eq!(
        compile("a { b: nth((x y z), -1); c: str-length(\"four\"); }"),
        "a {\n  b: z;\n  c: 4;\n}"
    );
}

#[test]
fn test_slash_division_literal_stays_slash() {
    assert_eq!(
        compile("a { font: 12px/30px serif; }"),
        "a {\n  font: 12px/30px serif;\n}"
    );
}

#[test]
fn test_slash_division_in_parens_divides() {
    assert_eq!(compile("a { w: (12px/3); }"), "a {\n  w: 4px;\n}");
}

#[test]
fn test_media_inside_rule_hoists() {
    assert_eq!(
        compile("a { b: c; @media screen { d: e; } }"),
        "a {\n  b: c;\n}\n\n@media screen {\n  a {\n    d: e;\n  }\n}"
    );
}

#[test]
fn test_unknown_function_renders_as_css() {
    assert_eq!(
        compile("a { grid: repeat(2, 1fr); }"),
        "a {\n  grid: repeat(2, 1fr);\n}"
    );
}

#[test]
fn test_calc_is_a_calculation() {
    assert_eq!(
        compile("$x: 10px;\na { w: calc(100% - #{$x}); }"),
        "a {\n  w: calc(100% - 10px);\n}"
    );
}

#[test]
fn test_error_statement_carries_trace() {
    let source = "\
@function boom() { @error \"bad things\"; }\n\
@mixin use-boom() { b: boom(); }\n\
a { @include use-boom(); }";
    let err = try_compile(&[], source).unwrap_err();
    assert!(err.message.contains("bad things"));
    let names: Vec<&str> = err.trace.iter().map(|frame| frame.name.as_str()).collect();
    assert_eq!(names, ["function boom", "mixin use-boom"]);
}

#[test]
fn test_undefined_variable_errors() {
    let err = try_compile(&[], "a { b: $missing; }").unwrap_err();
    assert!(err.message.contains("Undefined variable"));
}

#[test]
fn test_hyphen_underscore_equivalence() {
    assert_eq!(
        compile("$main_width: 5px;\na { w: $main-width; }"),
        "a {\n  w: 5px;\n}"
    );
}

#[test]
fn test_global_assignment_rules() {
    let source = "\
$defined: 1;\n\
@mixin bump() { $defined: 2 !global; }\n\
a { @include bump(); b: $defined; }";
    assert_eq!(compile(source), "a {\n  b: 2;\n}");

    let err = try_compile(
        &[],
        "@mixin bad() { $fresh: 1 !global; }\na { @include bad(); }",
    )
    .unwrap_err();
    assert!(err.message.contains("!global"));
}

#[test]
fn test_rest_arguments_and_keywords() {
    let source = "\
@use \"sass:meta\";\n\
@function tail($args...) { @return meta.keywords($args); }\n\
a { b: map-get(tail($x: 1, $y: 2), \"y\"); }";
    assert_eq!(compile(source), "a {\n  b: 2;\n}");
}

#[test]
fn test_each_destructuring() {
    assert_eq!(
        compile("a { @each $k, $v in (x: 1, y: 2) { #{$k}: $v; } }"),
        "a {\n  x: 1;\n  y: 2;\n}"
    );
}
