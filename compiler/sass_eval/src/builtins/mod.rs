//! Built-in modules and the legacy global function set.
//!
//! Each `sass:*` module is a static table of function pointers; the
//! evaluator materializes it into a `Module` (allocating arena ids) the
//! first time it is `@use`d. The global table carries the pre-module
//! names (`nth`, `map-get`, `str-length`, ...) that remain available
//! without a namespace.

mod colors;
mod lists;
mod maps;
mod math;
mod meta;
mod strings;

use sass_value::Value;

use crate::callable::{BuiltinFn, BuiltinMixinFn};

/// A built-in module definition.
pub struct ModuleDef {
    pub name: &'static str,
    pub functions: &'static [(&'static str, BuiltinFn)],
    pub mixins: &'static [(&'static str, BuiltinMixinFn)],
    pub variables: fn() -> Vec<(&'static str, Value)>,
}

fn no_variables() -> Vec<(&'static str, Value)> {
    Vec::new()
}

static LIST_MODULE: ModuleDef = ModuleDef {
    name: "list",
    functions: &[
        ("length", lists::length),
        ("nth", lists::nth),
        ("set-nth", lists::set_nth),
        ("join", lists::join),
        ("append", lists::append),
        ("index", lists::index),
        ("separator", lists::separator),
        ("is-bracketed", lists::is_bracketed),
        ("zip", lists::zip),
    ],
    mixins: &[],
    variables: no_variables,
};

static MAP_MODULE: ModuleDef = ModuleDef {
    name: "map",
    functions: &[
        ("get", maps::get),
        ("has-key", maps::has_key),
        ("merge", maps::merge),
        ("remove", maps::remove),
        ("keys", maps::keys),
        ("values", maps::values),
        ("set", maps::set),
    ],
    mixins: &[],
    variables: no_variables,
};

static MATH_MODULE: ModuleDef = ModuleDef {
    name: "math",
    functions: &[
        ("div", math::div),
        ("percentage", math::percentage),
        ("round", math::round),
        ("ceil", math::ceil),
        ("floor", math::floor),
        ("abs", math::abs),
        ("min", math::min),
        ("max", math::max),
        ("unit", math::unit),
        ("is-unitless", math::is_unitless),
        ("compatible", math::compatible),
    ],
    mixins: &[],
    variables: math::variables,
};

static STRING_MODULE: ModuleDef = ModuleDef {
    name: "string",
    functions: &[
        ("quote", strings::quote),
        ("unquote", strings::unquote),
        ("length", strings::length),
        ("insert", strings::insert),
        ("index", strings::index),
        ("slice", strings::slice),
        ("to-upper-case", strings::to_upper_case),
        ("to-lower-case", strings::to_lower_case),
    ],
    mixins: &[],
    variables: no_variables,
};

static META_MODULE: ModuleDef = ModuleDef {
    name: "meta",
    functions: &[
        ("type-of", meta::type_of),
        ("inspect", meta::inspect),
        ("call", meta::call),
        ("get-function", meta::get_function),
        ("get-mixin", meta::get_mixin),
        ("keywords", meta::keywords),
        ("module-variables", meta::module_variables),
        ("module-functions", meta::module_functions),
        ("function-exists", meta::function_exists),
        ("mixin-exists", meta::mixin_exists),
        ("variable-exists", meta::variable_exists),
    ],
    mixins: &[("load-css", meta::load_css)],
    variables: no_variables,
};

/// Look up a built-in module by its name after the `sass:` prefix.
pub fn module(name: &str) -> Option<&'static ModuleDef> {
    match name {
        "list" => Some(&LIST_MODULE),
        "map" => Some(&MAP_MODULE),
        "math" => Some(&MATH_MODULE),
        "string" => Some(&STRING_MODULE),
        "meta" => Some(&META_MODULE),
        _ => None,
    }
}

/// The legacy global function names.
pub static GLOBAL_FUNCTIONS: &[(&str, BuiltinFn)] = &[
    // list
    ("length", lists::length),
    ("nth", lists::nth),
    ("set-nth", lists::set_nth),
    ("join", lists::join),
    ("append", lists::append),
    ("index", lists::index),
    ("list-separator", lists::separator),
    ("is-bracketed", lists::is_bracketed),
    ("zip", lists::zip),
    // map
    ("map-get", maps::get),
    ("map-has-key", maps::has_key),
    ("map-merge", maps::merge),
    ("map-remove", maps::remove),
    ("map-keys", maps::keys),
    ("map-values", maps::values),
    // math
    ("percentage", math::percentage),
    ("round", math::round),
    ("ceil", math::ceil),
    ("floor", math::floor),
    ("abs", math::abs),
    ("min", math::min),
    ("max", math::max),
    ("unit", math::unit),
    ("unitless", math::is_unitless),
    ("comparable", math::compatible),
    // string
    ("quote", strings::quote),
    ("unquote", strings::unquote),
    ("str-length", strings::length),
    ("str-insert", strings::insert),
    ("str-index", strings::index),
    ("str-slice", strings::slice),
    ("to-upper-case", strings::to_upper_case),
    ("to-lower-case", strings::to_lower_case),
    // meta
    ("type-of", meta::type_of),
    ("inspect", meta::inspect),
    ("call", meta::call),
    ("get-function", meta::get_function),
    ("keywords", meta::keywords),
    ("function-exists", meta::function_exists),
    ("mixin-exists", meta::mixin_exists),
    ("variable-exists", meta::variable_exists),
    // color
    ("rgb", colors::rgb),
    ("rgba", colors::rgba),
    ("hsl", colors::hsl),
    ("hsla", colors::hsla),
    ("hwb", colors::hwb),
    ("red", colors::red),
    ("green", colors::green),
    ("blue", colors::blue),
    ("alpha", colors::alpha),
    ("hue", colors::hue),
    ("saturation", colors::saturation),
    ("lightness", colors::lightness),
];
