//! Sass Value - the SassScript value algebra.
//!
//! # Architecture
//!
//! - [`Value`]: one closed enum over every SassScript variant, with
//!   factory constructors and typed assertions.
//! - [`evaluate_binary`] / [`evaluate_unary`]: direct enum-based operator
//!   dispatch; the type set is fixed, so pattern matching beats trait
//!   objects and stays exhaustiveness-checked.
//! - [`Number`]: magnitude plus unit vectors, with the conversion table
//!   in [`unit`].
//! - [`serialize`]: strict CSS output and infallible `inspect` output.
//!
//! Every value is immutable; heavy payloads are `Arc`-shared so cloning
//! is cheap.

pub mod errors;
mod color;
mod number;
mod ops;
pub mod serialize;
pub mod unit;
mod value;

pub use color::Color;
pub use number::{format_double, fuzzy_equals, Number, Units, EPSILON, PRECISION};
pub use ops::{evaluate_binary, evaluate_unary};
pub use serialize::{inspect, to_css, write_css};
pub use value::{
    separators_match, ArgList, CalcArg, Calculation, FunctionRef, MixinRef, SassList, SassMap,
    SassString, Value,
};

// Re-export the separator so downstream crates need only this crate.
pub use sass_ir::ListSeparator;
