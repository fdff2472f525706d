//! Sass CSS - the CSS output tree and its serializers.
//!
//! The evaluator produces a [`CssTree`]; [`render`] turns it into the
//! final text in either output style and applies the charset policy.

mod emitter;
mod tree;

pub use emitter::{render, OutputStyle};
pub use tree::{CssStmt, CssTree};
