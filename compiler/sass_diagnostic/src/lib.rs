//! Sass Diagnostic - error carriers and warning dispatch for the Sass
//! compiler.
//!
//! - [`SassError`]: the single error type crossing crate boundaries, with
//!   a kind (parse / runtime / resolver / cycle), a span, and a stack of
//!   mixin/function frames.
//! - [`excerpt`]: caret-highlighted source excerpts for error output.
//! - [`Logger`] and [`WarnDispatcher`]: user-visible warnings, `@debug`
//!   messages, and deprecation handling, scoped per compilation.

mod deprecation;
mod error;
pub mod excerpt;
mod logger;

pub use deprecation::{Deprecation, WarnDispatcher};
pub use error::{ErrorKind, SassError, SassResult, TraceFrame};
pub use excerpt::{excerpt, line_col};
pub use logger::{
    buffer_logger, stderr_logger, BufferLogger, Logger, NullLogger, SharedLogger, StderrLogger,
    Warning,
};
