//! Warning and debug sinks.
//!
//! Everything user-visible that is not CSS or an error flows through a
//! [`Logger`]: `@warn`, `@debug`, and deprecation warnings. The default
//! sink writes to stderr; a buffer sink exists for embedding and tests.

use std::sync::Arc;

use parking_lot::Mutex;
use sass_ir::{SourceUrl, Span};

use crate::Deprecation;

/// A warning delivered to a [`Logger`].
#[derive(Clone, Debug, PartialEq)]
pub struct Warning {
    pub message: String,
    /// Present when this is a deprecation warning.
    pub deprecation: Option<Deprecation>,
    pub span: Option<Span>,
    pub url: Option<SourceUrl>,
}

/// Sink for warnings and `@debug` messages.
pub trait Logger {
    fn warn(&self, warning: &Warning);
    fn debug(&self, message: &str, span: Span, url: Option<&SourceUrl>);
}

/// Shared reference-counted logger handle.
pub type SharedLogger = Arc<dyn Logger + Send + Sync>;

/// Logger that writes to stderr.
#[derive(Default)]
pub struct StderrLogger;

impl Logger for StderrLogger {
    fn warn(&self, warning: &Warning) {
        let label = if warning.deprecation.is_some() {
            "DEPRECATION WARNING"
        } else {
            "WARNING"
        };
        match &warning.url {
            Some(url) => eprintln!("{label}: {} ({url})", warning.message),
            None => eprintln!("{label}: {}", warning.message),
        }
    }

    fn debug(&self, message: &str, _span: Span, url: Option<&SourceUrl>) {
        match url {
            Some(url) => eprintln!("{url} DEBUG: {message}"),
            None => eprintln!("DEBUG: {message}"),
        }
    }
}

/// Logger that drops everything.
#[derive(Default)]
pub struct NullLogger;

impl Logger for NullLogger {
    fn warn(&self, _warning: &Warning) {}
    fn debug(&self, _message: &str, _span: Span, _url: Option<&SourceUrl>) {}
}

/// Logger that collects messages for later inspection.
#[derive(Default)]
pub struct BufferLogger {
    warnings: Mutex<Vec<Warning>>,
    debugs: Mutex<Vec<String>>,
}

impl BufferLogger {
    pub fn new() -> Self {
        BufferLogger::default()
    }

    /// Warnings collected so far.
    pub fn warnings(&self) -> Vec<Warning> {
        self.warnings.lock().clone()
    }

    /// Debug messages collected so far.
    pub fn debugs(&self) -> Vec<String> {
        self.debugs.lock().clone()
    }
}

impl Logger for BufferLogger {
    fn warn(&self, warning: &Warning) {
        self.warnings.lock().push(warning.clone());
    }

    fn debug(&self, message: &str, _span: Span, _url: Option<&SourceUrl>) {
        self.debugs.lock().push(message.to_string());
    }
}

/// A stderr logger behind a shared handle.
pub fn stderr_logger() -> SharedLogger {
    Arc::new(StderrLogger)
}

/// A buffer logger, returned alongside its shared handle so the caller
/// keeps inspection access after handing the handle to a compilation.
pub fn buffer_logger() -> (Arc<BufferLogger>, SharedLogger) {
    let logger = Arc::new(BufferLogger::new());
    let shared: SharedLogger = logger.clone();
    (logger, shared)
}
