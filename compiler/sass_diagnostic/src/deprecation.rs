//! Deprecated-feature tags and the per-compilation warning dispatcher.

use rustc_hash::{FxHashMap, FxHashSet};
use sass_ir::{SourceUrl, Span};

use crate::{SharedLogger, Warning};

/// A deprecated language feature.
///
/// The ids are stable and user-facing: they are the values accepted by the
/// `silenceDeprecations` option.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Deprecation {
    /// `@import` and everything reachable only through it.
    Import,
    /// `/` as division outside `math.div`.
    SlashDiv,
    /// `!global` assignment to a variable that does not exist yet.
    NewGlobal,
    /// Passing a unit-bearing number where an index is expected.
    FunctionUnits,
    /// `call()` with a string function name.
    CallString,
    /// `-` and `+` parsed as unary in ambiguous positions.
    StrictUnary,
}

impl Deprecation {
    /// The stable id accepted by `silenceDeprecations`.
    pub fn id(self) -> &'static str {
        match self {
            Deprecation::Import => "import",
            Deprecation::SlashDiv => "slash-div",
            Deprecation::NewGlobal => "new-global",
            Deprecation::FunctionUnits => "function-units",
            Deprecation::CallString => "call-string",
            Deprecation::StrictUnary => "strict-unary",
        }
    }

    /// Parse a stable id back to a tag.
    pub fn from_id(id: &str) -> Option<Deprecation> {
        match id {
            "import" => Some(Deprecation::Import),
            "slash-div" => Some(Deprecation::SlashDiv),
            "new-global" => Some(Deprecation::NewGlobal),
            "function-units" => Some(Deprecation::FunctionUnits),
            "call-string" => Some(Deprecation::CallString),
            "strict-unary" => Some(Deprecation::StrictUnary),
            _ => None,
        }
    }
}

/// Per-deprecation repetition cap; further warnings of the same tag are
/// summarized by a final note.
const REPETITION_LIMIT: usize = 5;

/// Per-compilation warning dispatcher.
///
/// Owns the silence set and the repetition counters, and forwards
/// everything else to the user's logger. One dispatcher exists per
/// compilation; it is threaded through the evaluator rather than stored
/// globally.
pub struct WarnDispatcher {
    logger: SharedLogger,
    silenced: FxHashSet<Deprecation>,
    counts: FxHashMap<Deprecation, usize>,
}

impl WarnDispatcher {
    pub fn new(logger: SharedLogger, silenced: FxHashSet<Deprecation>) -> Self {
        WarnDispatcher {
            logger,
            silenced,
            counts: FxHashMap::default(),
        }
    }

    /// Emit a plain `@warn` warning.
    pub fn warn(&mut self, message: impl Into<String>, span: Option<Span>, url: Option<&SourceUrl>) {
        self.logger.warn(&Warning {
            message: message.into(),
            deprecation: None,
            span,
            url: url.cloned(),
        });
    }

    /// Emit a deprecation warning unless silenced or over the repetition
    /// cap.
    pub fn warn_deprecated(
        &mut self,
        deprecation: Deprecation,
        message: impl Into<String>,
        span: Option<Span>,
        url: Option<&SourceUrl>,
    ) {
        if self.silenced.contains(&deprecation) {
            return;
        }
        let count = self.counts.entry(deprecation).or_insert(0);
        *count += 1;
        if *count > REPETITION_LIMIT {
            return;
        }
        let mut message = message.into();
        if *count == REPETITION_LIMIT {
            message.push_str("\nFurther warnings of this type will be suppressed.");
        }
        self.logger.warn(&Warning {
            message,
            deprecation: Some(deprecation),
            span,
            url: url.cloned(),
        });
    }

    /// Forward a `@debug` message.
    pub fn debug(&self, message: &str, span: Span, url: Option<&SourceUrl>) {
        self.logger.debug(message, span, url);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::buffer_logger;

    #[test]
    fn test_silenced_deprecation_is_dropped() {
        let (buffer, shared) = buffer_logger();
        let mut silenced = FxHashSet::default();
        silenced.insert(Deprecation::SlashDiv);
        let mut dispatcher = WarnDispatcher::new(shared, silenced);

        dispatcher.warn_deprecated(Deprecation::SlashDiv, "1/2", None, None);
        assert!(buffer.warnings().is_empty());

        dispatcher.warn_deprecated(Deprecation::Import, "@import", None, None);
        assert_eq!(buffer.warnings().len(), 1);
    }

    #[test]
    fn test_repetition_cap() {
        let (buffer, shared) = buffer_logger();
        let mut dispatcher = WarnDispatcher::new(shared, FxHashSet::default());
        for _ in 0..10 {
            dispatcher.warn_deprecated(Deprecation::SlashDiv, "1/2", None, None);
        }
        assert_eq!(buffer.warnings().len(), REPETITION_LIMIT);
    }
}
