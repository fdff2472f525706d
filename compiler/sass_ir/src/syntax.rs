//! Surface syntax kinds.

use std::fmt;

use crate::SourceUrl;

/// The surface syntax of a stylesheet source.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub enum Syntax {
    /// Brace-delimited SCSS.
    #[default]
    Scss,
    /// Whitespace-sensitive indented syntax.
    Indented,
    /// Plain CSS (SCSS grammar with Sass-only constructs rejected).
    Css,
}

impl Syntax {
    /// Detect syntax from a file extension (without the dot).
    pub fn from_extension(ext: &str) -> Option<Syntax> {
        match ext {
            "scss" => Some(Syntax::Scss),
            "sass" => Some(Syntax::Indented),
            "css" => Some(Syntax::Css),
            _ => None,
        }
    }

    /// Detect syntax from a canonical URL, defaulting to SCSS.
    pub fn for_url(url: &SourceUrl) -> Syntax {
        let basename = url.basename();
        basename
            .rfind('.')
            .and_then(|idx| Syntax::from_extension(&basename[idx + 1..]))
            .unwrap_or(Syntax::Scss)
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Syntax::Scss => f.write_str("scss"),
            Syntax::Indented => f.write_str("indented"),
            Syntax::Css => f.write_str("css"),
        }
    }
}

/// A fetched stylesheet source, immutable once produced.
#[derive(Clone, Debug)]
pub struct StylesheetSource {
    /// Canonical identifier chosen by the resolver.
    pub url: SourceUrl,
    /// Full source text.
    pub contents: String,
    /// Surface syntax of `contents`.
    pub syntax: Syntax,
}
