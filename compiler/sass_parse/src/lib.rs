//! Sass Parse - scanner and recursive-descent parsers for the Sass
//! surface syntaxes.
//!
//! One statement grammar serves all three syntaxes: SCSS runs through it
//! directly, plain CSS runs through it with Sass-only constructs
//! rejected, and the indented syntax is rewritten to SCSS first (blocks
//! and statement ends are its only differences).

mod expression;
mod indented;
mod parser;
mod scanner;

use sass_diagnostic::{SassResult, SassError};
use sass_ir::{SourceUrl, Stylesheet, Syntax};

pub use parser::Parser;

/// Parse a stylesheet source.
///
/// `url` is attached to any parse error so diagnostics name the file.
pub fn parse(source: &str, syntax: Syntax, url: Option<&SourceUrl>) -> SassResult<Stylesheet> {
    tracing::debug!(?syntax, url = url.map(tracing::field::display), len = source.len(), "parse");
    let attach = |mut err: SassError| {
        if let Some(url) = url {
            err = err.with_url(url);
        }
        err
    };
    match syntax {
        Syntax::Scss => Parser::new(source, false)
            .parse_stylesheet()
            .map_err(attach),
        Syntax::Css => Parser::new(source, true)
            .parse_stylesheet()
            .map_err(attach),
        Syntax::Indented => {
            let rewritten = indented::to_scss(source).map_err(attach)?;
            Parser::new(&rewritten, false)
                .parse_stylesheet()
                .map_err(attach)
        }
    }
}

#[cfg(test)]
mod tests;
