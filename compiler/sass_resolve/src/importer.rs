//! The importer contract.
//!
//! An importer maps references as written (`@use "other"`) to canonical
//! identifiers, and canonical identifiers to stylesheet sources. The two
//! steps are separate so the loader can cache by canonical URL and so a
//! canonical URL can be re-fetched without re-resolving.

use std::sync::Arc;

use futures::future::BoxFuture;
use sass_diagnostic::SassResult;
use sass_ir::{SourceUrl, Syntax};

/// A successfully loaded stylesheet source.
#[derive(Clone, Debug)]
pub struct ImporterResult {
    pub contents: String,
    pub syntax: Syntax,
    /// Where a source map for this stylesheet would live, if the
    /// importer knows.
    pub source_map_url: Option<SourceUrl>,
}

/// Context available while canonicalizing.
#[derive(Clone, Copy, Debug, Default)]
pub struct CanonicalizeContext<'a> {
    /// The canonical URL of the referring stylesheet, when there is one.
    pub containing_url: Option<&'a SourceUrl>,
    /// Whether the reference came from `@import` rather than `@use` /
    /// `@forward` / `meta.load-css`.
    pub from_import: bool,
}

/// A synchronous importer.
///
/// `canonicalize` returning `Ok(None)` means "not mine, try the next
/// importer". Once an importer canonicalizes a reference, its `load`
/// must produce the source; `Ok(None)` from `load` at that point is a
/// hard resolver error.
pub trait Importer: Send + Sync {
    /// Map a reference to its canonical URL, or decline.
    fn canonicalize(
        &self,
        reference: &str,
        context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>>;

    /// Fetch the source for a canonical URL this importer produced.
    fn load(&self, url: &SourceUrl) -> SassResult<Option<ImporterResult>>;

    /// Declare that URLs of `scheme` are never canonical for this
    /// importer; the chain rejects a canonicalization that returns one.
    fn non_canonical_scheme(&self, _scheme: &str) -> bool {
        false
    }
}

/// An asynchronous importer, for resolvers backed by real I/O.
///
/// Mirrors [`Importer`] with boxed futures; the compiler suspends only
/// at these two calls.
pub trait AsyncImporter: Send + Sync {
    fn canonicalize<'a>(
        &'a self,
        reference: &'a str,
        context: &'a CanonicalizeContext<'a>,
    ) -> BoxFuture<'a, SassResult<Option<SourceUrl>>>;

    fn load<'a>(&'a self, url: &'a SourceUrl) -> BoxFuture<'a, SassResult<Option<ImporterResult>>>;

    fn non_canonical_scheme(&self, _scheme: &str) -> bool {
        false
    }
}

/// A chain entry: either flavor of importer behind one dispatch surface.
///
/// Asynchronous importers are driven to completion at the call, which is
/// exactly the resolver-boundary suspension point the scheduling model
/// allows.
#[derive(Clone)]
pub enum ChainImporter {
    Sync(Arc<dyn Importer>),
    Async(Arc<dyn AsyncImporter>),
}

impl ChainImporter {
    pub fn canonicalize(
        &self,
        reference: &str,
        context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>> {
        match self {
            ChainImporter::Sync(importer) => importer.canonicalize(reference, context),
            ChainImporter::Async(importer) => {
                crate::block_on::drive(importer.canonicalize(reference, context))
            }
        }
    }

    pub fn load(&self, url: &SourceUrl) -> SassResult<Option<ImporterResult>> {
        match self {
            ChainImporter::Sync(importer) => importer.load(url),
            ChainImporter::Async(importer) => crate::block_on::drive(importer.load(url)),
        }
    }

    pub fn non_canonical_scheme(&self, scheme: &str) -> bool {
        match self {
            ChainImporter::Sync(importer) => importer.non_canonical_scheme(scheme),
            ChainImporter::Async(importer) => importer.non_canonical_scheme(scheme),
        }
    }
}

impl<T: Importer + 'static> From<T> for ChainImporter {
    fn from(importer: T) -> Self {
        ChainImporter::Sync(Arc::new(importer))
    }
}
