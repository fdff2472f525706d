//! The prioritized resolver chain.
//!
//! Consultation order for a reference `R` written in a stylesheet `B`:
//!
//! 1. For a non-absolute `R`: the importer that produced `B`, with `R`
//!    resolved against `B`'s canonical URL.
//! 2. User importers, in declaration order.
//! 3. Load paths, each a filesystem importer, in declaration order.
//! 4. The `package:` resolver, when configured.
//!
//! An absolute `R` (one with a scheme) skips step 1 entirely: the chain
//! is consulted from the top, so an importer that canonicalized `B` can
//! lose a `scheme:` reference to an earlier importer claiming that
//! scheme.

use std::path::PathBuf;

use sass_diagnostic::{SassError, SassResult};
use sass_ir::{has_scheme, SourceUrl};

use crate::filesystem::FilesystemImporter;
use crate::importer::{CanonicalizeContext, ChainImporter, ImporterResult};
use crate::package::PackageImporter;

/// A successful canonicalization: the canonical URL plus which chain
/// entry produced it, so the entry can serve as the relative resolver
/// for the loaded stylesheet's own references.
#[derive(Clone, Debug)]
pub struct Resolution {
    pub url: SourceUrl,
    pub importer: usize,
}

/// The assembled chain for one compilation.
pub struct ResolverChain {
    entries: Vec<ChainImporter>,
    /// Entries below this index are consulted in order; entries at or
    /// above it (the entrypoint importer) are reachable only as a
    /// reference's relative resolver.
    chain_len: usize,
}

impl ResolverChain {
    /// Assemble the chain from its three ordered tiers.
    pub fn new(
        importers: Vec<ChainImporter>,
        load_paths: Vec<PathBuf>,
        package: Option<PackageImporter>,
    ) -> Self {
        let mut entries = importers;
        for path in load_paths {
            entries.push(ChainImporter::from(FilesystemImporter::new(path)));
        }
        if let Some(package) = package {
            entries.push(ChainImporter::from(package));
        }
        let chain_len = entries.len();
        ResolverChain { entries, chain_len }
    }

    /// Register an importer that only ever acts as a relative resolver
    /// (the entrypoint's importer). Returns its index.
    pub fn push_base_importer(&mut self, importer: ChainImporter) -> usize {
        self.entries.push(importer);
        self.entries.len() - 1
    }

    /// Canonicalize a reference per the precedence rules.
    pub fn canonicalize(
        &self,
        reference: &str,
        base: Option<(usize, &SourceUrl)>,
        from_import: bool,
    ) -> SassResult<Option<Resolution>> {
        if !has_scheme(reference) {
            if let Some((importer, base_url)) = base {
                let resolved = base_url
                    .join(reference)
                    .map_err(|err| SassError::resolver(err.to_string()))?;
                let context = CanonicalizeContext {
                    containing_url: Some(base_url),
                    from_import,
                };
                if let Some(url) =
                    self.entries[importer].canonicalize(resolved.as_str(), &context)?
                {
                    tracing::debug!(reference, url = %url, "resolved relative to base");
                    return Ok(Some(Resolution { url, importer }));
                }
            }
        }

        let containing_url = base.map(|(_, url)| url);
        let context = CanonicalizeContext {
            containing_url,
            from_import,
        };
        for (importer, entry) in self.entries[..self.chain_len].iter().enumerate() {
            let Some(url) = entry.canonicalize(reference, &context)? else {
                continue;
            };
            if entry.non_canonical_scheme(url.scheme()) {
                return Err(SassError::resolver(format!(
                    "Importer canonicalized {reference} to {url}, whose scheme it \
                     declares non-canonical."
                )));
            }
            tracing::debug!(reference, url = %url, importer, "resolved via chain");
            return Ok(Some(Resolution { url, importer }));
        }
        Ok(None)
    }

    /// Fetch the source for a resolution. A decline here is a hard
    /// error: the importer already claimed the URL by canonicalizing it.
    pub fn load(&self, resolution: &Resolution) -> SassResult<ImporterResult> {
        match self.entries[resolution.importer].load(&resolution.url)? {
            Some(result) => Ok(result),
            None => Err(SassError::resolver(format!(
                "The importer that canonicalized {} failed to load it.",
                resolution.url
            ))),
        }
    }

    /// The error reported when no importer claims a reference.
    pub fn unresolved() -> SassError {
        SassError::resolver("Can't find stylesheet to import.")
    }
}
