//! The `package:` URL resolver.
//!
//! Rewrites `package:name/rest` through a name → base-directory map and
//! delegates to a filesystem importer rooted at that base. Only the
//! `package:` scheme triggers it; everything else is declined.

use std::path::PathBuf;

use rustc_hash::FxHashMap;
use sass_diagnostic::{SassError, SassResult};
use sass_ir::SourceUrl;

use crate::filesystem::FilesystemImporter;
use crate::importer::{CanonicalizeContext, Importer, ImporterResult};

/// Importer for `package:` URLs.
pub struct PackageImporter {
    packages: FxHashMap<String, FilesystemImporter>,
}

impl PackageImporter {
    /// Build from a package-name → base-directory map.
    pub fn new(packages: FxHashMap<String, PathBuf>) -> Self {
        PackageImporter {
            packages: packages
                .into_iter()
                .map(|(name, base)| (name, FilesystemImporter::new(base)))
                .collect(),
        }
    }
}

impl Importer for PackageImporter {
    fn canonicalize(
        &self,
        reference: &str,
        context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>> {
        let Some(rest) = reference.strip_prefix("package:") else {
            return Ok(None);
        };
        let (name, subpath) = match rest.split_once('/') {
            Some((name, subpath)) => (name, subpath),
            None => (rest, ""),
        };
        let Some(importer) = self.packages.get(name) else {
            return Err(SassError::resolver(format!(
                "Unknown package \"{name}\"."
            )));
        };
        let subpath = if subpath.is_empty() { "index" } else { subpath };
        importer.canonicalize(subpath, context)
    }

    fn load(&self, url: &SourceUrl) -> SassResult<Option<ImporterResult>> {
        // Canonical URLs are file: URLs under some package base; any of
        // the wrapped importers can fetch them.
        match self.packages.values().next() {
            Some(importer) => importer.load(url),
            None => Ok(None),
        }
    }

    /// `package:` URLs always rewrite to `file:`; a canonical
    /// `package:` URL is a bug in the chain.
    fn non_canonical_scheme(&self, scheme: &str) -> bool {
        scheme == "package"
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_package_rewrite() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("chroma")).unwrap();
        fs::write(dir.path().join("chroma/utils.scss"), "a {b: c}").unwrap();

        let mut packages = FxHashMap::default();
        packages.insert("chroma".to_string(), dir.path().join("chroma"));
        let importer = PackageImporter::new(packages);

        let url = importer
            .canonicalize("package:chroma/utils", &CanonicalizeContext::default())
            .unwrap()
            .unwrap();
        assert_eq!(url.scheme(), "file");
        assert!(url.as_str().ends_with("utils.scss"));
        assert_eq!(importer.load(&url).unwrap().unwrap().contents, "a {b: c}");
    }

    #[test]
    fn test_unknown_package_errors() {
        let importer = PackageImporter::new(FxHashMap::default());
        assert!(importer
            .canonicalize("package:nope/x", &CanonicalizeContext::default())
            .is_err());
    }

    #[test]
    fn test_other_schemes_declined() {
        let importer = PackageImporter::new(FxHashMap::default());
        assert!(importer
            .canonicalize("plain/ref", &CanonicalizeContext::default())
            .unwrap()
            .is_none());
    }
}
