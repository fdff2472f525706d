//! The filesystem importer.
//!
//! Resolves references against a base directory, applying the candidate
//! rules for extensions, partials, and directory indexes:
//!
//! 1. The path as written, then with `.scss`, `.sass`, and `.css`
//!    appended; for each, the partial form (`_name`) is also a match.
//! 2. A directory resolves through its `_index.{scss,sass,css}` only;
//!    a bare `index.*` inside it is not a candidate.
//! 3. Two matches for the same stem is an ambiguity error.

use std::fs;
use std::path::{Path, PathBuf};

use sass_diagnostic::{SassError, SassResult};
use sass_ir::{SourceUrl, Syntax};

use crate::importer::{CanonicalizeContext, Importer, ImporterResult};

/// An importer that loads from a directory on disk.
#[derive(Debug)]
pub struct FilesystemImporter {
    base: PathBuf,
}

impl FilesystemImporter {
    /// An importer rooted at `base`; relative references resolve against
    /// it.
    pub fn new(base: impl Into<PathBuf>) -> Self {
        FilesystemImporter { base: base.into() }
    }

    /// The base directory.
    pub fn base(&self) -> &Path {
        &self.base
    }

    fn candidate_path(&self, reference: &str) -> Option<PathBuf> {
        if let Some(rest) = reference.strip_prefix("file://") {
            return Some(PathBuf::from(rest));
        }
        if sass_ir::has_scheme(reference) {
            // Only file: URLs name the filesystem.
            return None;
        }
        Some(self.base.join(reference))
    }
}

impl Importer for FilesystemImporter {
    fn canonicalize(
        &self,
        reference: &str,
        _context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>> {
        let Some(path) = self.candidate_path(reference) else {
            return Ok(None);
        };
        let resolved = resolve_path(&path)?;
        tracing::debug!(reference, resolved = ?resolved, "filesystem canonicalize");
        match resolved {
            Some(file) => {
                let absolute = absolutize(&file);
                Ok(Some(SourceUrl::from_file_path(&absolute)))
            }
            None => Ok(None),
        }
    }

    fn load(&self, url: &SourceUrl) -> SassResult<Option<ImporterResult>> {
        let Some(path) = url.to_file_path() else {
            return Ok(None);
        };
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(_) => return Ok(None),
        };
        Ok(Some(ImporterResult {
            contents,
            syntax: Syntax::for_url(url),
            source_map_url: None,
        }))
    }
}

/// Resolve a candidate path to the file it names, if any.
pub fn resolve_path(path: &Path) -> SassResult<Option<PathBuf>> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    if matches!(extension, "scss" | "sass" | "css") {
        return exactly_one(try_path(path));
    }

    let mut matches = try_path(&with_appended_extension(path, "scss"));
    matches.extend(try_path(&with_appended_extension(path, "sass")));
    if matches.is_empty() {
        matches = try_path(&with_appended_extension(path, "css"));
    }
    if let Some(file) = exactly_one(matches)? {
        return Ok(Some(file));
    }
    if path.is_dir() {
        return resolve_directory_index(path);
    }
    Ok(None)
}

/// A directory resolves only through its `_index.{scss,sass,css}`; the
/// bare `index.*` form is not a candidate.
fn resolve_directory_index(dir: &Path) -> SassResult<Option<PathBuf>> {
    let mut matches: Vec<PathBuf> = ["_index.scss", "_index.sass"]
        .iter()
        .map(|name| dir.join(name))
        .filter(|candidate| candidate.is_file())
        .collect();
    if matches.is_empty() {
        let css = dir.join("_index.css");
        if css.is_file() {
            matches.push(css);
        }
    }
    exactly_one(matches)
}

/// The plain and partial (`_name`) forms of a path that exist as files.
fn try_path(path: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();
    if let Some(name) = path.file_name().and_then(|name| name.to_str()) {
        let partial = path.with_file_name(format!("_{name}"));
        if partial.is_file() {
            found.push(partial);
        }
    }
    if path.is_file() {
        found.push(path.to_path_buf());
    }
    found
}

fn exactly_one(matches: Vec<PathBuf>) -> SassResult<Option<PathBuf>> {
    match matches.len() {
        0 => Ok(None),
        1 => Ok(matches.into_iter().next()),
        _ => {
            let listing = matches
                .iter()
                .map(|path| format!("  {}", path.display()))
                .collect::<Vec<_>>()
                .join("\n");
            Err(SassError::resolver(format!(
                "It's not clear which file to import. Found:\n{listing}"
            )))
        }
    }
}

/// Append an extension without replacing an existing suffix (`a.b` +
/// `scss` is `a.b.scss`).
fn with_appended_extension(path: &Path, extension: &str) -> PathBuf {
    let mut text = path.as_os_str().to_os_string();
    text.push(".");
    text.push(extension);
    PathBuf::from(text)
}

/// Lexically absolutize: prefix the working directory and strip `.` and
/// `..` segments. Symlinks are left alone so two spellings of the same
/// path canonicalize equally without touching the filesystem.
fn absolutize(path: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()
            .map(|cwd| cwd.join(path))
            .unwrap_or_else(|_| path.to_path_buf())
    };
    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            std::path::Component::CurDir => {}
            std::path::Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        let mut file = File::create(path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
    }

    fn canonicalize(importer: &FilesystemImporter, reference: &str) -> Option<SourceUrl> {
        importer
            .canonicalize(reference, &CanonicalizeContext::default())
            .unwrap()
    }

    #[test]
    fn test_extension_added() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "other.scss", "a {b: c}");
        let importer = FilesystemImporter::new(dir.path());

        let url = canonicalize(&importer, "other").unwrap();
        assert!(url.as_str().ends_with("other.scss"));
        assert_eq!(
            importer.load(&url).unwrap().unwrap().contents,
            "a {b: c}"
        );
    }

    #[test]
    fn test_partial_resolves() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "_corners.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        let url = canonicalize(&importer, "corners").unwrap();
        assert!(url.as_str().ends_with("_corners.scss"));
    }

    #[test]
    fn test_partial_and_plain_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "other.scss", "");
        write_file(dir.path(), "_other.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        let err = importer
            .canonicalize("other", &CanonicalizeContext::default())
            .unwrap_err();
        assert!(err.message.contains("not clear which file to import"));
    }

    #[test]
    fn test_scss_and_sass_is_ambiguous() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "other.scss", "");
        write_file(dir.path(), "other.sass", "");
        let importer = FilesystemImporter::new(dir.path());

        assert!(importer
            .canonicalize("other", &CanonicalizeContext::default())
            .is_err());
    }

    #[test]
    fn test_css_only_after_sass() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "other.css", "");
        write_file(dir.path(), "other.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        // Not ambiguous: .css is only consulted when no sass match exists.
        let url = canonicalize(&importer, "other").unwrap();
        assert!(url.as_str().ends_with("other.scss"));
    }

    #[test]
    fn test_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "lib/_index.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        let url = canonicalize(&importer, "lib").unwrap();
        assert!(url.as_str().ends_with("lib/_index.scss"));
    }

    #[test]
    fn test_bare_index_is_not_a_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "lib/index.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        // Only the partial form resolves a directory.
        assert!(canonicalize(&importer, "lib").is_none());
    }

    #[test]
    fn test_ambiguous_directory_index() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "lib/_index.scss", "");
        write_file(dir.path(), "lib/_index.sass", "");
        let importer = FilesystemImporter::new(dir.path());

        assert!(importer
            .canonicalize("lib", &CanonicalizeContext::default())
            .is_err());
    }

    #[test]
    fn test_explicit_extension_is_exact() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "other.scss", "");
        let importer = FilesystemImporter::new(dir.path());

        assert!(canonicalize(&importer, "other.scss").is_some());
        assert!(canonicalize(&importer, "other.sass").is_none());
    }

    #[test]
    fn test_missing_file_declines() {
        let dir = tempfile::tempdir().unwrap();
        let importer = FilesystemImporter::new(dir.path());
        assert!(canonicalize(&importer, "nope").is_none());
    }

    #[test]
    fn test_file_url_reference() {
        let dir = tempfile::tempdir().unwrap();
        write_file(dir.path(), "abs.scss", "x {y: z}");
        let importer = FilesystemImporter::new(dir.path());

        let direct = canonicalize(
            &importer,
            &format!("file://{}/abs.scss", dir.path().display()),
        );
        assert!(direct.is_some());
        // Other schemes are declined.
        assert!(canonicalize(&importer, "pkg:abs").is_none());
    }
}
