//! Canonical source identifiers.
//!
//! A [`SourceUrl`] is the canonical, URL-like identity of a loaded
//! stylesheet: a scheme, an opaque path, and an optional fragment. Two
//! identifiers are the same source iff their canonical texts are
//! byte-equal, so equality and hashing operate on the stored text.
//!
//! Canonicalization itself is the resolver's job; this type only carries
//! the result and provides the reference-merging arithmetic resolvers need.

use std::fmt;
use std::path::{Path, PathBuf};

/// Error when constructing a [`SourceUrl`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlError {
    /// The text has no `scheme:` prefix.
    MissingScheme(String),
    /// The scheme contains characters outside `[a-zA-Z0-9+.-]`.
    InvalidScheme(String),
    /// The text is empty.
    Empty,
}

impl fmt::Display for UrlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UrlError::MissingScheme(text) => {
                write!(f, "URL \"{text}\" has no scheme; canonical URLs are absolute")
            }
            UrlError::InvalidScheme(scheme) => write!(f, "invalid URL scheme \"{scheme}\""),
            UrlError::Empty => write!(f, "empty URL"),
        }
    }
}

impl std::error::Error for UrlError {}

/// A canonical source identifier.
///
/// Stored as the canonical text plus the byte offset of the scheme
/// delimiter, so `scheme()` and `path()` are slice operations.
#[derive(Clone, Eq, PartialEq, Hash)]
pub struct SourceUrl {
    text: Box<str>,
    scheme_end: u32,
}

impl SourceUrl {
    /// Parse a canonical URL. The text must carry a scheme.
    pub fn parse(text: &str) -> Result<Self, UrlError> {
        if text.is_empty() {
            return Err(UrlError::Empty);
        }
        let Some(colon) = find_scheme_end(text) else {
            return Err(UrlError::MissingScheme(text.to_string()));
        };
        Ok(SourceUrl {
            text: text.into(),
            scheme_end: u32::try_from(colon).map_err(|_| UrlError::Empty)?,
        })
    }

    /// Build a `file:` URL from a filesystem path.
    ///
    /// The path is converted to forward slashes. Relative paths are kept
    /// relative to the process working directory by the caller; this
    /// constructor does not touch the filesystem.
    pub fn from_file_path(path: &Path) -> Self {
        let mut text = String::from("file://");
        let slashed = slashify(path);
        if !slashed.starts_with('/') {
            text.push('/');
        }
        text.push_str(&slashed);
        SourceUrl {
            text: text.into(),
            scheme_end: 4,
        }
    }

    /// The scheme, without the trailing colon.
    #[inline]
    pub fn scheme(&self) -> &str {
        &self.text[..self.scheme_end as usize]
    }

    /// The full canonical text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// The path portion: everything after `scheme:` and an optional
    /// `//authority`, up to the fragment.
    pub fn path(&self) -> &str {
        let rest = self.after_scheme();
        let rest = match rest.strip_prefix("//") {
            Some(stripped) => match stripped.find('/') {
                Some(idx) => &stripped[idx..],
                None => "",
            },
            None => rest,
        };
        match rest.find('#') {
            Some(idx) => &rest[..idx],
            None => rest,
        }
    }

    /// The fragment, without the leading `#`.
    pub fn fragment(&self) -> Option<&str> {
        self.after_scheme().find('#').map(|idx| {
            let rest = self.after_scheme();
            &rest[idx + 1..]
        })
    }

    /// Convert a `file:` URL back to a filesystem path.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        if self.scheme() != "file" {
            return None;
        }
        Some(PathBuf::from(self.path()))
    }

    /// Resolve a reference against this URL.
    ///
    /// Absolute references parse on their own. A reference starting with
    /// `/` replaces the path. Anything else merges onto this URL with the
    /// last path segment dropped, then dot segments are normalized.
    pub fn join(&self, reference: &str) -> Result<SourceUrl, UrlError> {
        if reference.is_empty() {
            return Ok(self.clone());
        }
        if find_scheme_end(reference).is_some() {
            return SourceUrl::parse(reference);
        }
        let prefix = self.prefix_before_path();
        let merged = if let Some(absolute) = reference.strip_prefix('/') {
            format!("/{absolute}")
        } else {
            let base = self.path();
            match base.rfind('/') {
                Some(idx) => format!("{}/{}", &base[..idx], reference),
                None => reference.to_string(),
            }
        };
        let normalized = normalize_dot_segments(&merged);
        SourceUrl::parse(&format!("{prefix}{normalized}"))
    }

    /// The final path segment.
    pub fn basename(&self) -> &str {
        let path = self.path();
        match path.rfind('/') {
            Some(idx) => &path[idx + 1..],
            None => path,
        }
    }

    fn after_scheme(&self) -> &str {
        &self.text[self.scheme_end as usize + 1..]
    }

    /// `scheme:` plus the `//authority` part, if any.
    fn prefix_before_path(&self) -> &str {
        let rest = self.after_scheme();
        if let Some(stripped) = rest.strip_prefix("//") {
            let authority_len = stripped.find('/').unwrap_or(stripped.len());
            let end = self.scheme_end as usize + 1 + 2 + authority_len;
            &self.text[..end]
        } else {
            &self.text[..self.scheme_end as usize + 1]
        }
    }
}

impl fmt::Display for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl fmt::Debug for SourceUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SourceUrl({})", self.text)
    }
}

/// Whether a reference as written carries a scheme (is absolute).
pub fn has_scheme(reference: &str) -> bool {
    find_scheme_end(reference).is_some()
}

/// The default `@use` namespace for a reference as written: the final
/// segment, minus any extension and a leading partial underscore.
pub fn module_namespace(reference: &str) -> &str {
    let after_scheme = match find_scheme_end(reference) {
        Some(idx) => &reference[idx + 1..],
        None => reference,
    };
    let base = match after_scheme.rfind('/') {
        Some(idx) => &after_scheme[idx + 1..],
        None => after_scheme,
    };
    let base = base.strip_prefix('_').unwrap_or(base);
    match base.rfind('.') {
        Some(idx) if idx > 0 => &base[..idx],
        _ => base,
    }
}

/// Find the byte index of the `:` that terminates a scheme, if the text
/// starts with a valid one. A Windows drive letter (`C:`) is not a scheme,
/// which the one-letter minimum below rules out.
fn find_scheme_end(text: &str) -> Option<usize> {
    let bytes = text.as_bytes();
    if !bytes.first()?.is_ascii_alphabetic() {
        return None;
    }
    for (idx, &b) in bytes.iter().enumerate().skip(1) {
        match b {
            b':' => return if idx >= 2 { Some(idx) } else { None },
            b'a'..=b'z' | b'A'..=b'Z' | b'0'..=b'9' | b'+' | b'-' | b'.' => {}
            _ => return None,
        }
    }
    None
}

fn slashify(path: &Path) -> String {
    let text = path.to_string_lossy();
    if std::path::MAIN_SEPARATOR == '/' {
        text.into_owned()
    } else {
        text.replace(std::path::MAIN_SEPARATOR, "/")
    }
}

/// Remove `.` segments and resolve `..` segments lexically.
fn normalize_dot_segments(path: &str) -> String {
    let absolute = path.starts_with('/');
    let mut segments: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if segments.last().is_some_and(|s| *s != "..") {
                    segments.pop();
                } else if !absolute {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }
    let joined = segments.join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_requires_scheme() {
        assert!(SourceUrl::parse("file:///a/b.scss").is_ok());
        assert!(SourceUrl::parse("relative/path").is_err());
    }

    #[test]
    fn test_file_path_round_trip() {
        let url = SourceUrl::from_file_path(Path::new("/srv/styles/app.scss"));
        assert_eq!(url.as_str(), "file:///srv/styles/app.scss");
        assert_eq!(url.scheme(), "file");
        assert_eq!(url.path(), "/srv/styles/app.scss");
        assert_eq!(url.to_file_path(), Some(PathBuf::from("/srv/styles/app.scss")));
    }

    #[test]
    fn test_join_relative() {
        let base = SourceUrl::parse("file:///srv/styles/app.scss").unwrap();
        assert_eq!(
            base.join("partials/other").unwrap().as_str(),
            "file:///srv/styles/partials/other"
        );
        assert_eq!(
            base.join("../lib/x.scss").unwrap().as_str(),
            "file:///srv/lib/x.scss"
        );
    }

    #[test]
    fn test_join_absolute_reference_wins() {
        let base = SourceUrl::parse("file:///srv/app.scss").unwrap();
        assert_eq!(
            base.join("pkg:colors").unwrap().as_str(),
            "pkg:colors"
        );
    }

    #[test]
    fn test_equality_is_textual() {
        let a = SourceUrl::parse("custom:lib/a").unwrap();
        let b = SourceUrl::parse("custom:lib/a").unwrap();
        let c = SourceUrl::parse("custom:lib/A").unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_module_namespace() {
        assert_eq!(module_namespace("src/corners"), "corners");
        assert_eq!(module_namespace("src/_corners.scss"), "corners");
        assert_eq!(module_namespace("other"), "other");
        assert_eq!(module_namespace("pkg:chroma/utils"), "utils");
    }

    #[test]
    fn test_scheme_detection() {
        assert!(has_scheme("package:foo/bar"));
        assert!(!has_scheme("plain/reference"));
        // A single letter followed by a colon reads as a Windows drive.
        assert!(!has_scheme("c:/styles"));
    }
}
