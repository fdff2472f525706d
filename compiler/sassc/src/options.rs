//! Compilation options.

use std::path::PathBuf;

use rustc_hash::{FxHashMap, FxHashSet};
use sass_css::OutputStyle;
use sass_diagnostic::{stderr_logger, Deprecation, SharedLogger};
use sass_eval::HostFn;
use sass_ir::{SourceUrl, Syntax};
use sass_resolve::ChainImporter;

/// Options for one compilation.
///
/// Builder-style: start from `Options::default()` and chain the
/// `with_*` methods.
pub struct Options {
    /// User resolvers, consulted in order after the relative resolver.
    pub importers: Vec<ChainImporter>,
    /// Base directories, each wrapped as a filesystem importer after
    /// the user importers.
    pub load_paths: Vec<PathBuf>,
    /// Package name → base directory for `package:` URLs.
    pub package_config: FxHashMap<String, PathBuf>,
    /// The resolver associated with a string entrypoint.
    pub importer: Option<ChainImporter>,
    /// The identifier of a string entrypoint.
    pub url: Option<SourceUrl>,
    /// Surface syntax of a string entrypoint.
    pub syntax: Syntax,
    pub style: OutputStyle,
    /// Governs the `@charset`/BOM policy; default true.
    pub charset: bool,
    pub silence_deprecations: FxHashSet<Deprecation>,
    /// User-defined SassScript functions by name.
    pub functions: Vec<(String, HostFn)>,
    /// Sink for warnings and `@debug` messages.
    pub logger: SharedLogger,
}

impl Default for Options {
    fn default() -> Self {
        Options {
            importers: Vec::new(),
            load_paths: Vec::new(),
            package_config: FxHashMap::default(),
            importer: None,
            url: None,
            syntax: Syntax::Scss,
            style: OutputStyle::Expanded,
            charset: true,
            silence_deprecations: FxHashSet::default(),
            functions: Vec::new(),
            logger: stderr_logger(),
        }
    }
}

impl Options {
    pub fn new() -> Self {
        Options::default()
    }

    #[must_use]
    pub fn with_importer(mut self, importer: impl Into<ChainImporter>) -> Self {
        self.importers.push(importer.into());
        self
    }

    #[must_use]
    pub fn with_load_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.load_paths.push(path.into());
        self
    }

    #[must_use]
    pub fn with_package(mut self, name: impl Into<String>, base: impl Into<PathBuf>) -> Self {
        self.package_config.insert(name.into(), base.into());
        self
    }

    /// The "original" resolver for a string entrypoint; relative
    /// references in the entry resolve through it first.
    #[must_use]
    pub fn with_entry_importer(mut self, importer: impl Into<ChainImporter>) -> Self {
        self.importer = Some(importer.into());
        self
    }

    #[must_use]
    pub fn with_url(mut self, url: SourceUrl) -> Self {
        self.url = Some(url);
        self
    }

    #[must_use]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = syntax;
        self
    }

    #[must_use]
    pub fn with_style(mut self, style: OutputStyle) -> Self {
        self.style = style;
        self
    }

    #[must_use]
    pub fn with_charset(mut self, charset: bool) -> Self {
        self.charset = charset;
        self
    }

    #[must_use]
    pub fn silence(mut self, deprecation: Deprecation) -> Self {
        self.silence_deprecations.insert(deprecation);
        self
    }

    #[must_use]
    pub fn with_function(mut self, name: impl Into<String>, function: HostFn) -> Self {
        self.functions.push((name.into(), function));
        self
    }

    #[must_use]
    pub fn with_logger(mut self, logger: SharedLogger) -> Self {
        self.logger = logger;
        self
    }
}
