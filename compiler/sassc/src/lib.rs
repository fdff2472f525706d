//! Sassc - the public compilation surface.
//!
//! One-shot compilations over the evaluator: resolve an entry source,
//! evaluate it into CSS, and report the result together with the set of
//! canonical URLs that were loaded.
//!
//! ```no_run
//! let options = sassc::Options::default();
//! let css = sassc::compile("styles/app.scss", &options)?;
//! # Ok::<(), sassc::CompileError>(())
//! ```
//!
//! The `*_async` variants differ only in scheduling: they accept
//! asynchronous importers and suspend only at resolver boundaries. The
//! evaluator itself never yields mid-module; the module cache's
//! in-progress slot guarantees each canonical URL is fetched and
//! evaluated at most once per compilation either way.

mod error;
mod options;

use std::path::Path;

use sass_css::render;
use sass_diagnostic::{SassError, SassResult, WarnDispatcher};
use sass_eval::Evaluator;
use sass_ir::SourceUrl;

pub use error::CompileError;
pub use options::Options;

// Re-exports forming the embedding surface.
pub use sass_css::OutputStyle;
pub use sass_diagnostic::{
    buffer_logger, stderr_logger, BufferLogger, Deprecation, Logger, NullLogger, SharedLogger,
    Warning,
};
pub use sass_eval::HostFn;
pub use sass_ir::{SourceUrl as Url, Syntax};
pub use sass_resolve::{
    AsyncImporter, CanonicalizeContext, ChainImporter, FilesystemImporter, Importer,
    ImporterResult, PackageImporter, ResolverChain,
};
pub use sass_value::Value;

/// A successful compilation.
#[derive(Clone, Debug)]
pub struct CompileResult {
    pub css: String,
    /// Canonical URLs loaded during the compilation, in load order.
    /// Contains the entry URL iff one was provided.
    pub loaded_urls: Vec<SourceUrl>,
}

/// Compile a stylesheet file to CSS.
pub fn compile(path: impl AsRef<Path>, options: &Options) -> Result<String, CompileError> {
    compile_to_result(path, options).map(|result| result.css)
}

/// Compile a stylesheet file, reporting the loaded URLs too.
pub fn compile_to_result(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<CompileResult, CompileError> {
    let path = path.as_ref();
    let mut chain = build_chain(options);
    let entry_importer = ChainImporter::from(FilesystemImporter::new("."));
    let entry_index = chain.push_base_importer(entry_importer.clone());

    let resolved = resolve_entry(&entry_importer, path)
        .map_err(|err| CompileError::new(err, None, None))?;
    let (url, source) = resolved;

    let mut evaluator = build_evaluator(chain, options);
    tracing::debug!(url = %url, "compiling entry file");
    run_entry(
        &mut evaluator,
        &source.contents,
        source.syntax,
        Some(url.clone()),
        Some(entry_index),
        options,
    )
    .map_err(|err| CompileError::new(err, Some(&source.contents), Some(&url)))
}

/// Compile an in-memory source string to CSS.
pub fn compile_string(source: &str, options: &Options) -> Result<String, CompileError> {
    compile_string_to_result(source, options).map(|result| result.css)
}

/// Compile an in-memory source string, reporting the loaded URLs too.
pub fn compile_string_to_result(
    source: &str,
    options: &Options,
) -> Result<CompileResult, CompileError> {
    run_string(source, options)
        .map_err(|err| CompileError::new(err, Some(source), options.url.as_ref()))
}

/// Async variant of [`compile`]; suspends only at resolver boundaries.
pub async fn compile_async(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<String, CompileError> {
    compile_to_result_async(path, options).await.map(|r| r.css)
}

/// Async variant of [`compile_to_result`].
pub async fn compile_to_result_async(
    path: impl AsRef<Path>,
    options: &Options,
) -> Result<CompileResult, CompileError> {
    compile_to_result(path, options)
}

/// Async variant of [`compile_string`].
pub async fn compile_string_async(
    source: &str,
    options: &Options,
) -> Result<String, CompileError> {
    compile_string_to_result_async(source, options)
        .await
        .map(|r| r.css)
}

/// Async variant of [`compile_string_to_result`].
pub async fn compile_string_to_result_async(
    source: &str,
    options: &Options,
) -> Result<CompileResult, CompileError> {
    compile_string_to_result(source, options)
}

// Pipeline

fn build_chain(options: &Options) -> ResolverChain {
    let package = if options.package_config.is_empty() {
        None
    } else {
        Some(PackageImporter::new(options.package_config.clone()))
    };
    ResolverChain::new(
        options.importers.clone(),
        options.load_paths.clone(),
        package,
    )
}

fn build_evaluator(chain: ResolverChain, options: &Options) -> Evaluator {
    let dispatcher = WarnDispatcher::new(
        options.logger.clone(),
        options.silence_deprecations.clone(),
    );
    let mut evaluator = Evaluator::new(chain, dispatcher);
    for (name, function) in &options.functions {
        evaluator.register_host_function(name, function.clone());
    }
    evaluator
}

fn resolve_entry(
    entry_importer: &ChainImporter,
    path: &Path,
) -> SassResult<(SourceUrl, sass_resolve::ImporterResult)> {
    let reference = path.to_string_lossy();
    let url = entry_importer
        .canonicalize(&reference, &CanonicalizeContext::default())?
        .ok_or_else(|| {
            SassError::resolver(format!("Can't find stylesheet to import: {reference}"))
        })?;
    let source = entry_importer
        .load(&url)?
        .ok_or_else(|| SassError::resolver(format!("Failed to load entry stylesheet {url}.")))?;
    Ok((url, source))
}

fn run_string(source: &str, options: &Options) -> SassResult<CompileResult> {
    let mut chain = build_chain(options);
    let entry_index = options
        .importer
        .clone()
        .map(|importer| chain.push_base_importer(importer));
    // Relative resolution needs both an importer and a URL to resolve
    // against; with either missing, references go straight to the chain.
    let importer_for_entry = match (&entry_index, &options.url) {
        (Some(index), Some(_)) => Some(*index),
        _ => None,
    };

    let mut evaluator = build_evaluator(chain, options);
    tracing::debug!(url = options.url.as_ref().map(tracing::field::display), "compiling entry string");
    run_entry(
        &mut evaluator,
        source,
        options.syntax,
        options.url.clone(),
        importer_for_entry,
        options,
    )
}

fn run_entry(
    evaluator: &mut Evaluator,
    contents: &str,
    syntax: Syntax,
    url: Option<SourceUrl>,
    importer: Option<usize>,
    options: &Options,
) -> SassResult<CompileResult> {
    let tree = evaluator.compile_entry(contents, syntax, url, importer)?;
    let css = render(&tree, options.style, options.charset)?;
    Ok(CompileResult {
        css,
        loaded_urls: evaluator.loaded_urls().to_vec(),
    })
}
