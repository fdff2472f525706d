//! End-to-end compilation scenarios: importer precedence, charset
//! policy, loaded-URL reporting, and load coalescing.

#![allow(clippy::unwrap_used)]

use std::fs;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use futures::future::BoxFuture;
use futures::FutureExt;
use pretty_assertions::assert_eq;
use sassc::{
    compile, compile_string, compile_string_to_result, compile_string_to_result_async,
    compile_to_result, AsyncImporter, Importer, ImporterResult, Options, OutputStyle, Syntax,
};
use sass_diagnostic::SassResult;
use sass_ir::SourceUrl;
use sass_resolve::{CanonicalizeContext, ChainImporter, FilesystemImporter};

fn write_file(dir: &Path, name: &str, contents: &str) {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, contents).unwrap();
}

/// A synchronous importer claiming exactly one URL scheme.
struct SchemeImporter {
    scheme: &'static str,
    contents: &'static str,
    loads: Arc<AtomicUsize>,
}

impl Importer for SchemeImporter {
    fn canonicalize(
        &self,
        reference: &str,
        _context: &CanonicalizeContext<'_>,
    ) -> SassResult<Option<SourceUrl>> {
        if reference.starts_with(&format!("{}:", self.scheme)) {
            Ok(Some(SourceUrl::parse(reference)?))
        } else {
            Ok(None)
        }
    }

    fn load(&self, _url: &SourceUrl) -> SassResult<Option<ImporterResult>> {
        self.loads.fetch_add(1, Ordering::SeqCst);
        Ok(Some(ImporterResult {
            contents: self.contents.to_string(),
            syntax: Syntax::Scss,
            source_map_url: None,
        }))
    }
}

/// An asynchronous importer serving one stylesheet, counting loads.
struct CountingAsyncImporter {
    name: &'static str,
    contents: &'static str,
    loads: Arc<AtomicUsize>,
}

impl AsyncImporter for CountingAsyncImporter {
    fn canonicalize<'a>(
        &'a self,
        reference: &'a str,
        _context: &'a CanonicalizeContext<'a>,
    ) -> BoxFuture<'a, SassResult<Option<SourceUrl>>> {
        async move {
            if reference == self.name || reference == format!("async:{}", self.name) {
                Ok(Some(SourceUrl::parse(&format!("async:{}", self.name))?))
            } else {
                Ok(None)
            }
        }
        .boxed()
    }

    fn load<'a>(&'a self, _url: &'a SourceUrl) -> BoxFuture<'a, SassResult<Option<ImporterResult>>> {
        async move {
            self.loads.fetch_add(1, Ordering::SeqCst);
            Ok(Some(ImporterResult {
                contents: self.contents.to_string(),
                syntax: Syntax::Scss,
                source_map_url: None,
            }))
        }
        .boxed()
    }
}

#[test]
fn test_importer_order() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "first/other.scss", "a {b: from-first}");
    write_file(dir.path(), "second/other.scss", "a {b: from-second}");
    write_file(dir.path(), "test.scss", "@use \"other\";");

    let options = Options::default()
        .with_importer(FilesystemImporter::new(dir.path().join("first")))
        .with_importer(FilesystemImporter::new(dir.path().join("second")));
    let css = compile(dir.path().join("test.scss"), &options).unwrap();
    assert_eq!(css, "a {\n  b: from-first;\n}");
}

#[test]
fn test_relative_beats_importers() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "subdir/other.scss", "a {b: from-load-path}");
    write_file(dir.path(), "other.scss", "a {b: from-relative}");
    write_file(dir.path(), "test.scss", "@use \"other\";");

    let options =
        Options::default().with_importer(FilesystemImporter::new(dir.path().join("subdir")));
    let css = compile(dir.path().join("test.scss"), &options).unwrap();
    assert_eq!(css, "a {\n  b: from-relative;\n}");
}

#[test]
fn test_load_paths_after_importers() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "imp/other.scss", "a {b: from-importer}");
    write_file(dir.path(), "lp/other.scss", "a {b: from-load-path}");

    let options = Options::default()
        .with_importer(FilesystemImporter::new(dir.path().join("imp")))
        .with_load_path(dir.path().join("lp"));
    let css = compile_string("@use \"other\";", &options).unwrap();
    assert_eq!(css, "a {\n  b: from-importer;\n}");

    let only_load_path = Options::default().with_load_path(dir.path().join("lp"));
    let css = compile_string("@use \"other\";", &only_load_path).unwrap();
    assert_eq!(css, "a {\n  b: from-load-path;\n}");
}

#[test]
fn test_absolute_scheme_cross_importer_handoff() {
    let a_loads = Arc::new(AtomicUsize::new(0));
    let b_loads = Arc::new(AtomicUsize::new(0));
    let options = Options::default()
        .with_importer(SchemeImporter {
            scheme: "first",
            contents: "a {from: first}",
            loads: a_loads.clone(),
        })
        .with_importer(SchemeImporter {
            scheme: "second",
            contents: "@use \"first:other\";",
            loads: b_loads.clone(),
        });

    // Even though B produced the containing stylesheet, the absolute
    // first: reference is claimed by A at the top of the chain.
    let css = compile_string("@use \"second:other\";", &options).unwrap();
    assert_eq!(css, "a {\n  from: first;\n}");
    assert_eq!(a_loads.load(Ordering::SeqCst), 1);
    assert_eq!(b_loads.load(Ordering::SeqCst), 1);
}

#[test]
fn test_charset_policy() {
    let source = "a {b: 👭}";

    let expanded = compile_string(source, &Options::default()).unwrap();
    assert!(expanded.starts_with("@charset \"UTF-8\";"));

    let compressed = compile_string(
        source,
        &Options::default().with_style(OutputStyle::Compressed),
    )
    .unwrap();
    assert!(compressed.starts_with('\u{feff}'));

    let no_charset = compile_string(source, &Options::default().with_charset(false)).unwrap();
    assert!(no_charset.starts_with("a {"));

    let no_bom = compile_string(
        source,
        &Options::default()
            .with_style(OutputStyle::Compressed)
            .with_charset(false),
    )
    .unwrap();
    assert!(no_bom.starts_with("a{"));
}

#[test]
fn test_loaded_urls_chain() {
    let dir = tempfile::tempdir().unwrap();
    write_file(
        dir.path(),
        "mercury.scss",
        "@use \"sass:meta\";\n@include meta.load-css(\"venus\");",
    );
    write_file(dir.path(), "_venus.scss", "@use \"earth\";");
    write_file(dir.path(), "_earth.scss", "@import \"mars\";");
    write_file(dir.path(), "_mars.scss", "@forward \"jupiter\";");
    write_file(dir.path(), "_jupiter.scss", "a {b: c}");

    let options = Options::default().silence(sassc::Deprecation::Import);
    let result = compile_to_result(dir.path().join("mercury.scss"), &options).unwrap();
    assert_eq!(result.css, "a {\n  b: c;\n}");

    let names: Vec<String> = result
        .loaded_urls
        .iter()
        .map(|url| {
            Path::new(url.path())
                .file_name()
                .unwrap()
                .to_string_lossy()
                .into_owned()
        })
        .collect();
    assert_eq!(
        names,
        [
            "mercury.scss",
            "_venus.scss",
            "_earth.scss",
            "_mars.scss",
            "_jupiter.scss"
        ]
    );
}

#[test]
fn test_loaded_urls_entry_only_when_url_given() {
    let result = compile_string_to_result("a {b: c}", &Options::default()).unwrap();
    assert!(result.loaded_urls.is_empty());

    let url = SourceUrl::parse("custom:entry").unwrap();
    let options = Options::default().with_url(url.clone());
    let result = compile_string_to_result("a {b: c}", &options).unwrap();
    assert_eq!(result.loaded_urls, [url]);
}

#[test]
fn test_load_css_coalesces_per_compilation() {
    let loads = Arc::new(AtomicUsize::new(0));
    let importer = Arc::new(CountingAsyncImporter {
        name: "other",
        contents: "a {b: c}",
        loads: loads.clone(),
    });
    let source = "\
@use \"sass:meta\";\n\
@include meta.load-css(\"other\");\n\
@include meta.load-css(\"other\");";

    let run = |importer: Arc<CountingAsyncImporter>| async move {
        let options =
            Options::default().with_importer(ChainImporter::Async(importer));
        compile_string_to_result_async(source, &options).await
    };

    let (first, second) = futures::executor::block_on(async {
        futures::join!(run(importer.clone()), run(importer.clone()))
    });
    let first = first.unwrap();
    let second = second.unwrap();

    // Both load-css calls splice the CSS, but they coalesce into one
    // parse and one evaluation per compilation; two compilations make
    // two loads total.
    assert_eq!(first.css, "a {\n  b: c;\n}\n\na {\n  b: c;\n}");
    assert_eq!(second.css, "a {\n  b: c;\n}\n\na {\n  b: c;\n}");
    assert_eq!(loads.load(Ordering::SeqCst), 2);
}

#[test]
fn test_entry_importer_for_string_compiles() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "styles/other.scss", "a {b: relative}");

    let options = Options::default()
        .with_entry_importer(FilesystemImporter::new("/"))
        .with_url(SourceUrl::from_file_path(&dir.path().join("styles/entry.scss")));
    let css = compile_string("@use \"other\";", &options).unwrap();
    assert_eq!(css, "a {\n  b: relative;\n}");
}

#[test]
fn test_package_urls() {
    let dir = tempfile::tempdir().unwrap();
    write_file(dir.path(), "chroma/utils.scss", "a {b: packaged}");

    let options = Options::default().with_package("chroma", dir.path().join("chroma"));
    let css = compile_string("@use \"package:chroma/utils\";", &options).unwrap();
    assert_eq!(css, "a {\n  b: packaged;\n}");
}

#[test]
fn test_compressed_output() {
    let css = compile_string(
        "a { b: c; d: e; }\nf { g: h; }",
        &Options::default().with_style(OutputStyle::Compressed),
    )
    .unwrap();
    assert_eq!(css, "a{b:c;d:e}f{g:h}");
}

#[test]
fn test_missing_import_error_message() {
    let err = compile_string("@use \"nowhere\";", &Options::default()).unwrap_err();
    assert!(err.inner.message.contains("Can't find stylesheet to import."));
}

#[test]
fn test_error_formatting_excerpts_entry() {
    let err = compile_string("a { b: $missing; }", &Options::default()).unwrap_err();
    assert!(err.formatted.starts_with("Error: Undefined variable $missing."));
    assert!(err.formatted.contains("a { b: $missing; }"));
    assert!(err.formatted.contains('^'));
}

#[test]
fn test_custom_host_function() {
    let halve: sassc::HostFn = Arc::new(|args| {
        let number = args[0].assert_number(Some("number"))?;
        Ok(sassc::Value::Number(number.div(&sass_value::Number::unitless(2.0))))
    });
    let options = Options::default().with_function("halve", halve);
    let css = compile_string("a { w: halve(10px); }", &options).unwrap();
    assert_eq!(css, "a {\n  w: 5px;\n}");
}

#[test]
fn test_indented_entry_syntax() {
    let css = compile_string(
        "a\n  b: c\n",
        &Options::default().with_syntax(Syntax::Indented),
    )
    .unwrap();
    assert_eq!(css, "a {\n  b: c;\n}");
}
