//! Source document compilation.
//!
//! # Module Structure
//!
//! ```text
//! compiler/
//! ├── document      # SourceDocument, SourceKind, content scan
//! ├── front_matter  # fence splitting, YAML field editing
//! ├── render        # body rendering (pulldown-cmark)
//! ├── scratch       # isolated projects for front matter conversion
//! └── mod.rs        # DocumentCompiler (this file)
//! ```
//!
//! Each compiled file is the document's front matter as YAML followed by
//! the rendered body. A document is skipped when its source fingerprint
//! matches the last successful compile and the derived file still hashes to
//! what was written then.

pub mod document;
pub mod front_matter;
mod render;
pub mod scratch;

pub use document::{SourceDocument, SourceKind, is_derived_artifact, scan};
pub use front_matter::{FrontMatterError, PostMeta, edit_yaml};
pub use scratch::normalize_file;

use crate::debug;
use crate::freshness::{Entry, FingerprintStore, compute_file_hash, hash_bytes, source_fingerprint};
use crate::generator::{Generator, GeneratorError};
use crate::logger::ProgressLine;
use crate::utils::fs::{FsError, read, write_if_changed};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("{}: {source}", path.display())]
    FrontMatter {
        path: PathBuf,
        #[source]
        source: FrontMatterError,
    },

    #[error("{} is not valid UTF-8", path.display())]
    Encoding { path: PathBuf },

    #[error("failed to convert front matter of {}", path.display())]
    Convert {
        path: PathBuf,
        #[source]
        source: GeneratorError,
    },

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Outcome of compiling one document; carries the derived file path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompiledPath {
    Compiled(PathBuf),
    Skipped(PathBuf),
}

impl CompiledPath {
    pub fn path(&self) -> &Path {
        match self {
            Self::Compiled(p) | Self::Skipped(p) => p,
        }
    }

    pub const fn is_compiled(&self) -> bool {
        matches!(self, Self::Compiled(_))
    }
}

pub struct DocumentCompiler<'a> {
    generator: &'a Generator,
    store: &'a mut FingerprintStore,
    scratch_dir: Option<PathBuf>,
    force: bool,
}

impl<'a> DocumentCompiler<'a> {
    pub fn new(generator: &'a Generator, store: &'a mut FingerprintStore) -> Self {
        Self {
            generator,
            store,
            scratch_dir: None,
            force: false,
        }
    }

    /// Compile even when the recorded fingerprint matches.
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Parent directory for scratch projects (system temp dir by default).
    pub fn scratch_dir(mut self, dir: Option<PathBuf>) -> Self {
        self.scratch_dir = dir;
        self
    }

    pub fn compile(&mut self, doc: &SourceDocument) -> Result<CompiledPath, CompileError> {
        let source = read(doc.path())?;
        let target = doc.target_path();
        if !self.force && !is_stale(&*self.store, doc, &source) {
            debug!("compile"; "fresh: {}", doc.rel_path());
            return Ok(CompiledPath::Skipped(target));
        }

        let text = std::str::from_utf8(&source).map_err(|_| CompileError::Encoding {
            path: doc.path().to_path_buf(),
        })?;
        let normalized = scratch::normalize_front_matter(
            self.generator,
            doc.path(),
            text,
            self.scratch_dir.as_deref(),
        )?;
        let output = assemble(doc, &normalized)?;

        if write_if_changed(&target, output.as_bytes())? {
            debug!("compile"; "{} -> {}", doc.rel_path(), doc.target_rel());
        } else {
            debug!("compile"; "unchanged output: {}", doc.target_rel());
        }

        self.store.record(
            doc.rel_path(),
            Entry {
                source: source_fingerprint(doc.rel_path(), &source),
                output: doc.target_rel(),
                output_hash: hash_bytes(output.as_bytes()),
            },
        );
        Ok(CompiledPath::Compiled(target))
    }

    /// Compile `docs` in order, stopping at the first failure.
    ///
    /// Documents compiled before a failure stay recorded in the store.
    pub fn compile_all(&mut self, docs: &[SourceDocument]) -> Result<Vec<CompiledPath>, CompileError> {
        let count = |kind| docs.iter().filter(|d| d.kind() == kind).count();
        let progress = ProgressLine::new(&[
            ("html", count(SourceKind::Rmd)),
            ("markdown", count(SourceKind::Rmarkdown)),
        ]);

        let mut results = Vec::with_capacity(docs.len());
        for doc in docs {
            results.push(self.compile(doc)?);
            progress.inc(doc.kind().target_ext());
        }
        progress.finish();
        Ok(results)
    }
}

/// Whether `doc` needs compiling, given its current source bytes.
pub fn is_stale(store: &FingerprintStore, doc: &SourceDocument, source: &[u8]) -> bool {
    let Some(entry) = store.get(doc.rel_path()) else {
        return true;
    };
    entry.source != source_fingerprint(doc.rel_path(), source)
        || entry.output != doc.target_rel()
        || !compute_file_hash(&doc.target_path()).is_ok_and(|h| h == entry.output_hash)
}

/// YAML front matter block followed by the rendered body.
fn assemble(doc: &SourceDocument, normalized: &str) -> Result<String, CompileError> {
    let split = front_matter::split(normalized).map_err(|e| CompileError::FrontMatter {
        path: doc.path().to_path_buf(),
        source: e,
    })?;
    let block = if split.block.is_empty() {
        "---\n---\n"
    } else {
        split.block
    };
    let body = render::render_body(doc.kind(), split.body);
    let mut out = String::with_capacity(block.len() + body.len() + 1);
    out.push_str(block);
    if !block.ends_with('\n') {
        out.push('\n');
    }
    out.push_str(&body);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CancelToken;
    use std::fs;
    use tempfile::TempDir;

    struct Project {
        dir: TempDir,
        generator: Generator,
    }

    impl Project {
        fn new() -> Self {
            let dir = TempDir::new().unwrap();
            fs::create_dir_all(dir.path().join("content/post")).unwrap();
            // YAML documents never reach the generator
            let generator =
                Generator::with_binary(dir.path().join("no-hugo")).with_cancel(CancelToken::new());
            Self { dir, generator }
        }

        fn root(&self) -> &Path {
            self.dir.path()
        }

        fn write(&self, rel: &str, content: &str) -> SourceDocument {
            let path = self.root().join(rel);
            fs::write(&path, content).unwrap();
            SourceDocument::new(self.root(), &path).unwrap()
        }
    }

    #[test]
    fn test_compile_rmd() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmd", "---\ntitle: A\n---\n# Hi\n");
        let mut store = FingerprintStore::default();
        let mut compiler = DocumentCompiler::new(&project.generator, &mut store);

        let result = compiler.compile(&doc).unwrap();
        assert!(result.is_compiled());
        assert_eq!(result.path(), project.root().join("content/post/a.html"));
        assert_eq!(
            fs::read_to_string(result.path()).unwrap(),
            "---\ntitle: A\n---\n<h1>Hi</h1>\n"
        );

        let entry = store.get("content/post/a.Rmd").unwrap();
        assert_eq!(entry.output, "content/post/a.html");
    }

    #[test]
    fn test_unchanged_source_is_skipped() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmarkdown", "---\ntitle: A\n---\nbody\n");
        let mut store = FingerprintStore::default();
        let mut compiler = DocumentCompiler::new(&project.generator, &mut store);

        assert!(compiler.compile(&doc).unwrap().is_compiled());
        assert_eq!(
            compiler.compile(&doc).unwrap(),
            CompiledPath::Skipped(doc.target_path())
        );
    }

    #[test]
    fn test_force_recompiles_fresh_document() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmd", "---\ntitle: A\n---\nx\n");
        let mut store = FingerprintStore::default();
        DocumentCompiler::new(&project.generator, &mut store)
            .compile(&doc)
            .unwrap();
        assert!(!is_stale(&store, &doc, &fs::read(doc.path()).unwrap()));

        let result = DocumentCompiler::new(&project.generator, &mut store)
            .force(true)
            .compile(&doc)
            .unwrap();
        assert!(result.is_compiled());
    }

    #[test]
    fn test_identical_recompile_keeps_mtime() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmd", "---\ntitle: A\n---\ntext\n");
        let mut store = FingerprintStore::default();
        DocumentCompiler::new(&project.generator, &mut store)
            .compile(&doc)
            .unwrap();
        let before = fs::metadata(doc.target_path()).unwrap().modified().unwrap();

        // Forget the fingerprint so the document compiles again.
        store.clear();
        std::thread::sleep(std::time::Duration::from_millis(20));
        let result = DocumentCompiler::new(&project.generator, &mut store)
            .compile(&doc)
            .unwrap();

        assert!(result.is_compiled());
        let after = fs::metadata(doc.target_path()).unwrap().modified().unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_one_byte_change_recompiles() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmd", "---\ntitle: A\n---\nabc\n");
        let mut store = FingerprintStore::default();
        let mut compiler = DocumentCompiler::new(&project.generator, &mut store);
        compiler.compile(&doc).unwrap();

        project.write("content/post/a.Rmd", "---\ntitle: A\n---\nabd\n");
        assert!(compiler.compile(&doc).unwrap().is_compiled());
        assert!(
            fs::read_to_string(doc.target_path())
                .unwrap()
                .contains("<p>abd</p>")
        );
    }

    #[test]
    fn test_tampered_output_recompiles() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmd", "---\ntitle: A\n---\nabc\n");
        let mut store = FingerprintStore::default();
        let mut compiler = DocumentCompiler::new(&project.generator, &mut store);
        compiler.compile(&doc).unwrap();

        fs::write(doc.target_path(), "edited by hand").unwrap();
        assert!(compiler.compile(&doc).unwrap().is_compiled());

        fs::remove_file(doc.target_path()).unwrap();
        assert!(compiler.compile(&doc).unwrap().is_compiled());
        assert!(doc.target_path().is_file());
    }

    #[test]
    fn test_no_front_matter_gets_empty_yaml_block() {
        let project = Project::new();
        let doc = project.write("content/post/a.Rmarkdown", "just text\n");
        let mut store = FingerprintStore::default();
        DocumentCompiler::new(&project.generator, &mut store)
            .compile(&doc)
            .unwrap();
        assert_eq!(
            fs::read_to_string(doc.target_path()).unwrap(),
            "---\n---\njust text\n"
        );
    }

    #[test]
    fn test_invalid_utf8() {
        let project = Project::new();
        let path = project.root().join("content/post/a.Rmd");
        fs::write(&path, [0xff, 0xfe, 0x00]).unwrap();
        let doc = SourceDocument::new(project.root(), &path).unwrap();
        let mut store = FingerprintStore::default();
        let err = DocumentCompiler::new(&project.generator, &mut store)
            .compile(&doc)
            .unwrap_err();
        assert!(matches!(err, CompileError::Encoding { .. }));
        assert!(store.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_toml_front_matter_compiles_to_yaml() {
        let project = Project::new();
        let generator = Generator::with_binary(crate::generator::fake::script(
            project.root(),
            crate::generator::fake::TOOLBOX,
        ))
        .with_cancel(CancelToken::new());
        let doc = project.write("content/post/a.Rmarkdown", "+++\ntitle = \"A\"\n+++\nbody\n");
        let mut store = FingerprintStore::default();
        DocumentCompiler::new(&generator, &mut store)
            .compile(&doc)
            .unwrap();
        assert_eq!(
            fs::read_to_string(doc.target_path()).unwrap(),
            "---\ntitle: converted\n---\nbody\n"
        );
    }
}
