//! Source documents and their derived content files.

use crate::utils::path::to_slash;
use jwalk::WalkDir;
use std::path::{Path, PathBuf};

/// Rich-markup source kinds, keyed by extension (case-insensitive).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    /// `.Rmd`, rendered to `.html`
    Rmd,
    /// `.Rmarkdown`, rendered to `.markdown`
    Rmarkdown,
}

impl SourceKind {
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?;
        if ext.eq_ignore_ascii_case("rmd") {
            Some(Self::Rmd)
        } else if ext.eq_ignore_ascii_case("rmarkdown") {
            Some(Self::Rmarkdown)
        } else {
            None
        }
    }

    /// Extension of the derived content file.
    pub const fn target_ext(self) -> &'static str {
        match self {
            Self::Rmd => "html",
            Self::Rmarkdown => "markdown",
        }
    }
}

/// A source document under the content root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    path: PathBuf,
    rel: String,
    kind: SourceKind,
}

impl SourceDocument {
    /// `None` when `path` is not a source document or lies outside `root`.
    pub fn new(root: &Path, path: &Path) -> Option<Self> {
        let kind = SourceKind::from_path(path)?;
        let rel = to_slash(path.strip_prefix(root).ok()?);
        Some(Self {
            path: path.to_path_buf(),
            rel,
            kind,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Root-relative path with forward slashes; the fingerprint store key.
    pub fn rel_path(&self) -> &str {
        &self.rel
    }

    pub const fn kind(&self) -> SourceKind {
        self.kind
    }

    /// Same directory and stem, mapped extension.
    pub fn target_path(&self) -> PathBuf {
        self.path.with_extension(self.kind.target_ext())
    }

    pub fn target_rel(&self) -> String {
        let ext = self.kind.target_ext();
        match self.rel.rsplit_once('.') {
            Some((stem, _)) => format!("{stem}.{ext}"),
            None => format!("{}.{ext}", self.rel),
        }
    }
}

/// All source documents under `content_root`, sorted by path.
///
/// Hidden files and directories are skipped.
pub fn scan(root: &Path, content_root: &Path) -> Vec<SourceDocument> {
    if !content_root.is_dir() {
        return Vec::new();
    }
    let mut docs: Vec<_> = WalkDir::new(content_root)
        .skip_hidden(true)
        .sort(true)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| SourceDocument::new(root, &e.path()))
        .collect();
    docs.sort_by(|a, b| a.rel.cmp(&b.rel));
    docs
}

/// Whether `path` is compiled output: a `.html`/`.markdown` file next to a
/// source document with the same stem.
pub fn is_derived_artifact(path: &Path) -> bool {
    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let sources: &[&str] = match ext {
        "html" => &["Rmd", "rmd", "RMD"],
        "markdown" => &["Rmarkdown", "rmarkdown", "RMARKDOWN"],
        _ => return false,
    };
    sources.iter().any(|src| path.with_extension(src).is_file())
}
