//! Per-cycle build plan.

use crate::compiler::{SourceDocument, is_stale, scan};
use crate::config::{Options, SiteConfig};
use crate::freshness::{FingerprintStore, LoadStatus};
use crate::generator::GeneratorArgs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildMode {
    /// Every document is compiled.
    Full,
    /// Only documents whose fingerprint changed are compiled.
    Incremental,
}

/// Derived file whose source no longer exists.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Orphan {
    /// Store key of the vanished source.
    pub source: String,
    pub output: PathBuf,
}

/// What one cycle will do. Computed fresh every cycle, never persisted.
#[derive(Debug, Clone)]
pub struct BuildPlan {
    pub mode: BuildMode,
    pub documents: Vec<SourceDocument>,
    /// Documents found fresh and left alone.
    pub fresh: usize,
    pub orphans: Vec<Orphan>,
    pub args: GeneratorArgs,
    pub output_dir: PathBuf,
}

impl BuildPlan {
    pub fn compute(
        site: &SiteConfig,
        options: &Options,
        store: &FingerprintStore,
        status: &LoadStatus,
        full: bool,
        local: bool,
    ) -> Self {
        let mode = if full || status.forces_full_build() || store.is_empty() {
            BuildMode::Full
        } else {
            BuildMode::Incremental
        };

        let all = scan(site.root(), &site.content_root());
        let total = all.len();
        let documents: Vec<_> = match mode {
            BuildMode::Full => all,
            BuildMode::Incremental => all
                .into_iter()
                .filter(|doc| needs_compile(store, doc))
                .collect(),
        };

        Self {
            mode,
            fresh: total - documents.len(),
            orphans: find_orphans(site.root(), store),
            args: GeneratorArgs::for_build(site, options, local),
            output_dir: site.publish_root(),
            documents,
        }
    }
}

fn needs_compile(store: &FingerprintStore, doc: &SourceDocument) -> bool {
    // Unreadable sources are handed to the compiler, which reports them.
    std::fs::read(doc.path()).map_or(true, |source| is_stale(store, doc, &source))
}

/// Orphans are known only through store records. Without a record there is
/// no telling a stale `.html` from one the user wrote, so it stays.
fn find_orphans(root: &Path, store: &FingerprintStore) -> Vec<Orphan> {
    store
        .iter()
        .filter(|(source, _)| !root.join(source.as_str()).exists())
        .map(|(source, entry)| Orphan {
            source: source.clone(),
            output: root.join(&entry.output),
        })
        .collect()
}
