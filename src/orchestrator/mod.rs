//! Build orchestration.
//!
//! One cycle, always in this order:
//!
//! ```text
//! config ──► plan ──► compile ──► hugo ──► reconcile
//!  (fresh)   (full/    (changed    (guarded)  (side effects,
//!            incr.)     documents)             output check)
//! ```
//!
//! The fingerprint store is saved after the compile step, so a failing
//! generator run does not force recompilation next time. The output
//! directory is never touched before the generator runs.

mod debouncer;
mod error;
mod guard;
mod plan;
mod watch;

pub use debouncer::ChangeKind;
pub use error::BuildError;
pub use guard::InvocationGuard;
pub use plan::{BuildMode, BuildPlan};
pub use watch::ChangeWatcher;

use crate::compiler::DocumentCompiler;
use crate::config::{Options, SiteConfig};
use crate::core::{CancelToken, GuardedScope, shutdown_token};
use crate::freshness::FingerprintStore;
use crate::generator::Generator;
use crate::logger::{status_error, status_success, status_unchanged};
use crate::utils::fs::{is_empty_dir, remove_path};
use crate::{debug, log};
use std::path::{Path, PathBuf};

/// What one cycle did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub mode: BuildMode,
    pub compiled: usize,
    pub fresh: usize,
    pub removed: usize,
    /// `None` for compile-only cycles.
    pub output_dir: Option<PathBuf>,
}

impl BuildReport {
    pub fn summary(&self) -> String {
        let mut parts = vec![format!("{} compiled", self.compiled)];
        if self.fresh > 0 {
            parts.push(format!("{} fresh", self.fresh));
        }
        if self.removed > 0 {
            parts.push(format!("{} removed", self.removed));
        }
        parts.join(", ")
    }
}

pub struct Orchestrator<'a> {
    options: &'a Options,
    generator: Generator,
    cancel: CancelToken,
}

impl<'a> Orchestrator<'a> {
    pub fn new(options: &'a Options, generator: Generator) -> Self {
        Self {
            options,
            generator,
            cancel: shutdown_token(),
        }
    }

    #[cfg(test)]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.generator = self.generator.with_cancel(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn generator(&self) -> &Generator {
        &self.generator
    }

    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    fn root(&self) -> &Path {
        &self.options.root
    }

    /// One full cycle: compile changed documents, then run the generator
    /// over the whole site.
    ///
    /// With `local`, the site is rooted at its base path and drafts and
    /// future content are included; the site config is left as it was.
    pub fn build(&self, local: bool, full: bool) -> Result<BuildReport, BuildError> {
        let (plan, mut report) = self.compile_step(full, local)?;

        self.invoke_generator(&plan)?;
        self.reconcile(&plan.output_dir)?;

        report.output_dir = Some(plan.output_dir);
        Ok(report)
    }

    /// Config, plan and compile steps only (the preview server renders on
    /// its own).
    pub fn compile_only(&self, full: bool) -> Result<BuildReport, BuildError> {
        self.compile_step(full, false).map(|(_, report)| report)
    }

    fn compile_step(
        &self,
        full: bool,
        local: bool,
    ) -> Result<(BuildPlan, BuildReport), BuildError> {
        if self.cancel.is_cancelled() {
            return Err(BuildError::Cancelled);
        }

        let site = SiteConfig::load(self.root())?;
        let (mut store, status) = FingerprintStore::load(self.root());
        if status.forces_full_build() {
            debug!("build"; "fingerprint store {:?}, full build", status);
        }
        let plan = BuildPlan::compute(&site, self.options, &store, &status, full, local);
        debug!(
            "build";
            "{:?}: {} to compile, {} fresh, {} orphaned",
            plan.mode,
            plan.documents.len(),
            plan.fresh,
            plan.orphans.len()
        );

        let mut removed = 0;
        for orphan in &plan.orphans {
            remove_path(&orphan.output)?;
            store.remove(&orphan.source);
            log!("build"; "removed {}", orphan.output.display());
            removed += 1;
        }

        let compiled = {
            let mut compiler = DocumentCompiler::new(&self.generator, &mut store)
                .force(plan.mode == BuildMode::Full)
                .scratch_dir(self.options.build.scratch_dir.clone());
            compiler.compile_all(&plan.documents)
        };
        // Keep what compiled before a failure.
        store.save(self.root())?;
        let compiled = compiled?;

        let report = BuildReport {
            mode: plan.mode,
            compiled: compiled.iter().filter(|c| c.is_compiled()).count(),
            fresh: plan.fresh,
            removed,
            output_dir: None,
        };
        Ok((plan, report))
    }

    fn invoke_generator(&self, plan: &BuildPlan) -> Result<(), BuildError> {
        let mut guard = InvocationGuard::new(self.root());
        let result = self.generator.run(&plan.args, self.root());
        match guard.restore() {
            Ok(restored) => {
                for dir in &restored.removed_dirs {
                    debug!("build"; "removed empty {}", dir.display());
                }
            }
            Err(e) => log!("warn"; "failed to clean up after hugo: {}", e),
        }

        let output = result?;
        let stdout = output.stdout.trim();
        if !stdout.is_empty() {
            debug!("hugo"; "{}", stdout);
        }
        Ok(())
    }

    fn reconcile(&self, output_dir: &Path) -> Result<(), BuildError> {
        if !output_dir.is_dir() {
            return Err(BuildError::MissingOutput(output_dir.to_path_buf()));
        }
        if is_empty_dir(output_dir) {
            log!("warn"; "{} is empty after the build", output_dir.display());
        }
        Ok(())
    }

    /// Build once, then rebuild on every batch of changes until cancelled.
    ///
    /// Failed cycles are reported and the loop keeps going.
    pub fn watch(&self, local: bool) -> Result<(), BuildError> {
        let _scope = GuardedScope::enter();

        self.report_cycle(self.build(local, false));
        if self.cancel.is_cancelled() {
            return Ok(());
        }

        let site = SiteConfig::load(self.root())?;
        let mut watcher = ChangeWatcher::new(&site)?;
        log!("watch"; "watching {} for changes", self.root().display());

        while let Some(batch) = watcher.next_batch(&self.cancel, || true)? {
            log_batch(self.root(), &batch);
            if !self.report_cycle(self.build(local, false)) {
                break;
            }
            watcher.reload(self.root());
        }
        Ok(())
    }

    /// Show a cycle result on the status line. Returns `false` once the
    /// loop should stop.
    pub fn report_cycle(&self, result: Result<BuildReport, BuildError>) -> bool {
        match result {
            Ok(report) if report.compiled == 0 && report.removed == 0 => {
                status_unchanged(&format!("no documents changed ({})", report.summary()));
                true
            }
            Ok(report) => {
                status_success(&report.summary());
                true
            }
            Err(e) if e.is_cancelled() => false,
            Err(e) => {
                status_error("build failed", &error_chain(&e));
                true
            }
        }
    }
}

fn log_batch(root: &Path, batch: &[(PathBuf, ChangeKind)]) {
    for (path, kind) in batch {
        let rel = path.strip_prefix(root).unwrap_or(path);
        debug!("watch"; "{} {}", kind.label(), rel.display());
    }
}

/// Display an error followed by its chain of causes, one per line.
pub fn error_chain(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\n  caused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}
