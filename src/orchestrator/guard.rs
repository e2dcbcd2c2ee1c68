//! Undo generator side effects on the project tree.
//!
//! A guard notes which side-effect directories are missing before the
//! generator runs. Restoring (explicitly or on drop, including during a panic
//! unwind) removes the ones the generator created but left empty. The site
//! config is never touched: per-invocation settings travel as flags, so
//! whatever sits in the config afterwards belongs to the user.

use crate::core::GuardedScope;
use crate::log;
use crate::utils::fs::FsError;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Directories Hugo creates as a side effect of building.
const SIDE_EFFECT_DIRS: &[&str] = &["resources"];

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Restored {
    pub removed_dirs: Vec<PathBuf>,
}

pub struct InvocationGuard {
    created: Vec<PathBuf>,
    done: bool,
    _scope: GuardedScope,
}

impl InvocationGuard {
    pub fn new(root: &Path) -> Self {
        let created = SIDE_EFFECT_DIRS
            .iter()
            .map(|dir| root.join(dir))
            .filter(|dir| !dir.exists())
            .collect();
        Self {
            created,
            done: false,
            _scope: GuardedScope::enter(),
        }
    }

    /// Clean up now. Later calls (and the drop) do nothing.
    pub fn restore(&mut self) -> Result<Restored, FsError> {
        if self.done {
            return Ok(Restored::default());
        }
        self.done = true;

        let mut restored = Restored::default();
        for dir in &self.created {
            if remove_empty_tree(dir)? {
                restored.removed_dirs.push(dir.clone());
            }
        }
        Ok(restored)
    }
}

impl Drop for InvocationGuard {
    fn drop(&mut self) {
        if let Err(e) = self.restore() {
            log!("error"; "failed to clean up after hugo: {}", e);
        }
    }
}

/// Remove `dir` if it holds nothing but empty directories.
fn remove_empty_tree(dir: &Path) -> Result<bool, FsError> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FsError::new("read directory", dir, e)),
    };

    let mut empty = true;
    for entry in entries {
        let entry = entry.map_err(|e| FsError::new("read directory", dir, e))?;
        let path = entry.path();
        let is_dir = entry.file_type().is_ok_and(|t| t.is_dir());
        if !is_dir || !remove_empty_tree(&path)? {
            empty = false;
        }
    }

    if empty {
        fs::remove_dir(dir).map_err(|e| FsError::new("remove directory", dir, e))?;
    }
    Ok(empty)
}
