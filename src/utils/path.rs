//! Path helpers shared by config loading, watching and compilation.

use std::borrow::Cow;
use std::path::{Path, PathBuf};

/// Absolute form of `path`: canonical when it exists, otherwise joined
/// onto the working directory.
pub fn normalize_path(path: &Path) -> PathBuf {
    if let Ok(canonical) = path.canonicalize() {
        return canonical;
    }
    if path.is_absolute() {
        return path.to_path_buf();
    }
    std::env::current_dir().map_or_else(|_| path.to_path_buf(), |cwd| cwd.join(path))
}

/// Expand a leading `~` in a user-supplied path.
pub fn expand_tilde(path: &Path) -> PathBuf {
    match shellexpand::tilde(&path.to_string_lossy()) {
        Cow::Borrowed(_) => path.to_path_buf(),
        Cow::Owned(expanded) => PathBuf::from(expanded),
    }
}

/// `/`-joined components, so fingerprint keys match across platforms.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<_> = path.components().map(|c| c.as_os_str().to_string_lossy()).collect();
    parts.join("/")
}
