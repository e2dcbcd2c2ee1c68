//! Finding the Hugo binary.

use crate::config::Options;
use crate::utils::path::expand_tilde;
use std::path::{Path, PathBuf};

/// Platform file name of the binary.
pub const fn exe_name() -> &'static str {
    if cfg!(windows) { "hugo.exe" } else { "hugo" }
}

/// Install locations checked after `PATH`, in order.
pub fn known_locations(options: &Options) -> Vec<PathBuf> {
    let mut dirs = vec![
        options.generator.install_dir(),
        expand_tilde(Path::new("~/bin")),
        expand_tilde(Path::new("~/.local/bin")),
    ];
    if cfg!(unix) {
        dirs.push(PathBuf::from("/usr/local/bin"));
        dirs.push(PathBuf::from("/opt/homebrew/bin"));
    }
    dirs.into_iter().map(|dir| dir.join(exe_name())).collect()
}

/// Search for the binary: explicit `[generator] binary`, then `PATH`, then
/// [`known_locations`].
///
/// On failure returns every location that was searched.
pub fn locate(options: &Options) -> Result<PathBuf, Vec<PathBuf>> {
    let mut searched = Vec::new();

    if let Some(explicit) = options.generator.binary_path() {
        if explicit.is_file() {
            return Ok(explicit);
        }
        searched.push(explicit);
    }

    match which::which(exe_name()) {
        Ok(found) => return Ok(found),
        Err(_) => searched.push(PathBuf::from(format!("{} (PATH)", exe_name()))),
    }

    for candidate in known_locations(options) {
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    Err(searched)
}
