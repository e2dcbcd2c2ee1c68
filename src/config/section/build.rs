//! `[build]` section configuration.
//!
//! ```toml
//! [build]
//! drafts = false          # Pass -D to non-local builds
//! future = false          # Pass -F to non-local builds
//! scratch_dir = "/tmp"    # Parent of scratch projects (default: system temp)
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub drafts: bool,
    pub future: bool,
    pub scratch_dir: Option<PathBuf>,
}
