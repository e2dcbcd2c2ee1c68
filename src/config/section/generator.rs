//! `[generator]` section configuration.
//!
//! ```toml
//! [generator]
//! binary = "~/bin/hugo"        # Explicit path, skips discovery
//! install = true               # Download Hugo when it cannot be found
//! version = "0.139.0"          # Pin the installed version (default: latest)
//! install_dir = "~/.pressroom/bin"
//! ```

use crate::utils::path::expand_tilde;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub binary: Option<PathBuf>,
    pub install: bool,
    pub version: Option<String>,
    pub install_dir: Option<PathBuf>,
}

impl GeneratorConfig {
    /// Explicit binary path with `~` expanded.
    pub fn binary_path(&self) -> Option<PathBuf> {
        self.binary.as_deref().map(expand_tilde)
    }

    /// Where `install-generator` puts the binary.
    pub fn install_dir(&self) -> PathBuf {
        let dir = self
            .install_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("~/.pressroom/bin"));
        expand_tilde(&dir)
    }
}

#[cfg(test)]
mod tests {
    use crate::config::test_parse_options;
    use std::path::PathBuf;

    #[test]
    fn test_generator_defaults() {
        let options = test_parse_options("");
        assert!(options.generator.binary.is_none());
        assert!(!options.generator.install);
        assert!(options.generator.install_dir().ends_with(".pressroom/bin"));
    }

    #[test]
    fn test_generator_explicit() {
        let options = test_parse_options(
            "[generator]\nbinary = \"/opt/hugo/hugo\"\ninstall = true\nversion = \"0.139.0\"",
        );
        assert_eq!(
            options.generator.binary_path(),
            Some(PathBuf::from("/opt/hugo/hugo"))
        );
        assert!(options.generator.install);
        assert_eq!(options.generator.version.as_deref(), Some("0.139.0"));
    }
}
