//! Config and front-matter dialects.

use super::ConfigError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Site config file names in detection order.
pub const SITE_CONFIG_CANDIDATES: [&str; 6] = [
    "hugo.toml",
    "hugo.yaml",
    "hugo.yml",
    "config.toml",
    "config.yaml",
    "config.yml",
];

/// Serialization dialect of a config file or metadata block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, clap::ValueEnum)]
pub enum Dialect {
    Toml,
    Yaml,
    Json,
}

impl Dialect {
    /// Dialect from a file extension (case-insensitive).
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "toml" => Some(Self::Toml),
            "yaml" | "yml" => Some(Self::Yaml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }

    /// Suffix for `hugo convert to<NAME>`.
    pub const fn convert_target(self) -> &'static str {
        match self {
            Self::Toml => "toTOML",
            Self::Yaml => "toYAML",
            Self::Json => "toJSON",
        }
    }

    /// Value of `hugo new site -f <format>`.
    pub const fn format_name(self) -> &'static str {
        match self {
            Self::Toml => "toml",
            Self::Yaml => "yaml",
            Self::Json => "json",
        }
    }

    /// Key/value separator for top-level assignments.
    pub const fn assign(self) -> &'static str {
        match self {
            Self::Toml => " = ",
            Self::Yaml | Self::Json => ": ",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.format_name())
    }
}

/// Find the site config in `root`: first existing candidate wins.
pub fn detect_site_config(root: &Path) -> Result<(PathBuf, Dialect), ConfigError> {
    for name in SITE_CONFIG_CANDIDATES {
        let path = root.join(name);
        if path.is_file() {
            let dialect =
                Dialect::from_path(&path).ok_or_else(|| ConfigError::UnknownDialect(path.clone()))?;
            return Ok((path, dialect));
        }
    }
    Err(ConfigError::NotFound(root.to_path_buf()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_from_path() {
        assert_eq!(Dialect::from_path(Path::new("a.TOML")), Some(Dialect::Toml));
        assert_eq!(Dialect::from_path(Path::new("a.yml")), Some(Dialect::Yaml));
        assert_eq!(Dialect::from_path(Path::new("a.json")), Some(Dialect::Json));
        assert_eq!(Dialect::from_path(Path::new("a.ini")), None);
        assert_eq!(Dialect::from_path(Path::new("noext")), None);
    }

    #[test]
    fn test_detect_order() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("config.toml"), "").unwrap();
        fs::write(dir.path().join("hugo.yaml"), "").unwrap();

        let (path, dialect) = detect_site_config(dir.path()).unwrap();
        assert_eq!(path.file_name().unwrap(), "hugo.yaml");
        assert_eq!(dialect, Dialect::Yaml);
    }

    #[test]
    fn test_detect_missing() {
        let dir = TempDir::new().unwrap();
        let err = detect_site_config(dir.path()).unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }
}
