//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no site config (hugo.toml, hugo.yaml, config.toml, ...) in `{0}`")]
    NotFound(PathBuf),

    #[error("IO error when accessing `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse TOML in `{0}`")]
    Toml(PathBuf, #[source] toml::de::Error),

    #[error("failed to parse YAML in `{0}`")]
    Yaml(PathBuf, #[source] serde_yaml_ng::Error),

    #[error("duplicate key `{key}` in `{}`: remove all but one definition", file.display())]
    DuplicateKey { file: PathBuf, key: String },

    #[error("unknown config dialect for `{0}` (expected .toml, .yaml or .yml)")]
    UnknownDialect(PathBuf),
}
