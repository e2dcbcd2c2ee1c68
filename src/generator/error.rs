use super::args::ArgsError;
use crate::utils::archive::ArchiveError;
use crate::utils::fs::FsError;
use std::fmt::Write as _;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeneratorError {
    #[error("hugo not found; searched:{}", list_paths(searched))]
    NotFound { searched: Vec<PathBuf> },

    #[error("`{command}` exited with {}\n{output}", describe_code(*code))]
    Exec {
        command: String,
        code: Option<i32>,
        output: String,
    },

    #[error("failed to start `{command}`")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid hugo arguments")]
    Args(#[from] ArgsError),

    #[error("failed to install hugo {version}")]
    Install {
        version: String,
        #[source]
        source: ArchiveError,
    },

    #[error("failed to resolve the latest hugo release: {0}")]
    Release(String),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("cancelled before starting hugo")]
    Cancelled,
}

fn list_paths(paths: &[PathBuf]) -> String {
    let mut out = String::new();
    for path in paths {
        let _ = write!(out, "\n  - {}", path.display());
    }
    out
}

fn describe_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "a signal".to_string(),
    }
}
