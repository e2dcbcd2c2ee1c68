use crate::compiler::CompileError;
use crate::config::ConfigError;
use crate::generator::GeneratorError;
use crate::utils::fs::FsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BuildError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Compile(#[from] CompileError),

    #[error(transparent)]
    Generator(#[from] GeneratorError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("failed to watch {}", path.display())]
    Watch {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },

    #[error("file watcher disconnected")]
    WatcherGone,

    #[error("hugo succeeded but {} does not exist", .0.display())]
    MissingOutput(PathBuf),

    #[error("build cancelled")]
    Cancelled,
}

impl BuildError {
    /// A cycle that stopped because shutdown was requested.
    pub const fn is_cancelled(&self) -> bool {
        matches!(
            self,
            Self::Cancelled | Self::Generator(GeneratorError::Cancelled)
        )
    }
}
