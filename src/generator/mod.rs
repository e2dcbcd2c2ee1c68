//! External generator (Hugo) adapter.
//!
//! - `locate`: binary discovery (explicit, `PATH`, known dirs)
//! - `install`: GitHub release download
//! - `args`: typed argument construction
//! - `version`: `hugo version` parsing
//!
//! Every invocation is one blocking call: spawn, wait, capture. The
//! cancellation token is consulted before spawning only; a running child is
//! never killed from here.

mod args;
mod error;
mod install;
mod locate;
mod version;

pub use args::{ArgsError, GeneratorArgs};
pub use error::GeneratorError;
pub use install::install;
pub use locate::locate;
pub use version::Version;

use version::parse_version_output;

use crate::config::Options;
use crate::core::{CancelToken, shutdown_token};
use crate::utils::exec::{Cmd, output_text};
use crate::{debug, log};
use std::path::{Path, PathBuf};
use std::process::Child;
use std::sync::OnceLock;

/// Binary resolved by [`Generator::discover`], once per process.
static DISCOVERED: OnceLock<PathBuf> = OnceLock::new();

/// Exit status and captured output of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcessResult {
    /// `None` when the process was killed by a signal.
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl ProcessResult {
    pub const fn success(&self) -> bool {
        matches!(self.exit_code, Some(0))
    }

    /// stderr followed by stdout, as the user would have seen them.
    pub fn combined_output(&self) -> String {
        let mut out = self.stderr.clone();
        if !self.stdout.is_empty() {
            if !out.is_empty() && !out.ends_with('\n') {
                out.push('\n');
            }
            out.push_str(&self.stdout);
        }
        out
    }
}

#[derive(Debug, Clone)]
pub struct Generator {
    binary: PathBuf,
    cancel: CancelToken,
}

impl Generator {
    /// Use a specific binary, bypassing discovery.
    pub fn with_binary(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            cancel: shutdown_token(),
        }
    }

    #[cfg(test)]
    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Find the binary (cached for the process), installing it when
    /// `[generator] install` allows.
    pub fn discover(options: &Options) -> Result<Self, GeneratorError> {
        // An explicit binary is cheap to check and may differ per project.
        if let Some(explicit) = options.generator.binary_path()
            && explicit.is_file()
        {
            return Ok(Self::with_binary(explicit));
        }
        if let Some(binary) = DISCOVERED.get() {
            return Ok(Self::with_binary(binary.clone()));
        }

        let binary = match locate(options) {
            Ok(binary) => binary,
            Err(searched) if options.generator.install => {
                debug!("hugo"; "not found in {} locations, installing", searched.len());
                install(options)?
            }
            Err(searched) => return Err(GeneratorError::NotFound { searched }),
        };

        debug!("hugo"; "using {}", binary.display());
        let binary = DISCOVERED.get_or_init(|| binary).clone();
        Ok(Self::with_binary(binary))
    }

    pub fn binary(&self) -> &Path {
        &self.binary
    }

    fn command(&self, args: &GeneratorArgs, cwd: &Path) -> Result<(Cmd, String), GeneratorError> {
        args.validate()?;
        if self.cancel.is_cancelled() {
            return Err(GeneratorError::Cancelled);
        }
        let display = args.display(&self.binary.to_string_lossy());
        debug!("hugo"; "{}", display);
        let cmd = Cmd::new(&self.binary).args(args.to_os_args()).cwd(cwd);
        Ok((cmd, display))
    }

    /// Run to completion and capture the result, whatever the exit status.
    pub fn invoke(&self, args: &GeneratorArgs, cwd: &Path) -> Result<ProcessResult, GeneratorError> {
        let (cmd, display) = self.command(args, cwd)?;
        let output = cmd.capture().map_err(|source| GeneratorError::Spawn {
            command: display,
            source,
        })?;
        Ok(ProcessResult {
            exit_code: output.status.code(),
            stdout: output_text(&output.stdout),
            stderr: output_text(&output.stderr),
        })
    }

    /// Like [`invoke`](Self::invoke), but a non-zero exit is an error
    /// carrying the captured output.
    pub fn run(&self, args: &GeneratorArgs, cwd: &Path) -> Result<ProcessResult, GeneratorError> {
        let result = self.invoke(args, cwd)?;
        if result.success() {
            Ok(result)
        } else {
            Err(GeneratorError::Exec {
                command: args.display(&self.binary.to_string_lossy()),
                code: result.exit_code,
                output: result.combined_output(),
            })
        }
    }

    /// Start a long-running child (the preview server) with inherited stdio.
    pub fn spawn(&self, args: &GeneratorArgs, cwd: &Path) -> Result<Child, GeneratorError> {
        let (cmd, display) = self.command(args, cwd)?;
        log!("hugo"; "{}", display);
        cmd.spawn().map_err(|source| GeneratorError::Spawn {
            command: display,
            source,
        })
    }

    /// Installed version, or `None` (with a logged warning) when the output
    /// has no recognizable version.
    pub fn version(&self, cwd: &Path) -> Result<Option<Version>, GeneratorError> {
        let result = self.run(&GeneratorArgs::for_version(), cwd)?;
        let version = parse_version_output(&result.stdout);
        if version.is_none() {
            log!("warn"; "cannot read hugo version from output:\n{}", result.combined_output().trim());
        }
        Ok(version)
    }
}
