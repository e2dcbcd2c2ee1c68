//! External command execution.
//!
//! A small builder over [`std::process::Command`] with three ways to run:
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Capture output regardless of exit status
//! let output = Cmd::new("hugo").arg("version").cwd(root).capture()?;
//!
//! // Long-running child (e.g. a preview server)
//! let child = Cmd::new("hugo").args(["server", "-p", "4321"]).spawn()?;
//!
//! // Interactive program attached to the terminal
//! Cmd::from_slice(&["code", "--wait"]).arg(path).status()?;
//! ```

use regex::Regex;
use std::{
    borrow::Cow,
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Child, Command, ExitStatus, Output, Stdio},
    sync::OnceLock,
};

/// Command builder for external process execution.
#[derive(Debug, Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Create from a command array (e.g., `["code"]` or `["code", "--wait"]`).
    pub fn from_slice<S: AsRef<OsStr>>(cmd: &[S]) -> Self {
        let mut iter = cmd.iter();
        let program = iter
            .next()
            .map(|s| s.as_ref().to_owned())
            .unwrap_or_default();
        let args: Vec<_> = iter.map(|s| s.as_ref().to_owned()).collect();
        Self {
            program,
            args,
            ..Default::default()
        }
    }

    /// Add a single argument. Empty arguments are dropped.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        let arg = arg.as_ref();
        if !arg.is_empty() {
            self.args.push(arg.to_owned());
        }
        self
    }

    /// Add multiple arguments. Empty arguments are dropped.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            let arg = arg.as_ref();
            if !arg.is_empty() {
                self.args.push(arg.to_owned());
            }
        }
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Execute the command and return its output whatever the exit status.
    ///
    /// Only spawn failures are errors; interpreting the status is left to
    /// the caller.
    pub fn capture(self) -> std::io::Result<Output> {
        self.command().stdin(Stdio::null()).output()
    }

    /// Spawn the command with inherited stdout/stderr and return the child.
    pub fn spawn(self) -> std::io::Result<Child> {
        self.command().stdin(Stdio::null()).spawn()
    }

    /// Run attached to the terminal (e.g. an editor) and wait for it.
    pub fn status(self) -> std::io::Result<ExitStatus> {
        self.command().status()
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }
        cmd
    }
}

/// Captured output as text, lossily decoded and without ANSI colors.
pub fn output_text(bytes: &[u8]) -> String {
    strip_ansi(&String::from_utf8_lossy(bytes)).into_owned()
}

/// Strip ANSI escape codes from string.
pub fn strip_ansi(s: &str) -> Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").expect("valid ANSI pattern"));
    re.replace_all(s, "")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cmd_builder() {
        let cmd = Cmd::new("hugo")
            .arg("new")
            .args(["site", "blog"])
            .cwd("/tmp");

        assert_eq!(cmd.program, OsString::from("hugo"));
        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/tmp")));
    }

    #[test]
    fn test_from_slice() {
        let cmd = Cmd::from_slice(&["code", "--wait"]);
        assert_eq!(cmd.program, OsString::from("code"));
        assert_eq!(cmd.args, vec![OsString::from("--wait")]);
    }

    #[test]
    fn test_empty_args_filtered() {
        let cmd = Cmd::new("hugo").arg("").args(["-D", "", "-F"]);
        assert_eq!(cmd.args.len(), 2);
    }

    #[test]
    fn test_output_text() {
        assert_eq!(strip_ansi("\x1b[31mRed\x1b[0m"), "Red");
        assert_eq!(output_text(b"\x1b[1mERROR\x1b[0m build failed\xff"), "ERROR build failed\u{fffd}");
    }

    #[cfg(unix)]
    #[test]
    fn test_capture_keeps_failed_output() {
        let output = Cmd::new("sh")
            .args(["-c", "echo oops; exit 3"])
            .capture()
            .unwrap();
        assert_eq!(output.status.code(), Some(3));
        assert_eq!(output_text(&output.stdout).trim(), "oops");
    }

    #[cfg(unix)]
    #[test]
    fn test_status_waits() {
        let status = Cmd::from_slice(&["sh", "-c"]).arg("exit 4").status().unwrap();
        assert_eq!(status.code(), Some(4));
    }
}
