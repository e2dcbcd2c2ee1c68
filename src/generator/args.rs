//! Typed argument lists for Hugo invocations.
//!
//! Arguments are built declaratively, validated, and handed to the process
//! as a vector (no shell). [`GeneratorArgs::display`] gives a shell-quoted
//! form for logs and error messages.

use crate::config::{Dialect, Options, SiteConfig};
use std::ffi::OsString;
use std::fmt;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArgsError {
    #[error("empty value for `{0}`")]
    EmptyValue(String),

    #[error("NUL byte in argument `{0}`")]
    NulByte(String),

    #[error("flag `{0}` given more than once")]
    DuplicateFlag(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Arg {
    Subcommand(String),
    Switch(String),
    Value(String, String),
    Positional(String),
}

impl Arg {
    fn flag(&self) -> Option<&str> {
        match self {
            Self::Switch(flag) | Self::Value(flag, _) => Some(flag),
            _ => None,
        }
    }

    fn push_into(&self, out: &mut Vec<String>) {
        match self {
            Self::Subcommand(s) | Self::Switch(s) | Self::Positional(s) => out.push(s.clone()),
            Self::Value(flag, value) => {
                out.push(flag.clone());
                out.push(value.clone());
            }
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeneratorArgs {
    items: Vec<Arg>,
}

impl GeneratorArgs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subcommand(mut self, name: impl Into<String>) -> Self {
        self.items.push(Arg::Subcommand(name.into()));
        self
    }

    pub fn switch(mut self, flag: impl Into<String>) -> Self {
        self.items.push(Arg::Switch(flag.into()));
        self
    }

    pub fn switch_if(self, on: bool, flag: impl Into<String>) -> Self {
        if on { self.switch(flag) } else { self }
    }

    pub fn value(mut self, flag: impl Into<String>, value: impl Into<String>) -> Self {
        self.items.push(Arg::Value(flag.into(), value.into()));
        self
    }

    pub fn value_opt(self, flag: impl Into<String>, value: Option<impl Into<String>>) -> Self {
        match value {
            Some(value) => self.value(flag, value),
            None => self,
        }
    }

    pub fn positional(mut self, value: impl Into<String>) -> Self {
        self.items.push(Arg::Positional(value.into()));
        self
    }

    /// Append raw user flags (e.g. `[serve] flags`).
    ///
    /// `--flag value` pairs are kept apart from switches by the leading
    /// dash of the next token.
    pub fn passthrough<S: AsRef<str>>(mut self, raw: &[S]) -> Self {
        let mut iter = raw.iter().map(AsRef::as_ref).peekable();
        while let Some(token) = iter.next() {
            if token.starts_with('-') {
                if let Some((flag, value)) = token.split_once('=') {
                    self.items.push(Arg::Value(flag.into(), value.into()));
                } else if let Some(next) = iter.next_if(|n| !n.starts_with('-')) {
                    self.items.push(Arg::Value(token.into(), next.into()));
                } else {
                    self.items.push(Arg::Switch(token.into()));
                }
            } else {
                self.items.push(Arg::Positional(token.into()));
            }
        }
        self
    }

    /// Check for empty values, NUL bytes and repeated flags.
    pub fn validate(&self) -> Result<(), ArgsError> {
        let mut seen: Vec<&str> = Vec::new();
        for item in &self.items {
            let mut tokens = Vec::new();
            item.push_into(&mut tokens);
            for token in &tokens {
                if token.contains('\0') {
                    return Err(ArgsError::NulByte(token.replace('\0', "\\0")));
                }
            }
            match item {
                Arg::Value(flag, value) if value.is_empty() => {
                    return Err(ArgsError::EmptyValue(flag.clone()));
                }
                Arg::Subcommand(s) | Arg::Switch(s) | Arg::Positional(s) if s.is_empty() => {
                    return Err(ArgsError::EmptyValue(String::new()));
                }
                _ => {}
            }
            if let Some(flag) = item.flag() {
                if seen.contains(&flag) {
                    return Err(ArgsError::DuplicateFlag(flag.to_string()));
                }
                seen.push(flag);
            }
        }
        Ok(())
    }

    pub fn to_vec(&self) -> Vec<String> {
        let mut out = Vec::with_capacity(self.items.len() * 2);
        for item in &self.items {
            item.push_into(&mut out);
        }
        out
    }

    pub fn to_os_args(&self) -> Vec<OsString> {
        self.to_vec().into_iter().map(OsString::from).collect()
    }

    #[cfg(test)]
    pub fn has_flag(&self, flag: &str) -> bool {
        self.items.iter().any(|item| item.flag() == Some(flag))
    }

    /// Shell-quoted rendering, prefixed by `program`.
    pub fn display(&self, program: &str) -> String {
        std::iter::once(program.to_string())
            .chain(self.to_vec().iter().map(|s| shell_quote(s)))
            .collect::<Vec<_>>()
            .join(" ")
    }

    // ------------------------------------------------------------------------
    // Invocations
    // ------------------------------------------------------------------------

    /// Bare site build. With `local`, the site is rooted at its base path
    /// (`-b <site base dir> -D -F`) for this invocation only.
    pub fn for_build(site: &SiteConfig, options: &Options, local: bool) -> Self {
        Self::new()
            .value("-d", site.publish_dir())
            .value_opt("-t", resolve_theme(site, options))
            .value_opt("--themesDir", custom_themes_dir(site))
            .value_opt("-b", local.then(|| site.site_base_dir()))
            .switch_if(local || options.build.drafts, "-D")
            .switch_if(local || options.build.future, "-F")
    }

    /// `hugo server` with passthrough flags from `[serve] flags`.
    pub fn for_server(site: &SiteConfig, options: &Options, theme: Option<String>) -> Self {
        let theme = theme.or_else(|| resolve_theme(site, options));
        Self::new()
            .subcommand("server")
            .value("--bind", options.serve.host.to_string())
            .value("-p", options.serve.port.to_string())
            .value_opt("-t", theme)
            .value_opt("--themesDir", custom_themes_dir(site))
            .passthrough(&options.serve.flags)
    }

    /// `hugo convert to<DIALECT> [--unsafe]`.
    pub fn for_convert(dialect: Dialect, unsafe_: bool) -> Self {
        Self::new()
            .subcommand("convert")
            .subcommand(dialect.convert_target())
            .switch_if(unsafe_, "--unsafe")
    }

    /// `hugo new site <dir> --force -f <format>`.
    pub fn for_new_site(dir: &Path, format: Dialect) -> Self {
        Self::new()
            .subcommand("new")
            .subcommand("site")
            .positional(dir.to_string_lossy())
            .switch("--force")
            .value("-f", format.format_name())
    }

    /// `hugo new <path> [-k kind]`.
    pub fn for_new_content(path: &str, kind: Option<&str>) -> Self {
        Self::new()
            .subcommand("new")
            .positional(path)
            .value_opt("-k", kind.filter(|k| !k.is_empty()))
    }

    pub fn for_version() -> Self {
        Self::new().subcommand("version")
    }
}

impl fmt::Display for GeneratorArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let quoted: Vec<_> = self.to_vec().iter().map(|s| shell_quote(s)).collect();
        f.write_str(&quoted.join(" "))
    }
}

/// Theme precedence: `[theme] name` > site `theme` > first dir in themes dir.
pub fn resolve_theme(site: &SiteConfig, options: &Options) -> Option<String> {
    options
        .theme
        .name
        .clone()
        .or_else(|| site.theme())
        .or_else(|| first_theme_dir(&site.themes_root()))
}

fn first_theme_dir(themes_root: &Path) -> Option<String> {
    let mut dirs: Vec<String> = std::fs::read_dir(themes_root)
        .ok()?
        .filter_map(Result::ok)
        .filter(|e| e.file_type().is_ok_and(|t| t.is_dir()))
        .filter_map(|e| e.file_name().into_string().ok())
        .filter(|name| !name.starts_with('.'))
        .collect();
    dirs.sort();
    dirs.into_iter().next()
}

fn custom_themes_dir(site: &SiteConfig) -> Option<String> {
    let dir = site.themes_dir();
    (dir != "themes").then(|| dir.to_string())
}

/// Quote for POSIX shells when needed.
pub fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"-_./=:,@+%".contains(&b));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', r"'\''"))
    }
}
