//! Configuration: the tool's own `pressroom.toml` and the Hugo site config.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # [generator] [content] [serve] [theme] [build]
//! ├── dialect        # TOML / YAML detection
//! ├── edit           # ConfigFile: line-level site config mutation
//! ├── error          # ConfigError
//! ├── site           # SiteConfig: typed read-only site config view
//! ├── util           # URL and project-root helpers
//! └── mod.rs         # Options (this file)
//! ```
//!
//! `Options` is loaded once per process and threaded through every call.
//! `SiteConfig` is re-read on every build cycle, since the user (and theme
//! installs) edit it while the tool runs.

mod dialect;
mod edit;
mod error;
pub mod section;
mod site;
mod util;

pub use dialect::{Dialect, SITE_CONFIG_CANDIDATES, detect_site_config};
pub use edit::{ConfigFile, check_duplicates, list_literal, quoted, set_config_field};
pub use error::ConfigError;
pub use site::SiteConfig;

use section::{BuildConfig, ContentConfig, GeneratorConfig, ServeConfig, ThemeConfig};

use crate::{
    cli::{Cli, Commands},
    log,
    utils::path::normalize_path,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Tool options from `pressroom.toml` plus command-line overrides.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Project root (internal use only)
    #[serde(skip)]
    pub root: PathBuf,

    #[serde(default)]
    pub generator: GeneratorConfig,

    #[serde(default)]
    pub content: ContentConfig,

    #[serde(default)]
    pub serve: ServeConfig,

    #[serde(default)]
    pub theme: ThemeConfig,

    #[serde(default)]
    pub build: BuildConfig,
}

impl Options {
    /// Load options for the project containing the working directory.
    ///
    /// The root is `--root` when given, otherwise the nearest ancestor
    /// holding `pressroom.toml` or a site config, otherwise the cwd.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;
        let root = match &cli.root {
            Some(root) => normalize_path(root),
            None => util::find_project_root(&cwd, &cli.config).unwrap_or(cwd),
        };

        let options_path = if cli.config.is_absolute() {
            cli.config.clone()
        } else {
            root.join(&cli.config)
        };
        let mut options = if options_path.is_file() {
            Self::from_path(&options_path)?
        } else {
            Self::default()
        };

        options.root = root;
        options.apply_command_options(cli);
        Ok(options)
    }

    /// Defaults rooted at `root`.
    #[cfg(test)]
    pub fn for_root(root: &Path) -> Self {
        Self {
            root: root.to_path_buf(),
            ..Self::default()
        }
    }

    fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        let (options, ignored) = Self::parse_with_ignored(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }
        Ok(options)
    }

    /// Parse TOML, collecting the paths of unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), toml::de::Error> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let options = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((options, ignored))
    }

    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warn"; "unknown fields in {}, ignoring: {}", display_path, fields.join(", "));
    }

    fn apply_command_options(&mut self, cli: &Cli) {
        if let Some(hugo) = &cli.hugo {
            self.generator.binary = Some(hugo.clone());
        }

        match &cli.command {
            Commands::Build {
                drafts,
                future,
                theme,
                ..
            } => {
                Self::update_option(&mut self.build.drafts, drafts.as_ref());
                Self::update_option(&mut self.build.future, future.as_ref());
                if theme.is_some() {
                    self.theme.name.clone_from(theme);
                }
            }
            Commands::Serve {
                host, port, watch, ..
            } => {
                Self::update_option(&mut self.serve.host, host.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
                Self::update_option(&mut self.serve.watch, watch.as_ref());
            }
            Commands::InstallHugo { version } => {
                if version.is_some() {
                    self.generator.version.clone_from(version);
                }
            }
            Commands::InstallTheme { host, .. } | Commands::NewSite { theme_host: host, .. } => {
                Self::update_option(&mut self.theme.host, host.as_ref());
            }
            _ => {}
        }
    }

    /// Update config option if CLI value is provided
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    pub fn root_join(&self, path: impl AsRef<Path>) -> PathBuf {
        self.root.join(path)
    }

    /// Load the site config for this project.
    pub fn site(&self) -> Result<SiteConfig, ConfigError> {
        SiteConfig::load(&self.root)
    }
}

/// Parse options from a TOML string (tests only).
#[cfg(test)]
pub fn test_parse_options(content: &str) -> Options {
    Options::parse_with_ignored(content)
        .map(|(options, _)| options)
        .unwrap()
}
