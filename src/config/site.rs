//! Read-only view of the Hugo site config.
//!
//! Loaded fresh for every build cycle. Lookups are case-insensitive on the
//! top-level key, like Hugo's own.

use super::dialect::{Dialect, detect_site_config};
use super::edit::check_duplicates;
use super::error::ConfigError;
use super::util::base_url_path;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct SiteConfig {
    root: PathBuf,
    path: PathBuf,
    values: Map<String, Value>,
}

impl SiteConfig {
    /// Detect, read and parse the site config in `root`.
    pub fn load(root: &Path) -> Result<Self, ConfigError> {
        let (path, dialect) = detect_site_config(root)?;
        let content =
            std::fs::read_to_string(&path).map_err(|e| ConfigError::Io(path.clone(), e))?;
        Self::parse(root, &path, dialect, &content)
    }

    pub fn parse(
        root: &Path,
        path: &Path,
        dialect: Dialect,
        content: &str,
    ) -> Result<Self, ConfigError> {
        check_duplicates(content, dialect, path)?;

        let value: Value = match dialect {
            Dialect::Toml => {
                toml::from_str(content).map_err(|e| ConfigError::Toml(path.to_path_buf(), e))?
            }
            Dialect::Yaml => {
                if content.trim().is_empty() {
                    Value::Null
                } else {
                    serde_yaml_ng::from_str(content)
                        .map_err(|e| ConfigError::Yaml(path.to_path_buf(), e))?
                }
            }
            Dialect::Json => return Err(ConfigError::UnknownDialect(path.to_path_buf())),
        };

        let values = match value {
            Value::Object(map) => map,
            _ => Map::new(),
        };

        Ok(Self {
            root: root.to_path_buf(),
            path: path.to_path_buf(),
            values,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Case-insensitive top-level lookup.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str).filter(|s| !s.is_empty())
    }

    /// `theme`: a string, or the first entry of a list.
    pub fn theme(&self) -> Option<String> {
        match self.get("theme")? {
            Value::String(s) if !s.is_empty() => Some(s.clone()),
            Value::Array(items) => items.first()?.as_str().map(String::from),
            _ => None,
        }
    }

    pub fn themes_dir(&self) -> &str {
        self.get_str("themesDir").unwrap_or("themes")
    }

    pub fn content_dir(&self) -> &str {
        self.get_str("contentDir").unwrap_or("content")
    }

    pub fn publish_dir(&self) -> &str {
        self.get_str("publishDir").unwrap_or("public")
    }

    pub fn base_url(&self) -> &str {
        self.get_str("baseURL").unwrap_or("/")
    }

    #[cfg(test)]
    pub fn ignore_files(&self) -> Vec<String> {
        match self.get("ignoreFiles") {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(Value::as_str)
                .map(String::from)
                .collect(),
            Some(Value::String(s)) => vec![s.clone()],
            _ => Vec::new(),
        }
    }

    /// `/` plus the path component of `baseURL`, with a trailing slash.
    ///
    /// `https://example.org/blog` gives `/blog/`; a bare host gives `/`.
    pub fn site_base_dir(&self) -> String {
        let base = self.base_url();
        let path = base_url_path(base).unwrap_or_else(|| base.trim_matches('/').to_string());
        if path.is_empty() {
            "/".to_string()
        } else {
            format!("/{path}/")
        }
    }

    pub fn content_root(&self) -> PathBuf {
        self.root.join(self.content_dir())
    }

    pub fn themes_root(&self) -> PathBuf {
        self.root.join(self.themes_dir())
    }

    pub fn publish_root(&self) -> PathBuf {
        self.root.join(self.publish_dir())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn parse(dialect: Dialect, content: &str) -> SiteConfig {
        let path = match dialect {
            Dialect::Toml => "config.toml",
            _ => "config.yaml",
        };
        SiteConfig::parse(Path::new("/site"), Path::new(path), dialect, content).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = parse(Dialect::Toml, "");
        assert_eq!(config.theme(), None);
        assert_eq!(config.themes_dir(), "themes");
        assert_eq!(config.content_dir(), "content");
        assert_eq!(config.publish_dir(), "public");
        assert_eq!(config.base_url(), "/");
        assert!(config.ignore_files().is_empty());
        assert_eq!(config.site_base_dir(), "/");
    }

    #[test]
    fn test_toml_accessors() {
        let config = parse(
            Dialect::Toml,
            "baseurl = \"https://example.org/blog\"\ntheme = [\"lithium\", \"base\"]\npublishDir = \"docs\"\nignoreFiles = [\"\\\\.Rmd$\"]\n",
        );
        assert_eq!(config.theme().as_deref(), Some("lithium"));
        assert_eq!(config.publish_dir(), "docs");
        assert_eq!(config.base_url(), "https://example.org/blog");
        assert_eq!(config.site_base_dir(), "/blog/");
        assert_eq!(config.ignore_files(), vec!["\\.Rmd$"]);
        assert_eq!(config.publish_root(), PathBuf::from("/site/docs"));
    }

    #[test]
    fn test_yaml_accessors() {
        let config = parse(
            Dialect::Yaml,
            "baseURL: https://example.org/\ntheme: ananke\ncontentDir: posts\n",
        );
        assert_eq!(config.theme().as_deref(), Some("ananke"));
        assert_eq!(config.content_dir(), "posts");
        assert_eq!(config.site_base_dir(), "/");
    }

    #[test]
    fn test_relative_base_url() {
        let config = parse(Dialect::Yaml, "baseURL: /docs/\n");
        assert_eq!(config.site_base_dir(), "/docs/");
    }

    #[test]
    fn test_duplicate_key_is_fatal() {
        let err = SiteConfig::parse(
            Path::new("/site"),
            Path::new("config.yaml"),
            Dialect::Yaml,
            "theme: a\ntheme: b\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateKey { key, .. } if key == "theme"));
    }

    #[test]
    fn test_parse_error() {
        let err = SiteConfig::parse(
            Path::new("/site"),
            Path::new("config.toml"),
            Dialect::Toml,
            "theme = ",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Toml(..)));
    }

    #[test]
    fn test_load_detects_dialect() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("hugo.yaml"), "title: Blog\n").unwrap();
        let config = SiteConfig::load(dir.path()).unwrap();
        assert_eq!(Dialect::from_path(config.path()).unwrap(), Dialect::Yaml);
        assert_eq!(config.get("TITLE").and_then(Value::as_str), Some("Blog"));
    }
}
