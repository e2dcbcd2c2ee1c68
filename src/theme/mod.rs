//! Hugo themes: references and installation.
//!
//! A theme is referenced as `owner/repo[@ref]` (an archive on a
//! GitHub-style host), a direct `.zip` URL, or a local `.zip` file. Once
//! installed it is a plain directory under the site's themes dir; the site
//! config only holds its name.

mod install;

pub use install::{InstallOptions, install_from_archive, install_theme};

use crate::config::ConfigError;
use crate::utils::archive::ArchiveError;
use crate::utils::fs::FsError;
use regex::Regex;
use std::fmt;
use std::path::PathBuf;
use std::sync::OnceLock;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("invalid theme reference `{0}`; expected `owner/repo[@ref]` or a .zip URL")]
    Malformed(String),

    #[error("theme directory {} already exists (use --force to replace it)", .0.display())]
    AlreadyExists(PathBuf),

    #[error("theme archive {} is empty", .0.display())]
    EmptyArchive(PathBuf),

    #[error(transparent)]
    Archive(#[from] ArchiveError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Fs(#[from] FsError),
}

/// Default branch of `owner/repo` references.
const DEFAULT_REF: &str = "master";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ThemeReference {
    Repo {
        owner: String,
        repo: String,
        reference: Option<String>,
    },
    Url(String),
    Local(PathBuf),
}

impl ThemeReference {
    pub fn parse(raw: &str) -> Result<Self, ThemeError> {
        let raw = raw.trim();
        let malformed = || ThemeError::Malformed(raw.to_string());

        if raw.starts_with("http://") || raw.starts_with("https://") {
            let url = url::Url::parse(raw).map_err(|_| malformed())?;
            if !url.path().to_ascii_lowercase().ends_with(".zip") {
                return Err(malformed());
            }
            return Ok(Self::Url(raw.to_string()));
        }
        if raw.to_ascii_lowercase().ends_with(".zip") {
            return Ok(Self::Local(PathBuf::from(raw)));
        }

        let (path, reference) = match raw.split_once('@') {
            Some((path, r)) if !r.is_empty() => (path, Some(r.to_string())),
            Some(_) => return Err(malformed()),
            None => (raw, None),
        };
        let (owner, repo) = path.split_once('/').ok_or_else(malformed)?;
        let repo = repo.strip_suffix(".git").unwrap_or(repo);
        if !is_name(owner) || !is_name(repo) {
            return Err(malformed());
        }
        Ok(Self::Repo {
            owner: owner.to_string(),
            repo: repo.to_string(),
            reference,
        })
    }

    /// Branch, tag or commit of a repo reference (`master` when omitted).
    pub fn git_ref(&self) -> Option<&str> {
        match self {
            Self::Repo { reference, .. } => Some(reference.as_deref().unwrap_or(DEFAULT_REF)),
            _ => None,
        }
    }

    /// Where the archive is downloaded from; `None` for local archives.
    pub fn archive_url(&self, host: &str) -> Option<String> {
        match self {
            Self::Repo { owner, repo, .. } => Some(format!(
                "https://{}/{owner}/{repo}/archive/{}.zip",
                host.trim_end_matches('/'),
                self.git_ref().unwrap_or(DEFAULT_REF)
            )),
            Self::Url(url) => Some(url.clone()),
            Self::Local(_) => None,
        }
    }

    /// Directory name of the installed theme.
    pub fn name(&self) -> String {
        match self {
            Self::Repo { repo, .. } => repo.clone(),
            Self::Url(url) => {
                let url = url::Url::parse(url).ok();
                let segments: Vec<String> = url
                    .as_ref()
                    .and_then(|u| u.path_segments())
                    .map(|s| s.filter(|p| !p.is_empty()).map(String::from).collect())
                    .unwrap_or_default();
                // https://host/owner/repo/archive/<ref>.zip
                if let [.., repo, archive, _] = segments.as_slice()
                    && archive == "archive"
                {
                    return repo.clone();
                }
                let file = segments.last().map_or("theme", String::as_str);
                normalize_dir_name(strip_zip(file), None)
            }
            Self::Local(path) => {
                let file = path.file_name().and_then(|n| n.to_str()).unwrap_or("theme");
                normalize_dir_name(strip_zip(file), None)
            }
        }
    }
}

impl fmt::Display for ThemeReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Repo {
                owner,
                repo,
                reference: Some(r),
            } => write!(f, "{owner}/{repo}@{r}"),
            Self::Repo { owner, repo, .. } => write!(f, "{owner}/{repo}"),
            Self::Url(url) => f.write_str(url),
            Self::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

fn is_name(s: &str) -> bool {
    !s.is_empty()
        && !s.starts_with('.')
        && s
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

fn strip_zip(file: &str) -> &str {
    let len = file.len();
    if len > 4 && file[len - 4..].eq_ignore_ascii_case(".zip") {
        &file[..len - 4]
    } else {
        file
    }
}

fn ref_suffix_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"-(?:master|main|[0-9a-f]{7,40})$").expect("valid ref suffix pattern")
    })
}

/// Strip the branch or commit suffix archive hosts append to the top-level
/// directory: `hugo-lithium-master` becomes `hugo-lithium`.
pub fn normalize_dir_name(dir: &str, reference: Option<&str>) -> String {
    if let Some(r) = reference
        && let Some(stripped) = dir.strip_suffix(&format!("-{}", r.replace('/', "-")))
        && !stripped.is_empty()
    {
        return stripped.to_string();
    }
    let stripped = ref_suffix_re().replace(dir, "");
    if stripped.is_empty() {
        dir.to_string()
    } else {
        stripped.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_with_commit() {
        let theme = ThemeReference::parse("owner/repo@abc123def456").unwrap();
        assert_eq!(theme.name(), "repo");
        assert_eq!(theme.git_ref(), Some("abc123def456"));
        assert_eq!(
            theme.archive_url("github.com").as_deref(),
            Some("https://github.com/owner/repo/archive/abc123def456.zip")
        );
        assert_eq!(normalize_dir_name("repo-abc123def456", Some("abc123def456")), "repo");
    }

    #[test]
    fn test_repo_defaults_to_master() {
        let theme = ThemeReference::parse("yihui/hugo-lithium").unwrap();
        assert_eq!(theme.git_ref(), Some("master"));
        assert_eq!(theme.name(), "hugo-lithium");
        assert_eq!(
            theme.archive_url("gitlab.com/").as_deref(),
            Some("https://gitlab.com/yihui/hugo-lithium/archive/master.zip")
        );
        assert_eq!(theme.to_string(), "yihui/hugo-lithium");
    }

    #[test]
    fn test_zip_urls() {
        let theme =
            ThemeReference::parse("https://github.com/owner/pretty/archive/v1.2.zip").unwrap();
        assert_eq!(theme.name(), "pretty");

        let theme = ThemeReference::parse("https://example.org/dl/my-theme-main.zip").unwrap();
        assert_eq!(theme.name(), "my-theme");
        assert!(theme.git_ref().is_none());

        let theme = ThemeReference::parse("./themes/local-theme.ZIP").unwrap();
        assert_eq!(theme, ThemeReference::Local(PathBuf::from("./themes/local-theme.ZIP")));
        assert_eq!(theme.name(), "local-theme");
        assert!(theme.archive_url("github.com").is_none());
    }

    #[test]
    fn test_malformed() {
        for raw in ["", "repo", "owner/", "/repo", "owner/repo@", "a/b/c", "https://x.org/theme"] {
            assert!(
                matches!(ThemeReference::parse(raw), Err(ThemeError::Malformed(_))),
                "{raw}"
            );
        }
    }

    #[test]
    fn test_normalize_dir_name() {
        assert_eq!(normalize_dir_name("hugo-lithium-master", None), "hugo-lithium");
        assert_eq!(normalize_dir_name("theme-1a2b3c4", None), "theme");
        assert_eq!(normalize_dir_name("theme-v1.2", Some("v1.2")), "theme");
        assert_eq!(normalize_dir_name("plain", None), "plain");
        assert_eq!(normalize_dir_name("master", None), "master");
    }
}
