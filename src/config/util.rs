//! Project root discovery and `baseURL` helpers.

use super::dialect::SITE_CONFIG_CANDIDATES;
use std::path::{Path, PathBuf};

/// Path component of an absolute `baseURL`, without surrounding slashes.
///
/// `None` for anything `url` cannot parse as absolute (`/blog/`, `blog`).
pub fn base_url_path(base_url: &str) -> Option<String> {
    let url = url::Url::parse(base_url).ok()?;
    Some(url.path().trim_matches('/').to_owned())
}

/// Nearest ancestor of `start` (itself included) holding `options_name`
/// or a site config file.
pub fn find_project_root(start: &Path, options_name: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| {
            dir.join(options_name).is_file()
                || SITE_CONFIG_CANDIDATES.iter().any(|name| dir.join(name).is_file())
        })
        .map(Path::to_path_buf)
}
