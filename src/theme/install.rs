//! Theme installation.
//!
//! Archives are unpacked into a scratch directory inside the themes dir and
//! moved into place with a single rename, so a failed install never leaves
//! a partial theme behind.

use super::{ThemeError, ThemeReference, normalize_dir_name};
use crate::config::{SiteConfig, quoted, set_config_field};
use crate::log;
use crate::utils::archive::{download, unzip};
use crate::utils::fs::{
    FsContext, copy_tree_no_clobber, create_dir_all, remove_empty_dir, remove_path, rename,
};
use std::fs;
use std::path::{Path, PathBuf};

/// Project files some theme authors commit along with the theme.
const PROJECT_FILES: &[&str] = &[".Rproj.user", ".idea", ".vscode"];

/// `exampleSite` subdirectories copied into the project.
const EXAMPLE_DIRS: &[&str] = &["content", "static", "data", "layouts", "assets", "i18n"];

#[derive(Debug, Clone, Default)]
pub struct InstallOptions {
    /// Replace an existing theme directory.
    pub force: bool,
    /// Copy the theme's `exampleSite` into the project.
    pub example_site: bool,
    /// Leave the site config's `theme` untouched.
    pub skip_config: bool,
}

/// Download (unless local) and install a theme. Returns the theme name.
pub fn install_theme(
    site: &SiteConfig,
    reference: &ThemeReference,
    host: &str,
    opts: &InstallOptions,
) -> Result<String, ThemeError> {
    let name = reference.name();
    check_target(site, &name, opts)?;

    if let ThemeReference::Local(path) = reference {
        let path = site.root().join(path);
        install_from_archive(site, &path, &name, None, opts)?;
        return Ok(name);
    }

    let Some(url) = reference.archive_url(host) else {
        return Err(ThemeError::Malformed(reference.to_string()));
    };
    log!("theme"; "downloading {}", url);

    with_themes_root(site, |themes| {
        let download_dir = scratch_dir(themes)?;
        let archive = download_dir.path().join("theme.zip");
        download(&url, &archive)?;
        unpack(site, themes, &archive, &name, reference.git_ref(), opts)
    })?;
    Ok(name)
}

/// Install a theme from a zip archive already on disk.
pub fn install_from_archive(
    site: &SiteConfig,
    archive: &Path,
    name: &str,
    git_ref: Option<&str>,
    opts: &InstallOptions,
) -> Result<PathBuf, ThemeError> {
    check_target(site, name, opts)?;
    with_themes_root(site, |themes| unpack(site, themes, archive, name, git_ref, opts))
}

fn check_target(site: &SiteConfig, name: &str, opts: &InstallOptions) -> Result<(), ThemeError> {
    let target = site.themes_root().join(name);
    if target.exists() && !opts.force {
        return Err(ThemeError::AlreadyExists(target));
    }
    Ok(())
}

/// Run `f` with the themes dir created, removing it again if `f` fails
/// and the dir did not exist before.
fn with_themes_root<T>(
    site: &SiteConfig,
    f: impl FnOnce(&Path) -> Result<T, ThemeError>,
) -> Result<T, ThemeError> {
    let themes = site.themes_root();
    let created = !themes.exists();
    create_dir_all(&themes)?;

    let result = f(&themes);
    if result.is_err() && created {
        let _ = remove_empty_dir(&themes);
    }
    result
}

fn scratch_dir(themes: &Path) -> Result<tempfile::TempDir, ThemeError> {
    Ok(tempfile::Builder::new()
        .prefix(".pressroom-theme-")
        .tempdir_in(themes)
        .fs_context("create scratch directory in", themes)?)
}

fn unpack(
    site: &SiteConfig,
    themes: &Path,
    archive: &Path,
    name: &str,
    git_ref: Option<&str>,
    opts: &InstallOptions,
) -> Result<PathBuf, ThemeError> {
    let scratch = scratch_dir(themes)?;
    unzip(archive, scratch.path())?;

    let top = top_level_dir(scratch.path(), archive)?;
    if let Some(dir) = top.file_name().and_then(|n| n.to_str()) {
        crate::debug!("theme"; "archive root `{}` -> `{}`", dir, normalize_dir_name(dir, git_ref));
    }
    remove_project_files(&top)?;

    let target = themes.join(name);
    if opts.force {
        remove_path(&target)?;
    }
    // A flat archive is the scratch dir itself; the TempDir then finds
    // nothing to clean up.
    rename(&top, &target)?;
    drop(scratch);

    if opts.example_site {
        copy_example_site(&target, site.root())?;
    }
    if !opts.skip_config {
        set_config_field(site.path(), "theme", Some(&quoted(name)))?;
    }
    log!("theme"; "installed {} into {}", name, target.display());
    Ok(target)
}

/// The single top-level directory of an unpacked archive, or the unpack
/// dir itself for archives without one.
fn top_level_dir(unpacked: &Path, archive: &Path) -> Result<PathBuf, ThemeError> {
    let entries: Vec<PathBuf> = fs::read_dir(unpacked)
        .fs_context("read directory", unpacked)?
        .filter_map(Result::ok)
        .map(|e| e.path())
        .collect();

    match entries.as_slice() {
        [] => Err(ThemeError::EmptyArchive(archive.to_path_buf())),
        [only] if only.is_dir() => Ok(only.clone()),
        _ => Ok(unpacked.to_path_buf()),
    }
}

fn remove_project_files(theme: &Path) -> Result<(), ThemeError> {
    for entry in fs::read_dir(theme).fs_context("read directory", theme)? {
        let path = entry.fs_context("read directory", theme)?.path();
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        let is_rproj = path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("rproj"));
        if is_rproj || PROJECT_FILES.contains(&name) {
            remove_path(&path)?;
        }
    }
    Ok(())
}

fn copy_example_site(theme: &Path, root: &Path) -> Result<(), ThemeError> {
    let example = theme.join("exampleSite");
    if !example.is_dir() {
        log!("theme"; "no exampleSite in {}", theme.display());
        return Ok(());
    }
    let mut copied = 0;
    for dir in EXAMPLE_DIRS {
        let from = example.join(dir);
        if from.is_dir() {
            copied += copy_tree_no_clobber(&from, &root.join(dir))?;
        }
    }
    log!("theme"; "copied {} example files", copied);
    Ok(())
}
