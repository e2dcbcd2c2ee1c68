//! Installing Hugo from GitHub releases.
//!
//! Downloads `hugo_extended_<version>_<os>-<arch>.<ext>` into a scratch
//! directory, extracts the binary into the install dir and marks it
//! executable. The scratch directory is removed on every path.

use super::GeneratorError;
use super::locate::exe_name;
use crate::config::Options;
use crate::log;
use crate::utils::archive::{self, ArchiveError, make_executable};
use crate::utils::fs::{FsContext, create_dir_all};
use std::path::PathBuf;

const LATEST_RELEASE_API: &str = "https://api.github.com/repos/gohugoio/hugo/releases/latest";

#[derive(serde::Deserialize)]
struct Release {
    tag_name: String,
}

/// Release asset name for the current platform.
pub fn asset_name(version: &str, os: &str, arch: &str) -> Option<String> {
    let (os, ext) = match os {
        "linux" => ("linux", "tar.gz"),
        "macos" => ("darwin", "tar.gz"),
        "windows" => ("windows", "zip"),
        "freebsd" => ("freebsd", "tar.gz"),
        _ => return None,
    };
    let arch = if os == "darwin" {
        "universal"
    } else {
        match arch {
            "x86_64" => "amd64",
            "aarch64" => "arm64",
            _ => return None,
        }
    };
    Some(format!("hugo_extended_{version}_{os}-{arch}.{ext}"))
}

pub fn download_url(version: &str, asset: &str) -> String {
    format!("https://github.com/gohugoio/hugo/releases/download/v{version}/{asset}")
}

/// Tag of the latest release, without the leading `v`.
fn latest_version() -> Result<String, GeneratorError> {
    let body = archive::fetch(LATEST_RELEASE_API)
        .map_err(|e| GeneratorError::Release(e.to_string()))?;
    let release: Release =
        serde_json::from_slice(&body).map_err(|e| GeneratorError::Release(e.to_string()))?;
    Ok(release.tag_name.trim_start_matches('v').to_string())
}

/// Download and install Hugo. Returns the installed binary path.
pub fn install(options: &Options) -> Result<PathBuf, GeneratorError> {
    let version = match &options.generator.version {
        Some(v) => v.trim_start_matches('v').to_string(),
        None => latest_version()?,
    };
    let asset = asset_name(&version, std::env::consts::OS, std::env::consts::ARCH)
        .ok_or_else(|| {
            GeneratorError::Release(format!(
                "no prebuilt hugo for {}-{}",
                std::env::consts::OS,
                std::env::consts::ARCH
            ))
        })?;
    let url = download_url(&version, &asset);
    let install_err = |source: ArchiveError| GeneratorError::Install {
        version: version.clone(),
        source,
    };

    let scratch = tempfile::Builder::new()
        .prefix("pressroom-")
        .tempdir()
        .fs_context("create scratch directory", &std::env::temp_dir())?;

    log!("install"; "downloading {}", url);
    let archive_path = scratch.path().join(&asset);
    archive::download(&url, &archive_path).map_err(install_err)?;

    let extracted = scratch.path().join(exe_name());
    if asset.ends_with(".zip") {
        archive::extract_from_zip(&archive_path, exe_name(), &extracted)
    } else {
        archive::extract_from_tar_gz(&archive_path, exe_name(), &extracted)
    }
    .map_err(install_err)?;

    let install_dir = options.generator.install_dir();
    create_dir_all(&install_dir)?;
    let target = install_dir.join(exe_name());
    std::fs::copy(&extracted, &target).fs_context("copy", &extracted)?;
    make_executable(&target)?;

    let path = scratch.path().to_path_buf();
    scratch.close().fs_context("remove scratch directory", &path)?;

    log!("install"; "hugo {} installed to {}", version, target.display());
    Ok(target)
}
