//! Downloading and unpacking release and theme archives.

use super::fs::{FsContext, FsError, create_dir_all};
use crate::debug;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("failed to download {url}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("failed to download {url}: HTTP {status}")]
    Status { url: String, status: u16 },

    #[error("failed to read zip archive {}", path.display())]
    Zip {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    #[error("`{name}` not found in archive {}", archive.display())]
    MissingEntry { archive: PathBuf, name: String },

    #[error(transparent)]
    Fs(#[from] FsError),
}

fn client() -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .user_agent(concat!("pressroom/", env!("CARGO_PKG_VERSION")))
        .timeout(Duration::from_secs(300))
        .build()
}

/// GET `url` and return the body, failing on non-2xx statuses.
pub fn fetch(url: &str) -> Result<Vec<u8>, ArchiveError> {
    let download = |source| ArchiveError::Download {
        url: url.to_string(),
        source,
    };
    let resp = client().map_err(download)?.get(url).send().map_err(download)?;
    let status = resp.status();
    if !status.is_success() {
        return Err(ArchiveError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }
    let bytes = resp.bytes().map_err(download)?;
    debug!("download"; "{} ({} bytes)", url, bytes.len());
    Ok(bytes.to_vec())
}

/// Download `url` into `dest`.
pub fn download(url: &str, dest: &Path) -> Result<(), ArchiveError> {
    let bytes = fetch(url)?;
    fs::write(dest, bytes).fs_context("write", dest)?;
    Ok(())
}

fn open_zip(archive: &Path) -> Result<zip::ZipArchive<File>, ArchiveError> {
    let file = File::open(archive).fs_context("open", archive)?;
    zip::ZipArchive::new(file).map_err(|source| ArchiveError::Zip {
        path: archive.to_path_buf(),
        source,
    })
}

/// Extract a whole zip archive into `dir`.
pub fn unzip(archive: &Path, dir: &Path) -> Result<(), ArchiveError> {
    create_dir_all(dir)?;
    open_zip(archive)?
        .extract(dir)
        .map_err(|source| ArchiveError::Zip {
            path: archive.to_path_buf(),
            source,
        })
}

/// Copy one entry (matched by file name, at any depth) out of a zip.
pub fn extract_from_zip(archive: &Path, name: &str, dest: &Path) -> Result<(), ArchiveError> {
    let mut zip = open_zip(archive)?;
    for i in 0..zip.len() {
        let mut entry = zip.by_index(i).map_err(|source| ArchiveError::Zip {
            path: archive.to_path_buf(),
            source,
        })?;
        let matches = entry
            .enclosed_name()
            .and_then(|p| p.file_name().map(|n| n == name))
            .unwrap_or(false);
        if entry.is_file() && matches {
            return write_entry(&mut entry, dest);
        }
    }
    Err(ArchiveError::MissingEntry {
        archive: archive.to_path_buf(),
        name: name.to_string(),
    })
}

/// Copy one entry (matched by file name, at any depth) out of a `.tar.gz`.
pub fn extract_from_tar_gz(archive: &Path, name: &str, dest: &Path) -> Result<(), ArchiveError> {
    let file = File::open(archive).fs_context("open", archive)?;
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(file));
    let entries = tar.entries().fs_context("read", archive)?;
    for entry in entries {
        let mut entry = entry.fs_context("read", archive)?;
        let matches = entry
            .path()
            .ok()
            .and_then(|p| p.file_name().map(|n| n == name))
            .unwrap_or(false);
        if entry.header().entry_type().is_file() && matches {
            return write_entry(&mut entry, dest);
        }
    }
    Err(ArchiveError::MissingEntry {
        archive: archive.to_path_buf(),
        name: name.to_string(),
    })
}

fn write_entry(reader: &mut impl Read, dest: &Path) -> Result<(), ArchiveError> {
    if let Some(parent) = dest.parent() {
        create_dir_all(parent)?;
    }
    let mut out = File::create(dest).fs_context("create", dest)?;
    io::copy(reader, &mut out).fs_context("write", dest)?;
    Ok(())
}

/// Mark a file executable (no-op on Windows).
pub fn make_executable(path: &Path) -> Result<(), FsError> {
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(0o755)).fs_context("chmod", path)?;
    }
    #[cfg(not(unix))]
    let _ = path;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_zip(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let mut zip = zip::ZipWriter::new(file);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in files {
            zip.start_file(*name, options).unwrap();
            zip.write_all(content.as_bytes()).unwrap();
        }
        zip.finish().unwrap();
    }

    fn make_tar_gz(path: &Path, files: &[(&str, &str)]) {
        let file = File::create(path).unwrap();
        let gz = flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut tar = tar::Builder::new(gz);
        for (name, content) in files {
            let mut header = tar::Header::new_gnu();
            header.set_size(content.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            tar.append_data(&mut header, name, content.as_bytes()).unwrap();
        }
        tar.into_inner().unwrap().finish().unwrap();
    }

    #[test]
    fn test_unzip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("theme.zip");
        make_zip(
            &archive,
            &[("hugo-lithium-master/theme.toml", "name = 'x'"), ("hugo-lithium-master/layouts/index.html", "")],
        );

        let out = dir.path().join("out");
        unzip(&archive, &out).unwrap();
        assert!(out.join("hugo-lithium-master/theme.toml").is_file());
        assert!(out.join("hugo-lithium-master/layouts/index.html").is_file());
    }

    #[test]
    fn test_extract_from_zip() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("hugo.zip");
        make_zip(&archive, &[("LICENSE", "mit"), ("hugo.exe", "binary")]);

        let dest = dir.path().join("bin/hugo.exe");
        extract_from_zip(&archive, "hugo.exe", &dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "binary");

        let err = extract_from_zip(&archive, "missing", &dest).unwrap_err();
        assert!(matches!(err, ArchiveError::MissingEntry { .. }));
    }

    #[test]
    fn test_extract_from_tar_gz() {
        let dir = TempDir::new().unwrap();
        let archive = dir.path().join("hugo.tar.gz");
        make_tar_gz(&archive, &[("README.md", "readme"), ("hugo", "#!/bin/sh\n")]);

        let dest = dir.path().join("bin/hugo");
        extract_from_tar_gz(&archive, "hugo", &dest).unwrap();
        make_executable(&dest).unwrap();
        assert_eq!(fs::read_to_string(&dest).unwrap(), "#!/bin/sh\n");

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = fs::metadata(&dest).unwrap().permissions().mode();
            assert_eq!(mode & 0o777, 0o755);
        }
    }
}
