//! Filesystem helpers with operation and path context on every error.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// A filesystem failure, naming what was being done and to which path.
#[derive(Debug, Error)]
#[error("failed to {op} {}", path.display())]
pub struct FsError {
    pub op: &'static str,
    pub path: PathBuf,
    #[source]
    pub source: io::Error,
}

impl FsError {
    pub fn new(op: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self {
            op,
            path: path.into(),
            source,
        }
    }
}

/// Attach operation and path context to an `io::Result`.
pub trait FsContext<T> {
    fn fs_context(self, op: &'static str, path: &Path) -> Result<T, FsError>;
}

impl<T> FsContext<T> for io::Result<T> {
    fn fs_context(self, op: &'static str, path: &Path) -> Result<T, FsError> {
        self.map_err(|e| FsError::new(op, path, e))
    }
}

pub fn read(path: &Path) -> Result<Vec<u8>, FsError> {
    fs::read(path).fs_context("read", path)
}

pub fn read_to_string(path: &Path) -> Result<String, FsError> {
    fs::read_to_string(path).fs_context("read", path)
}

pub fn create_dir_all(path: &Path) -> Result<(), FsError> {
    fs::create_dir_all(path).fs_context("create directory", path)
}

pub fn rename(from: &Path, to: &Path) -> Result<(), FsError> {
    fs::rename(from, to).fs_context("rename", from)
}

/// Write `content` to `path` through a temp file in the same directory.
///
/// Readers see either the old or the new content, never a partial write.
/// An existing file keeps its permissions; a new one gets the same mode a
/// plain create would.
pub fn atomic_write(path: &Path, content: &[u8]) -> Result<(), FsError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    create_dir_all(dir)?;

    let existing = fs::metadata(path).ok().map(|meta| meta.permissions());
    let mut builder = tempfile::Builder::new();
    builder.prefix(".pressroom-");
    if existing.is_none() {
        plain_create_mode(&mut builder);
    }
    let mut tmp = builder.tempfile_in(dir).fs_context("create temp file in", dir)?;
    if let Some(perms) = existing {
        tmp.as_file()
            .set_permissions(perms)
            .fs_context("set permissions on", tmp.path())?;
    }
    tmp.write_all(content).fs_context("write", tmp.path())?;
    tmp.as_file().sync_all().fs_context("sync", tmp.path())?;
    tmp.persist(path)
        .map_err(|e| FsError::new("replace", path, e.error))?;
    Ok(())
}

/// `0o666` before the umask, as `File::create` uses. Temp files default
/// to owner-only.
#[cfg(unix)]
fn plain_create_mode(builder: &mut tempfile::Builder<'_, '_>) {
    use std::os::unix::fs::PermissionsExt;
    builder.permissions(fs::Permissions::from_mode(0o666));
}

#[cfg(not(unix))]
fn plain_create_mode(_: &mut tempfile::Builder<'_, '_>) {}

/// Write only when the content differs from what is on disk.
///
/// Returns `true` if the file was written.
pub fn write_if_changed(path: &Path, content: &[u8]) -> Result<bool, FsError> {
    if let Ok(existing) = fs::read(path)
        && existing == content
    {
        return Ok(false);
    }
    atomic_write(path, content)?;
    Ok(true)
}

/// Remove `dir` if it exists and is empty. Returns `true` if removed.
pub fn remove_empty_dir(dir: &Path) -> Result<bool, FsError> {
    let mut entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
        Err(e) => return Err(FsError::new("read directory", dir, e)),
    };
    if entries.next().is_some() {
        return Ok(false);
    }
    fs::remove_dir(dir).fs_context("remove directory", dir)?;
    Ok(true)
}

/// Remove a file or directory tree, ignoring a missing path.
pub fn remove_path(path: &Path) -> Result<(), FsError> {
    let result = if path.is_dir() {
        fs::remove_dir_all(path)
    } else {
        fs::remove_file(path)
    };
    match result {
        Err(e) if e.kind() != io::ErrorKind::NotFound => Err(FsError::new("remove", path, e)),
        _ => Ok(()),
    }
}

/// Check whether a directory is missing or has no entries.
pub fn is_empty_dir(dir: &Path) -> bool {
    fs::read_dir(dir).map_or(true, |mut entries| entries.next().is_none())
}

/// Copy a directory tree without overwriting existing files.
///
/// Returns the number of files copied.
pub fn copy_tree_no_clobber(from: &Path, to: &Path) -> Result<usize, FsError> {
    let mut copied = 0;
    for entry in jwalk::WalkDir::new(from).skip_hidden(false).sort(true) {
        let entry = entry.map_err(|e| FsError::new("walk", from, io::Error::other(e)))?;
        let path = entry.path();
        let Ok(rel) = path.strip_prefix(from) else {
            continue;
        };
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else if !target.exists() {
            if let Some(parent) = target.parent() {
                create_dir_all(parent)?;
            }
            fs::copy(&path, &target).fs_context("copy", &path)?;
            copied += 1;
        }
    }
    Ok(copied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_atomic_write_replaces_content() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/file.txt");

        atomic_write(&path, b"one").unwrap();
        atomic_write(&path, b"two").unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"two");

        // no temp files left behind
        let leftovers: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .filter_map(Result::ok)
            .filter(|e| e.file_name().to_string_lossy().starts_with(".pressroom-"))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[cfg(unix)]
    #[test]
    fn test_atomic_write_keeps_permissions() {
        use std::os::unix::fs::PermissionsExt;
        let mode = |path: &Path| fs::metadata(path).unwrap().permissions().mode() & 0o777;
        let dir = TempDir::new().unwrap();

        for expected in [0o644, 0o755, 0o664] {
            let path = dir.path().join(format!("{expected:o}.toml"));
            fs::write(&path, "a").unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(expected)).unwrap();
            atomic_write(&path, b"b").unwrap();
            assert_eq!(mode(&path), expected, "{path:?}");
        }

        // New files match a plain create under the current umask.
        let plain = dir.path().join("plain.txt");
        fs::write(&plain, "a").unwrap();
        let fresh = dir.path().join("fresh.txt");
        atomic_write(&fresh, b"a").unwrap();
        assert_eq!(mode(&fresh), mode(&plain));
    }

    #[test]
    fn test_write_if_changed() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("a.txt");
        assert!(write_if_changed(&path, b"x").unwrap());
        assert!(!write_if_changed(&path, b"x").unwrap());
        assert!(write_if_changed(&path, b"y").unwrap());
    }

    #[test]
    fn test_remove_empty_dir() {
        let dir = TempDir::new().unwrap();
        let empty = dir.path().join("resources");
        let full = dir.path().join("static");
        fs::create_dir(&empty).unwrap();
        fs::create_dir(&full).unwrap();
        fs::write(full.join("x"), "").unwrap();

        assert!(remove_empty_dir(&empty).unwrap());
        assert!(!empty.exists());
        assert!(!remove_empty_dir(&full).unwrap());
        assert!(!remove_empty_dir(&dir.path().join("missing")).unwrap());
    }

    #[test]
    fn test_copy_tree_no_clobber() {
        let dir = TempDir::new().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(src.join("content/post")).unwrap();
        fs::write(src.join("config.toml"), "theme").unwrap();
        fs::write(src.join("content/post/a.md"), "a").unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(dst.join("config.toml"), "mine").unwrap();

        let copied = copy_tree_no_clobber(&src, &dst).unwrap();
        assert_eq!(copied, 1);
        assert_eq!(fs::read_to_string(dst.join("config.toml")).unwrap(), "mine");
        assert_eq!(fs::read_to_string(dst.join("content/post/a.md")).unwrap(), "a");
    }

    #[test]
    fn test_fs_error_display() {
        let err = FsError::new(
            "read",
            "/tmp/x",
            io::Error::new(io::ErrorKind::NotFound, "gone"),
        );
        assert_eq!(err.to_string(), "failed to read /tmp/x");
    }
}
