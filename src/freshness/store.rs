//! Persisted fingerprints of compiled documents.
//!
//! Stored as pretty JSON at `<root>/.pressroom/fingerprints.json`:
//!
//! ```json
//! {
//!   "version": 1,
//!   "entries": {
//!     "content/post/a.Rmd": {
//!       "source": "<blake3 hex>",
//!       "output": "content/post/a.html",
//!       "output_hash": "<blake3 hex>"
//!     }
//!   }
//! }
//! ```

use super::ContentHash;
use crate::debug;
use crate::utils::fs::{FsError, write_if_changed};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

/// State directory name (inside project root)
pub const STATE_DIR: &str = ".pressroom";

const STORE_FILE: &str = "fingerprints.json";

const FORMAT_VERSION: u32 = 1;

/// Last successful compile of one source document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// Fingerprint of the source (path + content).
    pub source: ContentHash,
    /// Root-relative path of the derived file.
    pub output: String,
    /// Hash of the derived file as written.
    pub output_hash: ContentHash,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FingerprintStore {
    version: u32,
    entries: BTreeMap<String, Entry>,
}

impl Default for FingerprintStore {
    fn default() -> Self {
        Self {
            version: FORMAT_VERSION,
            entries: BTreeMap::new(),
        }
    }
}

/// How the store came off disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadStatus {
    Loaded,
    Missing,
    Corrupt(String),
    UnknownVersion(u32),
}

impl LoadStatus {
    /// Anything but a clean load means nothing recorded can be trusted.
    pub const fn forces_full_build(&self) -> bool {
        !matches!(self, Self::Loaded)
    }
}

impl FingerprintStore {
    pub fn path(root: &Path) -> PathBuf {
        root.join(STATE_DIR).join(STORE_FILE)
    }

    /// Load the store. Never fails: an unusable store comes back empty with
    /// a status saying why.
    pub fn load(root: &Path) -> (Self, LoadStatus) {
        let path = Self::path(root);
        let json = match std::fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return (Self::default(), LoadStatus::Missing);
            }
            Err(e) => return (Self::default(), LoadStatus::Corrupt(e.to_string())),
        };

        match serde_json::from_str::<Self>(&json) {
            Ok(store) if store.version == FORMAT_VERSION => {
                debug!("fingerprint"; "restored {} entries", store.len());
                (store, LoadStatus::Loaded)
            }
            Ok(store) => (Self::default(), LoadStatus::UnknownVersion(store.version)),
            Err(e) => (Self::default(), LoadStatus::Corrupt(e.to_string())),
        }
    }

    /// Persist atomically. Skips the write when the file is already
    /// up to date; returns whether it wrote.
    pub fn save(&self, root: &Path) -> Result<bool, FsError> {
        let path = Self::path(root);
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| FsError::new("serialize", &path, io::Error::other(e)))?;

        let written = write_if_changed(&path, json.as_bytes())?;
        if written {
            debug!("fingerprint"; "saved {} entries", self.len());
        }
        Ok(written)
    }

    pub fn get(&self, source: &str) -> Option<&Entry> {
        self.entries.get(source)
    }

    pub fn record(&mut self, source: impl Into<String>, entry: Entry) {
        self.entries.insert(source.into(), entry);
    }

    pub fn remove(&mut self, source: &str) -> Option<Entry> {
        self.entries.remove(source)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Entry)> {
        self.entries.iter()
    }

    #[cfg(test)]
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::freshness::hash_bytes;
    use std::fs;
    use tempfile::TempDir;

    fn entry(tag: &[u8]) -> Entry {
        Entry {
            source: hash_bytes(tag),
            output: "content/post/a.html".into(),
            output_hash: hash_bytes(b"out"),
        }
    }

    #[test]
    fn test_missing_store_forces_full_build() {
        let dir = TempDir::new().unwrap();
        let (store, status) = FingerprintStore::load(dir.path());
        assert!(store.is_empty());
        assert_eq!(status, LoadStatus::Missing);
        assert!(status.forces_full_build());
    }

    #[test]
    fn test_save_and_load() {
        let dir = TempDir::new().unwrap();
        let mut store = FingerprintStore::default();
        store.record("content/post/a.Rmd", entry(b"a"));

        assert!(store.save(dir.path()).unwrap());
        // unchanged content is not rewritten
        assert!(!store.save(dir.path()).unwrap());

        let (loaded, status) = FingerprintStore::load(dir.path());
        assert_eq!(status, LoadStatus::Loaded);
        assert!(!status.forces_full_build());
        assert_eq!(loaded, store);
        assert_eq!(loaded.get("content/post/a.Rmd"), Some(&entry(b"a")));
    }

    #[test]
    fn test_corrupt_store() {
        let dir = TempDir::new().unwrap();
        let path = FingerprintStore::path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        let (store, status) = FingerprintStore::load(dir.path());
        assert!(store.is_empty());
        assert!(matches!(status, LoadStatus::Corrupt(_)));
    }

    #[test]
    fn test_unknown_version() {
        let dir = TempDir::new().unwrap();
        let path = FingerprintStore::path(dir.path());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, r#"{"version": 99, "entries": {}}"#).unwrap();

        let (_, status) = FingerprintStore::load(dir.path());
        assert_eq!(status, LoadStatus::UnknownVersion(99));
        assert!(status.forces_full_build());
    }

    #[test]
    fn test_remove() {
        let mut store = FingerprintStore::default();
        store.record("a", entry(b"a"));
        store.record("b", entry(b"b"));
        assert_eq!(store.remove("a"), Some(entry(b"a")));
        assert_eq!(store.len(), 1);
        assert_eq!(store.iter().next().map(|(k, _)| k.as_str()), Some("b"));
    }
}
