//! blake3 digests for fingerprints and compiled outputs.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io;
use std::path::Path;

/// 32-byte blake3 digest, stored as 64 hex characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentHash([u8; 32]);

impl ContentHash {
    pub fn to_hex(self) -> String {
        hex::encode(self.0)
    }

    pub fn from_hex(s: &str) -> Option<Self> {
        let mut bytes = [0u8; 32];
        hex::decode_to_slice(s, &mut bytes).ok()?;
        Some(Self(bytes))
    }
}

impl From<blake3::Hash> for ContentHash {
    fn from(hash: blake3::Hash) -> Self {
        Self(*hash.as_bytes())
    }
}

/// Short form for log lines.
impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex()[..16])
    }
}

impl From<ContentHash> for String {
    fn from(hash: ContentHash) -> Self {
        hash.to_hex()
    }
}

impl TryFrom<String> for ContentHash {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::from_hex(&s).ok_or_else(|| format!("invalid content hash `{s}`"))
    }
}

pub fn hash_bytes(bytes: &[u8]) -> ContentHash {
    blake3::hash(bytes).into()
}

/// Digest of a source document's root-relative path and its bytes.
///
/// Moving a document changes its target, so the path is part of it.
pub fn source_fingerprint(rel_path: &str, content: &[u8]) -> ContentHash {
    blake3::Hasher::new()
        .update(rel_path.as_bytes())
        .update(&[0])
        .update(content)
        .finalize()
        .into()
}

/// Digest of a file's contents, read in chunks.
pub fn compute_file_hash(path: &Path) -> io::Result<ContentHash> {
    let mut hasher = blake3::Hasher::new();
    hasher.update_reader(File::open(path)?)?;
    Ok(hasher.finalize().into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_file_hash_matches_bytes_hash() {
        let dir = TempDir::new().unwrap();
        let file = dir.path().join("a.html");
        fs::write(&file, "<p>hello</p>").unwrap();

        assert_eq!(
            compute_file_hash(&file).unwrap(),
            hash_bytes(b"<p>hello</p>")
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let dir = TempDir::new().unwrap();
        let err = compute_file_hash(&dir.path().join("missing")).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[test]
    fn test_fingerprint_depends_on_path_and_content() {
        let a = source_fingerprint("content/post/a.Rmd", b"body");
        assert_eq!(a, source_fingerprint("content/post/a.Rmd", b"body"));
        assert_ne!(a, source_fingerprint("content/post/b.Rmd", b"body"));
        assert_ne!(a, source_fingerprint("content/post/a.Rmd", b"body!"));
        // path/content boundary is unambiguous
        assert_ne!(
            source_fingerprint("ab", b"c"),
            source_fingerprint("a", b"bc")
        );
    }

    #[test]
    fn test_hex_roundtrip_and_display() {
        let hash = hash_bytes(b"x");
        assert_eq!(ContentHash::from_hex(&hash.to_hex()), Some(hash));
        assert_eq!(hash.to_string().len(), 16);
        assert!(ContentHash::from_hex("abcd").is_none());
        assert!(ContentHash::from_hex("zz").is_none());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = hash_bytes(b"x");
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, format!("\"{}\"", hash.to_hex()));
        let back: ContentHash = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hash);
        assert!(serde_json::from_str::<ContentHash>("\"nope\"").is_err());
    }
}
