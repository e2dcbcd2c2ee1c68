//! Freshness detection: blake3 content hashes for sources and outputs,
//! persisted between runs in the fingerprint store.

mod hash;
mod store;

pub use hash::{ContentHash, compute_file_hash, hash_bytes, source_fingerprint};
pub use store::{Entry, FingerprintStore, LoadStatus, STATE_DIR};
