//! Digest of a chapter's fingerprint snapshot.
//!
//! ```text
//! SHA-256(version.to_be_bytes() || 0x00 || for each fp: len(fp).to_be_bytes() || fp)
//! ```
//!
//! Lengths are framed so `["ab", "c"]` and `["a", "bc"]` never collide, and
//! the extraction version is folded in so a rule change always changes the
//! digest.

use sha2::{Digest, Sha256};

/// Hash an ordered list of paragraph fingerprints into a hex digest.
///
/// # Examples
///
/// ```rust
/// use fingerprint::snapshot_digest;
///
/// let a = snapshot_digest(1, &["Alpha", "Beta"]);
/// let b = snapshot_digest(1, &["Beta", "Alpha"]);
/// assert_eq!(a.len(), 64);
/// assert_ne!(a, b);
/// ```
pub fn snapshot_digest<S: AsRef<str>>(version: u32, fingerprints: &[S]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(version.to_be_bytes());
    hasher.update([0u8]);
    for fp in fingerprints {
        let bytes = fp.as_ref().as_bytes();
        hasher.update((bytes.len() as u64).to_be_bytes());
        hasher.update(bytes);
    }
    hex::encode(hasher.finalize())
}
