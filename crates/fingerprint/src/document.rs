use serde::{Deserialize, Serialize};

use crate::config::FingerprintConfig;
use crate::extract::{extract, is_match};
use crate::hash::snapshot_digest;

/// Fingerprints of every paragraph of one chapter, in document order.
///
/// Built once per reconciliation run so the resolver never re-extracts a
/// paragraph per comment. Index `i` holds the fingerprint of paragraph `i`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ParagraphFingerprints {
    /// Extraction rule version used to build the snapshot.
    pub version: u32,
    /// One fingerprint per paragraph.
    pub fingerprints: Vec<String>,
    /// [`snapshot_digest`] over `fingerprints`.
    pub digest: String,
}

impl ParagraphFingerprints {
    /// Fingerprint every paragraph under `cfg`.
    pub fn from_paragraphs<S: AsRef<str>>(paragraphs: &[S], cfg: &FingerprintConfig) -> Self {
        let fingerprints: Vec<String> = paragraphs
            .iter()
            .map(|p| extract(p.as_ref(), cfg))
            .collect();
        let digest = snapshot_digest(cfg.version, &fingerprints);
        Self {
            version: cfg.version,
            fingerprints,
            digest,
        }
    }

    pub fn len(&self) -> usize {
        self.fingerprints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fingerprints.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.fingerprints.get(index).map(String::as_str)
    }

    /// Whether paragraph `index` exists and its fingerprint starts with `context`.
    pub fn matches_at(&self, index: usize, context: &str) -> bool {
        self.get(index).is_some_and(|fp| is_match(fp, context))
    }

    /// First paragraph, in document order, whose fingerprint starts with `context`.
    pub fn first_match(&self, context: &str) -> Option<usize> {
        self.fingerprints
            .iter()
            .position(|fp| is_match(fp, context))
    }
}
