use std::collections::BTreeMap;

use comments::Comment;
use fingerprint::FingerprintError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// How a comment ended up in its bucket.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AnchorOutcome {
    /// No fingerprint was captured; the recorded index is trusted as-is.
    Unverified,
    /// The paragraph at the recorded index still matches.
    Verified,
    /// The fingerprint was found at a different paragraph.
    Relocated { from: usize },
    /// No paragraph matches; placed by the orphan policy.
    Orphaned,
    /// A reply, placed with its thread root.
    Inherited { root_id: String },
}

/// Where one comment was placed by a resolution run.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Placement {
    pub comment_id: String,
    pub recorded_index: usize,
    pub resolved_index: usize,
    pub outcome: AnchorOutcome,
}

/// Current paragraph index to the comments anchored there, in input order.
///
/// Serializes like the store's `commentsByPara` object: keys are the indices
/// as strings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(transparent)]
pub struct ResolvedMapping {
    buckets: BTreeMap<usize, Vec<Comment>>,
}

impl ResolvedMapping {
    pub(crate) fn push(&mut self, index: usize, comment: Comment) {
        self.buckets.entry(index).or_default().push(comment);
    }

    /// Comments anchored at `index`; empty when there are none.
    pub fn get(&self, index: usize) -> &[Comment] {
        self.buckets.get(&index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices with at least one comment, ascending.
    pub fn indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.buckets.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &[Comment])> + '_ {
        self.buckets
            .iter()
            .map(|(index, bucket)| (*index, bucket.as_slice()))
    }

    /// Every comment, bucket by bucket.
    pub fn comments(&self) -> impl Iterator<Item = &Comment> + '_ {
        self.buckets.values().flatten()
    }

    /// Total number of comments across all buckets.
    pub fn len(&self) -> usize {
        self.buckets.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn bucket_count(&self) -> usize {
        self.buckets.len()
    }

    pub fn into_inner(self) -> BTreeMap<usize, Vec<Comment>> {
        self.buckets
    }
}

impl From<ResolvedMapping> for BTreeMap<usize, Vec<Comment>> {
    fn from(mapping: ResolvedMapping) -> Self {
        mapping.into_inner()
    }
}

/// Tally of outcomes for one resolution run.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ResolveStats {
    pub paragraphs: usize,
    pub comments: usize,
    pub unverified: usize,
    pub verified: usize,
    pub relocated: usize,
    pub orphaned: usize,
    pub inherited: usize,
}

impl ResolveStats {
    pub(crate) fn record(&mut self, outcome: &AnchorOutcome) {
        self.comments += 1;
        match outcome {
            AnchorOutcome::Unverified => self.unverified += 1,
            AnchorOutcome::Verified => self.verified += 1,
            AnchorOutcome::Relocated { .. } => self.relocated += 1,
            AnchorOutcome::Orphaned => self.orphaned += 1,
            AnchorOutcome::Inherited { .. } => self.inherited += 1,
        }
    }

    /// Comments that were matched positionally (everything but replies).
    pub fn roots(&self) -> usize {
        self.comments - self.inherited
    }
}

/// Full result of a resolution run.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Resolution {
    pub mapping: ResolvedMapping,
    /// One entry per input comment, in input order.
    pub placements: Vec<Placement>,
    pub stats: ResolveStats,
}

impl Resolution {
    /// Root comments whose fingerprint matched no paragraph.
    pub fn orphans(&self) -> impl Iterator<Item = &Placement> + '_ {
        self.placements
            .iter()
            .filter(|p| p.outcome == AnchorOutcome::Orphaned)
    }

    pub fn placement(&self, comment_id: &str) -> Option<&Placement> {
        self.placements.iter().find(|p| p.comment_id == comment_id)
    }
}

/// Errors from the anchor layer. Only configuration can fail; resolution
/// itself is total.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum AnchorError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Fingerprint(#[from] FingerprintError),
}
