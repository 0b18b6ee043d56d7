use std::time::Instant;

use comments::Comment;
use fingerprint::{FingerprintConfig, ParagraphFingerprints};
use fxhash::FxHashMap;
use tracing::{debug, info};

use crate::config::{AnchorConfig, OrphanPolicy};
use crate::metrics::metrics_recorder;
use crate::types::{AnchorError, AnchorOutcome, Placement, Resolution, ResolveStats, ResolvedMapping};


/// Re-anchors comments against the current paragraph list.
///
/// Stateless apart from its configuration; one instance can serve any number
/// of chapters and threads.
#[derive(Debug, Clone, Default)]
pub struct Resolver {
    cfg: AnchorConfig,
    fingerprint_cfg: FingerprintConfig,
}

impl Resolver {
    pub fn new(cfg: AnchorConfig, fingerprint_cfg: FingerprintConfig) -> Result<Self, AnchorError> {
        cfg.validate()?;
        fingerprint_cfg.validate()?;
        Ok(Self {
            cfg,
            fingerprint_cfg,
        })
    }

    pub fn config(&self) -> &AnchorConfig {
        &self.cfg
    }

    pub fn fingerprint_config(&self) -> &FingerprintConfig {
        &self.fingerprint_cfg
    }

    /// Fingerprint every paragraph once, with this resolver's rules.
    pub fn fingerprints<S: AsRef<str>>(&self, paragraphs: &[S]) -> ParagraphFingerprints {
        ParagraphFingerprints::from_paragraphs(paragraphs, &self.fingerprint_cfg)
    }

    /// Current index to comments. Never fails and never drops a comment.
    pub fn resolve<S: AsRef<str>>(&self, paragraphs: &[S], comments: &[Comment]) -> ResolvedMapping {
        self.resolve_detailed(paragraphs, comments).mapping
    }

    /// Like [`resolve`](Self::resolve), with a placement record per comment.
    pub fn resolve_detailed<S: AsRef<str>>(
        &self,
        paragraphs: &[S],
        comments: &[Comment],
    ) -> Resolution {
        let fingerprints = self.fingerprints(paragraphs);
        self.resolve_fingerprints(&fingerprints, comments)
    }

    /// Resolve against fingerprints computed earlier by
    /// [`fingerprints`](Self::fingerprints).
    pub fn resolve_fingerprints(
        &self,
        fingerprints: &ParagraphFingerprints,
        comments: &[Comment],
    ) -> Resolution {
        let start = Instant::now();
        let roots = thread_roots(comments);

        // Roots first, so every reply can look up its root's target.
        let mut targets: Vec<Option<(usize, AnchorOutcome)>> = vec![None; comments.len()];
        for (pos, comment) in comments.iter().enumerate() {
            if roots[pos] == pos {
                targets[pos] = Some(self.place_root(fingerprints, comment));
            }
        }

        let mut resolution = Resolution::default();
        resolution.stats.paragraphs = fingerprints.len();
        resolution.placements.reserve(comments.len());

        for (pos, comment) in comments.iter().enumerate() {
            let root = roots[pos];
            let (resolved_index, outcome) = if root == pos {
                targets[pos]
                    .clone()
                    .unwrap_or_else(|| self.place_root(fingerprints, comment))
            } else {
                let root_index = targets[root]
                    .as_ref()
                    .map(|(index, _)| *index)
                    .unwrap_or(comments[root].recorded_index);
                (
                    root_index,
                    AnchorOutcome::Inherited {
                        root_id: comments[root].id.clone(),
                    },
                )
            };

            match &outcome {
                AnchorOutcome::Relocated { from } => debug!(
                    comment_id = %comment.id,
                    from = *from,
                    to = resolved_index,
                    "anchor_relocated"
                ),
                AnchorOutcome::Orphaned => debug!(
                    comment_id = %comment.id,
                    recorded_index = comment.recorded_index,
                    resolved_index,
                    "anchor_orphaned"
                ),
                _ => {}
            }

            resolution.stats.record(&outcome);
            resolution.mapping.push(resolved_index, comment.clone());
            resolution.placements.push(Placement {
                comment_id: comment.id.clone(),
                recorded_index: comment.recorded_index,
                resolved_index,
                outcome,
            });
        }

        let latency = start.elapsed();
        let stats = &resolution.stats;
        info!(
            paragraphs = stats.paragraphs,
            comments = stats.comments,
            verified = stats.verified,
            relocated = stats.relocated,
            orphaned = stats.orphaned,
            inherited = stats.inherited,
            elapsed_micros = latency.as_micros(),
            "anchor_resolve_success"
        );
        if let Some(recorder) = metrics_recorder() {
            recorder.record_resolve(latency, stats);
        }

        resolution
    }

    fn place_root(
        &self,
        fingerprints: &ParagraphFingerprints,
        comment: &Comment,
    ) -> (usize, AnchorOutcome) {
        let recorded = comment.recorded_index;
        let Some(context) = comment.context() else {
            return (recorded, AnchorOutcome::Unverified);
        };
        if fingerprints.matches_at(recorded, context) {
            return (recorded, AnchorOutcome::Verified);
        }
        match fingerprints.first_match(context) {
            Some(index) => (index, AnchorOutcome::Relocated { from: recorded }),
            None => {
                let index = match self.cfg.orphan_policy {
                    OrphanPolicy::KeepRecorded => recorded,
                    OrphanPolicy::FirstParagraph => 0,
                };
                (index, AnchorOutcome::Orphaned)
            }
        }
    }
}

/// [`Resolver::resolve`] with default configuration.
///
/// ```
/// use anchor::resolve;
/// use comments::Comment;
///
/// let paragraphs = ["Alpha text", "Gamma text", "Beta text"];
/// let comments = vec![Comment::new("c1", 0, Some("Gamma"), "moved with its paragraph")];
///
/// let mapping = resolve(&paragraphs, &comments);
/// assert_eq!(mapping.get(1)[0].id, "c1");
/// assert!(mapping.get(0).is_empty());
/// ```
pub fn resolve<S: AsRef<str>>(paragraphs: &[S], comments: &[Comment]) -> ResolvedMapping {
    Resolver::default().resolve(paragraphs, comments)
}

/// Position of each comment's thread root within `comments`.
///
/// A comment is its own root when it has no parent, or its parent is not in
/// the set. A parent chain that loops is cut at the loop member that comes
/// first in input order, which becomes the root for the whole loop.
pub(crate) fn thread_roots(comments: &[Comment]) -> Vec<usize> {
    let positions = first_positions(comments);
    let parent_of = |pos: usize| -> Option<usize> {
        let parent_id = comments[pos].parent_id.as_deref()?;
        positions.get(parent_id).copied().filter(|&p| p != pos)
    };

    let mut roots: Vec<Option<usize>> = vec![None; comments.len()];
    let mut on_path = vec![false; comments.len()];
    let mut path: Vec<usize> = Vec::new();
    for start in 0..comments.len() {
        if roots[start].is_some() {
            continue;
        }
        path.clear();
        let mut cur = start;
        let root = loop {
            if let Some(known) = roots[cur] {
                break known;
            }
            if on_path[cur] {
                let loop_at = path.iter().position(|&p| p == cur).unwrap_or(0);
                break path[loop_at..].iter().copied().min().unwrap_or(cur);
            }
            on_path[cur] = true;
            path.push(cur);
            match parent_of(cur) {
                Some(parent) => cur = parent,
                None => break cur,
            }
        };
        for &member in &path {
            roots[member] = Some(root);
            on_path[member] = false;
        }
    }

    roots
        .into_iter()
        .enumerate()
        .map(|(pos, root)| root.unwrap_or(pos))
        .collect()
}

/// Id to first position. Later duplicates never shadow an earlier comment.
pub(crate) fn first_positions(comments: &[Comment]) -> FxHashMap<&str, usize> {
    let mut positions = FxHashMap::default();
    for (pos, comment) in comments.iter().enumerate() {
        positions.entry(comment.id.as_str()).or_insert(pos);
    }
    positions
}
