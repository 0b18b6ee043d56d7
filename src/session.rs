//! Per-chapter UI state.
//!
//! A [`ChapterSession`] holds what a reader widget keeps between renders: the
//! current paragraph snapshot, the last reconciliation, the derived counts,
//! and which paragraph's panel is open. The anchoring core stays stateless;
//! the session just feeds it complete snapshots and caches the answers.

use std::time::Instant;

use anchor::{
    CommentNode, ParagraphCounts, Resolution, ResolvedMapping, Resolver, build_tree, counts,
};
use comments::{
    ChapterCommentsPayload, ChapterKey, Comment, CommentError, CommentIngestConfig,
    CreateCommentRequest, ingest_chapter,
};
use fingerprint::ParagraphFingerprints;
use thiserror::Error;
use tracing::{debug, info};

use crate::capability::Credential;
use crate::config::{ConfigLoadError, ParanoteConfig};
use crate::store::{CommentStore, StoreError};

/// Errors surfaced by session operations.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SessionError {
    #[error("comment ingest failed: {0}")]
    Ingest(#[from] CommentError),

    #[error("comment store failed: {0}")]
    Store(#[from] StoreError),

    #[error("configuration failed: {0}")]
    Config(#[from] ConfigLoadError),

    #[error("paragraph {index} out of range (chapter has {len})")]
    ParagraphOutOfRange { index: usize, len: usize },

    #[error("comment {0} is not in this chapter")]
    UnknownComment(String),
}

/// UI state for one chapter.
pub struct ChapterSession {
    key: ChapterKey,
    resolver: Resolver,
    ingest_cfg: CommentIngestConfig,
    paragraphs: Vec<String>,
    fingerprints: ParagraphFingerprints,
    comments: Vec<Comment>,
    rejected: Vec<CommentError>,
    resolution: Resolution,
    counts: ParagraphCounts,
    open: Option<usize>,
}

impl ChapterSession {
    pub fn new(key: ChapterKey, resolver: Resolver, ingest_cfg: CommentIngestConfig) -> Self {
        let fingerprints = resolver.fingerprints::<&str>(&[]);
        Self {
            key,
            resolver,
            ingest_cfg,
            paragraphs: Vec::new(),
            fingerprints,
            comments: Vec::new(),
            rejected: Vec::new(),
            resolution: Resolution::default(),
            counts: ParagraphCounts::default(),
            open: None,
        }
    }

    pub fn from_config(cfg: &ParanoteConfig) -> Result<Self, SessionError> {
        cfg.validate()?;
        Ok(Self::new(
            cfg.chapter_key(),
            cfg.resolver()?,
            cfg.ingest.clone(),
        ))
    }

    pub fn key(&self) -> &ChapterKey {
        &self.key
    }

    pub fn paragraphs(&self) -> &[String] {
        &self.paragraphs
    }

    /// Replace the paragraph snapshot and re-anchor.
    ///
    /// Returns `true` when the document's fingerprint digest changed. An open
    /// panel is closed if its paragraph no longer exists.
    pub fn set_paragraphs<I, S>(&mut self, paragraphs: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.paragraphs = paragraphs.into_iter().map(Into::into).collect();
        let fingerprints = self.resolver.fingerprints(&self.paragraphs);
        let changed = fingerprints.digest != self.fingerprints.digest;
        self.fingerprints = fingerprints;
        if self.open.is_some_and(|index| index >= self.paragraphs.len()) {
            self.open = None;
        }
        self.reconcile();
        changed
    }

    /// Fetch the chapter from the store and re-anchor.
    pub async fn refresh(&mut self, store: &dyn CommentStore) -> Result<&Resolution, SessionError> {
        let payload = store.list_chapter(&self.key).await?;
        self.load_payload(payload)?;
        Ok(&self.resolution)
    }

    /// Replace the comment set from a store payload and re-anchor.
    pub fn load_payload(&mut self, payload: ChapterCommentsPayload) -> Result<(), SessionError> {
        let report = ingest_chapter(payload, &self.ingest_cfg)?;
        self.comments = report.comments;
        self.rejected = report.rejected;
        self.reconcile();
        Ok(())
    }

    /// Replace the comment set directly and re-anchor.
    pub fn set_comments(&mut self, comments: Vec<Comment>) {
        self.comments = comments;
        self.rejected.clear();
        self.reconcile();
    }

    fn reconcile(&mut self) {
        let start = Instant::now();
        self.resolution = self
            .resolver
            .resolve_fingerprints(&self.fingerprints, &self.comments);
        self.counts = counts(&self.resolution.mapping);
        debug!(
            chapter = %self.key,
            buckets = self.resolution.mapping.bucket_count(),
            threads = self.counts.total(),
            elapsed_micros = start.elapsed().as_micros(),
            "session_reconciled"
        );
    }

    pub fn resolution(&self) -> &Resolution {
        &self.resolution
    }

    pub fn mapping(&self) -> &ResolvedMapping {
        &self.resolution.mapping
    }

    pub fn counts(&self) -> &ParagraphCounts {
        &self.counts
    }

    /// Badge count for a paragraph.
    pub fn count(&self, index: usize) -> usize {
        self.counts.get(index)
    }

    /// Panel header count: threads shown in the open panel. Replies are
    /// nested inside their thread and do not add to it.
    pub fn header_count(&self, index: usize) -> usize {
        self.counts.get(index)
    }

    /// Records the last ingest skipped.
    pub fn rejected(&self) -> &[CommentError] {
        &self.rejected
    }

    pub fn open_index(&self) -> Option<usize> {
        self.open
    }

    /// Toggle the panel for `index`.
    ///
    /// Opening returns the reply forest for that paragraph. Opening the
    /// paragraph that is already open closes it and returns `None`.
    pub fn open(&mut self, index: usize) -> Option<Vec<CommentNode>> {
        if self.open == Some(index) {
            self.open = None;
            return None;
        }
        self.open = Some(index);
        Some(self.thread(index))
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Reply forest for a paragraph, without touching panel state.
    pub fn thread(&self, index: usize) -> Vec<CommentNode> {
        build_tree(self.resolution.mapping.get(index))
    }

    /// Build a new root comment for paragraph `index`, capturing its
    /// fingerprint.
    pub fn draft_comment(
        &self,
        index: usize,
        content: &str,
    ) -> Result<CreateCommentRequest, SessionError> {
        let fingerprint = self
            .fingerprints
            .get(index)
            .ok_or(SessionError::ParagraphOutOfRange {
                index,
                len: self.paragraphs.len(),
            })?;
        let req = CreateCommentRequest {
            chapter: self.key.clone(),
            para_index: index,
            content: content.trim().to_string(),
            context_text: Some(fingerprint.to_string()).filter(|fp| !fp.is_empty()),
            parent_id: None,
        };
        req.validate(self.ingest_cfg.max_content_bytes)?;
        Ok(req)
    }

    /// Build a reply to `parent_id`, posted at the parent's current index.
    pub fn draft_reply(
        &self,
        parent_id: &str,
        content: &str,
    ) -> Result<CreateCommentRequest, SessionError> {
        let placement = self
            .resolution
            .placement(parent_id)
            .ok_or_else(|| SessionError::UnknownComment(parent_id.to_string()))?;
        let req = CreateCommentRequest {
            chapter: self.key.clone(),
            para_index: placement.resolved_index,
            content: content.trim().to_string(),
            context_text: None,
            parent_id: Some(parent_id.to_string()),
        };
        req.validate(self.ingest_cfg.max_content_bytes)?;
        Ok(req)
    }

    /// Draft, submit, and refresh in one step.
    pub async fn post(
        &mut self,
        store: &dyn CommentStore,
        credential: &Credential,
        req: CreateCommentRequest,
    ) -> Result<Comment, SessionError> {
        let comment = store.create(credential, req).await?;
        info!(
            chapter = %self.key,
            comment_id = %comment.id,
            para_index = comment.recorded_index,
            "session_comment_posted"
        );
        self.refresh(store).await?;
        Ok(comment)
    }
}
