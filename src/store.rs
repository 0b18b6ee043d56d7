//! Comment store collaborator.
//!
//! The real store is a remote service; [`CommentStore`] pins down the calls
//! a chapter session needs from it. [`InMemoryCommentStore`] implements the
//! same contract in process and backs the tests and the demo binary.

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use comments::{
    ALREADY_LIKED, BanUserRequest, ChapterCommentsPayload, ChapterKey, Comment, CommentError,
    CreateCommentRequest, DeleteCommentRequest, LikeCommentRequest, RawComment, StoreResponse,
};
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use crate::capability::{CapabilityCheck, ClaimsCapability, Credential, Viewer};

/// Failures reported by a [`CommentStore`].
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StoreError {
    #[error("comment {0} not found")]
    NotFound(String),
    #[error("comment already liked")]
    AlreadyLiked,
    #[error("not allowed: {0}")]
    Forbidden(String),
    #[error("user is banned on this site")]
    Banned,
    #[error(transparent)]
    Invalid(#[from] CommentError),
    #[error("store backend failure: {0}")]
    Backend(String),
}

impl StoreError {
    /// Map a store reply's error code onto a typed error.
    pub fn from_response(resp: &StoreResponse) -> Option<Self> {
        if resp.success {
            return None;
        }
        let code = resp.error.clone().unwrap_or_else(|| "unknown".into());
        Some(match code.as_str() {
            ALREADY_LIKED => StoreError::AlreadyLiked,
            "not_found" => StoreError::NotFound(String::new()),
            "forbidden" | "unauthorized" => StoreError::Forbidden(code),
            "banned" => StoreError::Banned,
            _ => StoreError::Backend(code),
        })
    }

    /// Error code as the store's JSON reply would carry it.
    pub fn code(&self) -> &'static str {
        match self {
            StoreError::NotFound(_) => "not_found",
            StoreError::AlreadyLiked => ALREADY_LIKED,
            StoreError::Forbidden(_) => "forbidden",
            StoreError::Banned => "banned",
            StoreError::Invalid(_) => "invalid",
            StoreError::Backend(_) => "backend",
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            StoreError::NotFound(_) => 404,
            StoreError::AlreadyLiked => 409,
            StoreError::Forbidden(_) | StoreError::Banned => 403,
            StoreError::Invalid(err) => err.http_status_code(),
            StoreError::Backend(_) => 502,
        }
    }
}

/// The comment store API a chapter session talks to.
#[async_trait]
pub trait CommentStore: Send + Sync {
    /// All comments of a chapter, bucketed by recorded paragraph index.
    async fn list_chapter(&self, key: &ChapterKey) -> Result<ChapterCommentsPayload, StoreError>;

    async fn create(
        &self,
        credential: &Credential,
        req: CreateCommentRequest,
    ) -> Result<Comment, StoreError>;

    async fn delete(
        &self,
        credential: &Credential,
        req: DeleteCommentRequest,
    ) -> Result<(), StoreError>;

    /// Returns the new like count.
    async fn like(&self, credential: &Credential, req: LikeCommentRequest)
    -> Result<u64, StoreError>;

    async fn ban(&self, credential: &Credential, req: BanUserRequest) -> Result<(), StoreError>;
}

#[derive(Default)]
struct StoreState {
    chapters: HashMap<ChapterKey, Vec<Comment>>,
    likes: HashSet<(ChapterKey, String, String)>,
    /// `(site_id, user_id)`
    banned: HashSet<(String, String)>,
}

/// In-process [`CommentStore`].
///
/// Permission checks go through a [`CapabilityCheck`]; the default one reads
/// unverified token claims.
pub struct InMemoryCommentStore {
    state: RwLock<StoreState>,
    capability: Arc<dyn CapabilityCheck>,
    max_content_bytes: Option<usize>,
}

impl Default for InMemoryCommentStore {
    fn default() -> Self {
        Self::new(Arc::new(ClaimsCapability))
    }
}

impl InMemoryCommentStore {
    pub fn new(capability: Arc<dyn CapabilityCheck>) -> Self {
        Self {
            state: RwLock::new(StoreState::default()),
            capability,
            max_content_bytes: None,
        }
    }

    pub fn with_max_content_bytes(mut self, limit: usize) -> Self {
        self.max_content_bytes = Some(limit);
        self
    }

    /// Insert comments as-is, bypassing validation. Used to seed fixtures.
    pub async fn seed(&self, key: &ChapterKey, comments: impl IntoIterator<Item = Comment>) {
        let mut state = self.state.write().await;
        state
            .chapters
            .entry(key.clone())
            .or_default()
            .extend(comments);
    }

    /// Number of stored comments for a chapter.
    pub async fn len(&self, key: &ChapterKey) -> usize {
        let state = self.state.read().await;
        state.chapters.get(key).map_or(0, Vec::len)
    }
}

#[async_trait]
impl CommentStore for InMemoryCommentStore {
    async fn list_chapter(&self, key: &ChapterKey) -> Result<ChapterCommentsPayload, StoreError> {
        let state = self.state.read().await;
        let mut comments_by_para: BTreeMap<String, Vec<RawComment>> = BTreeMap::new();
        for comment in state.chapters.get(key).into_iter().flatten() {
            comments_by_para
                .entry(comment.recorded_index.to_string())
                .or_default()
                .push(RawComment::from(comment));
        }
        Ok(ChapterCommentsPayload { comments_by_para })
    }

    async fn create(
        &self,
        credential: &Credential,
        req: CreateCommentRequest,
    ) -> Result<Comment, StoreError> {
        req.validate(self.max_content_bytes)?;
        let viewer = Viewer::from(credential);
        let Some(user_id) = self.capability.user_id(credential) else {
            return Err(StoreError::Forbidden("sign in to comment".into()));
        };

        let mut state = self.state.write().await;
        if state
            .banned
            .contains(&(req.chapter.site_id.clone(), user_id.clone()))
        {
            warn!(chapter = %req.chapter, user_id = %user_id, "store_create_banned");
            return Err(StoreError::Banned);
        }

        let CreateCommentRequest {
            chapter,
            para_index,
            content,
            context_text,
            parent_id,
        } = req;
        let thread = state.chapters.entry(chapter.clone()).or_default();
        if let Some(parent) = parent_id.as_deref() {
            if !thread.iter().any(|c| c.id == parent) {
                return Err(StoreError::NotFound(parent.to_string()));
            }
        }

        let comment = Comment {
            id: Uuid::new_v4().to_string(),
            recorded_index: para_index,
            context_text: context_text.filter(|ctx| !ctx.is_empty()),
            content,
            author_name: viewer.display_name.clone(),
            author_id: Some(user_id),
            created_at: Some(Utc::now()),
            likes: 0,
            parent_id,
            replies: Vec::new(),
        };
        thread.push(comment.clone());
        info!(
            chapter = %chapter,
            comment_id = %comment.id,
            para_index = comment.recorded_index,
            reply = comment.is_reply(),
            "store_create_success"
        );
        Ok(comment)
    }

    async fn delete(
        &self,
        credential: &Credential,
        req: DeleteCommentRequest,
    ) -> Result<(), StoreError> {
        let mut credential = credential.clone();
        if req.edit_token.is_some() {
            credential.edit_token = req.edit_token.clone();
        }
        let privileged = self.capability.is_privileged(&credential);
        let user_id = self.capability.user_id(&credential);

        let mut state = self.state.write().await;
        let thread = state
            .chapters
            .get_mut(&req.chapter)
            .ok_or_else(|| StoreError::NotFound(req.comment_id.clone()))?;
        let target = thread
            .iter()
            .find(|c| c.id == req.comment_id)
            .ok_or_else(|| StoreError::NotFound(req.comment_id.clone()))?;

        let own = user_id.is_some() && target.author_id == user_id;
        if !privileged && !own {
            return Err(StoreError::Forbidden(
                "only admins, the author, or the commenter may delete".into(),
            ));
        }

        // Replies go with their parent.
        let mut doomed: HashSet<String> = HashSet::from([req.comment_id.clone()]);
        loop {
            let before = doomed.len();
            for comment in thread.iter() {
                if comment
                    .parent_id
                    .as_ref()
                    .is_some_and(|parent| doomed.contains(parent))
                {
                    doomed.insert(comment.id.clone());
                }
            }
            if doomed.len() == before {
                break;
            }
        }
        thread.retain(|c| !doomed.contains(&c.id));
        info!(
            chapter = %req.chapter,
            comment_id = %req.comment_id,
            removed = doomed.len(),
            "store_delete_success"
        );
        Ok(())
    }

    async fn like(
        &self,
        credential: &Credential,
        req: LikeCommentRequest,
    ) -> Result<u64, StoreError> {
        let Some(user_id) = self.capability.user_id(credential) else {
            return Err(StoreError::Forbidden("sign in to like".into()));
        };

        let mut state = self.state.write().await;
        let StoreState { chapters, likes, .. } = &mut *state;
        let comment = chapters
            .get_mut(&req.chapter)
            .and_then(|thread| thread.iter_mut().find(|c| c.id == req.comment_id))
            .ok_or_else(|| StoreError::NotFound(req.comment_id.clone()))?;

        if !likes.insert((req.chapter.clone(), req.comment_id.clone(), user_id)) {
            return Err(StoreError::AlreadyLiked);
        }
        comment.likes += 1;
        Ok(comment.likes)
    }

    async fn ban(&self, credential: &Credential, req: BanUserRequest) -> Result<(), StoreError> {
        if !self.capability.can_moderate(credential) {
            return Err(StoreError::Forbidden("only admins and the document author may ban".into()));
        }
        if self.capability.user_id(credential).as_deref() == Some(req.target_user_id.as_str()) {
            return Err(StoreError::Forbidden("cannot ban yourself".into()));
        }
        let mut state = self.state.write().await;
        state
            .banned
            .insert((req.site_id.clone(), req.target_user_id.clone()));
        info!(
            site_id = %req.site_id,
            target_user_id = %req.target_user_id,
            reason = %req.reason,
            "store_ban_success"
        );
        Ok(())
    }
}
