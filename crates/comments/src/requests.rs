//! Request and response shapes of the comment store API.
//!
//! The store itself lives elsewhere; these types only pin down the JSON the
//! widget exchanges with it so both sides agree on field names.
use serde::{Deserialize, Serialize};

use crate::error::CommentError;
use crate::types::ChapterKey;

/// Error code the store returns when a user likes the same comment twice.
pub const ALREADY_LIKED: &str = "already_liked";

/// `POST /api/v1/comments`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentRequest {
    #[serde(flatten)]
    pub chapter: ChapterKey,
    pub para_index: usize,
    pub content: String,
    /// Fingerprint of the paragraph at creation time. Absent for replies.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl CreateCommentRequest {
    /// Content must be non-blank and, when a limit is given, within it.
    pub fn validate(&self, max_content_bytes: Option<usize>) -> Result<(), CommentError> {
        if self.content.trim().is_empty() {
            return Err(CommentError::EmptyContent {
                id: "<new>".into(),
            });
        }
        if let Some(limit) = max_content_bytes {
            let len = self.content.len();
            if len > limit {
                return Err(CommentError::ContentTooLarge {
                    id: "<new>".into(),
                    len,
                    limit,
                });
            }
        }
        Ok(())
    }
}

/// `DELETE /api/v1/comments`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DeleteCommentRequest {
    #[serde(flatten)]
    pub chapter: ChapterKey,
    pub comment_id: String,
    /// Document author's edit token, sent when the viewer is the author.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit_token: Option<String>,
}

/// `POST /api/v1/comments/like`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct LikeCommentRequest {
    #[serde(flatten)]
    pub chapter: ChapterKey,
    pub comment_id: String,
}

/// `POST /api/v1/ban`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BanUserRequest {
    pub site_id: String,
    pub target_user_id: String,
    #[serde(default)]
    pub reason: String,
}

/// Generic store reply. Which fields are set depends on the endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StoreResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// New like count, set by the like endpoint.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
}

impl StoreResponse {
    pub fn ok() -> Self {
        Self {
            success: true,
            ..Self::default()
        }
    }

    pub fn failed(code: impl Into<String>) -> Self {
        Self {
            success: false,
            error: Some(code.into()),
            likes: None,
        }
    }

    pub fn is_already_liked(&self) -> bool {
        self.error.as_deref() == Some(ALREADY_LIKED)
    }
}
