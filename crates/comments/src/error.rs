//! Error types produced by the comments crate.
//!
//! Every variant describes a record the store handed back that the anchoring
//! core cannot accept. Ingest rejects these before reconciliation so the core
//! only ever sees well-typed comments.
//!
//! | Error | Description |
//! |-------|-------------|
//! | [`MissingId`](CommentError::MissingId) | Record has no usable id |
//! | [`InvalidIndex`](CommentError::InvalidIndex) | Paragraph index missing, negative, or not a number |
//! | [`EmptyContent`](CommentError::EmptyContent) | Content empty after trimming |
//! | [`ContentTooLarge`](CommentError::ContentTooLarge) | Content exceeds the configured limit |
//! | [`InvalidTimestamp`](CommentError::InvalidTimestamp) | `createdAt` not RFC 3339 or epoch millis |
//! | [`InvalidLikes`](CommentError::InvalidLikes) | Negative like count |
//! | [`Duplicate`](CommentError::Duplicate) | Same id seen twice in one payload |
//! | [`InvalidPayload`](CommentError::InvalidPayload) | Payload JSON does not parse |
//! | [`InvalidConfig`](CommentError::InvalidConfig) | Ingest configuration rejected |
//!
//! # Examples
//!
//! ```rust
//! use comments::CommentError;
//!
//! fn describe(err: &CommentError) -> String {
//!     match err {
//!         CommentError::EmptyContent { id } => format!("comment {id} has no text"),
//!         other => other.to_string(),
//!     }
//! }
//!
//! let err = CommentError::EmptyContent { id: "c-1".into() };
//! assert_eq!(describe(&err), "comment c-1 has no text");
//! ```
use thiserror::Error;

/// Errors that can occur while ingesting comment records.
///
/// Cloneable and comparable so tests and callers can match precisely.
/// Marked `#[non_exhaustive]`; include a catch-all arm when matching.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CommentError {
    #[error("comment record has no id")]
    MissingId,

    #[error("invalid paragraph index: {0}")]
    InvalidIndex(String),

    #[error("comment {id} has empty content")]
    EmptyContent { id: String },

    #[error("comment {id} content is {len} bytes, limit is {limit}")]
    ContentTooLarge { id: String, len: usize, limit: usize },

    #[error("comment {id} has invalid timestamp: {reason}")]
    InvalidTimestamp { id: String, reason: String },

    #[error("comment {id} has negative like count {likes}")]
    InvalidLikes { id: String, likes: i64 },

    #[error("duplicate comment id {0}")]
    Duplicate(String),

    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl CommentError {
    /// Id of the offending record, when the error is tied to one.
    pub fn comment_id(&self) -> Option<&str> {
        match self {
            CommentError::EmptyContent { id }
            | CommentError::ContentTooLarge { id, .. }
            | CommentError::InvalidTimestamp { id, .. }
            | CommentError::InvalidLikes { id, .. } => Some(id),
            CommentError::Duplicate(id) => Some(id),
            _ => None,
        }
    }

    /// Suggested HTTP status for a collaborator that surfaces this error.
    ///
    /// ```rust
    /// use comments::CommentError;
    ///
    /// let err = CommentError::ContentTooLarge { id: "c".into(), len: 10, limit: 5 };
    /// assert_eq!(err.http_status_code(), 413);
    /// assert_eq!(CommentError::MissingId.http_status_code(), 400);
    /// ```
    pub fn http_status_code(&self) -> u16 {
        match self {
            CommentError::ContentTooLarge { .. } => 413,
            CommentError::Duplicate(_) => 409,
            _ => 400,
        }
    }
}
