//! Core data model types for the comments crate.
//!
//! # Type Hierarchy
//!
//! ```text
//! ChapterCommentsPayload          (what the store returns for one chapter)
//! └── comments_by_para: "<idx>" → [RawComment]
//!     RawComment
//!     ├── id: Option<RawId>              ("c-1" or 17)
//!     ├── para_index: Option<i64>
//!     ├── context_text: Option<String>
//!     ├── content: Option<String>
//!     ├── user_id / user_name: Option<String>
//!     ├── created_at: Option<RawTimestamp>  (RFC 3339 or epoch millis)
//!     ├── likes: Option<i64>
//!     ├── parent_id: Option<RawId>
//!     └── replies: Vec<RawComment>       (nested replies, flattened by ingest)
//!
//!         ↓ ingest_chapter()
//!
//! Comment                         (well-typed, flat, immutable to the core)
//! ```
//!
//! All wire shapes use the store's camelCase field names.
use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CommentError;

/// Identifies one chapter in the comment store.
///
/// Missing ids fall back to the same placeholders the widget uses, so a page
/// without explicit ids still gets a stable key.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "camelCase")]
pub struct ChapterKey {
    #[serde(default = "ChapterKey::default_site")]
    pub site_id: String,
    #[serde(default = "ChapterKey::default_work")]
    pub work_id: String,
    #[serde(default = "ChapterKey::default_chapter")]
    pub chapter_id: String,
}

impl ChapterKey {
    pub const DEFAULT_SITE: &'static str = "default-site";
    pub const DEFAULT_WORK: &'static str = "default-work";
    pub const DEFAULT_CHAPTER: &'static str = "default-chapter";

    fn default_site() -> String {
        Self::DEFAULT_SITE.to_string()
    }

    fn default_work() -> String {
        Self::DEFAULT_WORK.to_string()
    }

    fn default_chapter() -> String {
        Self::DEFAULT_CHAPTER.to_string()
    }

    /// Builds a key, substituting the placeholder for any blank component.
    pub fn new(
        site_id: impl Into<String>,
        work_id: impl Into<String>,
        chapter_id: impl Into<String>,
    ) -> Self {
        fn or_default(value: String, fallback: &str) -> String {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                fallback.to_string()
            } else {
                trimmed.to_string()
            }
        }
        Self {
            site_id: or_default(site_id.into(), Self::DEFAULT_SITE),
            work_id: or_default(work_id.into(), Self::DEFAULT_WORK),
            chapter_id: or_default(chapter_id.into(), Self::DEFAULT_CHAPTER),
        }
    }
}

impl Default for ChapterKey {
    fn default() -> Self {
        Self {
            site_id: Self::default_site(),
            work_id: Self::default_work(),
            chapter_id: Self::default_chapter(),
        }
    }
}

impl fmt::Display for ChapterKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.site_id, self.work_id, self.chapter_id)
    }
}

/// A comment anchored to a paragraph.
///
/// `recorded_index` and `context_text` are what the comment remembers about
/// its paragraph from creation time. The anchoring core reads them and never
/// modifies a comment; `replies` is filled only by the tree builder.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: String,
    /// Paragraph index at creation time.
    #[serde(rename = "paraIndex")]
    pub recorded_index: usize,
    /// Fingerprint of the paragraph at creation time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context_text: Option<String>,
    pub content: String,
    #[serde(rename = "userId", default, skip_serializing_if = "Option::is_none")]
    pub author_id: Option<String>,
    #[serde(rename = "userName", default, skip_serializing_if = "Option::is_none")]
    pub author_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub likes: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub replies: Vec<Comment>,
}

impl Comment {
    /// A root comment with only the fields the anchoring core reads.
    pub fn new(
        id: impl Into<String>,
        recorded_index: usize,
        context_text: Option<&str>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            recorded_index,
            context_text: context_text.map(str::to_string),
            content: content.into(),
            author_id: None,
            author_name: None,
            created_at: None,
            likes: 0,
            parent_id: None,
            replies: Vec::new(),
        }
    }

    /// A reply to `parent_id`. Replies carry no fingerprint of their own.
    pub fn reply(
        id: impl Into<String>,
        parent_id: impl Into<String>,
        recorded_index: usize,
        content: impl Into<String>,
    ) -> Self {
        Self {
            parent_id: Some(parent_id.into()),
            ..Self::new(id, recorded_index, None, content)
        }
    }

    /// Captured fingerprint, if one was recorded and is non-empty.
    pub fn context(&self) -> Option<&str> {
        self.context_text.as_deref().filter(|ctx| !ctx.is_empty())
    }

    pub fn is_reply(&self) -> bool {
        self.parent_id.is_some()
    }

    /// Name to show for the author: user name, then user id, then anonymous.
    pub fn display_name(&self) -> &str {
        self.author_name
            .as_deref()
            .or(self.author_id.as_deref())
            .unwrap_or("anonymous")
    }
}

/// Comment id as the store may send it: string or number.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawId {
    Text(String),
    Number(i64),
}

impl From<RawId> for String {
    fn from(value: RawId) -> Self {
        match value {
            RawId::Text(text) => text,
            RawId::Number(n) => n.to_string(),
        }
    }
}

/// Creation time as the store may send it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum RawTimestamp {
    /// Epoch milliseconds.
    Millis(i64),
    /// RFC 3339 text.
    Text(String),
}

impl RawTimestamp {
    pub fn parse(&self) -> Result<DateTime<Utc>, String> {
        match self {
            RawTimestamp::Millis(ms) => DateTime::<Utc>::from_timestamp_millis(*ms)
                .ok_or_else(|| format!("epoch millis {ms} out of range")),
            RawTimestamp::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|err| err.to_string()),
        }
    }
}

/// A comment record exactly as the store returned it.
///
/// Every field is optional here; [`ingest_chapter`](crate::ingest_chapter)
/// decides what is acceptable.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct RawComment {
    #[serde(default)]
    pub id: Option<RawId>,
    #[serde(default)]
    pub para_index: Option<i64>,
    #[serde(default)]
    pub context_text: Option<String>,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub created_at: Option<RawTimestamp>,
    #[serde(default)]
    pub likes: Option<i64>,
    #[serde(default)]
    pub parent_id: Option<RawId>,
    #[serde(default)]
    pub replies: Vec<RawComment>,
}

impl From<&Comment> for RawComment {
    /// Store shape of an accepted comment. Replies are emitted flat, with
    /// `parentId` set, rather than nested.
    fn from(comment: &Comment) -> Self {
        Self {
            id: Some(RawId::Text(comment.id.clone())),
            para_index: i64::try_from(comment.recorded_index).ok(),
            context_text: comment.context_text.clone(),
            content: Some(comment.content.clone()),
            user_id: comment.author_id.clone(),
            user_name: comment.author_name.clone(),
            created_at: comment
                .created_at
                .map(|ts| RawTimestamp::Text(ts.to_rfc3339())),
            likes: i64::try_from(comment.likes).ok(),
            parent_id: comment.parent_id.clone().map(RawId::Text),
            replies: Vec::new(),
        }
    }
}

/// The store's list-by-chapter response.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChapterCommentsPayload {
    #[serde(default)]
    pub comments_by_para: BTreeMap<String, Vec<RawComment>>,
}

impl ChapterCommentsPayload {
    /// Parse a response body.
    pub fn from_json(body: &str) -> Result<Self, CommentError> {
        serde_json::from_str(body).map_err(|err| CommentError::InvalidPayload(err.to_string()))
    }

    /// Total records, nested replies included.
    pub fn record_count(&self) -> usize {
        fn count(records: &[RawComment]) -> usize {
            records.iter().map(|r| 1 + count(&r.replies)).sum()
        }
        self.comments_by_para.values().map(|list| count(list)).sum()
    }
}
