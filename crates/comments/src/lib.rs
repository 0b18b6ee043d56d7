//! Comment ingest layer.
//!
//! This is where comment records coming back from the store are checked
//! before the anchoring core sees them. The core assumes well-typed input, so
//! anything malformed stops here.
//!
//! ## What we do here
//!
//! - **Parse the store payload** - `commentsByPara` buckets keyed by paragraph
//!   index, as strings
//! - **Flatten nested replies** - replies the store nested under their parent
//!   become flat comments with `parent_id` set
//! - **Validate** - ids, indices, content, timestamps, like counts, duplicates
//! - **Sanitize identity fields** - control characters stripped from ids and
//!   author fields; content and fingerprints are left byte-exact
//! - **Log** - structured `tracing` events for accepted and rejected records
//!
//! ## Main entry point
//!
//! Call [`ingest_chapter`] with a [`ChapterCommentsPayload`] and a
//! [`CommentIngestConfig`], get back an [`IngestReport`].
//!
//! ## Example
//!
//! ```
//! use comments::{ingest_chapter, ChapterCommentsPayload, CommentIngestConfig};
//!
//! let payload = ChapterCommentsPayload::from_json(r#"{
//!     "commentsByPara": {
//!         "2": [ { "id": "c-1", "paraIndex": 2, "contextText": "Gamma", "content": "Nice",
//!                  "replies": [ { "id": "c-2", "content": "Agreed" } ] } ]
//!     }
//! }"#).unwrap();
//!
//! let report = ingest_chapter(payload, &CommentIngestConfig::default()).unwrap();
//! assert_eq!(report.comments.len(), 2);
//! assert_eq!(report.comments[1].parent_id.as_deref(), Some("c-1"));
//! assert_eq!(report.comments[1].recorded_index, 2);
//! ```
use std::collections::HashSet;
use std::time::Instant;

use tracing::{info, warn};

mod config;
mod error;
mod requests;
mod sanitize;
mod types;

use crate::sanitize::sanitize_optional_string;

pub use crate::config::CommentIngestConfig;
pub use crate::error::CommentError;
pub use crate::requests::{
    BanUserRequest, CreateCommentRequest, DeleteCommentRequest, LikeCommentRequest,
    StoreResponse, ALREADY_LIKED,
};
pub use crate::types::{
    ChapterCommentsPayload, ChapterKey, Comment, RawComment, RawId, RawTimestamp,
};

/// Outcome of ingesting one chapter payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Accepted comments, flat, in bucket order then store order, each
    /// parent before its nested replies.
    pub comments: Vec<Comment>,
    /// Records skipped in lenient mode.
    pub rejected: Vec<CommentError>,
}

/// Ingest a whole chapter payload.
///
/// Buckets are visited in ascending paragraph order (the store's string keys
/// are sorted numerically, not lexically). Inside a bucket the store's order
/// is kept. A nested reply inherits its parent's id as `parent_id` and its
/// parent's paragraph index when it carries none of its own.
///
/// In strict mode the first malformed record fails the call. In lenient mode
/// it is logged, recorded in [`IngestReport::rejected`], and skipped; its
/// nested replies are still ingested and will surface as orphaned replies.
pub fn ingest_chapter(
    payload: ChapterCommentsPayload,
    cfg: &CommentIngestConfig,
) -> Result<IngestReport, CommentError> {
    cfg.validate()?;
    let start = Instant::now();
    let mut report = IngestReport::default();

    let mut buckets: Vec<(usize, Vec<RawComment>)> =
        Vec::with_capacity(payload.comments_by_para.len());
    for (key, records) in payload.comments_by_para {
        match parse_bucket_key(&key) {
            Ok(index) => buckets.push((index, records)),
            Err(err) => reject(err, cfg, &mut report.rejected, start)?,
        }
    }
    buckets.sort_by_key(|(index, _)| *index);

    let mut seen: HashSet<String> = HashSet::new();
    for (bucket_index, records) in buckets {
        // Depth-first over nested replies with an explicit stack, so deep
        // threads cannot exhaust the call stack.
        let mut stack: Vec<(RawComment, Option<String>, usize)> = records
            .into_iter()
            .rev()
            .map(|raw| (raw, None, bucket_index))
            .collect();

        while let Some((mut raw, parent_hint, index_hint)) = stack.pop() {
            let nested = std::mem::take(&mut raw.replies);
            let (parent_for_nested, index_for_nested) =
                match ingest_record(raw, parent_hint, Some(index_hint), cfg) {
                    Ok(comment) => {
                        if seen.insert(comment.id.clone()) {
                            let hints = (Some(comment.id.clone()), comment.recorded_index);
                            report.comments.push(comment);
                            hints
                        } else {
                            // Replies under a duplicate must not attach to the
                            // earlier record that owns this id.
                            let index = comment.recorded_index;
                            reject(
                                CommentError::Duplicate(comment.id),
                                cfg,
                                &mut report.rejected,
                                start,
                            )?;
                            (None, index)
                        }
                    }
                    Err(err) => {
                        reject(err, cfg, &mut report.rejected, start)?;
                        (None, index_hint)
                    }
                };

            for reply in nested.into_iter().rev() {
                stack.push((reply, parent_for_nested.clone(), index_for_nested));
            }
        }
    }

    info!(
        accepted = report.comments.len(),
        rejected = report.rejected.len(),
        elapsed_micros = start.elapsed().as_micros(),
        "comments_ingest_success"
    );
    Ok(report)
}

/// Ingest a single record. Nested `replies` are ignored; use
/// [`ingest_chapter`] to flatten them.
pub fn ingest_comment(raw: RawComment, cfg: &CommentIngestConfig) -> Result<Comment, CommentError> {
    ingest_record(raw, None, None, cfg)
}

fn reject(
    err: CommentError,
    cfg: &CommentIngestConfig,
    rejected: &mut Vec<CommentError>,
    start: Instant,
) -> Result<(), CommentError> {
    warn!(
        error = %err,
        comment_id = ?err.comment_id(),
        lenient = cfg.lenient,
        elapsed_micros = start.elapsed().as_micros(),
        "comments_ingest_rejected"
    );
    if cfg.lenient {
        rejected.push(err);
        Ok(())
    } else {
        Err(err)
    }
}

fn parse_bucket_key(key: &str) -> Result<usize, CommentError> {
    key.trim()
        .parse::<usize>()
        .map_err(|_| CommentError::InvalidIndex(format!("bucket key {key:?}")))
}

fn ingest_record(
    raw: RawComment,
    parent_hint: Option<String>,
    index_hint: Option<usize>,
    cfg: &CommentIngestConfig,
) -> Result<Comment, CommentError> {
    let RawComment {
        id,
        para_index,
        context_text,
        content,
        user_id,
        user_name,
        created_at,
        likes,
        parent_id,
        replies: _,
    } = raw;

    let id = sanitize_optional_string(id.map(String::from), cfg.strip_control_chars)
        .ok_or(CommentError::MissingId)?;

    let recorded_index = match para_index {
        Some(index) if index >= 0 => usize::try_from(index)
            .map_err(|_| CommentError::InvalidIndex(format!("comment {id}: {index}")))?,
        Some(index) => {
            return Err(CommentError::InvalidIndex(format!("comment {id}: {index}")));
        }
        None => index_hint
            .ok_or_else(|| CommentError::InvalidIndex(format!("comment {id}: missing")))?,
    };

    let content = content.unwrap_or_default();
    if content.trim().is_empty() {
        return Err(CommentError::EmptyContent { id });
    }
    if let Some(limit) = cfg.max_content_bytes {
        if content.len() > limit {
            return Err(CommentError::ContentTooLarge {
                len: content.len(),
                id,
                limit,
            });
        }
    }

    let created_at = match created_at {
        Some(ts) => Some(
            ts.parse()
                .map_err(|reason| CommentError::InvalidTimestamp { id: id.clone(), reason })?,
        ),
        None => None,
    };

    let likes = match likes {
        Some(n) if n < 0 => return Err(CommentError::InvalidLikes { id, likes: n }),
        Some(n) => n.unsigned_abs(),
        None => 0,
    };

    let parent_id = sanitize_optional_string(parent_id.map(String::from), cfg.strip_control_chars)
        .or(parent_hint)
        .filter(|parent| *parent != id);

    Ok(Comment {
        context_text: context_text.filter(|ctx| !ctx.is_empty()),
        author_id: sanitize_optional_string(user_id, cfg.strip_control_chars),
        author_name: sanitize_optional_string(user_name, cfg.strip_control_chars),
        id,
        recorded_index,
        content,
        created_at,
        likes,
        parent_id,
        replies: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(id: &str, index: i64, content: &str) -> RawComment {
        RawComment {
            id: Some(RawId::Text(id.into())),
            para_index: Some(index),
            content: Some(content.into()),
            ..Default::default()
        }
    }

    fn payload(json: &str) -> ChapterCommentsPayload {
        ChapterCommentsPayload::from_json(json).expect("payload parses")
    }

    #[test]
    fn single_record_round_trip() {
        let mut record = raw("c-1", 3, "Hello");
        record.context_text = Some("It was a dark".into());
        record.likes = Some(4);
        record.user_name = Some(" Ada\u{1b} ".into());

        let comment = ingest_comment(record, &CommentIngestConfig::default()).expect("valid");
        assert_eq!(comment.id, "c-1");
        assert_eq!(comment.recorded_index, 3);
        assert_eq!(comment.context(), Some("It was a dark"));
        assert_eq!(comment.likes, 4);
        assert_eq!(comment.author_name.as_deref(), Some("Ada"));
    }

    #[test]
    fn context_is_not_rewritten() {
        let mut record = raw("c-1", 0, "x");
        record.context_text = Some("  Leading space\tand tab".into());
        let comment = ingest_comment(record, &CommentIngestConfig::default()).expect("valid");
        assert_eq!(comment.context_text.as_deref(), Some("  Leading space\tand tab"));
    }

    #[test]
    fn malformed_records_rejected() {
        let cfg = CommentIngestConfig::default();

        let mut no_id = raw("", 0, "x");
        no_id.id = None;
        assert_eq!(ingest_comment(no_id, &cfg), Err(CommentError::MissingId));

        assert!(matches!(
            ingest_comment(raw("c", -1, "x"), &cfg),
            Err(CommentError::InvalidIndex(_))
        ));

        let mut no_index = raw("c", 0, "x");
        no_index.para_index = None;
        assert!(matches!(
            ingest_comment(no_index, &cfg),
            Err(CommentError::InvalidIndex(_))
        ));

        assert!(matches!(
            ingest_comment(raw("c", 0, "   "), &cfg),
            Err(CommentError::EmptyContent { .. })
        ));

        let mut negative = raw("c", 0, "x");
        negative.likes = Some(-2);
        assert!(matches!(
            ingest_comment(negative, &cfg),
            Err(CommentError::InvalidLikes { likes: -2, .. })
        ));

        let mut bad_time = raw("c", 0, "x");
        bad_time.created_at = Some(RawTimestamp::Text("soon".into()));
        assert!(matches!(
            ingest_comment(bad_time, &cfg),
            Err(CommentError::InvalidTimestamp { .. })
        ));
    }

    #[test]
    fn content_limit_enforced() {
        let cfg = CommentIngestConfig {
            max_content_bytes: Some(4),
            ..Default::default()
        };
        assert!(ingest_comment(raw("c", 0, "four"), &cfg).is_ok());
        assert!(matches!(
            ingest_comment(raw("c", 0, "fives"), &cfg),
            Err(CommentError::ContentTooLarge { len: 5, limit: 4, .. })
        ));
    }

    #[test]
    fn self_parent_dropped() {
        let mut record = raw("c", 0, "x");
        record.parent_id = Some(RawId::Text("c".into()));
        let comment = ingest_comment(record, &CommentIngestConfig::default()).expect("valid");
        assert_eq!(comment.parent_id, None);
    }

    #[test]
    fn buckets_sorted_numerically() {
        let report = ingest_chapter(
            payload(
                r#"{ "commentsByPara": {
                    "10": [ { "id": "ten", "paraIndex": 10, "content": "x" } ],
                    "2":  [ { "id": "two", "paraIndex": 2, "content": "x" } ]
                } }"#,
            ),
            &CommentIngestConfig::default(),
        )
        .expect("ingest");
        let ids: Vec<&str> = report.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["two", "ten"]);
    }

    #[test]
    fn nested_replies_flattened_in_order() {
        let report = ingest_chapter(
            payload(
                r#"{ "commentsByPara": { "1": [
                    { "id": "a", "paraIndex": 1, "content": "root a", "replies": [
                        { "id": "a1", "content": "reply", "replies": [
                            { "id": "a1x", "content": "deep" } ] },
                        { "id": "a2", "content": "reply 2" } ] },
                    { "id": "b", "paraIndex": 1, "content": "root b" }
                ] } }"#,
            ),
            &CommentIngestConfig::default(),
        )
        .expect("ingest");

        let ids: Vec<&str> = report.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "a1", "a1x", "a2", "b"]);
        let parents: Vec<Option<&str>> =
            report.comments.iter().map(|c| c.parent_id.as_deref()).collect();
        assert_eq!(parents, vec![None, Some("a"), Some("a1"), Some("a"), None]);
        assert!(report.comments.iter().all(|c| c.recorded_index == 1));
    }

    #[test]
    fn missing_index_falls_back_to_bucket_key() {
        let report = ingest_chapter(
            payload(r#"{ "commentsByPara": { "7": [ { "id": "x", "content": "y" } ] } }"#),
            &CommentIngestConfig::default(),
        )
        .expect("ingest");
        assert_eq!(report.comments[0].recorded_index, 7);
    }

    #[test]
    fn lenient_mode_skips_and_reports() {
        let report = ingest_chapter(
            payload(
                r#"{ "commentsByPara": {
                    "0": [ { "id": "ok", "content": "fine" },
                           { "id": "blank", "content": " " },
                           { "id": "ok", "content": "dup" } ],
                    "oops": [ { "id": "z", "content": "q" } ]
                } }"#,
            ),
            &CommentIngestConfig::default(),
        )
        .expect("lenient ingest succeeds");

        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.rejected.len(), 3);
        assert!(report
            .rejected
            .contains(&CommentError::Duplicate("ok".into())));
        assert!(report
            .rejected
            .iter()
            .any(|e| matches!(e, CommentError::InvalidIndex(_))));
    }

    #[test]
    fn strict_mode_fails_fast() {
        let result = ingest_chapter(
            payload(r#"{ "commentsByPara": { "0": [ { "id": "blank", "content": "" } ] } }"#),
            &CommentIngestConfig::strict(),
        );
        assert_eq!(
            result,
            Err(CommentError::EmptyContent {
                id: "blank".into()
            })
        );
    }

    #[test]
    fn rejected_parent_leaves_orphaned_replies() {
        let report = ingest_chapter(
            payload(
                r#"{ "commentsByPara": { "3": [
                    { "content": "no id", "replies": [ { "id": "r", "content": "kept" } ] }
                ] } }"#,
            ),
            &CommentIngestConfig::default(),
        )
        .expect("ingest");
        assert_eq!(report.rejected, vec![CommentError::MissingId]);
        assert_eq!(report.comments.len(), 1);
        assert_eq!(report.comments[0].id, "r");
        assert_eq!(report.comments[0].parent_id, None);
        assert_eq!(report.comments[0].recorded_index, 3);
    }

    #[test]
    fn replies_under_duplicate_become_roots() {
        let report = ingest_chapter(
            payload(
                r#"{ "commentsByPara": {
                    "0": [ { "id": "a", "content": "first" } ],
                    "2": [ { "id": "a", "content": "second", "replies": [
                        { "id": "r", "content": "answer to the second" }
                    ] } ]
                } }"#,
            ),
            &CommentIngestConfig::default(),
        )
        .expect("ingest");
        assert_eq!(report.rejected, vec![CommentError::Duplicate("a".into())]);
        let ids: Vec<&str> = report.comments.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a", "r"]);
        assert_eq!(report.comments[1].parent_id, None);
        assert_eq!(report.comments[1].recorded_index, 2);
    }
}
