//! Workspace umbrella crate for paranote, paragraph-anchored comments.
//!
//! This crate stitches the fingerprint, comment ingest and anchoring layers
//! together behind one dependency, and adds the pieces a reader widget needs
//! around them: a YAML config, a per-chapter [`ChapterSession`], the
//! [`CommentStore`] contract with an in-memory implementation, and advisory
//! viewer capabilities.
//!
//! ```
//! use paranote::{Comment, counts, resolve};
//!
//! let before = Comment::new("c1", 0, Some("Gamma text"), "still here?");
//! let mapping = resolve(&["Alpha text", "Beta text", "Gamma text"], &[before]);
//! assert_eq!(counts(&mapping).get(2), 1);
//! ```

pub mod capability;
pub mod config;
pub mod session;
pub mod store;

pub use anchor::{
    AnchorConfig, AnchorError, AnchorMetrics, AnchorOutcome, CommentNode, OrphanPolicy,
    ParagraphCounts, Placement, Resolution, ResolveStats, ResolvedMapping, Resolver, build_tree,
    counts, resolve, set_anchor_metrics,
};
pub use comments::{
    ALREADY_LIKED, BanUserRequest, ChapterCommentsPayload, ChapterKey, Comment, CommentError,
    CommentIngestConfig, CreateCommentRequest, DeleteCommentRequest, IngestReport,
    LikeCommentRequest, RawComment, RawId, RawTimestamp, StoreResponse, ingest_chapter,
    ingest_comment,
};
pub use fingerprint::{
    DEFAULT_BADGE_CLASS, DEFAULT_MAX_CHARS, FingerprintConfig, FingerprintError,
    InjectedFragment, ParagraphFingerprints, TextFormat, extract, extract_fingerprint, is_match,
    snapshot_digest, strip_injected,
};

pub use crate::capability::{CapabilityCheck, Claims, ClaimsCapability, Credential, Viewer};
pub use crate::config::{ConfigLoadError, ParanoteConfig};
pub use crate::session::{ChapterSession, SessionError};
pub use crate::store::{CommentStore, InMemoryCommentStore, StoreError};
