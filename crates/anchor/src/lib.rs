//! # Paragraph anchoring (`anchor`)
//!
//! ## Purpose
//!
//! Comments are written against a paragraph. When the document is edited,
//! paragraphs move, so the index a comment remembers may now point somewhere
//! else. `anchor` reconciles the stored comments with the current paragraph
//! list and groups them by where they belong now.
//!
//! Each comment carries a short fingerprint of its paragraph's text captured
//! at creation time. Resolution tries the recorded index first, then scans the
//! document for the first paragraph whose fingerprint starts with the captured
//! one. If nothing matches the comment is kept, never dropped.
//!
//! ## Core Types
//!
//! - [`Resolver`]: runs reconciliation under an [`AnchorConfig`] and a
//!   fingerprint configuration.
//! - [`ResolvedMapping`]: current paragraph index to comments.
//! - [`Resolution`]: the mapping plus a [`Placement`] per comment and
//!   [`ResolveStats`].
//! - [`CommentNode`]: a comment with its replies, produced by [`build_tree`].
//! - [`ParagraphCounts`]: thread counts per paragraph, produced by [`counts`].
//!
//! ## Example Usage
//!
//! ```
//! use anchor::{build_tree, counts, resolve};
//! use comments::Comment;
//!
//! let paragraphs = ["Alpha text", "Gamma text", "Beta text"];
//! let comments = vec![
//!     Comment::new("c1", 0, Some("Gamma"), "followed its paragraph"),
//!     Comment::reply("c2", "c1", 0, "so did I"),
//! ];
//!
//! let mapping = resolve(&paragraphs, &comments);
//! let counts = counts(&mapping);
//! assert_eq!(counts.get(1), 1);
//! assert_eq!(counts.thread_total(1), 2);
//!
//! let threads = build_tree(mapping.get(1));
//! assert_eq!(threads[0].replies[0].comment.id, "c2");
//! ```
//!
//! ## Observability
//!
//! Every run emits an `anchor_resolve_success` `tracing` event with outcome
//! tallies and `elapsed_micros`; relocations and orphans emit `debug!` events.
//! Install an [`AnchorMetrics`] implementation via [`set_anchor_metrics`] to
//! receive the same numbers programmatically.

mod config;
mod counts;
mod metrics;
mod resolver;
mod tree;
mod types;

pub use crate::config::{AnchorConfig, OrphanPolicy};
pub use crate::counts::{counts, ParagraphCounts};
pub use crate::metrics::{set_anchor_metrics, AnchorMetrics};
pub use crate::resolver::{resolve, Resolver};
pub use crate::tree::{build_tree, CommentNode};
pub use crate::types::{
    AnchorError, AnchorOutcome, Placement, Resolution, ResolveStats, ResolvedMapping,
};
