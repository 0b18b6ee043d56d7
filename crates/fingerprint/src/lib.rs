//! Paragraph fingerprint layer.
//!
//! A fingerprint is a short prefix of a paragraph's visible text. Comments
//! record the fingerprint of the paragraph they were written against, so a
//! later render of the document can find that paragraph again even if it
//! moved.
//!
//! ## What we do
//!
//! - Strip UI-injected fragments (count badges, literal markers) from the text
//! - Recover visible text from rendered markup when asked to
//! - Trim leading/trailing whitespace
//! - Cut the result to the first 32 characters (configurable)
//! - Digest a whole chapter's fingerprints so callers can detect reshaping
//!
//! ## What we don't do
//!
//! No case folding, no whitespace collapsing, no Unicode normalization.
//! Comparison downstream is exact-prefix, and any normalization here would
//! have to be replayed identically on every stored fingerprint.
//!
//! ## Pure function guarantee
//!
//! No I/O, no clock, no locale. The paragraph text is only read.

mod config;
mod document;
mod error;
mod extract;
mod hash;
mod strip;

pub use crate::config::{
    FingerprintConfig, InjectedFragment, TextFormat, DEFAULT_BADGE_CLASS, DEFAULT_MAX_CHARS,
};
pub use crate::document::ParagraphFingerprints;
pub use crate::error::FingerprintError;
pub use crate::extract::{char_prefix, extract, extract_fingerprint, is_match};
pub use crate::hash::snapshot_digest;
pub use crate::strip::strip_injected;
