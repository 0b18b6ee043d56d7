//! Configuration types for comment ingest.
//!
//! [`CommentIngestConfig`] controls how strictly raw store records are
//! checked before they are handed to the anchoring core.
//!
//! # Quick Start
//!
//! ```rust
//! use comments::CommentIngestConfig;
//!
//! let config = CommentIngestConfig::default();
//! config.validate().expect("default config is valid");
//! assert!(config.lenient);
//! ```
use serde::{Deserialize, Serialize};

use crate::error::CommentError;

/// Runtime configuration for comment ingest.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "strip_control_chars": true,
///   "max_content_bytes": 65536,
///   "lenient": true
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CommentIngestConfig {
    /// Version of the ingest rules. Must be >= 1.
    ///
    /// Default: `1`
    #[serde(default = "CommentIngestConfig::default_version")]
    pub version: u32,

    /// Remove control characters from ids and author fields.
    ///
    /// Content and context fingerprints are never rewritten: the fingerprint
    /// is compared byte-for-byte against paragraph text.
    ///
    /// Default: `true`
    #[serde(default = "CommentIngestConfig::default_strip_control_chars")]
    pub strip_control_chars: bool,

    /// Maximum content size in bytes. `None` disables the check.
    ///
    /// Default: `None`
    #[serde(default)]
    pub max_content_bytes: Option<usize>,

    /// When true, a malformed record is logged and skipped instead of failing
    /// the whole chapter. Rejections are reported in
    /// [`IngestReport::rejected`](crate::IngestReport::rejected).
    ///
    /// Default: `true`
    #[serde(default = "CommentIngestConfig::default_lenient")]
    pub lenient: bool,
}

impl CommentIngestConfig {
    fn default_version() -> u32 {
        1
    }

    fn default_strip_control_chars() -> bool {
        true
    }

    fn default_lenient() -> bool {
        true
    }

    /// Strict variant: the first malformed record fails the chapter.
    pub fn strict() -> Self {
        Self {
            lenient: false,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), CommentError> {
        if self.version == 0 {
            return Err(CommentError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.max_content_bytes == Some(0) {
            return Err(CommentError::InvalidConfig(
                "max_content_bytes must be greater than zero when set".into(),
            ));
        }
        Ok(())
    }
}

impl Default for CommentIngestConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            strip_control_chars: Self::default_strip_control_chars(),
            max_content_bytes: None,
            lenient: Self::default_lenient(),
        }
    }
}
