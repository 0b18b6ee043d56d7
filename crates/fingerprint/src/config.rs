//! Configuration types for paragraph fingerprint extraction.
//!
//! This module defines [`FingerprintConfig`], which controls how a paragraph's
//! rendered text is cleaned of UI-injected fragments and cut down to a short
//! prefix signature.
//!
//! # Versioning
//!
//! The `version` field is folded into [`snapshot_digest`](crate::snapshot_digest)
//! so digests computed under different extraction rules never collide. Any
//! change to extraction behavior must come with a version bump, otherwise
//! fingerprints stored with old comments silently stop matching.
//!
//! # Examples
//!
//! ## Default Configuration
//!
//! ```rust
//! use fingerprint::{FingerprintConfig, TextFormat};
//!
//! let config = FingerprintConfig::default();
//! assert_eq!(config.version, 1);
//! assert_eq!(config.max_chars, 32);
//! assert_eq!(config.format, TextFormat::Plain);
//! ```
//!
//! ## Rendered Markup With A Badge
//!
//! ```rust
//! use fingerprint::{FingerprintConfig, InjectedFragment, TextFormat};
//!
//! let config = FingerprintConfig {
//!     format: TextFormat::Markup,
//!     injected: vec![InjectedFragment::element("na-comment-count")],
//!     ..Default::default()
//! };
//! assert!(config.validate().is_ok());
//! ```

use serde::{Deserialize, Serialize};

use crate::error::FingerprintError;

/// Default prefix length, in characters.
pub const DEFAULT_MAX_CHARS: usize = 32;

/// CSS class of the count badge the widget appends to every paragraph.
pub const DEFAULT_BADGE_CLASS: &str = "na-comment-count";

/// How the paragraph text handed to the extractor is encoded.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum TextFormat {
    /// Already plain text. Angle brackets and ampersands are content.
    #[default]
    Plain,
    /// Rendered HTML-like markup. Tags are dropped and their text kept, the
    /// way a DOM `textContent` read would see it.
    Markup,
}

/// A fragment known to be injected by the UI rather than authored content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InjectedFragment {
    /// Every occurrence of this literal substring is removed.
    Text { value: String },
    /// Every element whose `class` attribute lists this class is removed
    /// together with its content. Only meaningful for [`TextFormat::Markup`].
    Element { class: String },
}

impl InjectedFragment {
    pub fn text(value: impl Into<String>) -> Self {
        InjectedFragment::Text {
            value: value.into(),
        }
    }

    pub fn element(class: impl Into<String>) -> Self {
        InjectedFragment::Element {
            class: class.into(),
        }
    }
}

/// Configuration for fingerprint extraction.
///
/// `FingerprintConfig` is cheap to clone and serde-friendly so the same rule
/// can be shared between the code that captures a fingerprint when a comment
/// is created and the code that reconciles it later. Both sides must agree,
/// or captured prefixes will not match freshly extracted ones.
///
/// # Serialization
///
/// ```json
/// {
///   "version": 1,
///   "max_chars": 32,
///   "format": "markup",
///   "injected": [{ "type": "element", "class": "na-comment-count" }]
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FingerprintConfig {
    /// Version of the extraction rule. Must be >= 1.
    #[serde(default = "FingerprintConfig::default_version")]
    pub version: u32,

    /// Maximum fingerprint length in Unicode scalar values.
    ///
    /// # Default
    ///
    /// `32`
    #[serde(default = "FingerprintConfig::default_max_chars")]
    pub max_chars: usize,

    /// Encoding of the paragraph text.
    #[serde(default)]
    pub format: TextFormat,

    /// Fragments stripped before the prefix is taken.
    ///
    /// # Default
    ///
    /// The count badge element (`na-comment-count`). It is ignored for plain
    /// text, where the caller is expected to hand in badge-free text.
    #[serde(default = "FingerprintConfig::default_injected")]
    pub injected: Vec<InjectedFragment>,
}

impl FingerprintConfig {
    fn default_version() -> u32 {
        1
    }

    fn default_max_chars() -> usize {
        DEFAULT_MAX_CHARS
    }

    fn default_injected() -> Vec<InjectedFragment> {
        vec![InjectedFragment::element(DEFAULT_BADGE_CLASS)]
    }

    /// Convenience constructor for rendered markup with the default badge class.
    pub fn markup() -> Self {
        Self {
            format: TextFormat::Markup,
            ..Self::default()
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), FingerprintError> {
        if self.version == 0 {
            return Err(FingerprintError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        if self.max_chars == 0 {
            return Err(FingerprintError::InvalidConfig(
                "max_chars must be greater than zero".into(),
            ));
        }
        for fragment in &self.injected {
            let empty = match fragment {
                InjectedFragment::Text { value } => value.is_empty(),
                InjectedFragment::Element { class } => class.trim().is_empty(),
            };
            if empty {
                return Err(FingerprintError::InvalidConfig(
                    "injected fragments must not be empty".into(),
                ));
            }
        }
        Ok(())
    }
}

impl Default for FingerprintConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            max_chars: Self::default_max_chars(),
            format: TextFormat::Plain,
            injected: Self::default_injected(),
        }
    }
}
