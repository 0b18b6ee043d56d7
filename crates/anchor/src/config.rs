use serde::{Deserialize, Serialize};

use crate::types::AnchorError;

/// Where a root comment goes when no paragraph matches its fingerprint.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum OrphanPolicy {
    /// Stay at the recorded index, even if it is now out of range.
    #[default]
    KeepRecorded,
    /// Collect orphans on the first paragraph.
    FirstParagraph,
}

/// Configuration for the anchor resolver.
///
/// Both policies keep every comment in exactly one bucket; they only differ
/// in which bucket an orphan lands in.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnchorConfig {
    /// Version of the resolution rules. Must be >= 1.
    #[serde(default = "AnchorConfig::default_version")]
    pub version: u32,
    #[serde(default)]
    pub orphan_policy: OrphanPolicy,
}

impl AnchorConfig {
    fn default_version() -> u32 {
        1
    }

    pub fn validate(&self) -> Result<(), AnchorError> {
        if self.version == 0 {
            return Err(AnchorError::InvalidConfig(
                "config version must be >= 1".into(),
            ));
        }
        Ok(())
    }
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self {
            version: Self::default_version(),
            orphan_policy: OrphanPolicy::default(),
        }
    }
}
