//! YAML configuration for paranote.
//!
//! One file configures every layer: which chapter a session targets, how
//! paragraph fingerprints are taken, how strictly store records are checked,
//! what happens to orphaned comments, and how the demo binary logs.
//!
//! ## Example
//!
//! ```yaml
//! version: "1.0"
//! name: "reader widget"
//!
//! chapter:
//!   site_id: "my-site"
//!   work_id: "novel-1"
//!   chapter_id: "ch-03"
//!
//! fingerprint:
//!   version: 1
//!   max_chars: 32
//!   format: "markup"
//!   injected:
//!     - type: "element"
//!       class: "na-comment-count"
//!
//! ingest:
//!   version: 1
//!   strip_control_chars: true
//!   max_content_bytes: 65536
//!   lenient: true
//!
//! anchor:
//!   version: 1
//!   orphan_policy: "keep_recorded"
//!
//! logging:
//!   level: "info"
//!   json: false
//! ```

use std::fs;
use std::path::Path;

use anchor::{AnchorConfig, Resolver};
use comments::{ChapterKey, CommentIngestConfig};
use fingerprint::FingerprintConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures while loading a paranote YAML file.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),

    #[error("failed to parse YAML: {0}")]
    YamlParse(#[from] serde_yaml::Error),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("unsupported config version: {0}")]
    UnsupportedVersion(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub struct ParanoteConfig {
    /// Config schema version, `"1.0"` or `"1"`.
    pub version: String,

    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub chapter: ChapterYamlConfig,

    #[serde(default)]
    pub fingerprint: FingerprintConfig,

    #[serde(default)]
    pub ingest: CommentIngestConfig,

    #[serde(default)]
    pub anchor: AnchorConfig,

    #[serde(default)]
    pub logging: LoggingYamlConfig,
}

impl ParanoteConfig {
    /// Read and validate a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigLoadError> {
        let content = fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: ParanoteConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigLoadError> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigLoadError> {
        match self.version.as_str() {
            "1.0" | "1" => Ok(()),
            v => Err(ConfigLoadError::UnsupportedVersion(v.to_string())),
        }?;

        self.fingerprint
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("fingerprint: {e}")))?;
        self.ingest
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("ingest: {e}")))?;
        self.anchor
            .validate()
            .map_err(|e| ConfigLoadError::Validation(format!("anchor: {e}")))?;
        self.logging.validate()?;

        Ok(())
    }

    pub fn chapter_key(&self) -> ChapterKey {
        self.chapter.key()
    }

    /// Resolver built from the `fingerprint` and `anchor` sections.
    pub fn resolver(&self) -> Result<Resolver, ConfigLoadError> {
        Resolver::new(self.anchor.clone(), self.fingerprint.clone())
            .map_err(|e| ConfigLoadError::Validation(e.to_string()))
    }
}

impl Default for ParanoteConfig {
    fn default() -> Self {
        Self {
            version: "1.0".to_string(),
            name: None,
            chapter: ChapterYamlConfig::default(),
            fingerprint: FingerprintConfig::default(),
            ingest: CommentIngestConfig::default(),
            anchor: AnchorConfig::default(),
            logging: LoggingYamlConfig::default(),
        }
    }
}

/// Which chapter a session targets. Blank ids fall back to the widget
/// placeholders.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChapterYamlConfig {
    #[serde(default)]
    pub site_id: String,
    #[serde(default)]
    pub work_id: String,
    #[serde(default)]
    pub chapter_id: String,
}

impl ChapterYamlConfig {
    pub fn key(&self) -> ChapterKey {
        ChapterKey::new(
            self.site_id.as_str(),
            self.work_id.as_str(),
            self.chapter_id.as_str(),
        )
    }
}

/// Logging for the demo binary.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingYamlConfig {
    /// `EnvFilter` directive, e.g. `info` or `paranote=debug,anchor=debug`.
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

impl LoggingYamlConfig {
    fn validate(&self) -> Result<(), ConfigLoadError> {
        if self.level.trim().is_empty() {
            return Err(ConfigLoadError::Validation(
                "logging.level must not be empty".into(),
            ));
        }
        Ok(())
    }
}

impl Default for LoggingYamlConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
