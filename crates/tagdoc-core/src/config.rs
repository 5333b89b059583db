//! Session configuration.
//!
//! ```rust
//! use tagdoc_core::{Alphabet, SessionConfig};
//!
//! let config = SessionConfig::from_yaml_str(
//!     "history_depth: 5\ndictionary:\n  path: words.txt\n  alphabet: latin\n",
//! )
//! .unwrap();
//! assert_eq!(config.history_depth, 5);
//! assert_eq!(config.dictionary.alphabet, Alphabet::Latin);
//! ```

use crate::actions::DEFAULT_HISTORY_DEPTH;
use crate::spellcheck::DictionaryConfig;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors produced while loading a [`SessionConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// YAML parsing failed.
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// `history_depth` must be at least 1.
    #[error("history_depth must be at least 1")]
    ZeroHistoryDepth,
}

/// Tunables for a [`DocumentSession`](crate::DocumentSession).
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Undo/redo depth.
    pub history_depth: usize,
    /// Spellcheck dictionary settings.
    pub dictionary: DictionaryConfig,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            dictionary: DictionaryConfig::default(),
        }
    }
}

impl SessionConfig {
    /// Parse a YAML configuration; missing keys take their defaults.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = serde_yaml::from_str(yaml)?;
        if config.history_depth == 0 {
            return Err(ConfigError::ZeroHistoryDepth);
        }
        Ok(config)
    }

    /// Read and parse a YAML configuration file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }
}
