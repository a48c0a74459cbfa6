//! Application configuration.
//!
//! The configuration is loaded from `$XDG_CONFIG_HOME/zonesnap/config.json`.
//! Every section is optional; a minimal `{}` file is valid and all sections
//! fall back to their compiled-in defaults.
//!
//! # Example
//!
//! ```json
//! {
//!   "keys": {
//!     "cycling_modifiers": "ctrl+opt",
//!     "drag_modifiers": "shift",
//!     "next_column": "right",
//!     "prev_column": "left",
//!     "next_row": "down",
//!     "prev_row": "up"
//!   },
//!   "engine": {
//!     "default_row_index": 3,
//!     "drag_threshold": 8.0,
//!     "tie_epsilon": 1.0
//!   }
//! }
//! ```

use crate::cycle::DEFAULT_ROW_INDEX;
use crate::desktop::DesktopConfig;
use crate::drag::{DEFAULT_DRAG_THRESHOLD, DEFAULT_TIE_EPSILON};
use crate::keys::KeyBindings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Modifier combinations and cycling keys.
    #[serde(default)]
    pub keys: KeyBindings,

    /// Cycling and drag-snap tuning.
    #[serde(default)]
    pub engine: EngineConfig,

    /// Display and window layout for headless runs.
    #[serde(default)]
    pub desktop: DesktopConfig,
}

/// Cycling and drag-snap tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Row zone a window is considered to be in before it has ever been
    /// cycled on the row axis.  Clamped to the zone list.
    pub default_row_index: usize,
    /// Pointer travel (logical units) before a drag starts matching zones.
    pub drag_threshold: f64,
    /// Zones whose center is within this of the nearest one tie; the
    /// narrower zone wins.
    pub tie_epsilon: f64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_row_index: DEFAULT_ROW_INDEX,
            drag_threshold: DEFAULT_DRAG_THRESHOLD,
            tie_epsilon: DEFAULT_TIE_EPSILON,
        }
    }
}

/// Error from loading, parsing or validating a configuration file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("invalid config: {0}")]
    Invalid(String),
}

impl Config {
    /// Load and validate configuration from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let keys = &self.keys;
        if keys.cycling_modifiers.is_empty() {
            return Err(ConfigError::Invalid("cycling_modifiers must hold at least one modifier".into()));
        }
        if keys.drag_modifiers.is_empty() {
            return Err(ConfigError::Invalid("drag_modifiers must hold at least one modifier".into()));
        }
        if keys.cycling_modifiers == keys.drag_modifiers {
            return Err(ConfigError::Invalid(format!(
                "cycling and drag modifiers are both {}",
                keys.cycling_modifiers.display_string()
            )));
        }
        let engine = &self.engine;
        if engine.drag_threshold < 0.0 || engine.tie_epsilon < 0.0 {
            return Err(ConfigError::Invalid(
                "drag_threshold and tie_epsilon must be non-negative".into(),
            ));
        }
        Ok(())
    }
}
