//! Configuration options for a [`Model`](crate::tree::Model).
//!
//! The options control how constraint formulas are rendered for the external
//! refinement engine, whether session roots are indexed on creation, and
//! whether validation failures are logged.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Smallest number of fractional digits used when rendering formulas.
pub const MIN_FORMULA_PRECISION: usize = 6;

/// Configuration options for a model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Field width of each number in a rendered formula. Default: 20
    pub formula_width: usize,

    /// Fractional digits of each number in a rendered formula. Values below
    /// [`MIN_FORMULA_PRECISION`] are raised to it. Default: 10
    pub formula_precision: usize,

    /// Build the global name index when a session root is created. Default: true
    pub index_sessions: bool,

    /// Emit a `tracing` warning for every validation failure. Default: true
    pub log_validation: bool,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            formula_width: 20,
            formula_precision: 10,
            index_sessions: true,
            log_validation: true,
        }
    }
}

impl ModelConfig {
    /// Precision actually used when rendering formulas.
    pub fn effective_precision(&self) -> usize {
        self.formula_precision.max(MIN_FORMULA_PRECISION)
    }

    /// Parse a configuration from a JSON string. Missing keys take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file.
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Self::from_json(&contents)
    }
}
