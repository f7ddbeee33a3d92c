use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::error::Result;
use crate::timing::ExtrapolationPolicy;
use crate::view::{CinemaLayout, RollLayout};

/// User-level settings, read from a RON file.
///
/// Every section has defaults, so a partial file (or none at all) works.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub roll: RollLayout,
    pub cinema: CinemaLayout,
    /// Seconds between beat-grid lines
    pub grid_interval: f64,
    pub extrapolation: ExtrapolationPolicy,
    /// `tracing` filter directive, overridden by `RUST_LOG`
    pub log_filter: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            roll: RollLayout::default(),
            cinema: CinemaLayout::default(),
            grid_interval: 0.5,
            extrapolation: ExtrapolationPolicy::default(),
            log_filter: "syncscore=info".to_string(),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No settings at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let ron_string = fs::read_to_string(path)?;
        Ok(ron::from_str(&ron_string)?)
    }
}
