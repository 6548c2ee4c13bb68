//! Multi-frame digit voting.
//!
//! No single frame is trusted. A digit is accepted for a cell only after
//! it has been voted `cap` times without any frame contradicting an
//! already settled row or column peer. Any contradiction wipes the whole
//! state.
//!
//! # Components
//!
//! - [`HitCountMatrix`]: ten bounded counters per cell
//! - [`checker`]: row/column consistency predicate
//! - [`DigitLibrary`]: cleanest image per digit value
//! - [`ConsensusState`]: merges frames and applies the reset policy
//! - [`extract`]: grids and confidence colors from the counters

pub mod checker;
pub mod extract;
mod hits;
mod library;
mod state;

pub use checker::{is_consistent, Conflict};
pub use extract::{confidence_colors, confident_cell_count, Threshold};
pub use hits::{HitCountMatrix, SLOTS};
pub use library::{DigitLibrary, DigitSample, DEFAULT_SAMPLE_SIZE};
pub use state::{ConsensusState, MergeReport};

use crate::capture::ConfigError;
use crate::solver::CELL_COUNT;
use serde::{Deserialize, Serialize};

/// Voting parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsensusConfig {
    /// Votes a digit needs at a cell before it counts as settled.
    pub cap: u8,
    /// Settled cells required before a solve is attempted (strictly more).
    pub min_hits: usize,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            cap: 5,
            min_hits: 20,
        }
    }
}

impl ConsensusConfig {
    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cap == 0 {
            return Err(ConfigError::InvalidCap);
        }
        if self.min_hits >= CELL_COUNT {
            return Err(ConfigError::InvalidMinHits(self.min_hits));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        assert!(ConsensusConfig::default().validate().is_ok());
    }

    #[test]
    fn test_min_hits_must_be_reachable() {
        let config = ConsensusConfig {
            min_hits: 81,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidMinHits(81))
        ));
    }
}
