//! Frame source and session configuration.
//!
//! The synthetic source settings control how noisy the generated stream
//! is. The same file also carries consensus, solver and output settings so
//! the CLI can be driven from a single TOML document.

use crate::consensus::ConsensusConfig;
use crate::solver::{Grid, SolverConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Newspaper puzzle used when no other is configured.
pub const DEFAULT_PUZZLE: &str =
    "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

/// Configuration for the synthetic frame source.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Puzzle shown to the "camera", 81 characters.
    pub puzzle: String,
    /// Side length of each rendered cell in pixels.
    pub cell_size: u32,
    /// Maximum per-pixel noise added to each cell image.
    pub pixel_noise: u8,
    /// Probability that a filled cell is rendered as a different digit.
    pub misread_rate: f64,
    /// Probability that a frame has no detectable puzzle.
    pub boundary_miss_rate: f64,
    /// Seed for the noise generator.
    pub seed: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            puzzle: DEFAULT_PUZZLE.to_string(),
            cell_size: 28,
            pixel_noise: 40,
            misread_rate: 0.002,
            boundary_miss_rate: 0.05,
            seed: 42,
        }
    }
}

impl SourceConfig {
    /// Parses the configured puzzle.
    pub fn puzzle_grid(&self) -> Result<Grid, ConfigError> {
        let grid: Grid = self
            .puzzle
            .parse()
            .map_err(|e| ConfigError::InvalidPuzzle(format!("{}", e)))?;
        if !grid.is_valid() {
            return Err(ConfigError::InvalidPuzzle(
                "puzzle repeats a digit in a row, column or box".to_string(),
            ));
        }
        Ok(grid)
    }

    /// Validates the configuration parameters.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cell_size < 5 {
            return Err(ConfigError::InvalidCellSize(self.cell_size));
        }
        for (name, value) in [
            ("misread_rate", self.misread_rate),
            ("boundary_miss_rate", self.boundary_miss_rate),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::InvalidRate { name, value });
            }
        }
        self.puzzle_grid()?;
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid cell size {0} (must be at least 5 pixels)")]
    InvalidCellSize(u32),
    #[error("invalid {name} {value} (must be within 0.0-1.0)")]
    InvalidRate { name: &'static str, value: f64 },
    #[error("invalid puzzle: {0}")]
    InvalidPuzzle(String),
    #[error("invalid cap (must be at least 1)")]
    InvalidCap,
    #[error("invalid min_hits {0} (must be below 81)")]
    InvalidMinHits(usize),
    #[error("invalid solver step budget (must be at least 1)")]
    InvalidStepBudget,
    #[error("failed to read config file: {0}")]
    FileReadError(String),
    #[error("failed to parse config file: {0}")]
    ParseError(String),
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Run until interrupted (true) or process a fixed number of frames (false).
    pub continuous: bool,
    /// Number of frames to process if not continuous.
    pub frame_count: u32,
    /// Metrics server port (0 to disable).
    pub metrics_port: u16,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            continuous: false,
            frame_count: 60,
            metrics_port: 9090,
        }
    }
}

/// Full configuration file format.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    #[serde(default)]
    pub consensus: ConsensusConfig,
    #[serde(default)]
    pub solver: SolverConfig,
    #[serde(default)]
    pub source: SourceConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

impl FileConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::FileReadError(e.to_string()))?;
        Self::from_toml(&content)
    }

    /// Parses and validates configuration from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: FileConfig =
            toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates every section.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.consensus.validate()?;
        if self.solver.max_steps == 0 {
            return Err(ConfigError::InvalidStepBudget);
        }
        self.source.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_valid() {
        let config = FileConfig::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_small_cell_invalid() {
        let config = SourceConfig {
            cell_size: 2,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCellSize(2))
        ));
    }

    #[test]
    fn test_rate_out_of_range() {
        let config = SourceConfig {
            misread_rate: 1.5,
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidRate {
                name: "misread_rate",
                ..
            })
        ));
    }

    #[test]
    fn test_invalid_puzzle() {
        let config = SourceConfig {
            puzzle: "55".repeat(40) + "5",
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidPuzzle(_))
        ));
    }

    #[test]
    fn test_partial_toml() {
        let config = FileConfig::from_toml(
            r#"
            [consensus]
            cap = 3
            min_hits = 25

            [output]
            continuous = true
            frame_count = 10
            metrics_port = 0
            "#,
        )
        .unwrap();

        assert_eq!(config.consensus.cap, 3);
        assert_eq!(config.consensus.min_hits, 25);
        assert_eq!(config.solver.max_steps, SolverConfig::default().max_steps);
        assert!(config.output.continuous);
    }

    #[test]
    fn test_zero_cap_rejected() {
        let result = FileConfig::from_toml("[consensus]\ncap = 0\nmin_hits = 20\n");
        assert!(matches!(result, Err(ConfigError::InvalidCap)));
    }

    #[test]
    fn test_garbage_toml() {
        assert!(matches!(
            FileConfig::from_toml("[consensus"),
            Err(ConfigError::ParseError(_))
        ));
    }
}
