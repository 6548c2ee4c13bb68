//! Frame source abstraction.
//!
//! Boundary detection and perspective correction live outside this crate.
//! A [`FrameSource`] is whatever delivers their output, one frame at a
//! time. [`SyntheticSource`] renders a known puzzle with reproducible noise
//! for tests and the demo binary.

use super::config::SourceConfig;
use super::frame::{CellImage, FrameContent, Geometry, PipelineFrame, BACKGROUND};
use super::glyph;
use crate::solver::{Grid, CELL_COUNT, SIDE};
use rand_chacha::ChaCha8Rng;
use rand_core::{RngCore, SeedableRng};
use thiserror::Error;

/// Errors that can occur while pulling frames.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("invalid source configuration: {0}")]
    ConfigFailed(String),
    #[error("source not initialized")]
    NotInitialized,
}

/// Trait for frame producers.
pub trait FrameSource {
    /// Prepares the source for reading.
    fn open(&mut self) -> Result<(), SourceError>;

    /// Returns the next frame.
    fn next_frame(&mut self) -> Result<PipelineFrame, SourceError>;

    /// Checks if the source is currently open.
    fn is_open(&self) -> bool;

    /// Releases resources.
    fn close(&mut self);
}

/// Renders a fixed puzzle into noisy cell images.
pub struct SyntheticSource {
    config: SourceConfig,
    puzzle: Option<Grid>,
    rng: ChaCha8Rng,
    sequence: u64,
}

impl SyntheticSource {
    pub fn new(config: SourceConfig) -> Self {
        let rng = ChaCha8Rng::seed_from_u64(config.seed);
        Self {
            config,
            puzzle: None,
            rng,
            sequence: 0,
        }
    }

    /// The puzzle being rendered, once opened.
    pub fn puzzle(&self) -> Option<&Grid> {
        self.puzzle.as_ref()
    }

    /// Uniform sample in [0, 1).
    fn unit(&mut self) -> f64 {
        (self.rng.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    fn render_cell(&mut self, digit: u8) -> CellImage {
        let size = self.config.cell_size;
        let mut image = if digit == 0 {
            CellImage::blank(size, size)
        } else {
            glyph::render_digit(size, size, digit)
        };

        let amplitude = u32::from(self.config.pixel_noise) + 1;
        for pixel in image.pixels_mut() {
            let n = (self.rng.next_u32() % amplitude) as u8;
            *pixel = if *pixel >= BACKGROUND / 2 {
                pixel.saturating_sub(n)
            } else {
                pixel.saturating_add(n)
            };
        }
        image
    }
}

impl FrameSource for SyntheticSource {
    fn open(&mut self) -> Result<(), SourceError> {
        self.config
            .validate()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        let puzzle = self
            .config
            .puzzle_grid()
            .map_err(|e| SourceError::ConfigFailed(e.to_string()))?;
        self.puzzle = Some(puzzle);
        self.rng = ChaCha8Rng::seed_from_u64(self.config.seed);
        self.sequence = 0;
        tracing::info!(
            givens = puzzle.filled_count(),
            seed = self.config.seed,
            "SyntheticSource opened"
        );
        Ok(())
    }

    fn next_frame(&mut self) -> Result<PipelineFrame, SourceError> {
        let puzzle = self.puzzle.ok_or(SourceError::NotInitialized)?;
        self.sequence += 1;

        if self.unit() < self.config.boundary_miss_rate {
            return Ok(PipelineFrame::new(FrameContent::NoBoundary, self.sequence));
        }

        let mut images = Vec::with_capacity(CELL_COUNT);
        for pos in 0..CELL_COUNT {
            let mut digit = puzzle.get(pos);
            if digit != 0 && self.unit() < self.config.misread_rate {
                // Any digit other than the true one.
                let shift = (self.rng.next_u32() % 8) as u8 + 1;
                digit = (digit - 1 + shift) % 9 + 1;
            }
            images.push(self.render_cell(digit));
        }

        let side = (self.config.cell_size as usize * SIDE) as f32;
        let geometry = Geometry::square(40.0, 40.0, side);
        Ok(PipelineFrame::new(
            FrameContent::Cells { geometry, images },
            self.sequence,
        ))
    }

    fn is_open(&self) -> bool {
        self.puzzle.is_some()
    }

    fn close(&mut self) {
        self.puzzle = None;
        tracing::info!("SyntheticSource closed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quiet_config() -> SourceConfig {
        SourceConfig {
            misread_rate: 0.0,
            boundary_miss_rate: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_synthetic_source_lifecycle() {
        let mut source = SyntheticSource::new(quiet_config());
        assert!(!source.is_open());

        source.open().unwrap();
        assert!(source.is_open());

        let frame = source.next_frame().unwrap();
        assert_eq!(frame.sequence(), 1);
        match frame.content() {
            FrameContent::Cells { images, .. } => {
                assert_eq!(images.len(), CELL_COUNT);
                assert!(images.iter().all(|i| i.is_valid()));
                // Position 2 is empty in the default puzzle, position 0 is a 5.
                assert!(images[2].ink_ratio() < images[0].ink_ratio());
            }
            other => panic!("unexpected content {other:?}"),
        }

        let frame2 = source.next_frame().unwrap();
        assert_eq!(frame2.sequence(), 2);

        source.close();
        assert!(!source.is_open());
    }

    #[test]
    fn test_next_frame_without_open() {
        let mut source = SyntheticSource::new(quiet_config());
        assert!(matches!(
            source.next_frame(),
            Err(SourceError::NotInitialized)
        ));
    }

    #[test]
    fn test_always_missing_boundary() {
        let mut source = SyntheticSource::new(SourceConfig {
            boundary_miss_rate: 1.0,
            ..Default::default()
        });
        source.open().unwrap();
        for _ in 0..5 {
            assert!(!source.next_frame().unwrap().has_boundary());
        }
    }

    #[test]
    fn test_invalid_config_rejected_on_open() {
        let mut source = SyntheticSource::new(SourceConfig {
            cell_size: 1,
            ..Default::default()
        });
        assert!(matches!(source.open(), Err(SourceError::ConfigFailed(_))));
    }

    #[test]
    fn test_reopen_replays_same_stream() {
        let mut source = SyntheticSource::new(SourceConfig::default());
        source.open().unwrap();
        let first: Vec<bool> = (0..20)
            .map(|_| source.next_frame().unwrap().has_boundary())
            .collect();

        source.open().unwrap();
        let second: Vec<bool> = (0..20)
            .map(|_| source.next_frame().unwrap().has_boundary())
            .collect();
        assert_eq!(first, second);
    }
}
