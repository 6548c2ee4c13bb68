//! Frame intake from the image pipeline.
//!
//! Detection and perspective correction happen upstream. This module
//! defines the shape of what arrives (boundary flag, geometry, 81 cell
//! candidates or cell images), a trait for sources of such frames, and the
//! configuration file format.

mod config;
mod frame;
pub mod glyph;
mod source;

pub use config::{ConfigError, FileConfig, OutputConfig, SourceConfig, DEFAULT_PUZZLE};
pub use frame::{
    CandidateFrame, CellCandidate, CellImage, FrameContent, Geometry, PipelineFrame, BACKGROUND,
    INK,
};
pub use source::{FrameSource, SourceError, SyntheticSource};
