//! Sudoku Lens Library
//!
//! Reads a Sudoku puzzle from a stream of noisy video frames, settles on
//! the printed digits by voting across frames, and solves the puzzle once
//! enough cells are trusted.
//!
//! # Architecture
//!
//! The system follows an explicit data flow:
//!
//! ```text
//! capture → recognition → consensus → solver
//!     ↓                        ↓          ↓
//!           session (one outcome per frame) → metrics
//! ```
//!
//! # Design Principles
//!
//! - **No single frame is trusted**: a digit counts only after repeated
//!   agreement across frames
//! - **Contradictions reset**: a frame clashing with settled cells discards
//!   all accumulated votes
//! - **Vision stays outside**: boundary detection and perspective correction
//!   are supplied by the caller through [`capture::FrameSource`]
//!
//! # Example
//!
//! ```no_run
//! use sudoku_lens::{
//!     capture::{FrameSource, SourceConfig, SyntheticSource},
//!     session::{FrameOutcome, PuzzleTracker},
//! };
//!
//! let mut source = SyntheticSource::new(SourceConfig::default());
//! source.open().unwrap();
//!
//! let mut tracker = PuzzleTracker::new(Default::default(), Default::default());
//!
//! for _ in 0..30 {
//!     let frame = source.next_frame().unwrap();
//!     if let FrameOutcome::Success(solved) = tracker.process(frame) {
//!         println!("{}", solved.solution);
//!         break;
//!     }
//! }
//! ```

#![warn(rust_2018_idioms)]
#![deny(unsafe_code)]

pub mod capture;
pub mod consensus;
pub mod metrics;
pub mod recognition;
pub mod session;
pub mod solver;

// Re-export commonly used types at crate root
pub use capture::{CandidateFrame, FileConfig, FrameSource, PipelineFrame, SyntheticSource};
pub use consensus::{ConsensusConfig, ConsensusState, DigitLibrary};
pub use recognition::{DigitRecognizer, TemplateRecognizer};
pub use session::{FrameOutcome, PuzzleTracker, TrackerState};
pub use solver::{Grid, Solver, SolverConfig};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
