//! Frame orchestration.
//!
//! [`PuzzleTracker`] owns the consensus state for one tracking session and
//! turns each pipeline frame into exactly one [`FrameOutcome`]: a solved
//! grid with the digit images to draw it, or a snapshot of what has been
//! gathered so far.

mod outcome;
mod tracker;

pub use outcome::{FailureReason, FrameOutcome, FrameSnapshot, SolvedFrame, TrackerState};
pub use tracker::{PuzzleTracker, SessionStats};
