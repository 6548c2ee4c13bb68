//! What a processed frame hands to the renderer.

use crate::capture::Geometry;
use crate::consensus::{Conflict, DigitSample};
use crate::solver::{Grid, SolveError, CELL_COUNT};
use std::fmt;

/// Tracker state as of the last processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TrackerState {
    /// No frame has been processed yet in this session.
    AwaitingBoundary,
    /// Votes are being collected; no solution yet.
    Accumulating,
    /// The last frame produced a full solution.
    Solved,
    /// The last frame could not be used. Consensus is unaffected.
    FrameFailed,
}

impl fmt::Display for TrackerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackerState::AwaitingBoundary => "awaiting-boundary",
            TrackerState::Accumulating => "accumulating",
            TrackerState::Solved => "solved",
            TrackerState::FrameFailed => "frame-failed",
        };
        f.write_str(name)
    }
}

/// Why a frame did not yield a solution.
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason {
    /// The pipeline found no puzzle outline.
    BoundaryNotFound,
    /// Not enough settled cells yet.
    Accumulating { confident: usize, needed: usize },
    /// The frame contradicted settled cells and consensus was discarded.
    ConflictReset(Conflict),
    /// Settled cells admit no completion, or the search ran out of budget.
    Unsolvable(SolveError),
}

impl fmt::Display for FailureReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureReason::BoundaryNotFound => write!(f, "puzzle boundary not found"),
            FailureReason::Accumulating { confident, needed } => {
                write!(f, "{} of {} settled cells needed", confident, needed)
            }
            FailureReason::ConflictReset(conflict) => write!(f, "consensus reset: {}", conflict),
            FailureReason::Unsolvable(e) => write!(f, "solve failed: {}", e),
        }
    }
}

/// A solved frame, ready for compositing.
#[derive(Debug, Clone)]
pub struct SolvedFrame {
    pub sequence: u64,
    /// The complete solution.
    pub solution: Grid,
    /// Settled digits the solution was computed from.
    pub givens: Grid,
    /// One image per digit, index 0 holding digit 1.
    pub digit_images: Vec<DigitSample>,
    pub geometry: Geometry,
    /// Per-cell border tint, 255 = fully settled.
    pub confidence: [u8; CELL_COUNT],
    /// True when the solution was reused from an earlier frame.
    pub cached: bool,
}

impl SolvedFrame {
    /// Cells the renderer should fill in (empty in `givens`).
    pub fn deduced_cells(&self) -> impl Iterator<Item = (usize, u8)> + '_ {
        (0..CELL_COUNT)
            .filter(move |&pos| self.givens.get(pos) == 0)
            .map(move |pos| (pos, self.solution.get(pos)))
    }

    /// Image to draw for `digit`.
    pub fn image_for(&self, digit: u8) -> Option<&DigitSample> {
        match digit {
            1..=9 => self.digit_images.get(usize::from(digit - 1)),
            _ => None,
        }
    }
}

/// Consensus snapshot for a frame that did not yield a solution.
#[derive(Debug, Clone)]
pub struct FrameSnapshot {
    pub sequence: u64,
    pub state: TrackerState,
    pub reason: FailureReason,
    /// Every digit with at least one vote.
    pub preview: Grid,
    pub confident_cells: usize,
    pub confidence: [u8; CELL_COUNT],
    /// Present when the pipeline located the puzzle.
    pub geometry: Option<Geometry>,
}

/// Result of processing one frame. Exactly one per frame.
#[derive(Debug, Clone)]
pub enum FrameOutcome {
    Success(SolvedFrame),
    Failure(FrameSnapshot),
}

impl FrameOutcome {
    pub fn state(&self) -> TrackerState {
        match self {
            FrameOutcome::Success(_) => TrackerState::Solved,
            FrameOutcome::Failure(snapshot) => snapshot.state,
        }
    }

    pub fn is_solved(&self) -> bool {
        matches!(self, FrameOutcome::Success(_))
    }

    pub fn sequence(&self) -> u64 {
        match self {
            FrameOutcome::Success(solved) => solved.sequence,
            FrameOutcome::Failure(snapshot) => snapshot.sequence,
        }
    }

    pub fn confidence(&self) -> &[u8; CELL_COUNT] {
        match self {
            FrameOutcome::Success(solved) => &solved.confidence,
            FrameOutcome::Failure(snapshot) => &snapshot.confidence,
        }
    }

    pub fn solved(&self) -> Option<&SolvedFrame> {
        match self {
            FrameOutcome::Success(solved) => Some(solved),
            FrameOutcome::Failure(_) => None,
        }
    }
}
