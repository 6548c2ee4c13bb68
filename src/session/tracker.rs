//! Per-frame state machine.
//!
//! ```text
//!   no boundary ──► FrameFailed (consensus untouched)
//!   boundary    ──► merge ──► settled ≤ min_hits ──► Accumulating
//!                          └► settled > min_hits ──► solve ─┬─► Solved
//!                                                          └─► Accumulating
//! ```

use super::outcome::{FailureReason, FrameOutcome, FrameSnapshot, SolvedFrame, TrackerState};
use crate::capture::{
    CandidateFrame, CellImage, FileConfig, FrameContent, Geometry, PipelineFrame,
};
use crate::consensus::{ConsensusConfig, ConsensusState};
use crate::recognition::{self, DigitRecognizer, TemplateRecognizer};
use crate::solver::{Grid, Solver, SolverConfig};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Counters for one tracking session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    pub started_at: DateTime<Utc>,
    /// Frames processed.
    pub frames: u64,
    /// Frames without a detected puzzle.
    pub frames_without_boundary: u64,
    /// Consensus resets caused by conflicting votes.
    pub resets: u64,
    /// Solver invocations (cache hits excluded).
    pub solve_attempts: u64,
    /// Frames that produced a solution, cached or not.
    pub frames_solved: u64,
    /// Solver invocations that failed.
    pub solve_failures: u64,
    /// Search steps of the most recent solver run.
    pub last_solve_steps: u64,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            started_at: Utc::now(),
            frames: 0,
            frames_without_boundary: 0,
            resets: 0,
            solve_attempts: 0,
            frames_solved: 0,
            solve_failures: 0,
            last_solve_steps: 0,
        }
    }
}

/// Tracks one puzzle across frames and decides, per frame, whether a
/// solution can be emitted.
///
/// Frames are processed strictly one after another through `&mut self`,
/// so a merge never interleaves with another.
pub struct PuzzleTracker {
    consensus: ConsensusState,
    solver: Solver,
    recognizer: Arc<dyn DigitRecognizer>,
    state: TrackerState,
    /// Last settled grid that was solved, and its solution.
    cache: Option<(Grid, Grid)>,
    stats: SessionStats,
}

impl PuzzleTracker {
    /// Starts a session with the default template recognizer.
    pub fn new(consensus: ConsensusConfig, solver: SolverConfig) -> Self {
        Self {
            consensus: ConsensusState::new(consensus),
            solver: Solver::with_config(solver),
            recognizer: Arc::new(TemplateRecognizer::default()),
            state: TrackerState::AwaitingBoundary,
            cache: None,
            stats: SessionStats::default(),
        }
    }

    /// Starts a session from a loaded configuration file.
    pub fn from_config(config: &FileConfig) -> Self {
        Self::new(config.consensus.clone(), config.solver.clone())
    }

    /// Replaces the recognizer used for frames that carry cell images.
    pub fn with_recognizer(mut self, recognizer: Box<dyn DigitRecognizer>) -> Self {
        self.recognizer = Arc::from(recognizer);
        self
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn consensus(&self) -> &ConsensusState {
        &self.consensus
    }

    pub fn stats(&self) -> &SessionStats {
        &self.stats
    }

    /// Discards everything and begins a new session, e.g. for a new puzzle.
    pub fn reset(&mut self) {
        self.consensus = ConsensusState::new(self.consensus.config().clone());
        self.state = TrackerState::AwaitingBoundary;
        self.cache = None;
        self.stats = SessionStats::default();
        tracing::info!("Tracking session reset");
    }

    /// Processes one frame from the pipeline.
    pub fn process(&mut self, frame: PipelineFrame) -> FrameOutcome {
        let sequence = frame.sequence();

        let candidates = match frame.into_content() {
            FrameContent::NoBoundary => return self.boundary_missing(sequence),
            FrameContent::Candidates(candidates) => candidates,
            FrameContent::Cells { geometry, images } => {
                let recognizer = Arc::clone(&self.recognizer);
                return self.process_cells(sequence, geometry, &images, recognizer.as_ref());
            }
        };

        self.process_candidates(sequence, &candidates)
    }

    /// Recognizes raw cell images with `recognizer`, then merges the result.
    pub fn process_cells(
        &mut self,
        sequence: u64,
        geometry: Geometry,
        images: &[CellImage],
        recognizer: &dyn DigitRecognizer,
    ) -> FrameOutcome {
        let candidates =
            recognition::recognize_cells(recognizer, geometry, images, self.consensus.library());
        self.process_candidates(sequence, &candidates)
    }

    /// Merges an already recognized frame and attempts a solve.
    pub fn process_candidates(&mut self, sequence: u64, frame: &CandidateFrame) -> FrameOutcome {
        self.stats.frames += 1;
        let geometry = *frame.geometry();
        let report = self.consensus.record_frame(frame);

        if let Some(conflict) = report.conflict {
            self.stats.resets += 1;
            self.cache = None;
            return self.failure(
                sequence,
                TrackerState::Accumulating,
                FailureReason::ConflictReset(conflict),
                Some(geometry),
            );
        }

        if !self.consensus.ready_to_solve() {
            let reason = FailureReason::Accumulating {
                confident: self.consensus.confident_cells(),
                needed: self.consensus.config().min_hits + 1,
            };
            return self.failure(sequence, TrackerState::Accumulating, reason, Some(geometry));
        }

        let givens = self.consensus.capped_grid();
        match self.solve(givens) {
            Ok((solution, cached)) => self.success(sequence, givens, solution, geometry, cached),
            Err(e) => self.failure(
                sequence,
                TrackerState::Accumulating,
                FailureReason::Unsolvable(e),
                Some(geometry),
            ),
        }
    }

    fn solve(&mut self, givens: Grid) -> Result<(Grid, bool), crate::solver::SolveError> {
        if let Some((cached_givens, solution)) = self.cache {
            if cached_givens == givens {
                return Ok((solution, true));
            }
        }

        self.stats.solve_attempts += 1;
        match self.solver.solve(givens) {
            Ok(solved) => {
                self.stats.last_solve_steps = solved.steps;
                self.cache = Some((givens, solved.grid));
                tracing::info!(
                    givens = givens.filled_count(),
                    steps = solved.steps,
                    "Puzzle solved"
                );
                Ok((solved.grid, false))
            }
            Err(e) => {
                self.stats.solve_failures += 1;
                tracing::debug!(
                    givens = givens.filled_count(),
                    error = %e,
                    "Solve attempt failed, waiting for more votes"
                );
                Err(e)
            }
        }
    }

    fn boundary_missing(&mut self, sequence: u64) -> FrameOutcome {
        self.stats.frames += 1;
        self.stats.frames_without_boundary += 1;
        tracing::trace!(sequence, "No puzzle boundary in frame");
        self.failure(
            sequence,
            TrackerState::FrameFailed,
            FailureReason::BoundaryNotFound,
            None,
        )
    }

    fn success(
        &mut self,
        sequence: u64,
        givens: Grid,
        solution: Grid,
        geometry: Geometry,
        cached: bool,
    ) -> FrameOutcome {
        if self.state != TrackerState::Solved {
            tracing::info!(sequence, "Tracker entered solved state");
        }
        self.state = TrackerState::Solved;
        self.stats.frames_solved += 1;

        FrameOutcome::Success(SolvedFrame {
            sequence,
            solution,
            givens,
            digit_images: self.consensus.library().render_set(),
            geometry,
            confidence: self.consensus.confidence_colors(),
            cached,
        })
    }

    fn failure(
        &mut self,
        sequence: u64,
        state: TrackerState,
        reason: FailureReason,
        geometry: Option<Geometry>,
    ) -> FrameOutcome {
        self.state = state;
        FrameOutcome::Failure(FrameSnapshot {
            sequence,
            state,
            reason,
            preview: self.consensus.preview_grid(),
            confident_cells: self.consensus.confident_cells(),
            confidence: self.consensus.confidence_colors(),
            geometry,
        })
    }
}

impl std::fmt::Debug for PuzzleTracker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PuzzleTracker")
            .field("state", &self.state)
            .field("consensus", &self.consensus)
            .field("cached", &self.cache.is_some())
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}
