//! Prometheus metrics exporter for puzzle tracking.
//!
//! # Metrics Exposed
//!
//! ## Session
//! - `sudoku_lens_solved` - Whether the last frame was solved (1=solved, 0=not)
//! - `sudoku_lens_frames_total` - Frames processed
//! - `sudoku_lens_frames_without_boundary_total` - Frames with no puzzle detected
//! - `sudoku_lens_frames_solved_total` - Frames that produced a solution
//!
//! ## Consensus
//! - `sudoku_lens_consensus_resets_total` - Resets caused by conflicting votes
//! - `sudoku_lens_confident_cells` - Cells settled on a digit
//! - `sudoku_lens_library_digits` - Digit values with a captured sample
//!
//! ## Solver
//! - `sudoku_lens_solve_attempts_total` - Solver invocations
//! - `sudoku_lens_solve_failures_total` - Failed solver invocations
//! - `sudoku_lens_last_solve_steps` - Search steps of the latest solve
//!
//! With the `metrics` feature, [`MetricsServer`] serves `/metrics`,
//! `/health` and a plain-text `/grid` view of the tracked puzzle.
//!
//! # Example
//!
//! ```no_run
//! use sudoku_lens::metrics::{MetricsRegistry, MetricsSnapshot};
//! use sudoku_lens::PuzzleTracker;
//!
//! let registry = MetricsRegistry::new().expect("Failed to create registry");
//! let tracker = PuzzleTracker::new(Default::default(), Default::default());
//!
//! registry.update(&MetricsSnapshot::from_tracker(&tracker));
//! ```

mod collector;
#[cfg(feature = "metrics")]
mod server;

pub use collector::{MetricsError, MetricsRegistry, MetricsSnapshot};
#[cfg(feature = "metrics")]
pub use server::{MetricsServer, MetricsServerConfig, MetricsState, ServerError};
