//! Metrics collection and registry.

use crate::session::{PuzzleTracker, TrackerState};
use prometheus::{Encoder, IntCounter, IntGauge, Registry, TextEncoder};
use thiserror::Error;

/// Errors that can occur during metrics operations.
#[derive(Debug, Error)]
pub enum MetricsError {
    #[error("prometheus error: {0}")]
    Prometheus(#[from] prometheus::Error),
}

/// A snapshot of tracker state for metrics update.
#[derive(Debug, Clone, Default)]
pub struct MetricsSnapshot {
    /// Whether the last frame produced a solution.
    pub is_solved: bool,
    /// Frames processed.
    pub frames: u64,
    /// Frames without a detected puzzle.
    pub frames_without_boundary: u64,
    /// Consensus resets.
    pub resets: u64,
    /// Solver invocations.
    pub solve_attempts: u64,
    /// Failed solver invocations.
    pub solve_failures: u64,
    /// Frames that produced a solution.
    pub frames_solved: u64,
    /// Cells currently settled on a digit.
    pub confident_cells: usize,
    /// Digit values with a captured sample.
    pub library_digits: usize,
    /// Search steps of the most recent solve.
    pub last_solve_steps: u64,
}

/// Prometheus metrics registry for puzzle tracking.
pub struct MetricsRegistry {
    registry: Registry,

    solved: IntGauge,
    frames_total: IntCounter,
    frames_without_boundary_total: IntCounter,
    resets_total: IntCounter,
    solve_attempts_total: IntCounter,
    solve_failures_total: IntCounter,
    frames_solved_total: IntCounter,
    confident_cells: IntGauge,
    library_digits: IntGauge,
    last_solve_steps: IntGauge,
}

/// Raises a monotonic counter to `target`.
fn advance(counter: &IntCounter, target: u64) {
    let current = counter.get();
    if target > current {
        counter.inc_by(target - current);
    }
}

impl MetricsRegistry {
    /// Creates a new registry with all tracker metrics registered.
    pub fn new() -> Result<Self, MetricsError> {
        let registry = Registry::new();

        let solved = IntGauge::new(
            "sudoku_lens_solved",
            "Whether the last frame produced a solution (1=solved, 0=not)",
        )?;
        let frames_total =
            IntCounter::new("sudoku_lens_frames_total", "Total number of frames processed")?;
        let frames_without_boundary_total = IntCounter::new(
            "sudoku_lens_frames_without_boundary_total",
            "Frames in which no puzzle was detected",
        )?;
        let resets_total = IntCounter::new(
            "sudoku_lens_consensus_resets_total",
            "Consensus resets caused by conflicting votes",
        )?;
        let solve_attempts_total = IntCounter::new(
            "sudoku_lens_solve_attempts_total",
            "Solver invocations, cache hits excluded",
        )?;
        let solve_failures_total = IntCounter::new(
            "sudoku_lens_solve_failures_total",
            "Solver invocations that found no solution",
        )?;
        let frames_solved_total = IntCounter::new(
            "sudoku_lens_frames_solved_total",
            "Frames that produced a solution",
        )?;
        let confident_cells = IntGauge::new(
            "sudoku_lens_confident_cells",
            "Cells currently settled on a digit",
        )?;
        let library_digits = IntGauge::new(
            "sudoku_lens_library_digits",
            "Digit values with a captured sample",
        )?;
        let last_solve_steps = IntGauge::new(
            "sudoku_lens_last_solve_steps",
            "Search steps taken by the most recent solve",
        )?;

        registry.register(Box::new(solved.clone()))?;
        registry.register(Box::new(frames_total.clone()))?;
        registry.register(Box::new(frames_without_boundary_total.clone()))?;
        registry.register(Box::new(resets_total.clone()))?;
        registry.register(Box::new(solve_attempts_total.clone()))?;
        registry.register(Box::new(solve_failures_total.clone()))?;
        registry.register(Box::new(frames_solved_total.clone()))?;
        registry.register(Box::new(confident_cells.clone()))?;
        registry.register(Box::new(library_digits.clone()))?;
        registry.register(Box::new(last_solve_steps.clone()))?;

        Ok(Self {
            registry,
            solved,
            frames_total,
            frames_without_boundary_total,
            resets_total,
            solve_attempts_total,
            solve_failures_total,
            frames_solved_total,
            confident_cells,
            library_digits,
            last_solve_steps,
        })
    }

    /// Updates all metrics from a snapshot.
    ///
    /// Counters only move forward; a snapshot taken after a session reset
    /// leaves them at their previous totals.
    pub fn update(&self, snapshot: &MetricsSnapshot) {
        self.solved.set(i64::from(snapshot.is_solved));

        advance(&self.frames_total, snapshot.frames);
        advance(
            &self.frames_without_boundary_total,
            snapshot.frames_without_boundary,
        );
        advance(&self.resets_total, snapshot.resets);
        advance(&self.solve_attempts_total, snapshot.solve_attempts);
        advance(&self.solve_failures_total, snapshot.solve_failures);
        advance(&self.frames_solved_total, snapshot.frames_solved);

        self.confident_cells.set(snapshot.confident_cells as i64);
        self.library_digits.set(snapshot.library_digits as i64);
        self.last_solve_steps.set(snapshot.last_solve_steps as i64);
    }

    /// Encodes all metrics in Prometheus text format.
    pub fn encode(&self) -> Result<String, MetricsError> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        Ok(String::from_utf8_lossy(&buffer).into_owned())
    }
}

impl MetricsSnapshot {
    /// Creates a snapshot from the current tracker state.
    pub fn from_tracker(tracker: &PuzzleTracker) -> Self {
        let stats = tracker.stats();
        let consensus = tracker.consensus();
        Self {
            is_solved: tracker.state() == TrackerState::Solved,
            frames: stats.frames,
            frames_without_boundary: stats.frames_without_boundary,
            resets: stats.resets,
            solve_attempts: stats.solve_attempts,
            solve_failures: stats.solve_failures,
            frames_solved: stats.frames_solved,
            confident_cells: consensus.confident_cells(),
            library_digits: consensus.library().digits_known(),
            last_solve_steps: stats.last_solve_steps,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::{FrameSource, SourceConfig, SyntheticSource};
    use crate::consensus::ConsensusConfig;
    use crate::solver::SolverConfig;

    #[test]
    fn test_registry_creation() {
        let registry = MetricsRegistry::new();
        assert!(registry.is_ok());
    }

    #[test]
    fn test_metrics_update() {
        let registry = MetricsRegistry::new().unwrap();

        let snapshot = MetricsSnapshot {
            is_solved: true,
            frames: 12,
            resets: 2,
            confident_cells: 30,
            library_digits: 9,
            ..Default::default()
        };
        registry.update(&snapshot);

        let output = registry.encode().unwrap();
        assert!(output.contains("sudoku_lens_solved 1"));
        assert!(output.contains("sudoku_lens_frames_total 12"));
        assert!(output.contains("sudoku_lens_consensus_resets_total 2"));
        assert!(output.contains("sudoku_lens_confident_cells 30"));
    }

    #[test]
    fn test_counters_do_not_rewind() {
        let registry = MetricsRegistry::new().unwrap();
        registry.update(&MetricsSnapshot {
            frames: 10,
            ..Default::default()
        });
        registry.update(&MetricsSnapshot {
            frames: 3,
            ..Default::default()
        });

        let output = registry.encode().unwrap();
        assert!(output.contains("sudoku_lens_frames_total 10"));
    }

    #[test]
    fn test_snapshot_from_tracker() {
        let mut source = SyntheticSource::new(SourceConfig {
            misread_rate: 0.0,
            boundary_miss_rate: 0.0,
            ..Default::default()
        });
        source.open().unwrap();
        let mut tracker = PuzzleTracker::new(
            ConsensusConfig { cap: 2, min_hits: 20 },
            SolverConfig::default(),
        );
        for _ in 0..3 {
            tracker.process(source.next_frame().unwrap());
        }

        let snapshot = MetricsSnapshot::from_tracker(&tracker);
        assert!(snapshot.is_solved);
        assert_eq!(snapshot.frames, 3);
        assert_eq!(snapshot.frames_solved, 2);
        assert_eq!(snapshot.solve_attempts, 1);
        assert_eq!(snapshot.confident_cells, 30);
        assert!(snapshot.last_solve_steps > 0);
    }
}
