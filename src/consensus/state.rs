//! Session-scoped consensus: vote matrix, digit library and reset policy.
//!
//! A frame is merged as one batch. Votes are counted first; if the updated
//! matrix then contradicts any candidate of that same frame, everything
//! accumulated so far is discarded. A single contradiction means the
//! recognizer is confused badly enough that earlier votes cannot be trusted
//! either.

use super::checker::{self, Conflict};
use super::extract;
use super::hits::HitCountMatrix;
use super::library::DigitLibrary;
use super::ConsensusConfig;
use crate::capture::CandidateFrame;
use crate::solver::{Grid, CELL_COUNT};

/// Outcome of merging one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MergeReport {
    /// Votes that changed a counter.
    pub votes_counted: usize,
    /// Candidates skipped because a settled peer already holds the digit.
    pub votes_blocked: usize,
    /// Digit library slots improved.
    pub library_updates: usize,
    /// Set when the frame triggered a full reset.
    pub conflict: Option<Conflict>,
}

impl MergeReport {
    pub fn was_reset(&self) -> bool {
        self.conflict.is_some()
    }
}

/// Accumulated voting state for one puzzle-tracking session.
#[derive(Debug, Clone)]
pub struct ConsensusState {
    hits: HitCountMatrix,
    library: DigitLibrary,
    config: ConsensusConfig,
    /// Frames merged since the last reset.
    frames_merged: u64,
    /// Resets performed over the session.
    resets: u64,
}

impl ConsensusState {
    /// Creates an empty state.
    ///
    /// # Panics
    ///
    /// Panics if `config.cap` is zero.
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            hits: HitCountMatrix::new(config.cap),
            library: DigitLibrary::new(),
            config,
            frames_merged: 0,
            resets: 0,
        }
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn hits(&self) -> &HitCountMatrix {
        &self.hits
    }

    pub fn library(&self) -> &DigitLibrary {
        &self.library
    }

    pub fn frames_merged(&self) -> u64 {
        self.frames_merged
    }

    pub fn resets(&self) -> u64 {
        self.resets
    }

    /// Counts the frame's votes, then resets if they contradict settled cells.
    ///
    /// The digit library is only updated from frames that merged cleanly.
    pub fn record_frame(&mut self, frame: &CandidateFrame) -> MergeReport {
        let candidates = frame.values();
        let mut report = MergeReport::default();

        // Blocking is judged against cells settled before this frame.
        let blocked: Vec<bool> = (0..CELL_COUNT)
            .map(|pos| checker::is_blocked(&self.hits, pos, candidates[pos]))
            .collect();

        for (pos, &digit) in candidates.iter().enumerate() {
            if blocked[pos] {
                report.votes_blocked += 1;
            } else if self.hits.vote(pos, digit) {
                report.votes_counted += 1;
            }
        }

        if let Some(conflict) = checker::first_conflict(&self.hits, &candidates) {
            tracing::warn!(
                %conflict,
                frames_merged = self.frames_merged,
                "Conflicting votes, discarding consensus"
            );
            self.reset();
            report.conflict = Some(conflict);
            return report;
        }

        report.library_updates = self.library.update(frame);
        self.frames_merged += 1;

        tracing::debug!(
            counted = report.votes_counted,
            confident = self.confident_cells(),
            library = self.library.digits_known(),
            "Frame merged"
        );
        report
    }

    /// Zeroes all votes and forgets every digit sample.
    pub fn reset(&mut self) {
        self.hits.clear();
        self.library.clear();
        self.frames_merged = 0;
        self.resets += 1;
    }

    /// Number of cells settled on a digit.
    pub fn confident_cells(&self) -> usize {
        extract::confident_cell_count(&self.hits)
    }

    /// True once enough cells are settled to attempt a solve.
    pub fn ready_to_solve(&self) -> bool {
        self.confident_cells() > self.config.min_hits
    }

    /// Settled digits only.
    pub fn capped_grid(&self) -> Grid {
        extract::capped_grid(&self.hits)
    }

    /// Any digit with a vote.
    pub fn preview_grid(&self) -> Grid {
        extract::preview_grid(&self.hits)
    }

    pub fn confidence_colors(&self) -> [u8; CELL_COUNT] {
        extract::confidence_colors(&self.hits)
    }
}
