//! Reading grids and confidence out of the vote matrix.

use super::hits::HitCountMatrix;
use crate::solver::{Grid, CELL_COUNT};

/// Which counters qualify a digit for extraction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Threshold {
    /// Counter has reached the cap.
    Capped,
    /// Counter is nonzero.
    AnyVote,
}

impl Threshold {
    #[inline]
    fn accepts(self, count: u8, cap: u8) -> bool {
        match self {
            Threshold::Capped => count >= cap,
            Threshold::AnyVote => count > 0,
        }
    }
}

/// Builds a grid taking, per cell, the lowest digit whose counter passes
/// `threshold`. Cells with no qualifying digit are empty.
///
/// Slot 0 is never scanned, so "empty" votes cannot hide a digit.
pub fn extract(hits: &HitCountMatrix, threshold: Threshold) -> Grid {
    let cap = hits.cap();
    let mut cells = [0u8; CELL_COUNT];
    for (pos, slot) in cells.iter_mut().enumerate() {
        *slot = (1..=9u8)
            .find(|&d| threshold.accepts(hits.get(pos, d), cap))
            .unwrap_or(0);
    }
    Grid::from_cells(cells)
}

/// Grid of settled digits only.
pub fn capped_grid(hits: &HitCountMatrix) -> Grid {
    extract(hits, Threshold::Capped)
}

/// Grid of every digit with at least one vote, for previews.
pub fn preview_grid(hits: &HitCountMatrix) -> Grid {
    extract(hits, Threshold::AnyVote)
}

/// Number of cells settled on a nonzero digit.
pub fn confident_cell_count(hits: &HitCountMatrix) -> usize {
    (0..CELL_COUNT)
        .filter(|&pos| hits.capped_digit(pos).is_some())
        .count()
}

/// Per-cell border tint: `max(counters) * 256 / cap`, saturated to 255.
pub fn confidence_colors(hits: &HitCountMatrix) -> [u8; CELL_COUNT] {
    let cap = u32::from(hits.cap());
    let mut colors = [0u8; CELL_COUNT];
    for (pos, color) in colors.iter_mut().enumerate() {
        let scaled = u32::from(hits.max_at(pos)) * 256 / cap;
        *color = scaled.min(255) as u8;
    }
    colors
}
