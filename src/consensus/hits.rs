//! Per-cell vote histogram.

use crate::solver::CELL_COUNT;

/// Counter slots per cell: index 0 counts "empty", 1..=9 count digits.
pub const SLOTS: usize = 10;

/// Vote counts for every cell, each bounded by `cap`.
///
/// Counters never exceed `cap`; once any counter of a cell reaches it the
/// cell stops accepting votes until the matrix is cleared.
#[derive(Clone, PartialEq, Eq)]
pub struct HitCountMatrix {
    counts: [[u8; SLOTS]; CELL_COUNT],
    cap: u8,
}

impl HitCountMatrix {
    /// Creates an all-zero matrix.
    ///
    /// # Panics
    ///
    /// Panics if `cap` is zero.
    pub fn new(cap: u8) -> Self {
        assert!(cap > 0, "hit cap must be positive");
        Self {
            counts: [[0; SLOTS]; CELL_COUNT],
            cap,
        }
    }

    #[inline]
    pub fn cap(&self) -> u8 {
        self.cap
    }

    /// Counter for `digit` (0..=9) at `pos`.
    #[inline]
    pub fn get(&self, pos: usize, digit: u8) -> u8 {
        self.counts[pos][usize::from(digit)]
    }

    /// All ten counters of a cell.
    #[inline]
    pub fn cell(&self, pos: usize) -> &[u8; SLOTS] {
        &self.counts[pos]
    }

    /// Largest counter of a cell, empty slot included.
    #[inline]
    pub fn max_at(&self, pos: usize) -> u8 {
        self.counts[pos].iter().copied().max().unwrap_or(0)
    }

    /// True if `digit` has reached the cap at `pos`.
    #[inline]
    pub fn is_capped(&self, pos: usize, digit: u8) -> bool {
        self.get(pos, digit) >= self.cap
    }

    /// The nonzero digit settled at `pos`, if any.
    pub fn capped_digit(&self, pos: usize) -> Option<u8> {
        (1..=9u8).find(|&d| self.is_capped(pos, d))
    }

    /// Adds one vote for `digit` at `pos` unless the cell is already settled.
    ///
    /// Returns true if a counter changed.
    ///
    /// # Panics
    ///
    /// Panics if `digit` is greater than 9.
    pub fn vote(&mut self, pos: usize, digit: u8) -> bool {
        assert!(digit <= 9, "vote digit {digit} out of range");
        if self.max_at(pos) >= self.cap {
            return false;
        }
        self.counts[pos][usize::from(digit)] += 1;
        true
    }

    /// Zeroes every counter.
    pub fn clear(&mut self) {
        self.counts = [[0; SLOTS]; CELL_COUNT];
    }

    /// True if every counter is zero.
    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|c| c.iter().all(|&v| v == 0))
    }

    /// Largest counter anywhere in the matrix.
    pub fn highest(&self) -> u8 {
        (0..CELL_COUNT).map(|p| self.max_at(p)).max().unwrap_or(0)
    }
}

impl std::fmt::Debug for HitCountMatrix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let settled = (0..CELL_COUNT)
            .filter(|&p| self.capped_digit(p).is_some())
            .count();
        f.debug_struct("HitCountMatrix")
            .field("cap", &self.cap)
            .field("settled_cells", &settled)
            .finish_non_exhaustive()
    }
}
