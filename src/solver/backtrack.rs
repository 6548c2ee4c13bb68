//! Depth-first backtracking search with a fewest-candidates cell choice.
//!
//! The search keeps one bitmask of used digits per row, column and box,
//! so computing the legal digits of a cell is three ORs and a NOT. Cells are
//! chosen by minimum remaining values, lowest position first on ties, and
//! digits are tried in ascending order. Identical input therefore always
//! explores the same tree and yields the same solution.

use super::grid::{box_of, col_of, row_of, Grid, CELL_COUNT, SIDE};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Bits 1..=9 set.
const ALL_DIGITS: u16 = 0b11_1111_1110;

/// Errors returned by the solver.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SolveError {
    #[error("grid has no valid completion")]
    Unsatisfiable,
    #[error("search budget exhausted after {0} steps")]
    BudgetExhausted(u64),
}

/// Solver limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Maximum recursion steps per solve attempt.
    pub max_steps: u64,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            max_steps: 1_000_000,
        }
    }
}

/// A completed grid plus search statistics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Solution {
    /// The fully filled grid.
    pub grid: Grid,
    /// Recursion steps the search needed.
    pub steps: u64,
}

/// Stateless backtracking solver; all search state lives per call.
#[derive(Debug, Clone, Default)]
pub struct Solver {
    config: SolverConfig,
}

impl Solver {
    /// Creates a solver with the default step budget.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a solver with custom limits.
    pub fn with_config(config: SolverConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &SolverConfig {
        &self.config
    }

    /// Completes `grid`, or reports why it cannot be completed.
    ///
    /// Givens that already break row, column or box uniqueness make the
    /// grid unsatisfiable without searching.
    pub fn solve(&self, grid: Grid) -> Result<Solution, SolveError> {
        let mut search = Search::from_grid(&grid, self.config.max_steps)?;

        if search.solve()? {
            tracing::trace!(steps = search.steps, "Search completed");
            Ok(Solution {
                grid: Grid::from_cells(search.cells),
                steps: search.steps,
            })
        } else {
            tracing::debug!(steps = search.steps, "Search space exhausted");
            Err(SolveError::Unsatisfiable)
        }
    }

    /// Counts completions of `grid`, stopping once `limit` have been found.
    pub fn count_solutions(&self, grid: Grid, limit: usize) -> Result<usize, SolveError> {
        let mut search = match Search::from_grid(&grid, self.config.max_steps) {
            Ok(search) => search,
            Err(SolveError::Unsatisfiable) => return Ok(0),
            Err(e) => return Err(e),
        };
        let mut found = 0;
        search.count(&mut found, limit)?;
        Ok(found)
    }

    /// True if `grid` has exactly one completion.
    pub fn has_unique_solution(&self, grid: Grid) -> Result<bool, SolveError> {
        Ok(self.count_solutions(grid, 2)? == 1)
    }
}

struct Search {
    cells: [u8; CELL_COUNT],
    rows: [u16; SIDE],
    cols: [u16; SIDE],
    boxes: [u16; SIDE],
    steps: u64,
    max_steps: u64,
}

impl Search {
    fn from_grid(grid: &Grid, max_steps: u64) -> Result<Self, SolveError> {
        let mut search = Self {
            cells: [0; CELL_COUNT],
            rows: [0; SIDE],
            cols: [0; SIDE],
            boxes: [0; SIDE],
            steps: 0,
            max_steps,
        };

        for pos in 0..CELL_COUNT {
            let digit = grid.get(pos);
            if digit == 0 {
                continue;
            }
            if search.legal_digits(pos) & (1 << digit) == 0 {
                tracing::debug!(pos, digit, "Conflicting given");
                return Err(SolveError::Unsatisfiable);
            }
            search.place(pos, digit);
        }
        Ok(search)
    }

    #[inline]
    fn legal_digits(&self, pos: usize) -> u16 {
        !(self.rows[row_of(pos)] | self.cols[col_of(pos)] | self.boxes[box_of(pos)]) & ALL_DIGITS
    }

    #[inline]
    fn place(&mut self, pos: usize, digit: u8) {
        let bit = 1 << digit;
        self.cells[pos] = digit;
        self.rows[row_of(pos)] |= bit;
        self.cols[col_of(pos)] |= bit;
        self.boxes[box_of(pos)] |= bit;
    }

    #[inline]
    fn unplace(&mut self, pos: usize, digit: u8) {
        let bit = !(1 << digit);
        self.cells[pos] = 0;
        self.rows[row_of(pos)] &= bit;
        self.cols[col_of(pos)] &= bit;
        self.boxes[box_of(pos)] &= bit;
    }

    /// Empty cell with the fewest legal digits, or `None` when the grid is full.
    fn select_cell(&self) -> Option<(usize, u16)> {
        let mut best: Option<(usize, u16)> = None;
        let mut best_count = u32::MAX;

        for pos in 0..CELL_COUNT {
            if self.cells[pos] != 0 {
                continue;
            }
            let mask = self.legal_digits(pos);
            let count = mask.count_ones();
            if count < best_count {
                best = Some((pos, mask));
                best_count = count;
                if count <= 1 {
                    break;
                }
            }
        }
        best
    }

    fn tick(&mut self) -> Result<(), SolveError> {
        self.steps += 1;
        if self.steps > self.max_steps {
            return Err(SolveError::BudgetExhausted(self.max_steps));
        }
        Ok(())
    }

    fn solve(&mut self) -> Result<bool, SolveError> {
        self.tick()?;

        let Some((pos, mask)) = self.select_cell() else {
            return Ok(true);
        };

        for digit in 1..=9u8 {
            if mask & (1 << digit) == 0 {
                continue;
            }
            self.place(pos, digit);
            if self.solve()? {
                return Ok(true);
            }
            self.unplace(pos, digit);
        }
        Ok(false)
    }

    fn count(&mut self, found: &mut usize, limit: usize) -> Result<(), SolveError> {
        if *found >= limit {
            return Ok(());
        }
        self.tick()?;

        let Some((pos, mask)) = self.select_cell() else {
            *found += 1;
            return Ok(());
        };

        for digit in 1..=9u8 {
            if *found >= limit {
                break;
            }
            if mask & (1 << digit) == 0 {
                continue;
            }
            self.place(pos, digit);
            self.count(found, limit)?;
            self.unplace(pos, digit);
        }
        Ok(())
    }
}
