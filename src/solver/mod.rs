//! Grid representation and backtracking completion.
//!
//! The solver applies full Sudoku rules (row, column and box) and is
//! independent of the consensus state: it takes a [`Grid`] by value and
//! can run on any thread.

mod backtrack;
mod grid;

pub use backtrack::{SolveError, Solution, Solver, SolverConfig};
pub use grid::{box_of, col_of, row_of, Grid, GridParseError, CELL_COUNT, SIDE};
