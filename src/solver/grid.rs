//! Fixed-size 9x9 digit grid.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Number of cells in a puzzle.
pub const CELL_COUNT: usize = 81;

/// Side length of the puzzle.
pub const SIDE: usize = 9;

/// Row index (0..9) of a position.
#[inline]
pub fn row_of(pos: usize) -> usize {
    pos / SIDE
}

/// Column index (0..9) of a position.
#[inline]
pub fn col_of(pos: usize) -> usize {
    pos % SIDE
}

/// 3x3 box index (0..9) of a position.
#[inline]
pub fn box_of(pos: usize) -> usize {
    (row_of(pos) / 3) * 3 + col_of(pos) / 3
}

/// Errors produced when parsing a grid from text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GridParseError {
    #[error("grid must have 81 cells, got {0}")]
    WrongLength(usize),
    #[error("invalid character {ch:?} at position {pos}")]
    InvalidCharacter { pos: usize, ch: char },
}

/// An 81-cell Sudoku grid in row-major order. `0` marks an empty cell.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grid {
    #[serde(with = "grid_string")]
    cells: [u8; CELL_COUNT],
}

impl Grid {
    /// Returns a grid with every cell empty.
    pub fn empty() -> Self {
        Self {
            cells: [0; CELL_COUNT],
        }
    }

    /// Builds a grid from raw cell values.
    ///
    /// # Panics
    ///
    /// Panics if any value is greater than 9.
    pub fn from_cells(cells: [u8; CELL_COUNT]) -> Self {
        assert!(
            cells.iter().all(|&v| v <= 9),
            "grid cell value out of range"
        );
        Self { cells }
    }

    /// Value at a position (0 = empty).
    #[inline]
    pub fn get(&self, pos: usize) -> u8 {
        self.cells[pos]
    }

    /// Sets a cell.
    ///
    /// # Panics
    ///
    /// Panics if `value` is greater than 9.
    #[inline]
    pub fn set(&mut self, pos: usize, value: u8) {
        assert!(value <= 9, "digit {value} out of range");
        self.cells[pos] = value;
    }

    /// Raw cell slice.
    #[inline]
    pub fn cells(&self) -> &[u8; CELL_COUNT] {
        &self.cells
    }

    /// Number of non-empty cells.
    pub fn filled_count(&self) -> usize {
        self.cells.iter().filter(|&&v| v != 0).count()
    }

    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|&v| v != 0)
    }

    /// Returns true if no row, column or box holds the same digit twice.
    pub fn is_valid(&self) -> bool {
        let mut rows = [0u16; SIDE];
        let mut cols = [0u16; SIDE];
        let mut boxes = [0u16; SIDE];

        for (pos, &value) in self.cells.iter().enumerate() {
            if value == 0 {
                continue;
            }
            let bit = 1u16 << value;
            let (r, c, b) = (row_of(pos), col_of(pos), box_of(pos));
            if rows[r] & bit != 0 || cols[c] & bit != 0 || boxes[b] & bit != 0 {
                return false;
            }
            rows[r] |= bit;
            cols[c] |= bit;
            boxes[b] |= bit;
        }
        true
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::empty()
    }
}

impl FromStr for Grid {
    type Err = GridParseError;

    /// Parses 81 characters of `1`-`9`, with `0` or `.` for empty cells.
    /// Whitespace is ignored so multi-line layouts are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
        if chars.len() != CELL_COUNT {
            return Err(GridParseError::WrongLength(chars.len()));
        }

        let mut cells = [0u8; CELL_COUNT];
        for (pos, &ch) in chars.iter().enumerate() {
            cells[pos] = match ch {
                '.' => 0,
                '0'..='9' => ch as u8 - b'0',
                _ => return Err(GridParseError::InvalidCharacter { pos, ch }),
            };
        }
        Ok(Self { cells })
    }
}

impl fmt::Display for Grid {
    /// Writes the 81-character row-major form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for &v in &self.cells {
            write!(f, "{}", v)?;
        }
        Ok(())
    }
}

impl fmt::Debug for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grid")
            .field("cells", &self.to_string())
            .field("filled", &self.filled_count())
            .finish()
    }
}

mod grid_string {
    use super::{Grid, CELL_COUNT};
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(cells: &[u8; CELL_COUNT], s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&Grid { cells: *cells }.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<[u8; CELL_COUNT], D::Error> {
        let text = String::deserialize(d)?;
        text.parse::<Grid>()
            .map(|g| g.cells)
            .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PUZZLE: &str =
        "530070000600195000098000060800060003400803001700020006060000280000419005000080079";

    #[test]
    fn test_position_helpers() {
        assert_eq!((row_of(0), col_of(0), box_of(0)), (0, 0, 0));
        assert_eq!((row_of(40), col_of(40), box_of(40)), (4, 4, 4));
        assert_eq!((row_of(80), col_of(80), box_of(80)), (8, 8, 8));
        assert_eq!(box_of(29), 3);
        assert_eq!(box_of(33), 5);
    }

    #[test]
    fn test_parse_and_display() {
        let grid: Grid = PUZZLE.parse().unwrap();
        assert_eq!(grid.get(0), 5);
        assert_eq!(grid.get(2), 0);
        assert_eq!(grid.filled_count(), 30);
        assert_eq!(grid.to_string(), PUZZLE);
    }

    #[test]
    fn test_parse_dots_and_whitespace() {
        let dotted = PUZZLE.replace('0', ".");
        let multiline: String = dotted
            .as_bytes()
            .chunks(9)
            .map(|row| format!("{}\n", std::str::from_utf8(row).unwrap()))
            .collect();
        let grid: Grid = multiline.parse().unwrap();
        assert_eq!(grid.to_string(), PUZZLE);
    }

    #[test]
    fn test_parse_errors() {
        assert_eq!("123".parse::<Grid>(), Err(GridParseError::WrongLength(3)));
        let bad = format!("x{}", &PUZZLE[1..]);
        assert!(matches!(
            bad.parse::<Grid>(),
            Err(GridParseError::InvalidCharacter { pos: 0, ch: 'x' })
        ));
    }

    #[test]
    fn test_validity() {
        let grid: Grid = PUZZLE.parse().unwrap();
        assert!(grid.is_valid());

        let mut dup_row = grid;
        dup_row.set(2, 5); // second 5 in row 0
        assert!(!dup_row.is_valid());

        let mut dup_box = Grid::empty();
        dup_box.set(0, 4);
        dup_box.set(10, 4); // row 1, col 1: same box
        assert!(!dup_box.is_valid());
    }

    #[test]
    #[should_panic(expected = "out of range")]
    fn test_set_rejects_out_of_range() {
        Grid::empty().set(0, 10);
    }
}
