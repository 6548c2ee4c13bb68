//! Row and column consistency of candidate digits against settled cells.
//!
//! Only rows and columns are checked. Two settled cells sharing a box but
//! neither a row nor a column are never reported as a conflict.

use super::hits::HitCountMatrix;
use crate::solver::{col_of, row_of, CELL_COUNT, SIDE};

/// A candidate digit that a settled peer already holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Conflict {
    /// Cell carrying the offending candidate.
    pub position: usize,
    /// Settled cell in the same row or column.
    pub peer: usize,
    /// The digit both claim.
    pub digit: u8,
}

impl std::fmt::Display for Conflict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "digit {} at r{}c{} clashes with settled r{}c{}",
            self.digit,
            row_of(self.position) + 1,
            col_of(self.position) + 1,
            row_of(self.peer) + 1,
            col_of(self.peer) + 1
        )
    }
}

/// Cells other than `pos` sharing its row or column.
fn line_peers(pos: usize) -> impl Iterator<Item = usize> {
    let (row, col) = (row_of(pos), col_of(pos));
    let row_cells = (0..SIDE).map(move |c| row * SIDE + c);
    let col_cells = (0..SIDE).map(move |r| r * SIDE + col);
    row_cells.chain(col_cells).filter(move |&p| p != pos)
}

/// Returns the settled peer that rules out `digit` at `pos`, if any.
pub fn blocking_peer(hits: &HitCountMatrix, pos: usize, digit: u8) -> Option<usize> {
    if digit == 0 {
        return None;
    }
    line_peers(pos).find(|&peer| hits.is_capped(peer, digit))
}

/// True if placing `digit` at `pos` contradicts a settled row or column peer.
#[inline]
pub fn is_blocked(hits: &HitCountMatrix, pos: usize, digit: u8) -> bool {
    blocking_peer(hits, pos, digit).is_some()
}

/// First candidate, in position order, that contradicts a settled peer.
pub fn first_conflict(hits: &HitCountMatrix, candidates: &[u8; CELL_COUNT]) -> Option<Conflict> {
    candidates
        .iter()
        .enumerate()
        .find_map(|(position, &digit)| {
            blocking_peer(hits, position, digit).map(|peer| Conflict {
                position,
                peer,
                digit,
            })
        })
}

/// True if no nonzero candidate contradicts a settled row or column peer.
pub fn is_consistent(hits: &HitCountMatrix, candidates: &[u8; CELL_COUNT]) -> bool {
    first_conflict(hits, candidates).is_none()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settle(hits: &mut HitCountMatrix, pos: usize, digit: u8) {
        for _ in 0..hits.cap() {
            hits.vote(pos, digit);
        }
    }

    #[test]
    fn test_line_peers() {
        let peers: Vec<usize> = line_peers(40).collect();
        assert_eq!(peers.len(), 16);
        assert!(!peers.contains(&40));
        assert!(peers.contains(&36) && peers.contains(&4));
        assert!(!peers.contains(&30)); // same box only
    }

    #[test]
    fn test_empty_matrix_is_consistent() {
        let hits = HitCountMatrix::new(3);
        assert!(is_consistent(&hits, &[5; CELL_COUNT]));
    }

    #[test]
    fn test_row_conflict() {
        let mut hits = HitCountMatrix::new(3);
        settle(&mut hits, 0, 5);

        let mut candidates = [0u8; CELL_COUNT];
        candidates[0] = 5;
        assert!(is_consistent(&hits, &candidates));

        candidates[8] = 5;
        assert_eq!(
            first_conflict(&hits, &candidates),
            Some(Conflict {
                position: 8,
                peer: 0,
                digit: 5
            })
        );
    }

    #[test]
    fn test_column_conflict() {
        let mut hits = HitCountMatrix::new(2);
        settle(&mut hits, 4, 9);
        assert!(is_blocked(&hits, 76, 9));
        assert!(!is_blocked(&hits, 76, 8));
    }

    #[test]
    fn test_box_not_checked() {
        let mut hits = HitCountMatrix::new(2);
        settle(&mut hits, 0, 3);
        // Position 10 is r2c2: same box as r1c1, different row and column.
        assert!(!is_blocked(&hits, 10, 3));
    }

    #[test]
    fn test_unsettled_peer_does_not_block() {
        let mut hits = HitCountMatrix::new(3);
        hits.vote(0, 5);
        hits.vote(0, 5);
        assert!(!is_blocked(&hits, 1, 5));
    }

    #[test]
    fn test_zero_never_blocked() {
        let mut hits = HitCountMatrix::new(1);
        settle(&mut hits, 0, 1);
        assert!(!is_blocked(&hits, 1, 0));
    }
}
