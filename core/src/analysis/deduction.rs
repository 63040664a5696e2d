//! Single-clue deductions.
//!
//! Each rule looks at one revealed number at a time, scanning the board in
//! row-major order and stopping at the first hit. Overlapping constraints
//! between neighboring numbers are never combined.

use crate::*;

/// A clue whose open neighbors must all be mines: `n - f == u` with `u > 0`.
pub fn find_certain_mine(board: &BoardSnapshot) -> Option<Coord2> {
    board
        .clues()
        .find(|clue| !clue.open.is_empty() && clue.remaining_mines() == clue.open.len() as i16)
        .map(|clue| clue.open[0])
}

/// A clue whose flags already account for its number, so every open
/// neighbor is safe: `n == f` with `u > 0`.
pub fn find_certain_safe(board: &BoardSnapshot) -> Option<Coord2> {
    first_satisfied_neighbor(board, 0)
}

/// Like [`find_certain_safe`], restricted to clues showing at least one mine.
pub fn find_safe_near_numbers(board: &BoardSnapshot) -> Option<Coord2> {
    first_satisfied_neighbor(board, 1)
}

fn first_satisfied_neighbor(board: &BoardSnapshot, min_clue: u8) -> Option<Coord2> {
    board
        .clues()
        .filter(|clue| clue.adjacent_mines >= min_clue)
        .find(|clue| !clue.open.is_empty() && clue.remaining_mines() == 0)
        .map(|clue| clue.open[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    fn board(text: &str) -> BoardSnapshot {
        text.parse().unwrap()
    }

    #[test]
    fn certain_mine_needs_remaining_equal_open() {
        // (0,2) reads 1 with a single open neighbor
        let board = board("F11\n12.\n111");

        assert_eq!(find_certain_mine(&board), Some((1, 2)));
    }

    #[test]
    fn certain_mine_ignores_satisfied_clues() {
        let board = board("F1.\n11.\n...");

        assert_eq!(find_certain_mine(&board), None);
    }

    #[test]
    fn certain_safe_when_flags_match_number() {
        let board = board("F1.\n11.\n...");

        assert_eq!(find_certain_safe(&board), Some((0, 2)));
        assert_eq!(find_safe_near_numbers(&board), Some((0, 2)));
    }

    #[test]
    fn scan_order_is_row_major() {
        // both (0,0) and (2,2) are satisfied ones; the earlier clue wins
        let cells = vec![
            Cell::revealed(1),
            Cell::HIDDEN,
            Cell::HIDDEN,
            Cell::FLAGGED,
            Cell::HIDDEN,
            Cell::HIDDEN,
            Cell::HIDDEN,
            Cell::FLAGGED,
            Cell::revealed(1),
        ];
        let board = BoardSnapshot::from_cells((3, 3), cells).unwrap();

        assert_eq!(find_certain_safe(&board), Some((0, 1)));
    }

    #[test]
    fn zero_clues_only_count_for_the_full_rule() {
        let board = board("0.\n..");

        assert_eq!(find_certain_safe(&board), Some((0, 1)));
        assert_eq!(find_safe_near_numbers(&board), None);
    }

    #[test]
    fn revealed_mines_are_not_clues() {
        let board = board("*.\n..");

        assert_eq!(find_certain_mine(&board), None);
        assert_eq!(find_certain_safe(&board), None);
    }
}
