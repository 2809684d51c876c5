//! Legal move generation.
//!
//! Pawns advance one row toward the opponent's edge. The straight step
//! requires an empty destination; the diagonal steps are legal onto an
//! empty cell or an enemy pawn (the shipped ruleset permits diagonal
//! advance without a capture).

use super::board::{Board, Cell, Side};
use tracing::instrument;

/// Legal destination cells for the pawn at `(row, col)`.
///
/// Returns an empty list when the cell does not hold a pawn of the side
/// to move. Destinations are emitted in fixed column-offset order
/// `{-1, 0, +1}` so cursor navigation and tests are reproducible.
#[instrument(skip(board))]
pub fn legal_moves(board: &Board, row: usize, col: usize, to_move: Side) -> Vec<(usize, usize)> {
    match board.get(row, col) {
        Some(cell) if cell.holds(to_move) => {}
        _ => return Vec::new(),
    }

    let Some(dest_row) = to_move.forward_row(row, board.height()) else {
        return Vec::new();
    };

    let mut moves = Vec::new();
    for offset in [-1isize, 0, 1] {
        let Some(dest_col) = col.checked_add_signed(offset) else {
            continue;
        };
        let Some(dest) = board.get(dest_row, dest_col) else {
            continue;
        };
        let legal = if offset == 0 {
            dest == Cell::Empty
        } else {
            dest == Cell::Empty || dest.holds(to_move.opponent())
        };
        if legal {
            moves.push((dest_row, dest_col));
        }
    }
    moves
}

/// Coordinates of the mover's pawns that have at least one legal
/// destination, in row-major order.
///
/// This is what the pawn-selection cursor iterates over.
#[instrument(skip(board))]
pub fn movable_pawns(board: &Board, to_move: Side) -> Vec<(usize, usize)> {
    let mut pawns = Vec::new();
    for row in 0..board.height() {
        for col in 0..board.width() {
            if board.get(row, col).is_some_and(|c| c.holds(to_move))
                && !legal_moves(board, row, col, to_move).is_empty()
            {
                pawns.push((row, col));
            }
        }
    }
    pawns
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_board() -> Board {
        // 8x8 with the two middle rows cleared around a single white pawn
        // at (6, 3) facing empty cells.
        let mut board = Board::new(8, 8).expect("valid dimensions");
        for col in 0..8 {
            board.set(5, col, Cell::Empty);
        }
        board
    }

    #[test]
    fn test_white_pawn_three_open_destinations() {
        let board = open_board();
        let moves = legal_moves(&board, 6, 3, Side::White);
        assert_eq!(moves, vec![(5, 2), (5, 3), (5, 4)]);
    }

    #[test]
    fn test_wrong_side_returns_empty() {
        let board = open_board();
        assert!(legal_moves(&board, 6, 3, Side::Black).is_empty());
        assert!(legal_moves(&board, 4, 4, Side::White).is_empty());
    }

    #[test]
    fn test_straight_blocked_by_any_pawn() {
        let mut board = open_board();
        board.set(5, 3, Cell::Pawn(Side::Black));
        let moves = legal_moves(&board, 6, 3, Side::White);
        // Diagonals stay legal (capture left as empty advance right),
        // the straight step does not.
        assert_eq!(moves, vec![(5, 2), (5, 4)]);

        board.set(5, 3, Cell::Pawn(Side::White));
        let moves = legal_moves(&board, 6, 3, Side::White);
        assert_eq!(moves, vec![(5, 2), (5, 4)]);
    }

    #[test]
    fn test_diagonal_capture_and_own_block() {
        let mut board = open_board();
        board.set(5, 2, Cell::Pawn(Side::Black));
        board.set(5, 4, Cell::Pawn(Side::White));
        let moves = legal_moves(&board, 6, 3, Side::White);
        // Enemy diagonal is a capture, own pawn blocks the other diagonal.
        assert_eq!(moves, vec![(5, 2), (5, 3)]);
    }

    #[test]
    fn test_edge_columns_stay_in_bounds() {
        let board = open_board();
        assert_eq!(legal_moves(&board, 6, 0, Side::White), vec![(5, 0), (5, 1)]);
        assert_eq!(legal_moves(&board, 6, 7, Side::White), vec![(5, 6), (5, 7)]);
    }

    #[test]
    fn test_black_moves_toward_bottom() {
        let mut board = Board::new(8, 8).expect("valid dimensions");
        for col in 0..8 {
            board.set(2, col, Cell::Empty);
        }
        let moves = legal_moves(&board, 1, 3, Side::Black);
        assert_eq!(moves, vec![(2, 2), (2, 3), (2, 4)]);
    }

    #[test]
    fn test_pawn_on_target_row_has_no_moves() {
        let mut board = open_board();
        board.set(0, 3, Cell::Pawn(Side::White));
        assert!(legal_moves(&board, 0, 3, Side::White).is_empty());
    }

    #[test]
    fn test_all_destinations_in_bounds() {
        let board = Board::new(6, 4).expect("valid dimensions");
        for side in [Side::White, Side::Black] {
            for row in 0..6 {
                for col in 0..4 {
                    for (r, c) in legal_moves(&board, row, col, side) {
                        assert!(r < 6 && c < 4, "destination ({r},{c}) out of bounds");
                    }
                }
            }
        }
    }

    #[test]
    fn test_movable_pawns_matches_legal_moves() {
        let board = Board::new(8, 8).expect("valid dimensions");
        // Opening position: only the front white row (row 6) can move.
        let pawns = movable_pawns(&board, Side::White);
        assert_eq!(pawns.len(), 8);
        assert!(pawns.iter().all(|&(row, _)| row == 6));
        for &(row, col) in &pawns {
            assert!(!legal_moves(&board, row, col, Side::White).is_empty());
        }
    }
}
