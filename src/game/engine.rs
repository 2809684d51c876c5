//! Move application and terminal-state detection.

use super::board::{Board, Cell, Side};
use crate::store::{GameRecord, SaveStore, StoreError};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

/// Why a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::Display)]
pub enum WinReason {
    /// A pawn reached the opponent's edge.
    EdgeReached,
    /// The opponent has no pawns left.
    OpponentEliminated,
}

/// Result of applying a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome {
    /// Game continues with the other side to move.
    InProgress,
    /// Game over.
    Won {
        /// Winning side.
        side: Side,
        /// What ended the game.
        reason: WinReason,
    },
}

/// Applies moves, persists each resulting snapshot, and detects the end
/// of the game.
#[derive(Debug)]
pub struct GameEngine {
    store: SaveStore,
}

impl GameEngine {
    /// Creates an engine persisting through the given store.
    #[instrument(skip(store))]
    pub fn new(store: SaveStore) -> Self {
        Self { store }
    }

    /// Returns the underlying save store.
    pub fn store(&self) -> &SaveStore {
        &self.store
    }

    /// Moves the pawn at `from` to `to` and persists the new snapshot.
    ///
    /// The caller must pass coordinates obtained from
    /// [`legal_moves`](crate::legal_moves); legality is not re-checked
    /// here. The input record is never mutated — the returned record is a
    /// brand-new one (fresh code, `move_count + 1`, and `is_win` set when
    /// a terminal condition was reached, in which case the finished record
    /// is persisted once more and the leaderboard file is refreshed).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when persistence fails; the move is then not
    /// durable and the caller must surface that to the player.
    #[instrument(
        skip(self, record),
        fields(code = %record.unique_code(), move_count = record.move_count())
    )]
    pub fn apply_move(
        &self,
        record: &GameRecord,
        from: (usize, usize),
        to: (usize, usize),
    ) -> Result<(GameRecord, Outcome), StoreError> {
        let mover = record.side_to_move();

        let mut board = record.board().clone();
        board.set(from.0, from.1, Cell::Empty);
        board.set(to.0, to.1, Cell::Pawn(mover));
        debug!(?mover, ?from, ?to, "Pawn moved");

        let advanced = self.store.rotate(record, board)?;

        let outcome = evaluate_terminal(advanced.board(), mover, to);
        match outcome {
            Outcome::InProgress => Ok((advanced, outcome)),
            Outcome::Won { side, reason } => {
                info!(%side, %reason, move_count = advanced.move_count(), "Game over");
                let finished = self.store.mark_won(&advanced)?;
                self.store.refresh_top_scores()?;
                Ok((finished, outcome))
            }
        }
    }
}

/// Evaluates terminal conditions after `mover` landed on `dest`.
///
/// Checks run in fixed order so simultaneous conditions resolve
/// deterministically: edge reached first, then elimination.
#[instrument(skip(board))]
pub fn evaluate_terminal(board: &Board, mover: Side, dest: (usize, usize)) -> Outcome {
    if dest.0 == mover.target_row(board.height()) {
        return Outcome::Won {
            side: mover,
            reason: WinReason::EdgeReached,
        };
    }
    if board.count(mover.opponent()) == 0 {
        return Outcome::Won {
            side: mover,
            reason: WinReason::OpponentEliminated,
        };
    }
    if board.count(mover) == 0 {
        return Outcome::Won {
            side: mover.opponent(),
            reason: WinReason::OpponentEliminated,
        };
    }
    Outcome::InProgress
}
