//! Persisted game records and their on-disk JSON shape.

use super::error::StoreError;
use crate::game::{Board, Cell, Side};
use derive_getters::Getters;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::instrument;

/// Which side takes the first move of the game. Fixed at game creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FirstMove {
    /// White moves first (wire code 0).
    #[default]
    White,
    /// Black moves first (wire code 1).
    Black,
}

impl FirstMove {
    /// Parity offset used in turn and winner derivation.
    pub fn offset(self) -> u32 {
        match self {
            FirstMove::White => 0,
            FirstMove::Black => 1,
        }
    }

    /// Parses the wire code (0 or 1).
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(FirstMove::White),
            1 => Some(FirstMove::Black),
            _ => None,
        }
    }
}

/// The persisted unit: one logical game, backed by one file on disk.
///
/// Records are immutable — every change produces a brand-new record with a
/// fresh unique code, keeping the store append-only at the logical level.
#[derive(Debug, Clone, PartialEq, Getters)]
pub struct GameRecord {
    /// Millisecond-precision timestamp string; names the save file and
    /// orders records by recency.
    unique_code: String,
    /// Moves made so far.
    move_count: u32,
    /// Player names, white then black.
    players: [String; 2],
    /// Side taking the first move.
    first_move: FirstMove,
    /// Current board snapshot.
    board: Board,
    /// Whether the game has finished with a winner.
    is_win: bool,
}

impl GameRecord {
    /// A fresh record at move 0.
    pub(crate) fn create(
        unique_code: String,
        board: Board,
        players: [String; 2],
        first_move: FirstMove,
    ) -> Self {
        Self {
            unique_code,
            move_count: 0,
            players,
            first_move,
            board,
            is_win: false,
        }
    }

    /// Successor record after one move.
    pub(crate) fn advanced(&self, unique_code: String, board: Board) -> Self {
        Self {
            unique_code,
            move_count: self.move_count + 1,
            players: self.players.clone(),
            first_move: self.first_move,
            board,
            is_win: self.is_win,
        }
    }

    /// Successor record flagged as finished.
    pub(crate) fn finished(&self, unique_code: String) -> Self {
        Self {
            unique_code,
            is_win: true,
            ..self.clone()
        }
    }

    /// Side whose turn it is, derived from move count and first-move parity.
    pub fn side_to_move(&self) -> Side {
        if (self.move_count + self.first_move.offset()) % 2 == 0 {
            Side::White
        } else {
            Side::Black
        }
    }

    /// Name of the player who made the final move of a finished game,
    /// derived purely from parity. `None` when that name is empty.
    pub fn winner_name(&self) -> Option<&str> {
        let idx = ((self.first_move.offset() + self.move_count + 1) % 2) as usize;
        let name = self.players[idx].as_str();
        (!name.is_empty()).then_some(name)
    }
}

/// On-disk JSON shape of a [`GameRecord`].
///
/// Required fields are optional here so a missing one surfaces as a
/// `MalformedRecord` naming the field, instead of a blanket parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub(crate) struct SaveData {
    unique_code: Option<String>,
    #[serde(default)]
    move_count: u32,
    players: Option<Vec<String>>,
    #[serde(default)]
    first_move: u8,
    matrix: Option<Vec<Vec<u8>>>,
    #[serde(default)]
    is_win: bool,
}

impl SaveData {
    pub(crate) fn from_record(record: &GameRecord) -> Self {
        Self {
            unique_code: Some(record.unique_code.clone()),
            move_count: record.move_count,
            players: Some(record.players.to_vec()),
            first_move: record.first_move.offset() as u8,
            matrix: Some(record.board.to_matrix()),
            is_win: record.is_win,
        }
    }

    /// Validating rehydration of a record, replacing the original's
    /// reflection-based private-field injection.
    ///
    /// # Errors
    ///
    /// Returns a `MalformedRecord` [`StoreError`] when a required field is
    /// absent or holds an invalid value.
    #[instrument(skip(self, path), fields(path = %path.display()))]
    pub(crate) fn into_record(self, path: &Path) -> Result<GameRecord, StoreError> {
        let unique_code = self
            .unique_code
            .ok_or_else(|| StoreError::malformed("missing 'UniqueCode' field", path))?;

        let players = self
            .players
            .ok_or_else(|| StoreError::malformed("missing 'Players' field", path))?;
        let players: [String; 2] = players.try_into().map_err(|_| {
            StoreError::malformed("'Players' must contain exactly two names", path)
        })?;

        let first_move = FirstMove::from_code(self.first_move)
            .ok_or_else(|| StoreError::malformed("'FirstMove' must be 0 or 1", path))?;

        let matrix = self
            .matrix
            .ok_or_else(|| StoreError::malformed("missing 'Matrix' field", path))?;
        let rows = matrix
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(Cell::from_code)
                    .collect::<Option<Vec<Cell>>>()
            })
            .collect::<Option<Vec<Vec<Cell>>>>()
            .ok_or_else(|| StoreError::malformed("'Matrix' holds an invalid cell value", path))?;
        let board =
            Board::from_rows(rows).map_err(|e| StoreError::malformed(e.to_string(), path))?;

        Ok(GameRecord {
            unique_code,
            move_count: self.move_count,
            players,
            first_move,
            board,
            is_win: self.is_win,
        })
    }
}
