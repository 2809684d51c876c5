//! UI-facing game session facade.
//!
//! The console UI (menus, cursor navigation, rendering) is an external
//! collaborator: it calls in with row/column coordinates and renders
//! whatever board snapshot the current record exposes.

use crate::game::{self, Board, ConfigError, GameEngine, Outcome};
use crate::leaderboard::LeaderboardSnapshot;
use crate::store::{FirstMove, GameRecord, SaveStore, StoreError};
use derive_getters::Getters;
use derive_more::{Display, Error, From};
use derive_new::new;
use tracing::{debug, info, instrument};

/// Errors surfaced to the UI layer.
#[derive(Debug, Display, Error, From)]
pub enum SessionError {
    /// Board dimensions out of range.
    #[from]
    Config(ConfigError),
    /// Persistence failure — the current move may not be durable.
    #[from]
    Store(StoreError),
    /// An operation needing an active game was called without one.
    #[display("no active game")]
    NoActiveGame,
    /// No save exists with the requested code.
    #[display("unknown save code: {_0}")]
    UnknownSave(#[error(not(source))] String),
}

/// Listing entry for the saved-games screen: what the UI shows per row.
#[derive(Debug, Clone, PartialEq, new, Getters)]
pub struct SaveSummary {
    /// Save file code, most recent sorts first.
    unique_code: String,
    /// Player names, white then black.
    players: [String; 2],
    /// Moves made so far.
    move_count: u32,
    /// Whether the game already finished.
    is_win: bool,
}

impl From<&GameRecord> for SaveSummary {
    fn from(record: &GameRecord) -> Self {
        Self::new(
            record.unique_code().clone(),
            record.players().clone(),
            *record.move_count(),
            *record.is_win(),
        )
    }
}

/// One interactive game session: the current record plus the engine and
/// store behind it.
#[derive(Debug)]
pub struct GameSession {
    engine: GameEngine,
    current: Option<GameRecord>,
}

impl GameSession {
    /// Creates a session persisting through the given store.
    #[instrument(skip(store))]
    pub fn new(store: SaveStore) -> Self {
        Self {
            engine: GameEngine::new(store),
            current: None,
        }
    }

    /// The record of the game in progress, if any.
    pub fn current(&self) -> Option<&GameRecord> {
        self.current.as_ref()
    }

    /// Starts a new game and persists the starting position (move 0).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Config`] for out-of-range dimensions and
    /// [`SessionError::Store`] when the initial save fails.
    #[instrument(skip(self, players))]
    pub fn start_game(
        &mut self,
        height: usize,
        width: usize,
        players: [String; 2],
        first_move: FirstMove,
    ) -> Result<&GameRecord, SessionError> {
        let board = Board::new(height, width)?;
        let record = self.engine.store().create(board, players, first_move)?;
        info!(code = %record.unique_code(), height, width, "Game started");
        Ok(self.current.insert(record))
    }

    /// Legal destinations for the pawn at `(row, col)` on the current
    /// board. Empty when no game is active or the pawn is not the
    /// mover's.
    pub fn legal_moves(&self, row: usize, col: usize) -> Vec<(usize, usize)> {
        match &self.current {
            Some(record) => game::legal_moves(record.board(), row, col, record.side_to_move()),
            None => Vec::new(),
        }
    }

    /// The mover's pawns that can move at all, for the selection cursor.
    pub fn movable_pawns(&self) -> Vec<(usize, usize)> {
        match &self.current {
            Some(record) => game::movable_pawns(record.board(), record.side_to_move()),
            None => Vec::new(),
        }
    }

    /// Applies a move previously obtained from
    /// [`legal_moves`](Self::legal_moves) and persists the result.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NoActiveGame`] without a current record and
    /// [`SessionError::Store`] when the move could not be saved — the UI
    /// must tell the player the move is not durable.
    #[instrument(skip(self))]
    pub fn apply_move(
        &mut self,
        from_row: usize,
        from_col: usize,
        to_row: usize,
        to_col: usize,
    ) -> Result<Outcome, SessionError> {
        let record = self.current.as_ref().ok_or(SessionError::NoActiveGame)?;
        let (next, outcome) =
            self.engine
                .apply_move(record, (from_row, from_col), (to_row, to_col))?;
        self.current = Some(next);
        Ok(outcome)
    }

    /// Summaries of every readable save, most recent first.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the saves directory is
    /// unreadable; individual corrupt files are skipped and logged by the
    /// store.
    #[instrument(skip(self))]
    pub fn list_saves(&self) -> Result<Vec<SaveSummary>, SessionError> {
        let records = self.engine.store().load_all()?;
        debug!(count = records.len(), "Saves listed");
        Ok(records.iter().map(SaveSummary::from).collect())
    }

    /// Resumes the game saved under the given code.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::UnknownSave`] when no readable save has
    /// that code.
    #[instrument(skip(self))]
    pub fn load_save(&mut self, code: &str) -> Result<&GameRecord, SessionError> {
        let record = self
            .engine
            .store()
            .load_all()?
            .into_iter()
            .find(|r| r.unique_code() == code)
            .ok_or_else(|| SessionError::UnknownSave(code.to_string()))?;
        info!(code = %record.unique_code(), move_count = record.move_count(), "Save loaded");
        Ok(self.current.insert(record))
    }

    /// Current leaderboard, recomputed from all finished games; also
    /// rewrites `top-scores.txt`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Store`] when the store cannot be read or
    /// the leaderboard file cannot be written.
    #[instrument(skip(self))]
    pub fn leaderboard(&self) -> Result<LeaderboardSnapshot, SessionError> {
        Ok(self.engine.store().refresh_top_scores()?)
    }
}
