//! Breakthrough game engine with durable save rotation and leaderboard
//! statistics.
//!
//! Pawns advance toward the opposite edge and capture diagonally; a side
//! wins by reaching the far edge or eliminating the opponent's pawns. The
//! crate provides the rule engine and the persistence layer; menus, key
//! handling, and rendering are external collaborators driving the
//! [`GameSession`] facade.
//!
//! # Architecture
//!
//! - **Game**: board types, legal-move generation, move application, and
//!   terminal-state detection
//! - **Store**: durable save-file rotation (write new, then delete old)
//!   with tamper detection and per-file error isolation on load
//! - **Leaderboard**: aggregate statistics recomputed from finished games
//! - **Session**: the UI-facing facade tying the above together
//!
//! # Example
//!
//! ```no_run
//! use breakthrough::{FirstMove, GameSession, SaveStore};
//!
//! # fn main() -> Result<(), breakthrough::SessionError> {
//! let mut session = GameSession::new(SaveStore::new("./data"));
//! session.start_game(8, 8, ["Alice".into(), "Bob".into()], FirstMove::White)?;
//!
//! let destinations = session.legal_moves(6, 3);
//! let (to_row, to_col) = destinations[0];
//! let outcome = session.apply_move(6, 3, to_row, to_col)?;
//! println!("{outcome:?}");
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Private module declarations
mod game;
mod leaderboard;
mod session;
mod store;

// Crate-level exports - game types and rules
pub use game::{
    Board, Cell, ConfigError, GameEngine, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, Outcome,
    Side, WinReason, evaluate_terminal, legal_moves, movable_pawns,
};

// Crate-level exports - persistence
pub use store::{FirstMove, GameRecord, SaveStore, StoreError, StoreErrorKind};

// Crate-level exports - leaderboard
pub use leaderboard::{LeaderboardSnapshot, UNDETERMINED};

// Crate-level exports - UI-facing session facade
pub use session::{GameSession, SaveSummary, SessionError};
