//! Board, rules, and move engine for Breakthrough.

mod board;
mod engine;
mod rules;

pub use board::{Board, Cell, ConfigError, MAX_HEIGHT, MAX_WIDTH, MIN_HEIGHT, MIN_WIDTH, Side};
pub use engine::{GameEngine, Outcome, WinReason, evaluate_terminal};
pub use rules::{legal_moves, movable_pawns};
