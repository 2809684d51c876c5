//! Leaderboard statistics derived from finished games.

use crate::store::GameRecord;
use derive_getters::Getters;
use std::collections::BTreeMap;
use tracing::{debug, instrument};

/// Value reported when a statistic cannot be determined — no finished
/// games, or a tie for the most wins.
pub const UNDETERMINED: &str = "undetermined";

/// Aggregate statistics over all finished games.
///
/// Always recomputed from scratch from the full finished-record set;
/// there is no incremental state to drift.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct LeaderboardSnapshot {
    /// Player with strictly more wins than every other player.
    best_player: Option<String>,
    /// Fewest moves among finished games.
    shortest_game: Option<u32>,
    /// Most moves among finished games.
    longest_game: Option<u32>,
}

impl LeaderboardSnapshot {
    /// Recomputes the snapshot over the given finished records.
    ///
    /// Records whose winner name is empty are excluded. Best player is
    /// `None` when two or more names tie for the maximum win count.
    #[instrument(skip(finished))]
    pub fn recompute<'a, I>(finished: I) -> Self
    where
        I: IntoIterator<Item = &'a GameRecord>,
    {
        let mut wins: BTreeMap<&str, u32> = BTreeMap::new();
        let mut shortest_game: Option<u32> = None;
        let mut longest_game: Option<u32> = None;

        for record in finished {
            let Some(winner) = record.winner_name() else {
                continue;
            };
            *wins.entry(winner).or_default() += 1;

            let moves = *record.move_count();
            shortest_game = Some(shortest_game.map_or(moves, |m| m.min(moves)));
            longest_game = Some(longest_game.map_or(moves, |m| m.max(moves)));
        }

        let best_player = match wins.values().max().copied() {
            Some(max) => {
                let mut leaders = wins.iter().filter(|(_, w)| **w == max);
                match (leaders.next(), leaders.next()) {
                    (Some((name, _)), None) => Some((*name).to_string()),
                    _ => None,
                }
            }
            None => None,
        };

        debug!(
            players = wins.len(),
            best = best_player.as_deref().unwrap_or(UNDETERMINED),
            "Leaderboard recomputed"
        );

        Self {
            best_player,
            shortest_game,
            longest_game,
        }
    }

    /// The six fixed label/value lines of `top-scores.txt`, in order:
    /// best player, longest game, shortest game.
    pub fn to_report(&self) -> [String; 6] {
        let undetermined = || UNDETERMINED.to_string();
        [
            "Most wins".to_string(),
            self.best_player.clone().unwrap_or_else(undetermined),
            "Longest game".to_string(),
            self.longest_game
                .map_or_else(undetermined, |m| m.to_string()),
            "Shortest game".to_string(),
            self.shortest_game
                .map_or_else(undetermined, |m| m.to_string()),
        ]
    }
}
