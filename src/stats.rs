//! Player statistics derived from match history
//!
//! Win rate, a per-player view of each match, and the "nemesis": the
//! opponent a player fares worst against.

use crate::types::{MatchRecord, MatchSummary, Player, PlayerId, Rating};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Opponents met fewer times than this never count as a nemesis
pub const MIN_MATCHES_FOR_NEMESIS: u32 = 3;

/// Win percentage (0-100), 0.0 for a player without games
pub fn win_rate(wins: u32, losses: u32) -> f64 {
    let total = wins + losses;
    if total == 0 {
        return 0.0;
    }
    wins as f64 / total as f64 * 100.0
}

/// One match seen from a single player's side of the table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerMatchView {
    pub match_id: u64,
    pub opponent_id: PlayerId,
    pub opponent_name: String,
    pub sets_won: u32,
    pub sets_lost: u32,
    pub rating_before: Rating,
    pub rating_after: Rating,
    pub rating_change: i64,
    pub won: bool,
}

impl PlayerMatchView {
    /// Build the view for `player_id`; `None` if the player did not take part
    pub fn from_summary(player_id: PlayerId, summary: &MatchSummary) -> Option<Self> {
        let record = &summary.record;

        let view = if record.player1_id == player_id {
            Self {
                match_id: record.id,
                opponent_id: record.player2_id,
                opponent_name: summary.player2_name.clone(),
                sets_won: record.sets_won1,
                sets_lost: record.sets_won2,
                rating_before: record.player1_rating_before,
                rating_after: record.player1_rating_after,
                rating_change: record.player1_rating_after - record.player1_rating_before,
                won: record.sets_won1 > record.sets_won2,
            }
        } else if record.player2_id == player_id {
            Self {
                match_id: record.id,
                opponent_id: record.player1_id,
                opponent_name: summary.player1_name.clone(),
                sets_won: record.sets_won2,
                sets_lost: record.sets_won1,
                rating_before: record.player2_rating_before,
                rating_after: record.player2_rating_after,
                rating_change: record.player2_rating_after - record.player2_rating_before,
                won: record.sets_won2 > record.sets_won1,
            }
        } else {
            return None;
        };

        Some(view)
    }
}

/// Head-to-head record against the worst opponent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Nemesis {
    pub opponent_id: PlayerId,
    pub opponent_name: String,
    pub wins: u32,
    pub losses: u32,
    pub total_matches: u32,
    pub win_rate: f64,
}

/// Find the opponent with the lowest win rate among those met at least
/// [`MIN_MATCHES_FOR_NEMESIS`] times.
///
/// Ties go to the opponent met first in `matches` order.
pub fn calculate_nemesis(player_id: PlayerId, matches: &[MatchSummary]) -> Option<Nemesis> {
    let mut order: Vec<PlayerId> = Vec::new();
    let mut head_to_head: HashMap<PlayerId, (String, u32, u32)> = HashMap::new();

    for view in matches
        .iter()
        .filter_map(|summary| PlayerMatchView::from_summary(player_id, summary))
    {
        let entry = head_to_head.entry(view.opponent_id).or_insert_with(|| {
            order.push(view.opponent_id);
            (view.opponent_name.clone(), 0, 0)
        });
        if view.won {
            entry.1 += 1;
        } else {
            entry.2 += 1;
        }
    }

    let mut nemesis: Option<Nemesis> = None;
    for opponent_id in order {
        let (name, wins, losses) = &head_to_head[&opponent_id];
        let total_matches = wins + losses;
        if total_matches < MIN_MATCHES_FOR_NEMESIS {
            continue;
        }

        let rate = win_rate(*wins, *losses);
        if nemesis.as_ref().map_or(true, |worst| rate < worst.win_rate) {
            nemesis = Some(Nemesis {
                opponent_id,
                opponent_name: name.clone(),
                wins: *wins,
                losses: *losses,
                total_matches,
                win_rate: rate,
            });
        }
    }

    nemesis
}

/// Everything shown about a single player
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerProfile {
    pub player: Player,
    pub games_played: u32,
    pub win_rate: f64,
    pub matches: Vec<PlayerMatchView>,
    pub nemesis: Option<Nemesis>,
}

impl PlayerProfile {
    /// Assemble a profile from the player's matches (newest first)
    pub fn build(player: Player, matches: &[MatchSummary]) -> Self {
        let views = matches
            .iter()
            .filter_map(|summary| PlayerMatchView::from_summary(player.id, summary))
            .collect();
        let nemesis = calculate_nemesis(player.id, matches);

        Self {
            games_played: player.games_played(),
            win_rate: win_rate(player.wins, player.losses),
            matches: views,
            nemesis,
            player,
        }
    }
}

/// Attach player names to match records; records with unknown players are
/// skipped.
pub fn summarize_matches(records: Vec<MatchRecord>, players: &[Player]) -> Vec<MatchSummary> {
    let names: HashMap<PlayerId, &str> = players
        .iter()
        .map(|player| (player.id, player.name.as_str()))
        .collect();

    records
        .into_iter()
        .filter_map(|record| {
            let player1_name = names.get(&record.player1_id)?.to_string();
            let player2_name = names.get(&record.player2_id)?.to_string();
            Some(MatchSummary {
                record,
                player1_name,
                player2_name,
            })
        })
        .collect()
}
