//! Notable-event records: 180s and high checkouts.
//!
//! `one_eighties` is a flat multiset: the same player id appears once per
//! occurrence and the append path is a single push. Grouping with a count
//! happens on read. Removal takes out exactly one matching entry, which is
//! why the representation stays a multiset rather than a count map.

use std::collections::HashMap;

use crate::id::PlayerId;
use crate::side::TournamentPlayer;
use crate::tournament::Tournament;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A checkout of more than 100, attributed to a player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Checkout {
    pub id: PlayerId,
    pub name: String,
    pub score: u32,
}

/// A grouped view of one player's accolades.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccoladeCount {
    pub id: PlayerId,
    pub name: String,
    pub count: usize,
}

/// Groups a multiset of players by id, sorted by occurrence count
/// descending (ties by name). This is how an `x N` suffix is derived for
/// display.
pub fn group_and_sort_by_occurrences(players: &[TournamentPlayer]) -> Vec<AccoladeCount> {
    let mut counts: Vec<AccoladeCount> = Vec::new();
    let mut index: HashMap<PlayerId, usize> = HashMap::new();

    for player in players {
        match index.get(&player.id) {
            Some(&at) => counts[at].count += 1,
            None => {
                index.insert(player.id, counts.len());
                counts.push(AccoladeCount {
                    id: player.id,
                    name: player.name.clone(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
    counts
}

impl Tournament {
    /// Records one 180 for `player`.
    pub fn add_180(&self, player: TournamentPlayer) -> Tournament {
        let mut tournament = self.clone();
        tournament.one_eighties.push(player);
        tournament
    }

    /// Removes exactly one 180 entry for `id`, leaving any further
    /// occurrences in place.
    pub fn remove_180(&self, id: PlayerId) -> Tournament {
        let mut tournament = self.clone();
        if let Some(at) = tournament.one_eighties.iter().position(|p| p.id == id) {
            tournament.one_eighties.remove(at);
        }
        tournament
    }

    /// Records a checkout of `score` for `player`.
    pub fn add_hi_check(&self, player: TournamentPlayer, score: u32) -> Tournament {
        let mut tournament = self.clone();
        tournament.over100_checkouts.push(Checkout {
            id: player.id,
            name: player.name,
            score,
        });
        tournament
    }

    /// Removes exactly one checkout entry matching `id` and `score`.
    pub fn remove_hi_check(&self, id: PlayerId, score: u32) -> Tournament {
        let mut tournament = self.clone();
        if let Some(at) = tournament
            .over100_checkouts
            .iter()
            .position(|c| c.id == id && c.score == score)
        {
            tournament.over100_checkouts.remove(at);
        }
        tournament
    }

    /// The players currently eligible for accolade selection: everyone
    /// seated in a side that has shown up, de-duplicated by id.
    ///
    /// Removing a side drops its players from this set for future
    /// selections; accolades already recorded for them are untouched.
    pub fn eligible_players(&self) -> Vec<&TournamentPlayer> {
        let mut seen = Vec::new();
        let mut players = Vec::new();

        for side in self.sides.iter().filter(|side| !side.no_show) {
            for player in &side.players {
                if !seen.contains(&player.id) {
                    seen.push(player.id);
                    players.push(player);
                }
            }
        }

        players
    }
}
