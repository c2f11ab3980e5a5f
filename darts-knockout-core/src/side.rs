//! Sides and tournament-scoped players.

use crate::id::{DivisionId, PlayerId, SideId, TeamId};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A lightweight projection of a roster player, scoped to one tournament.
///
/// This is distinct from the roster record the player originates from; only
/// the `id` carries identity, the `name` is a display copy taken at the time
/// the player was selected.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TournamentPlayer {
    pub id: PlayerId,
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub division_id: Option<DivisionId>,
}

impl TournamentPlayer {
    pub fn new(id: PlayerId, name: String) -> Self {
        Self {
            id,
            name,
            division_id: None,
        }
    }
}

/// One competitor in the knockout bracket.
///
/// A side is either a *team side* (`team_id` set), a *player side* (one or
/// more players listed) or transiently unresolved while it is being created.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Side {
    pub id: SideId,
    pub name: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub team_id: Option<TeamId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub players: Vec<TournamentPlayer>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub no_show: bool,
}

impl Side {
    pub fn new(id: SideId, name: String) -> Self {
        Self {
            id,
            name,
            team_id: None,
            players: Vec::new(),
            no_show: false,
        }
    }

    /// The generated display name for `players`: their names sorted and
    /// comma-joined.
    pub fn auto_name(players: &[TournamentPlayer]) -> String {
        let mut names: Vec<&str> = players.iter().map(|p| p.name.as_str()).collect();
        names.sort_unstable();
        names.join(", ")
    }

    /// Returns `true` if the side represents a whole team.
    #[inline]
    pub fn is_team_side(&self) -> bool {
        self.team_id.is_some()
    }

    /// Returns `true` if the side is a list of individual players.
    #[inline]
    pub fn is_player_side(&self) -> bool {
        !self.players.is_empty()
    }

    /// Returns `true` if the side names a team or at least one player.
    #[inline]
    pub fn is_resolved(&self) -> bool {
        self.is_team_side() || self.is_player_side()
    }

    /// Replaces the side's membership.
    ///
    /// The side is renamed only when its current name equals the
    /// auto-generated name of the previous membership; a name the user typed
    /// themselves is never overwritten.
    pub fn with_players(&self, players: Vec<TournamentPlayer>) -> Side {
        let mut side = self.clone();
        if side.name == Self::auto_name(&self.players) {
            side.name = Self::auto_name(&players);
        }
        side.players = players;
        side
    }
}
