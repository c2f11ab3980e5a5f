//! Side and player eligibility.
//!
//! Three independent rules feed the selection surfaces:
//!
//! - exclusivity within a round: a side may only occupy one spot per round
//!   ([`is_excluded`]);
//! - same-night conflicts: a player already committed to another fixture
//!   on the same date is flagged, never blocked;
//! - roster filters: division binding and non-deleted team-seasons decide
//!   which roster players are offered at all.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;

use crate::id::{DivisionId, PlayerId, SeasonId, SideId, TeamId, TournamentId};
use crate::round::{Designation, Round};
use crate::tournament::Tournament;

/// A fixture on the same date that already names some players.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SiblingFixture {
    pub tournament_id: TournamentId,
    pub date: NaiveDate,
    pub division_id: Option<DivisionId>,
    pub address: String,
    pub players: Vec<PlayerId>,
}

/// Where a player is already playing tonight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FixtureConflict {
    pub tournament_id: TournamentId,
    pub address: String,
}

/// A team's registration for one season.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TeamSeasonRecord {
    pub team_id: TeamId,
    pub season_id: SeasonId,
    pub division_id: Option<DivisionId>,
    pub deleted: bool,
}

/// A player as known to the season roster, carrying team membership.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RosterPlayer {
    pub id: PlayerId,
    pub name: String,
    pub team_id: TeamId,
}

/// Indexes which sides and players may be offered for selection, built
/// once per tournament load.
#[derive(Clone, Debug, Default)]
pub struct SideRegistry {
    conflicts: HashMap<PlayerId, FixtureConflict>,
    active_teams: HashSet<TeamId>,
}

impl SideRegistry {
    pub fn new(
        tournament: &Tournament,
        siblings: &[SiblingFixture],
        team_seasons: &[TeamSeasonRecord],
    ) -> Self {
        let mut conflicts = HashMap::new();
        for fixture in siblings {
            if fixture.tournament_id == tournament.id || fixture.date != tournament.date {
                continue;
            }
            if !division_compatible(tournament.division_id, fixture.division_id) {
                continue;
            }

            for player in &fixture.players {
                conflicts.entry(*player).or_insert_with(|| FixtureConflict {
                    tournament_id: fixture.tournament_id,
                    address: fixture.address.clone(),
                });
            }
        }

        let active_teams = team_seasons
            .iter()
            .filter(|record| record.season_id == tournament.season_id && !record.deleted)
            .filter(|record| division_compatible(tournament.division_id, record.division_id))
            .map(|record| record.team_id)
            .collect();

        let registry = Self {
            conflicts,
            active_teams,
        };

        log::debug!(
            "Built side registry: {} conflicts, {} active teams",
            registry.conflicts.len(),
            registry.active_teams.len()
        );

        registry
    }

    /// The fixture `player` is already committed to tonight, if any. Used
    /// to flag the player in selection lists, never to block them.
    pub fn conflict(&self, player: PlayerId) -> Option<&FixtureConflict> {
        self.conflicts.get(&player)
    }

    /// Returns `true` if the team has a live registration for this
    /// tournament's season and division.
    pub fn is_team_active(&self, team: TeamId) -> bool {
        self.active_teams.contains(&team)
    }

    /// Returns `true` if `player` may be offered on any selection surface:
    /// side editing, 180s and high checkouts alike.
    pub fn is_selectable(&self, player: &RosterPlayer) -> bool {
        self.is_team_active(player.team_id)
    }

    /// Filters `roster` down to the selectable players.
    pub fn selectable_players<'a>(&self, roster: &'a [RosterPlayer]) -> Vec<&'a RosterPlayer> {
        roster
            .iter()
            .filter(|player| self.is_selectable(player))
            .collect()
    }
}

/// A cross-divisional tournament (or record) matches everything; otherwise
/// the divisions must agree.
fn division_compatible(tournament: Option<DivisionId>, other: Option<DivisionId>) -> bool {
    match (tournament, other) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

/// Returns `true` if `side` must be excluded from the dropdown for the
/// spot at (`match_index`, `designation`):
///
/// - it already occupies the opposite spot of the same match (no
///   self-pairing), or
/// - it occupies any spot of a different match in the same round (no
///   double-booking).
///
/// The side currently occupying the queried spot itself is always
/// selectable: it is its own current value.
pub fn is_excluded(
    round: &Round,
    side: SideId,
    match_index: usize,
    designation: Designation,
) -> bool {
    let mut excluded = false;

    for (index, entry) in round.matches.iter().enumerate() {
        for spot in [Designation::A, Designation::B] {
            if entry.r#match.spot(spot).side_id() != Some(side) {
                continue;
            }

            if index == match_index && spot == designation {
                return false;
            }
            excluded = true;
        }
    }

    excluded
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::MatchId;
    use crate::round::MatchOptions;
    use crate::side::Side;

    fn side(id: u64, name: &str) -> Side {
        Side::new(SideId(id), name.to_string())
    }

    fn tournament() -> Tournament {
        let mut tournament = Tournament::new(
            TournamentId(1),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        );
        tournament.division_id = Some(DivisionId(1));
        tournament
    }

    fn fixture(id: u64, date: NaiveDate, players: &[u64]) -> SiblingFixture {
        SiblingFixture {
            tournament_id: TournamentId(id),
            date,
            division_id: Some(DivisionId(1)),
            address: "The Red Lion".to_string(),
            players: players.iter().copied().map(PlayerId).collect(),
        }
    }

    #[test]
    fn test_exclusivity_within_round() {
        let round = Round::new()
            .add_match(
                MatchId(1),
                Some(side(1, "A")),
                Some(side(2, "B")),
                MatchOptions::default(),
            )
            .unwrap()
            .add_match(
                MatchId(2),
                Some(side(3, "C")),
                Some(side(4, "D")),
                MatchOptions::default(),
            )
            .unwrap();

        // A side stays selectable as the current value of its own spot.
        assert!(!is_excluded(&round, SideId(1), 0, Designation::A));
        // No self-pairing within the same match.
        assert!(is_excluded(&round, SideId(1), 0, Designation::B));
        // No double-booking across matches of the same round.
        assert!(is_excluded(&round, SideId(1), 1, Designation::A));
        // Unassigned sides are offered everywhere.
        assert!(!is_excluded(&round, SideId(5), 1, Designation::B));
    }

    #[test]
    fn test_same_date_conflicts() {
        let tournament = tournament();
        let date = tournament.date;

        let siblings = vec![
            fixture(2, date, &[10, 11]),
            // Different date, never a conflict.
            fixture(3, NaiveDate::from_ymd_opt(2023, 5, 20).unwrap(), &[12]),
        ];

        let registry = SideRegistry::new(&tournament, &siblings, &[]);

        let conflict = registry.conflict(PlayerId(10)).unwrap();
        assert_eq!(conflict.tournament_id, TournamentId(2));
        assert_eq!(conflict.address, "The Red Lion");
        assert!(registry.conflict(PlayerId(12)).is_none());
    }

    #[test]
    fn test_conflicts_skip_own_fixture() {
        let tournament = tournament();
        let siblings = vec![fixture(1, tournament.date, &[10])];

        let registry = SideRegistry::new(&tournament, &siblings, &[]);
        assert!(registry.conflict(PlayerId(10)).is_none());
    }

    #[test]
    fn test_deleted_team_season_excludes_players() {
        let tournament = tournament();
        let records = vec![
            TeamSeasonRecord {
                team_id: TeamId(1),
                season_id: SeasonId(1),
                division_id: Some(DivisionId(1)),
                deleted: false,
            },
            TeamSeasonRecord {
                team_id: TeamId(2),
                season_id: SeasonId(1),
                division_id: Some(DivisionId(1)),
                deleted: true,
            },
        ];

        let registry = SideRegistry::new(&tournament, &[], &records);

        let roster = vec![
            RosterPlayer {
                id: PlayerId(1),
                name: "ADAMS".to_string(),
                team_id: TeamId(1),
            },
            RosterPlayer {
                id: PlayerId(2),
                name: "WILSON".to_string(),
                team_id: TeamId(2),
            },
        ];

        let selectable = registry.selectable_players(&roster);
        assert_eq!(selectable.len(), 1);
        assert_eq!(selectable[0].id, PlayerId(1));
    }

    #[test]
    fn test_division_filter() {
        let tournament = tournament();
        let records = vec![
            TeamSeasonRecord {
                team_id: TeamId(1),
                season_id: SeasonId(1),
                division_id: Some(DivisionId(2)),
                deleted: false,
            },
            // A record with no division is offered to every tournament.
            TeamSeasonRecord {
                team_id: TeamId(2),
                season_id: SeasonId(1),
                division_id: None,
                deleted: false,
            },
        ];

        let registry = SideRegistry::new(&tournament, &[], &records);
        assert!(!registry.is_team_active(TeamId(1)));
        assert!(registry.is_team_active(TeamId(2)));

        // A cross-divisional tournament offers teams of every division.
        let mut cross = tournament;
        cross.division_id = None;
        let registry = SideRegistry::new(&cross, &[], &records);
        assert!(registry.is_team_active(TeamId(1)));
        assert!(registry.is_team_active(TeamId(2)));
    }
}
