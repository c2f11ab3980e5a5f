//! The tournament aggregate.

use chrono::{DateTime, NaiveDate, Utc};

use crate::accolades::Checkout;
use crate::id::{DivisionId, PhotoId, SeasonId, SideId, TournamentId};
use crate::round::Round;
use crate::side::{Side, TournamentPlayer};
use crate::{Error, Result};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A reference to an uploaded photo of the night.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Photo {
    pub id: PhotoId,
    pub file_name: String,
}

/// A knockout tournament for one date.
///
/// Every mutator on this type is copy-on-write: it takes `&self` and
/// returns the edited copy, so a reader holding the previous value never
/// observes a partial edit.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Tournament {
    pub id: TournamentId,
    pub date: NaiveDate,
    pub season_id: SeasonId,
    /// Bound division, or `None` for a cross-divisional tournament.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub division_id: Option<DivisionId>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub address: String,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub notes: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub sides: Vec<Side>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub round: Option<Round>,
    /// One entry per 180 thrown; the same player appears once per
    /// occurrence and the display groups by id on read.
    #[cfg_attr(feature = "serde", serde(default))]
    pub one_eighties: Vec<TournamentPlayer>,
    #[cfg_attr(feature = "serde", serde(default, rename = "over100Checkouts"))]
    pub over100_checkouts: Vec<Checkout>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub best_of: Option<u32>,
    /// Superleague mode: exactly one round with two fixed competitors.
    #[cfg_attr(feature = "serde", serde(default))]
    pub single_round: bool,
    /// Whether accolades recorded here count towards season totals.
    #[cfg_attr(feature = "serde", serde(default))]
    pub accolades_count: bool,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub host: Option<String>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub opponent: Option<String>,
    #[cfg_attr(feature = "serde", serde(default))]
    pub photos: Vec<Photo>,
    /// Optimistic-concurrency token returned by the server.
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Tournament {
    pub fn new(id: TournamentId, date: NaiveDate, season_id: SeasonId) -> Self {
        Self {
            id,
            date,
            season_id,
            division_id: None,
            address: String::new(),
            notes: None,
            sides: Vec::new(),
            round: None,
            one_eighties: Vec::new(),
            over100_checkouts: Vec::new(),
            best_of: None,
            single_round: false,
            accolades_count: false,
            host: None,
            opponent: None,
            photos: Vec::new(),
            last_updated: None,
        }
    }

    /// Returns the side with the given `id`.
    pub fn side(&self, id: SideId) -> Option<&Side> {
        self.sides.iter().find(|side| side.id == id)
    }

    /// Returns the round at nested `depth` (`0` is the root round).
    pub fn round_at(&self, depth: usize) -> Option<&Round> {
        self.round.as_ref().and_then(|round| round.nested(depth))
    }

    /// Returns a copy of the tournament with the round at `depth` replaced
    /// by the result of `f`, creating the root and empty intermediate
    /// rounds when `create` is set.
    ///
    /// Any component editing a later round goes through here so it never
    /// needs to special-case how the round was reached.
    pub fn with_round_at<F>(&self, depth: usize, create: bool, f: F) -> Result<Tournament>
    where
        F: FnOnce(&Round) -> Result<Round>,
    {
        let mut tournament = self.clone();

        if tournament.round.is_none() && !create {
            return Err(Error::RoundDepthOutOfBounds { depth });
        }

        let root = tournament.round.get_or_insert_with(Round::new);
        let target = root
            .nested_mut(depth, create)
            .ok_or(Error::RoundDepthOutOfBounds { depth })?;
        let edited = f(target)?;
        *target = edited;

        Ok(tournament)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::id::MatchId;
    use crate::round::{MatchOptions, MatchEntry, SideSpot, TournamentMatch};

    fn tournament() -> Tournament {
        Tournament::new(
            TournamentId(1),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        )
    }

    #[test]
    fn test_with_round_at_missing() {
        let tournament = tournament();

        assert_eq!(
            tournament
                .with_round_at(0, false, |round| Ok(round.clone()))
                .unwrap_err(),
            Error::RoundDepthOutOfBounds { depth: 0 }
        );
    }

    #[test]
    fn test_with_round_at_create() {
        let tournament = tournament();

        let edited = tournament
            .with_round_at(2, true, |round| {
                let mut round = round.clone();
                round.matches.push(MatchEntry::new(
                    TournamentMatch::new(MatchId(1), SideSpot::Unset, SideSpot::Unset),
                    MatchOptions::default(),
                ));
                Ok(round)
            })
            .unwrap();

        // The original is untouched; the copy has three rounds.
        assert!(tournament.round.is_none());
        assert_eq!(edited.round.as_ref().unwrap().depth(), 3);
        assert_eq!(edited.round_at(2).unwrap().matches.len(), 1);
    }
}
