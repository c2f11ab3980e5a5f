//! Structural edits on the round tree.
//!
//! Every operation here is copy-on-write: it takes the existing value by
//! reference and returns the edited copy. A reader holding the previous
//! tree never observes a partial edit.

use std::collections::HashSet;

use crate::id::{MatchId, SideId};
use crate::round::{Designation, MatchEntry, MatchOptions, Round, SideSpot, TournamentMatch};
use crate::side::Side;
use crate::tournament::Tournament;
use crate::{Error, Result};

impl Round {
    /// Appends a match between `side_a` and `side_b`.
    ///
    /// Both sides must be selected; the caller is expected to surface
    /// [`Error::SideNotSelected`] as a blocking alert.
    pub fn add_match(
        &self,
        id: MatchId,
        side_a: Option<Side>,
        side_b: Option<Side>,
        options: MatchOptions,
    ) -> Result<Round> {
        let (side_a, side_b) = match (side_a, side_b) {
            (Some(side_a), Some(side_b)) => (side_a, side_b),
            _ => return Err(Error::SideNotSelected),
        };

        log::debug!("Adding match {} vs {}", side_a.name, side_b.name);

        let mut round = self.clone();
        round.matches.push(MatchEntry::new(
            TournamentMatch::new(id, SideSpot::Side(side_a), SideSpot::Side(side_b)),
            options,
        ));
        Ok(round)
    }

    /// Removes the match at `index`. Confirmation is the caller's concern.
    pub fn remove_match(&self, index: usize) -> Result<Round> {
        if index >= self.matches.len() {
            return Err(Error::MatchIndexOutOfBounds {
                index,
                length: self.matches.len(),
            });
        }

        let mut round = self.clone();
        round.matches.remove(index);
        Ok(round)
    }

    /// Replaces the spot at `designation` of the match at `index`.
    ///
    /// A match whose spots both become unset is removed rather than
    /// retained empty.
    pub fn set_match_side(
        &self,
        index: usize,
        designation: Designation,
        side: Option<Side>,
    ) -> Result<Round> {
        if index >= self.matches.len() {
            return Err(Error::MatchIndexOutOfBounds {
                index,
                length: self.matches.len(),
            });
        }

        let mut round = self.clone();
        let entry = &mut round.matches[index];
        *entry.r#match.spot_mut(designation) = SideSpot::new(side);

        if entry.r#match.is_empty() {
            log::debug!("Match at {} has no sides left, removing it", index);
            round.matches.remove(index);
        }

        Ok(round)
    }

    /// Records the score of the match at `index`.
    pub fn record_score(
        &self,
        index: usize,
        score_a: Option<u32>,
        score_b: Option<u32>,
    ) -> Result<Round> {
        if index >= self.matches.len() {
            return Err(Error::MatchIndexOutOfBounds {
                index,
                length: self.matches.len(),
            });
        }

        let mut round = self.clone();
        round.matches[index].r#match.score_a = score_a;
        round.matches[index].r#match.score_b = score_b;
        Ok(round)
    }

    /// Overwrites `number_of_legs` on every match in this round and every
    /// nested round. `starting_score` is independent and untouched.
    pub fn propagate_best_of(&self, number_of_legs: u32) -> Round {
        let mut round = self.clone();

        let mut current = Some(&mut round);
        while let Some(r) = current {
            for entry in &mut r.matches {
                entry.options.number_of_legs = number_of_legs;
            }
            current = r.next_round.as_deref_mut();
        }

        round
    }

    /// The pool of sides available to the next round: sides not engaged in
    /// any of this round's matches, plus each match's decided winner.
    ///
    /// Recomputed after every score edit.
    pub fn sides_for_next_round(&self, sides: &[Side]) -> Vec<Side> {
        let engaged: HashSet<SideId> = self
            .matches
            .iter()
            .flat_map(|entry| {
                [
                    entry.r#match.side_a.side_id(),
                    entry.r#match.side_b.side_id(),
                ]
            })
            .flatten()
            .collect();

        let mut pool: Vec<Side> = sides
            .iter()
            .filter(|side| !engaged.contains(&side.id))
            .cloned()
            .collect();

        for entry in &self.matches {
            if let Some(winner) = entry.winning_side() {
                pool.push(winner.clone());
            }
        }

        pool
    }

    /// Unsets every spot holding `id` in this round and every nested
    /// round, pruning matches that end up with no sides.
    pub fn without_side(&self, id: SideId) -> Round {
        let mut round = self.clone();

        let mut current = Some(&mut round);
        while let Some(r) = current {
            for entry in &mut r.matches {
                for designation in [Designation::A, Designation::B] {
                    if entry.r#match.spot(designation).side_id() == Some(id) {
                        entry.r#match.spot_mut(designation).take();
                    }
                }
            }
            r.matches.retain(|entry| !entry.r#match.is_empty());
            current = r.next_round.as_deref_mut();
        }

        round
    }

    /// Replaces every occurrence of `side` (by id) in this round and every
    /// nested round, so renames and membership changes propagate into the
    /// bracket.
    pub fn with_side(&self, side: &Side) -> Round {
        let mut round = self.clone();

        let mut current = Some(&mut round);
        while let Some(r) = current {
            for entry in &mut r.matches {
                for designation in [Designation::A, Designation::B] {
                    if entry.r#match.spot(designation).side_id() == Some(side.id) {
                        *entry.r#match.spot_mut(designation) = SideSpot::Side(side.clone());
                    }
                }
            }
            current = r.next_round.as_deref_mut();
        }

        round
    }
}

impl Tournament {
    /// Adds `side`, or replaces the existing side with the same id
    /// everywhere it is referenced (sides list and bracket spots).
    pub fn upsert_side(&self, side: Side) -> Result<Tournament> {
        if side.name.trim().is_empty() {
            return Err(Error::MissingSideName);
        }
        if !side.is_resolved() {
            return Err(Error::EmptySide);
        }

        let mut tournament = self.clone();
        match tournament.sides.iter_mut().find(|s| s.id == side.id) {
            Some(existing) => *existing = side.clone(),
            None => tournament.sides.push(side.clone()),
        }
        tournament.round = tournament.round.take().map(|round| round.with_side(&side));
        Ok(tournament)
    }

    /// Removes the side with the given `id` from the tournament and from
    /// every bracket spot. Recorded accolades referencing its players stay.
    pub fn remove_side(&self, id: SideId) -> Tournament {
        let mut tournament = self.clone();
        tournament.sides.retain(|side| side.id != id);
        tournament.round = tournament.round.take().map(|round| round.without_side(id));
        tournament
    }

    /// Changes the tournament-level "best of" default and pushes it down
    /// to every match in every round.
    pub fn set_best_of(&self, number_of_legs: u32) -> Result<Tournament> {
        if number_of_legs == 0 {
            return Err(Error::InvalidBestOf(number_of_legs));
        }

        let mut tournament = self.clone();
        tournament.best_of = Some(number_of_legs);
        tournament.round = tournament
            .round
            .take()
            .map(|round| round.propagate_best_of(number_of_legs));
        Ok(tournament)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::id::{PlayerId, SeasonId, TournamentId};
    use crate::side::TournamentPlayer;

    fn side(id: u64, name: &str) -> Side {
        let mut side = Side::new(SideId(id), name.to_string());
        side.players = vec![TournamentPlayer::new(PlayerId(id), name.to_string())];
        side
    }

    fn round_with_match(id: u64, a: &Side, b: &Side) -> Round {
        Round::new()
            .add_match(
                MatchId(id),
                Some(a.clone()),
                Some(b.clone()),
                MatchOptions::default(),
            )
            .unwrap()
    }

    #[test]
    fn test_add_match_requires_both_sides() {
        let round = Round::new();

        assert_eq!(
            round
                .add_match(MatchId(1), Some(side(1, "A")), None, MatchOptions::default())
                .unwrap_err(),
            Error::SideNotSelected
        );
        assert_eq!(
            round
                .add_match(MatchId(1), None, None, MatchOptions::default())
                .unwrap_err(),
            Error::SideNotSelected
        );
        assert!(round.matches.is_empty());
    }

    #[test]
    fn test_set_match_side_prunes_empty_match() {
        let round = round_with_match(1, &side(1, "A"), &side(2, "B"));

        let round = round.set_match_side(0, Designation::A, None).unwrap();
        assert_eq!(round.matches.len(), 1);

        let round = round.set_match_side(0, Designation::B, None).unwrap();
        assert!(round.matches.is_empty());
    }

    #[test]
    fn test_remove_match_out_of_bounds() {
        let round = round_with_match(1, &side(1, "A"), &side(2, "B"));

        assert_eq!(
            round.remove_match(1).unwrap_err(),
            Error::MatchIndexOutOfBounds {
                index: 1,
                length: 1
            }
        );
    }

    #[test]
    fn test_propagate_best_of_reaches_nested_rounds() {
        let mut round = round_with_match(1, &side(1, "A"), &side(2, "B"));
        round.next_round = Some(Box::new(round_with_match(2, &side(3, "C"), &side(4, "D"))));

        let round = round.propagate_best_of(7);

        for r in round.iter() {
            for entry in &r.matches {
                assert_eq!(entry.options.number_of_legs, 7);
                assert_eq!(entry.options.starting_score, 501);
            }
        }
    }

    #[test]
    fn test_sides_for_next_round() {
        let sides = vec![side(1, "A"), side(2, "B"), side(3, "C")];

        let mut round = round_with_match(1, &sides[0], &sides[1]);
        round.matches[0].r#match.score_a = Some(3);
        round.matches[0].r#match.score_b = Some(0);

        let pool = round.sides_for_next_round(&sides);
        let ids: Vec<SideId> = pool.iter().map(|s| s.id).collect();

        // C never played this round; A won its match.
        assert_eq!(ids, vec![SideId(3), SideId(1)]);
    }

    #[test]
    fn test_sides_for_next_round_undecided() {
        let sides = vec![side(1, "A"), side(2, "B")];
        let round = round_with_match(1, &sides[0], &sides[1]);

        assert!(round.sides_for_next_round(&sides).is_empty());
    }

    #[test]
    fn test_upsert_side_validation() {
        let tournament = Tournament::new(
            TournamentId(1),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        );

        assert_eq!(
            tournament
                .upsert_side(Side::new(SideId(1), "  ".to_string()))
                .unwrap_err(),
            Error::MissingSideName
        );
        assert_eq!(
            tournament
                .upsert_side(Side::new(SideId(1), "A".to_string()))
                .unwrap_err(),
            Error::EmptySide
        );
    }

    #[test]
    fn test_upsert_side_propagates_rename() {
        let mut tournament = Tournament::new(
            TournamentId(1),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        );
        let a = side(1, "A");
        let b = side(2, "B");
        tournament.sides = vec![a.clone(), b.clone()];
        tournament.round = Some(round_with_match(1, &a, &b));

        let mut renamed = a.clone();
        renamed.name = "The Arrows".to_string();
        let tournament = tournament.upsert_side(renamed).unwrap();

        let spot = &tournament.round.as_ref().unwrap().matches[0].r#match.side_a;
        assert_eq!(spot.side().unwrap().name, "The Arrows");
        assert_eq!(tournament.sides[0].name, "The Arrows");
    }

    #[test]
    fn test_remove_side_prunes_emptied_matches() {
        let mut tournament = Tournament::new(
            TournamentId(1),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        );
        let a = side(1, "A");
        let b = side(2, "B");
        tournament.sides = vec![a.clone(), b.clone()];

        let round = round_with_match(1, &a, &b);
        let round = round.set_match_side(0, Designation::B, None).unwrap();
        tournament.round = Some(round);

        let tournament = tournament.remove_side(SideId(1));

        assert!(tournament.round.as_ref().unwrap().matches.is_empty());
        assert_eq!(tournament.sides.len(), 1);
    }
}
