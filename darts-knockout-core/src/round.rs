//! The recursive round tree.
//!
//! A knockout bracket is a chain of [`Round`]s linked through `next_round`.
//! The root holds the earliest round; depth is unbounded in the type but in
//! practice bounded by `log2(sideCount)`, so traversal helpers walk the
//! chain iteratively rather than recursing.

use std::fmt::{self, Display, Formatter};
use std::mem;

use crate::id::{MatchId, SaygId, SideId};
use crate::side::Side;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Designates one of the two spots in a match.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Designation {
    A,
    B,
}

impl Designation {
    /// The spot index within a match.
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::A => 0,
            Self::B => 1,
        }
    }

    /// The opposite spot.
    #[inline]
    pub fn other(self) -> Self {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl Display for Designation {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        f.write_str(match self {
            Self::A => "sideA",
            Self::B => "sideB",
        })
    }
}

/// A spot for a side in a match.
///
/// A spot is *resolved* only in the [`Side`] case; [`Mnemonic`] stands in
/// for the winner of an earlier match that has not been decided yet.
///
/// [`Side`]: Self::Side
/// [`Mnemonic`]: Self::Mnemonic
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum SideSpot {
    Side(Side),
    Mnemonic { mnemonic: String },
    Unset,
}

impl SideSpot {
    /// Creates a new `SideSpot` from an [`Option`]. A `Some(side)` value
    /// translates into `Side(side)`, a `None` value into `Unset`.
    pub fn new(side: Option<Side>) -> Self {
        match side {
            Some(side) => Self::Side(side),
            None => Self::Unset,
        }
    }

    /// Returns `true` if the spot holds a resolved side.
    #[inline]
    pub fn is_side(&self) -> bool {
        matches!(self, Self::Side(_))
    }

    /// Returns `true` if no side has been selected for the spot.
    #[inline]
    pub fn is_unset(&self) -> bool {
        matches!(self, Self::Unset)
    }

    /// Returns the resolved side, if any.
    #[inline]
    pub fn side(&self) -> Option<&Side> {
        match self {
            Self::Side(side) => Some(side),
            _ => None,
        }
    }

    /// Returns the id of the resolved side, if any.
    #[inline]
    pub fn side_id(&self) -> Option<SideId> {
        self.side().map(|side| side.id)
    }

    /// Takes out the value, leaving [`Self::Unset`] in its place.
    pub fn take(&mut self) -> Self {
        mem::replace(self, Self::Unset)
    }
}

/// Per-match configuration.
///
/// `number_of_legs` follows the tournament-level "best of" default and is
/// overwritten when that default changes; `starting_score` is independent.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct MatchOptions {
    pub number_of_legs: u32,
    pub starting_score: u32,
}

impl MatchOptions {
    pub fn new(number_of_legs: u32, starting_score: u32) -> Self {
        Self {
            number_of_legs,
            starting_score,
        }
    }
}

impl Default for MatchOptions {
    #[inline]
    fn default() -> Self {
        Self {
            number_of_legs: 5,
            starting_score: 501,
        }
    }
}

/// A match between two spots of the bracket.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TournamentMatch {
    pub id: MatchId,
    pub side_a: SideSpot,
    pub side_b: SideSpot,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub score_a: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub score_b: Option<u32>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub sayg_id: Option<SaygId>,
}

impl TournamentMatch {
    pub fn new(id: MatchId, side_a: SideSpot, side_b: SideSpot) -> Self {
        Self {
            id,
            side_a,
            side_b,
            score_a: None,
            score_b: None,
            sayg_id: None,
        }
    }

    /// Returns a reference to the spot at `designation`.
    #[inline]
    pub fn spot(&self, designation: Designation) -> &SideSpot {
        match designation {
            Designation::A => &self.side_a,
            Designation::B => &self.side_b,
        }
    }

    /// Returns a mutable reference to the spot at `designation`.
    #[inline]
    pub fn spot_mut(&mut self, designation: Designation) -> &mut SideSpot {
        match designation {
            Designation::A => &mut self.side_a,
            Designation::B => &mut self.side_b,
        }
    }

    /// Returns the recorded score for `designation`.
    #[inline]
    pub fn score(&self, designation: Designation) -> Option<u32> {
        match designation {
            Designation::A => self.score_a,
            Designation::B => self.score_b,
        }
    }

    /// Returns `true` if neither spot has a side selected. Such matches are
    /// pruned rather than retained empty.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.side_a.is_unset() && self.side_b.is_unset()
    }

    /// Returns `true` if either score has been recorded.
    #[inline]
    pub fn has_score(&self) -> bool {
        self.score_a.is_some() || self.score_b.is_some()
    }

    /// The strict-majority winner for a match played over `number_of_legs`
    /// legs: a side wins only with more than half the legs. A score of
    /// exactly half (even leg counts) is never a winner.
    pub fn winner(&self, number_of_legs: u32) -> Option<Designation> {
        match (self.score_a, self.score_b) {
            (Some(score), _) if score * 2 > number_of_legs => Some(Designation::A),
            (_, Some(score)) if score * 2 > number_of_legs => Some(Designation::B),
            _ => None,
        }
    }

    /// The winning side, when decided and resolved.
    pub fn winning_side(&self, number_of_legs: u32) -> Option<&Side> {
        self.winner(number_of_legs)
            .and_then(|designation| self.spot(designation).side())
    }
}

/// A match paired with its options.
///
/// Pairing the two structurally guarantees that a match and its
/// configuration can never drift out of step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchEntry {
    #[cfg_attr(feature = "serde", serde(rename = "match"))]
    pub r#match: TournamentMatch,
    pub options: MatchOptions,
}

impl MatchEntry {
    pub fn new(r#match: TournamentMatch, options: MatchOptions) -> Self {
        Self { r#match, options }
    }

    /// The winner of the match under its own options.
    #[inline]
    pub fn winner(&self) -> Option<Designation> {
        self.r#match.winner(self.options.number_of_legs)
    }

    /// The winning side of the match under its own options.
    #[inline]
    pub fn winning_side(&self) -> Option<&Side> {
        self.r#match.winning_side(self.options.number_of_legs)
    }
}

/// A round of the knockout bracket.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Round {
    #[cfg_attr(feature = "serde", serde(default))]
    pub matches: Vec<MatchEntry>,
    #[cfg_attr(
        feature = "serde",
        serde(default, skip_serializing_if = "Option::is_none")
    )]
    pub next_round: Option<Box<Round>>,
}

impl Round {
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// The number of rounds in the chain starting at `self`.
    pub fn depth(&self) -> usize {
        self.iter().count()
    }

    /// The round `depth` levels below `self` (`0` is `self`).
    pub fn nested(&self, depth: usize) -> Option<&Round> {
        let mut round = self;
        for _ in 0..depth {
            round = round.next_round.as_deref()?;
        }
        Some(round)
    }

    /// Mutable access to the round `depth` levels below `self`, creating
    /// empty intermediate rounds on demand when `create` is set.
    pub fn nested_mut(&mut self, depth: usize, create: bool) -> Option<&mut Round> {
        let mut round = self;
        for _ in 0..depth {
            if round.next_round.is_none() {
                if !create {
                    return None;
                }
                log::debug!("Creating empty nested round");
                round.next_round = Some(Box::new(Round::new()));
            }
            round = round.next_round.as_deref_mut()?;
        }
        Some(round)
    }

    /// Returns an iterator over the chain of rounds starting at `self`.
    pub fn iter(&self) -> RoundIter<'_> {
        RoundIter { next: Some(self) }
    }

    /// Returns `true` if every match in this round has a decided winner.
    pub fn all_decided(&self) -> bool {
        self.matches.iter().all(|entry| entry.winner().is_some())
    }
}

/// Iterator over a chain of rounds, following `next_round`.
#[derive(Clone, Debug)]
pub struct RoundIter<'a> {
    next: Option<&'a Round>,
}

impl<'a> Iterator for RoundIter<'a> {
    type Item = &'a Round;

    fn next(&mut self) -> Option<Self::Item> {
        let round = self.next?;
        self.next = round.next_round.as_deref();
        Some(round)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::id::PlayerId;
    use crate::side::TournamentPlayer;

    fn side(id: u64, name: &str) -> Side {
        let mut side = Side::new(SideId(id), name.to_string());
        side.players = vec![TournamentPlayer::new(PlayerId(id), name.to_string())];
        side
    }

    fn r#match(id: u64, a: &Side, b: &Side) -> TournamentMatch {
        TournamentMatch::new(
            MatchId(id),
            SideSpot::Side(a.clone()),
            SideSpot::Side(b.clone()),
        )
    }

    #[test]
    fn test_winner_strict_majority_odd() {
        let a = side(1, "A");
        let b = side(2, "B");
        let mut m = r#match(1, &a, &b);

        assert_eq!(m.winner(5), None);

        m.score_a = Some(2);
        m.score_b = Some(1);
        assert_eq!(m.winner(5), None);

        m.score_a = Some(3);
        assert_eq!(m.winner(5), Some(Designation::A));
        assert_eq!(m.winning_side(5).unwrap().id, SideId(1));
    }

    #[test]
    fn test_winner_strict_majority_even() {
        let a = side(1, "A");
        let b = side(2, "B");
        let mut m = r#match(1, &a, &b);

        // Half the legs is never a win.
        m.score_a = Some(2);
        m.score_b = Some(2);
        assert_eq!(m.winner(4), None);

        m.score_b = Some(3);
        assert_eq!(m.winner(4), Some(Designation::B));
    }

    #[test]
    fn test_empty_match() {
        let mut m = TournamentMatch::new(MatchId(1), SideSpot::Unset, SideSpot::Unset);
        assert!(m.is_empty());

        *m.spot_mut(Designation::A) = SideSpot::Side(side(1, "A"));
        assert!(!m.is_empty());
    }

    #[test]
    fn test_nested() {
        let mut root = Round::new();
        root.next_round = Some(Box::new(Round::new()));

        assert_eq!(root.depth(), 2);
        assert!(root.nested(1).is_some());
        assert!(root.nested(2).is_none());
    }

    #[test]
    fn test_nested_mut_create() {
        let mut root = Round::new();

        assert!(root.nested_mut(2, false).is_none());
        assert!(root.nested_mut(2, true).is_some());
        assert_eq!(root.depth(), 3);
    }

    #[test]
    fn test_round_iter() {
        let mut root = Round::new();
        root.nested_mut(3, true).unwrap();

        assert_eq!(root.iter().count(), 4);
    }
}
