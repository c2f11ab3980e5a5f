//! # darts-knockout-core
//!
//! This crate contains all the items required to run a knockout darts
//! tournament: the recursive round tree, the bracket layout computation
//! and the eligibility rules.
//!
//! Important types:
//! - [`Tournament`]: The aggregate for one night's knockout. Every mutator
//! is copy-on-write.
//! - [`Round`]: A round of matches, linked to the next round through
//! `next_round`.
//! - [`SideSpot`]: A *spot* within a match, which can contain a resolved
//! side, a `winner(Mk)` mnemonic or nothing.
//! - [`MatchEntry`]: A match paired with its [`MatchOptions`], so the two
//! can never drift out of step.
//! - [`BracketLayout`]: The renderable bracket computed from the sides and
//! the round tree.
//! - [`SideRegistry`]: Which sides and players may legally be offered for
//! selection.
//!
//! ## Feature Flags
//!
//! `serde`: Adds `Serialize` and `Deserialize` impls to the data model so
//! it doubles as the wire representation.

pub mod accolades;
pub mod id;
pub mod layout;
pub mod registry;
pub mod round;
pub mod side;
pub mod tournament;

mod mutator;

use std::result;

use thiserror::Error;

pub use accolades::{group_and_sort_by_occurrences, AccoladeCount, Checkout};
pub use id::{
    DivisionId, MatchId, PhotoId, PlayerId, SaygId, SeasonId, SideId, TeamId, TournamentId,
};
pub use layout::{BracketLayout, CellSpot, MatchCell, RoundLayout};
pub use registry::{
    is_excluded, FixtureConflict, RosterPlayer, SiblingFixture, SideRegistry, TeamSeasonRecord,
};
pub use round::{Designation, MatchEntry, MatchOptions, Round, SideSpot, TournamentMatch};
pub use side::{Side, TournamentPlayer};
pub use tournament::{Photo, Tournament};

/// A `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

/// A local validation or precondition failure.
///
/// These abort the attempted operation with no state change; they are
/// surfaced as blocking alerts and never reach the network.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("no side selected")]
    SideNotSelected,
    #[error("invalid match index: {index} but the round has {length} matches")]
    MatchIndexOutOfBounds { index: usize, length: usize },
    #[error("no round exists at depth {depth}")]
    RoundDepthOutOfBounds { depth: usize },
    #[error("invalid best of: {0}")]
    InvalidBestOf(u32),
    #[error("the side needs a name")]
    MissingSideName,
    #[error("the side must name a team or at least one player")]
    EmptySide,
}
