//! Score-as-you-go: recorded scoring sessions and the bridge that turns
//! leg results into tournament patches.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use darts_knockout_core::{
    Checkout, Designation, MatchEntry, MatchOptions, SaygId, Tournament, TournamentPlayer,
};
use serde::{Deserialize, Serialize};

use crate::patch::{PatchMatch, PatchTournament};
use crate::session::{LiveUpdates, TournamentSession};
use crate::{Client, Error, Result};

/// The side of a scoring session. Sessions talk in home/away; the bracket
/// talks in sideA/sideB.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegSide {
    Home,
    Away,
}

impl LegSide {
    /// The bracket designation the session side maps to.
    #[inline]
    pub fn designation(self) -> Designation {
        match self {
            Self::Home => Designation::A,
            Self::Away => Designation::B,
        }
    }
}

/// One competitor's throws within a leg.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegThrows {
    /// The score of each visit, in order.
    #[serde(default)]
    pub throws: Vec<u32>,
    /// Total scored this leg.
    #[serde(default)]
    pub score: u32,
}

/// One leg of a match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Leg {
    pub home: LegThrows,
    pub away: LegThrows,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner: Option<LegSide>,
    pub starting_score: u32,
}

impl Leg {
    /// The sides that threw a maximum this leg, one entry per 180.
    pub fn one_eighties(&self) -> Vec<LegSide> {
        let mut sides = Vec::new();

        for (side, throws) in [(LegSide::Home, &self.home), (LegSide::Away, &self.away)] {
            for _ in throws.throws.iter().filter(|&&score| score == 180) {
                sides.push(side);
            }
        }

        sides
    }

    /// The winning checkout, when it took more than 100.
    pub fn high_checkout(&self) -> Option<(LegSide, u32)> {
        let winner = self.winner?;
        let throws = match winner {
            LegSide::Home => &self.home,
            LegSide::Away => &self.away,
        };

        let last = *throws.throws.last()?;
        (last > 100).then(|| (winner, last))
    }
}

/// A recorded scoring session bound to one match.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordedScoreAsYouGo {
    pub id: SaygId,
    pub your_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opponent_name: Option<String>,
    #[serde(default)]
    pub legs: BTreeMap<u32, Leg>,
    /// Legs won so far by the home side.
    #[serde(default)]
    pub home_score: u32,
    #[serde(default)]
    pub away_score: u32,
    pub starting_score: u32,
    pub number_of_legs: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

/// Client for the scoring session storage.
#[derive(Clone, Debug)]
pub struct SaygClient<'a> {
    client: &'a Client,
}

impl<'a> SaygClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Returns the recorded session with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, id: SaygId) -> Result<RecordedScoreAsYouGo> {
        let req = self
            .client
            .request()
            .uri(&format!("/api/sayg/{}", id))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Creates or updates a recorded session.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn upsert(&self, sayg: &RecordedScoreAsYouGo) -> Result<RecordedScoreAsYouGo> {
        let req = self.client.request().put().uri("/api/sayg").body(sayg).build();

        let resp: crate::tournaments::ApiResponse<RecordedScoreAsYouGo> =
            self.client.send(req).await?.json().await?;
        resp.into_result()
    }
}

/// The lifecycle of the scoring dialog for one match.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum SaygState {
    #[default]
    NoData,
    /// The create call is in flight; a second trigger short-circuits.
    Creating,
    Open,
    Closed,
}

/// Drives a single match's leg-by-leg scoring and emits the resulting
/// patches.
#[derive(Debug)]
pub struct SaygScoringBridge {
    state: SaygState,
    depth: usize,
    match_index: usize,
}

impl SaygScoringBridge {
    /// A bridge for the match at `match_index` of the round at `depth`.
    pub fn new(depth: usize, match_index: usize) -> Self {
        Self {
            state: SaygState::NoData,
            depth,
            match_index,
        }
    }

    #[inline]
    pub fn state(&self) -> SaygState {
        self.state
    }

    /// Whether a scoring session may be created for `entry`: both sides
    /// set, no score recorded yet, and a supported shape (superleague, two
    /// single players, or two whole teams).
    ///
    /// Existing sessions may always be viewed; [`open`] bypasses this
    /// gate.
    ///
    /// [`open`]: Self::open
    pub fn qualifies(tournament: &Tournament, entry: &MatchEntry) -> bool {
        let (side_a, side_b) = match (entry.r#match.side_a.side(), entry.r#match.side_b.side()) {
            (Some(side_a), Some(side_b)) => (side_a, side_b),
            _ => return false,
        };

        if entry.r#match.has_score() {
            return false;
        }

        tournament.single_round
            || (side_a.players.len() == 1 && side_b.players.len() == 1)
            || (side_a.is_team_side() && side_b.is_team_side())
    }

    /// The patches for one completed leg, accolades first.
    ///
    /// Accolades are attributed only when each side is exactly one player;
    /// multi-player and team matches emit no accolade patches. The score
    /// patch always follows, carrying absolute legs won so a re-send after
    /// a partial failure converges.
    pub fn leg_patches(
        &self,
        entry: &MatchEntry,
        leg: &Leg,
        home_legs: u32,
        away_legs: u32,
    ) -> Result<Vec<PatchTournament>> {
        let side_a = entry.r#match.side_a.side().ok_or(Error::IneligibleMatch)?;
        let side_b = entry.r#match.side_b.side().ok_or(Error::IneligibleMatch)?;

        let mut patches = Vec::new();

        if side_a.players.len() == 1 && side_b.players.len() == 1 {
            let player_for = |side: LegSide| -> &TournamentPlayer {
                match side.designation() {
                    Designation::A => &side_a.players[0],
                    Designation::B => &side_b.players[0],
                }
            };

            for side in leg.one_eighties() {
                patches.push(PatchTournament::one_eighty(player_for(side).clone()));
            }

            if let Some((side, score)) = leg.high_checkout() {
                let player = player_for(side);
                patches.push(PatchTournament::hi_check(Checkout {
                    id: player.id,
                    name: player.name.clone(),
                    score,
                }));
            }
        }

        patches.push(PatchTournament::match_score(
            self.depth,
            PatchMatch {
                side_a: side_a.id,
                side_b: side_b.id,
                score_a: home_legs,
                score_b: away_legs,
            },
        ));

        Ok(patches)
    }

    /// Creates the scoring session: `NoData` -> `Creating` -> `Open`.
    ///
    /// The match must be persisted before the server can link a session to
    /// it; with a temporary id the tournament is saved first (without a
    /// reload) to obtain one.
    pub async fn create<L>(
        &mut self,
        session: &mut TournamentSession<L>,
        options: MatchOptions,
    ) -> Result<()>
    where
        L: LiveUpdates,
    {
        match self.state {
            SaygState::NoData => {}
            SaygState::Creating => return Err(Error::SaveInProgress),
            SaygState::Open | SaygState::Closed => {
                self.state = SaygState::Open;
                return Ok(());
            }
        }

        let entry = self
            .entry(session.tournament())
            .cloned()
            .ok_or(Error::IneligibleMatch)?;

        if !Self::qualifies(session.tournament(), &entry) {
            return Err(Error::IneligibleMatch);
        }

        if entry.r#match.id.is_temporary() {
            log::debug!("Match has a temporary id, saving the tournament first");
            session.save().await?;
        }

        // Re-read after the save: the server handed out persisted ids.
        let match_id = self
            .entry(session.tournament())
            .map(|entry| entry.r#match.id)
            .ok_or(Error::IneligibleMatch)?;

        if match_id.is_temporary() {
            return Err(Error::UnsavedMatch);
        }

        self.state = SaygState::Creating;
        match session.add_sayg(match_id, options).await {
            Ok(()) => {
                self.state = SaygState::Open;
                Ok(())
            }
            Err(err) => {
                self.state = SaygState::NoData;
                Err(err)
            }
        }
    }

    /// Opens an existing session for viewing, bypassing the creation gate.
    pub fn open(&mut self) {
        self.state = SaygState::Open;
    }

    /// Closes the dialog. Draft state is the dialog's to discard.
    pub fn close(&mut self) {
        if self.state == SaygState::Open {
            self.state = SaygState::Closed;
        }
    }

    /// Sends the patches for one completed leg as separate, sequential
    /// calls: accolades first, then the depth-wrapped score patch.
    pub async fn record_leg<L>(
        &mut self,
        session: &mut TournamentSession<L>,
        leg: &Leg,
        home_legs: u32,
        away_legs: u32,
    ) -> Result<()>
    where
        L: LiveUpdates,
    {
        if self.state != SaygState::Open {
            return Err(Error::SessionNotOpen);
        }

        let entry = self
            .entry(session.tournament())
            .cloned()
            .ok_or(Error::SessionNotOpen)?;

        for patch in self.leg_patches(&entry, leg, home_legs, away_legs)? {
            session.patch(patch).await?;
        }

        Ok(())
    }

    /// Deletes the session data. With `clear_score` the recorded match
    /// score is cleared as well; declining keeps the match showing as
    /// decided without leg detail. The local `sayg_id` reference only
    /// disappears once the server confirmed the deletion.
    pub async fn delete<L>(
        &mut self,
        session: &mut TournamentSession<L>,
        clear_score: bool,
    ) -> Result<()>
    where
        L: LiveUpdates,
    {
        let match_id = self
            .entry(session.tournament())
            .map(|entry| entry.r#match.id)
            .ok_or(Error::SessionNotOpen)?;

        session.delete_sayg(match_id).await?;

        if clear_score {
            let edited = session.tournament().with_round_at(self.depth, false, |round| {
                round.record_score(self.match_index, None, None)
            })?;
            session.replace(edited);
            session.save().await?;
        }

        self.state = SaygState::NoData;
        Ok(())
    }

    fn entry<'a>(&self, tournament: &'a Tournament) -> Option<&'a MatchEntry> {
        tournament
            .round_at(self.depth)
            .and_then(|round| round.matches.get(self.match_index))
    }
}
