//! The optimistic tournament session.
//!
//! The single tournament object is the only mutable shared resource. All
//! network calls within one user action are awaited sequentially; a second
//! save or patch while one is in flight short-circuits with
//! [`Error::SaveInProgress`]. Every successful response replaces local
//! state before the next edit is permitted, so a patch is never computed
//! against a stale base.

use darts_knockout_core::{MatchId, MatchOptions, PhotoId, Side, Tournament};

use crate::patch::PatchTournament;
use crate::tournaments::{CreateSayg, PhotoUpload};
use crate::{Client, Error, Result};

/// Failure to broadcast a live update. Non-fatal: it is surfaced as a
/// warning and never rolls back the save that triggered it.
#[derive(Debug, thiserror::Error)]
#[error("publish failed: {0}")]
pub struct PublishError(pub String);

/// The live-update boundary: every successful save and patch is broadcast
/// through this callback. Incoming updates from other clients arrive via
/// [`TournamentSession::reconcile`].
pub trait LiveUpdates {
    fn publish(&mut self, tournament: &Tournament) -> std::result::Result<(), PublishError>;
}

/// A publisher that does nothing.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoLiveUpdates;

impl LiveUpdates for NoLiveUpdates {
    fn publish(&mut self, _tournament: &Tournament) -> std::result::Result<(), PublishError> {
        Ok(())
    }
}

/// Owns the optimistic local copy of one tournament and reconciles it with
/// the server's authoritative copy after each call.
#[derive(Debug)]
pub struct TournamentSession<L = NoLiveUpdates> {
    client: Client,
    live: L,
    tournament: Tournament,
    saving: bool,
    unsaved_match_warning: bool,
}

impl<L> TournamentSession<L>
where
    L: LiveUpdates,
{
    pub fn new(client: Client, tournament: Tournament, live: L) -> Self {
        Self {
            client,
            live,
            tournament,
            saving: false,
            unsaved_match_warning: false,
        }
    }

    /// The current local copy.
    #[inline]
    pub fn tournament(&self) -> &Tournament {
        &self.tournament
    }

    /// Replaces the local copy with an edited one, e.g. when a dialog is
    /// saved. Draft state a dialog discards never reaches here.
    pub fn replace(&mut self, tournament: Tournament) {
        self.tournament = tournament;
    }

    /// Replaces local state with the server's authoritative copy and
    /// broadcasts it to the live-update boundary.
    pub fn reconcile(&mut self, tournament: Tournament) {
        self.tournament = tournament;

        if let Err(err) = self.live.publish(&self.tournament) {
            log::warn!("Failed to publish live update: {}", err);
        }
    }

    /// Flags that a drafted match has not been added yet. The flag is
    /// process-wide and survives until the match is added or the warning
    /// is dismissed.
    pub fn warn_unsaved_match(&mut self) {
        self.unsaved_match_warning = true;
    }

    pub fn dismiss_unsaved_match(&mut self) {
        self.unsaved_match_warning = false;
    }

    #[inline]
    pub fn has_unsaved_match(&self) -> bool {
        self.unsaved_match_warning
    }

    /// Adds a match to the round at `depth`, creating the round on demand
    /// and clearing the pending unsaved-match warning on success.
    pub fn add_match(
        &mut self,
        depth: usize,
        id: MatchId,
        side_a: Option<Side>,
        side_b: Option<Side>,
        options: MatchOptions,
    ) -> Result<()> {
        let edited = self
            .tournament
            .with_round_at(depth, true, |round| round.add_match(id, side_a, side_b, options))?;

        self.tournament = edited;
        self.unsaved_match_warning = false;
        Ok(())
    }

    /// Saves the whole tournament. `last_updated` rides along as the
    /// optimistic-concurrency token.
    pub async fn save(&mut self) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        self.saving = true;
        let result = self.client.tournaments().update(&self.tournament).await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }

    /// Sends one localized patch. Patches are applied strictly in send
    /// order; the response replaces local state before the next edit.
    pub async fn patch(&mut self, patch: PatchTournament) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        self.saving = true;
        let result = self
            .client
            .tournaments()
            .patch(self.tournament.id, &patch)
            .await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }

    /// Creates a scoring session for the given match.
    pub async fn add_sayg(&mut self, match_id: MatchId, options: MatchOptions) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        let create = CreateSayg {
            match_id,
            match_options: options,
        };

        self.saving = true;
        let result = self
            .client
            .tournaments()
            .add_sayg(self.tournament.id, &create)
            .await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }

    /// Deletes the scoring session linked to `match_id`. The local
    /// `sayg_id` reference only disappears via the reconciled response.
    pub async fn delete_sayg(&mut self, match_id: MatchId) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        self.saving = true;
        let result = self
            .client
            .tournaments()
            .delete_sayg(self.tournament.id, match_id)
            .await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }

    pub async fn upload_photo(&mut self, file_name: String, bytes: &[u8]) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        let upload = PhotoUpload::new(file_name, bytes);

        self.saving = true;
        let result = self
            .client
            .tournaments()
            .upload_photo(self.tournament.id, &upload)
            .await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }

    pub async fn delete_photo(&mut self, photo_id: PhotoId) -> Result<()> {
        if self.saving {
            return Err(Error::SaveInProgress);
        }

        self.saving = true;
        let result = self
            .client
            .tournaments()
            .delete_photo(self.tournament.id, photo_id)
            .await;
        self.saving = false;

        self.reconcile(result?);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use darts_knockout_core::{
        PlayerId, SeasonId, Side, SideId, TournamentId, TournamentPlayer,
    };

    use super::*;

    /// Records every published tournament.
    #[derive(Debug, Default)]
    struct Recorder {
        published: Vec<TournamentId>,
        fail: bool,
    }

    impl<'a> LiveUpdates for &'a mut Recorder {
        fn publish(&mut self, tournament: &Tournament) -> std::result::Result<(), PublishError> {
            if self.fail {
                return Err(PublishError("socket closed".to_string()));
            }
            self.published.push(tournament.id);
            Ok(())
        }
    }

    fn tournament(id: u64) -> Tournament {
        Tournament::new(
            TournamentId(id),
            NaiveDate::from_ymd_opt(2023, 5, 13).unwrap(),
            SeasonId(1),
        )
    }

    fn side(id: u64, name: &str) -> Side {
        let mut side = Side::new(SideId(id), name.to_string());
        side.players = vec![TournamentPlayer::new(PlayerId(id), name.to_string())];
        side
    }

    fn session(recorder: &mut Recorder) -> TournamentSession<&mut Recorder> {
        TournamentSession::new(Client::new("http://localhost"), tournament(1), recorder)
    }

    #[test]
    fn test_reconcile_publishes() {
        let mut recorder = Recorder::default();
        let mut session = session(&mut recorder);

        session.reconcile(tournament(2));
        assert_eq!(session.tournament().id, TournamentId(2));

        drop(session);
        assert_eq!(recorder.published, vec![TournamentId(2)]);
    }

    #[test]
    fn test_publish_failure_keeps_state() {
        let mut recorder = Recorder {
            fail: true,
            ..Default::default()
        };
        let mut session = session(&mut recorder);

        session.reconcile(tournament(2));

        // The failed broadcast does not roll the reconcile back.
        assert_eq!(session.tournament().id, TournamentId(2));
    }

    #[test]
    fn test_add_match_clears_unsaved_warning() {
        let mut recorder = Recorder::default();
        let mut session = session(&mut recorder);

        session.warn_unsaved_match();
        assert!(session.has_unsaved_match());

        // A rejected add keeps the warning.
        assert!(session
            .add_match(
                0,
                MatchId::temporary(1),
                Some(side(1, "A")),
                None,
                MatchOptions::default(),
            )
            .is_err());
        assert!(session.has_unsaved_match());

        session
            .add_match(
                0,
                MatchId::temporary(1),
                Some(side(1, "A")),
                Some(side(2, "B")),
                MatchOptions::default(),
            )
            .unwrap();
        assert!(!session.has_unsaved_match());
        assert_eq!(session.tournament().round_at(0).unwrap().matches.len(), 1);
    }
}
