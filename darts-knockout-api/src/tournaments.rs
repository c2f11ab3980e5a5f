//! Tournament endpoints.

use darts_knockout_core::{MatchId, MatchOptions, PhotoId, Tournament, TournamentId};
use serde::{Deserialize, Serialize};

use crate::patch::PatchTournament;
use crate::{Client, Error, Result};

/// The response envelope every mutating endpoint returns.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
#[serde(bound(serialize = "T: Serialize", deserialize = "T: Deserialize<'de>"))]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<T>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub messages: Vec<String>,
}

impl<T> ApiResponse<T> {
    /// Unwraps the payload, turning a rejected call into
    /// [`Error::Remote`]. Local state must not be updated in that case.
    pub fn into_result(self) -> Result<T> {
        match self.result {
            Some(result) if self.success => Ok(result),
            _ => Err(Error::Remote {
                errors: self.errors,
            }),
        }
    }
}

/// Request body for creating a scoring session against a match.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSayg {
    pub match_id: MatchId,
    pub match_options: MatchOptions,
}

/// Request body for a photo upload.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoUpload {
    pub file_name: String,
    /// base64 encoded file contents.
    pub contents: String,
}

impl PhotoUpload {
    pub fn new(file_name: String, bytes: &[u8]) -> Self {
        Self {
            file_name,
            contents: base64::encode(bytes),
        }
    }
}

#[derive(Clone, Debug)]
pub struct TournamentsClient<'a> {
    client: &'a Client,
}

impl<'a> TournamentsClient<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        Self { client }
    }

    /// Returns the [`Tournament`] with the given `id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails.
    pub async fn get(&self, id: TournamentId) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .uri(&format!("/api/tournament/{}", id))
            .build();

        self.client.send(req).await?.json().await
    }

    /// Replaces the tournament wholesale. The `last_updated` field of the
    /// body is the optimistic-concurrency token the server checks.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn update(&self, tournament: &Tournament) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .put()
            .uri("/api/tournament")
            .body(tournament)
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }

    /// Applies a localized patch without resending the rest of the tree.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the server rejects it.
    pub async fn patch(&self, id: TournamentId, patch: &PatchTournament) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .patch()
            .uri(&format!("/api/tournament/{}", id))
            .body(patch)
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }

    /// Creates a scoring session for a match, returning the updated
    /// tournament with the session id linked.
    pub async fn add_sayg(&self, id: TournamentId, create: &CreateSayg) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .post()
            .uri(&format!("/api/tournament/{}/sayg", id))
            .body(create)
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }

    /// Deletes the scoring session linked to `match_id`, returning the
    /// updated tournament with the link removed.
    pub async fn delete_sayg(&self, id: TournamentId, match_id: MatchId) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .delete()
            .uri(&format!("/api/tournament/{}/sayg/{}", id, match_id))
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }

    pub async fn upload_photo(
        &self,
        id: TournamentId,
        upload: &PhotoUpload,
    ) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .post()
            .uri(&format!("/api/tournament/{}/photo", id))
            .body(upload)
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }

    pub async fn delete_photo(&self, id: TournamentId, photo_id: PhotoId) -> Result<Tournament> {
        let req = self
            .client
            .request()
            .delete()
            .uri(&format!("/api/tournament/{}/photo/{}", id, photo_id))
            .build();

        let resp: ApiResponse<Tournament> = self.client.send(req).await?.json().await?;
        resp.into_result()
    }
}
