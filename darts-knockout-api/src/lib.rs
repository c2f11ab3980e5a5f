//! # darts-knockout-api
//!
//! The wire contracts and client for the knockout darts backend:
//!
//! - [`Client`]: the REST client, split into [`tournaments`] and [`sayg`]
//! endpoint groups.
//! - [`patch`]: the recursive `nextRound` patch protocol for localized
//! updates.
//! - [`session::TournamentSession`]: the optimistic local copy, reconciled
//! with the server's authoritative copy after every call.
//! - [`sayg::SaygScoringBridge`]: drives a match's leg-by-leg scoring and
//! emits accolade and score patches.
//!
//! The data model itself lives in `darts-knockout-core`; this crate turns
//! it into the wire representation via the core crate's `serde` feature.

pub mod http;
pub mod ids;
pub mod patch;
pub mod sayg;
pub mod session;
pub mod tournaments;

use std::result;

use thiserror::Error as ThisError;

use crate::sayg::SaygClient;
use crate::tournaments::TournamentsClient;

/// A `Result<T>` using [`enum@Error`] as an error type.
pub type Result<T> = result::Result<T, Error>;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error(transparent)]
    Http(#[from] http::Error),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
    /// The server rejected the call; local state stays untouched.
    #[error("remote call failed: {errors:?}")]
    Remote { errors: Vec<String> },
    /// A save or patch is already in flight.
    #[error("a save or patch is already in progress")]
    SaveInProgress,
    /// Scoring needs a persisted match; save the tournament first.
    #[error("the match must be saved before scoring can begin")]
    UnsavedMatch,
    #[error("the match is not eligible for live scoring")]
    IneligibleMatch,
    #[error("no scoring session is open")]
    SessionNotOpen,
    #[error(transparent)]
    Core(#[from] darts_knockout_core::Error),
}

/// A client for the knockout darts backend.
#[derive(Clone, Debug)]
pub struct Client {
    base_url: String,
    http: http::HttpClient,
}

impl Client {
    pub fn new<T>(base_url: T) -> Self
    where
        T: ToString,
    {
        Self {
            base_url: base_url.to_string(),
            http: http::HttpClient::new(),
        }
    }

    pub(crate) fn request(&self) -> http::RequestBuilder {
        http::RequestBuilder::new(self.base_url.clone())
    }

    pub(crate) async fn send(&self, request: http::Request) -> Result<http::Response> {
        self.http.send(request).await
    }

    pub fn tournaments(&self) -> TournamentsClient<'_> {
        TournamentsClient::new(self)
    }

    pub fn sayg(&self) -> SaygClient<'_> {
        SaygClient::new(self)
    }
}
