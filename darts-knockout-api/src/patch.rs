//! The incremental patch protocol.
//!
//! A single leg's score or a single accolade travels as a small patch
//! addressed to the round depth it originated at, instead of resending the
//! whole tree. This keeps payloads independent of bracket size and lets
//! two in-flight edits to different rounds coexist: each patch only names
//! its own path.
//!
//! Match-score patches are wrapped in one `nextRound` level per round of
//! depth. Accolades attach to the tournament itself, regardless of which
//! round triggered them, and are never wrapped.

use darts_knockout_core::{Checkout, SideId, TournamentPlayer};
use serde::{Deserialize, Serialize};

/// The body of a `PATCH /api/tournament/{id}` call.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchTournament {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round: Option<PatchRound>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_180: Option<TournamentPlayer>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub additional_over100_checkout: Option<Checkout>,
}

impl PatchTournament {
    /// A score update for a match in the round at `depth`.
    pub fn match_score(depth: usize, patch: PatchMatch) -> Self {
        Self {
            round: Some(PatchRound::wrap(depth, patch)),
            ..Default::default()
        }
    }

    /// A recorded 180 for `player`. Never depth-wrapped.
    pub fn one_eighty(player: TournamentPlayer) -> Self {
        Self {
            additional_180: Some(player),
            ..Default::default()
        }
    }

    /// A recorded high checkout. Never depth-wrapped.
    pub fn hi_check(checkout: Checkout) -> Self {
        Self {
            additional_over100_checkout: Some(checkout),
            ..Default::default()
        }
    }
}

/// The recursive round wrapper: either a match update for *this* round or
/// a wrapper addressing the next one.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchRound {
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub r#match: Option<PatchMatch>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_round: Option<Box<PatchRound>>,
}

impl PatchRound {
    /// Wraps `patch` in `depth` levels of `nextRound` indirection so the
    /// server applies it to the correct round without seeing siblings.
    pub fn wrap(depth: usize, patch: PatchMatch) -> PatchRound {
        let mut round = PatchRound {
            r#match: Some(patch),
            next_round: None,
        };

        for _ in 0..depth {
            round = PatchRound {
                r#match: None,
                next_round: Some(Box::new(round)),
            };
        }

        log::debug!("Wrapped match patch at depth {}", depth);
        round
    }
}

/// A single match's score delta.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PatchMatch {
    pub side_a: SideId,
    pub side_b: SideId,
    pub score_a: u32,
    pub score_b: u32,
}

#[cfg(test)]
mod tests {
    use darts_knockout_core::PlayerId;
    use serde_json::json;
    use serde_test::{assert_tokens, Token};

    use super::*;

    fn patch_match() -> PatchMatch {
        PatchMatch {
            side_a: SideId(1),
            side_b: SideId(2),
            score_a: 3,
            score_b: 1,
        }
    }

    #[test]
    fn test_match_patch_tokens() {
        assert_tokens(
            &patch_match(),
            &[
                Token::Struct {
                    name: "PatchMatch",
                    len: 4,
                },
                Token::Str("sideA"),
                Token::U64(1),
                Token::Str("sideB"),
                Token::U64(2),
                Token::Str("scoreA"),
                Token::U32(3),
                Token::Str("scoreB"),
                Token::U32(1),
                Token::StructEnd,
            ],
        );
    }

    #[test]
    fn test_depth_wrapping() {
        let patch = PatchTournament::match_score(2, patch_match());

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "round": {
                    "nextRound": {
                        "nextRound": {
                            "match": {
                                "sideA": 1,
                                "sideB": 2,
                                "scoreA": 3,
                                "scoreB": 1,
                            }
                        }
                    }
                }
            })
        );
    }

    #[test]
    fn test_root_round_not_wrapped() {
        let patch = PatchTournament::match_score(0, patch_match());

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "round": {
                    "match": {
                        "sideA": 1,
                        "sideB": 2,
                        "scoreA": 3,
                        "scoreB": 1,
                    }
                }
            })
        );
    }

    #[test]
    fn test_accolades_never_wrapped() {
        let patch = PatchTournament::one_eighty(TournamentPlayer::new(
            PlayerId(7),
            "ADAMS".to_string(),
        ));

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "additional180": {
                    "id": 7,
                    "name": "ADAMS",
                }
            })
        );

        let patch = PatchTournament::hi_check(Checkout {
            id: PlayerId(7),
            name: "ADAMS".to_string(),
            score: 120,
        });

        assert_eq!(
            serde_json::to_value(&patch).unwrap(),
            json!({
                "additionalOver100Checkout": {
                    "id": 7,
                    "name": "ADAMS",
                    "score": 120,
                }
            })
        );
    }
}
