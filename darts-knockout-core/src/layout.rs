//! Bracket layout computation.
//!
//! [`BracketLayout::new`] turns a flat list of sides plus the recursive
//! round tree into a renderable bracket: per-round match cells with names,
//! scores, winners and `winner(Mk)` mnemonics for spots that are not
//! resolved yet. Inputs are never mutated.

use crate::round::{Designation, MatchEntry, MatchOptions, Round, SideSpot};
use crate::side::Side;

/// One spot of a rendered match cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CellSpot {
    /// A resolved side, shown by name.
    Side { name: String },
    /// A placeholder for the winner of an earlier match. `hidden` spots
    /// carry over more than one round and are suppressed to reduce
    /// clutter.
    Mnemonic { label: String, hidden: bool },
    /// Nothing to show.
    Empty,
}

/// A rendered match.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchCell {
    pub spots: [CellSpot; 2],
    pub scores: [Option<u32>; 2],
    pub winner: Option<Designation>,
    pub number_of_legs: u32,
    /// Set on cells that preview a match the organiser has not created
    /// yet.
    pub synthetic: bool,
}

/// A rendered round with its display name.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundLayout {
    pub name: String,
    pub cells: Vec<MatchCell>,
}

/// The computed bracket.
#[derive(Clone, Debug, PartialEq)]
pub struct BracketLayout {
    pub rounds: Vec<RoundLayout>,
    /// The grand winner: present only when the deepest round the organiser
    /// has created contains exactly one match and that match is decided.
    pub winner: Option<Side>,
}

/// What the previous round feeds into the next while synthesizing preview
/// rounds.
#[derive(Clone, Debug)]
enum Feed {
    /// A side known by name: a decided winner or a side with a bye.
    Decided(String),
    /// The winner of the match labelled `label` in an earlier round.
    Winner { label: String, carried: bool },
}

impl Feed {
    fn spot(&self) -> CellSpot {
        match self {
            Self::Decided(name) => CellSpot::Side { name: name.clone() },
            Self::Winner { label, carried } => CellSpot::Mnemonic {
                label: label.clone(),
                hidden: *carried,
            },
        }
    }

    /// The feed as it looks one round later, having skipped a round.
    fn carry(&self) -> Feed {
        match self {
            Self::Decided(name) => Self::Decided(name.clone()),
            Self::Winner { label, .. } => Self::Winner {
                label: label.clone(),
                carried: true,
            },
        }
    }
}

impl BracketLayout {
    /// Computes the layout for `sides` and the optional round tree.
    ///
    /// Without a root round (or with an empty one) this produces the
    /// unplayed hint layout; otherwise the actual tree is walked and
    /// extended with preview rounds down to a single final cell.
    pub fn new(sides: &[Side], root: Option<&Round>, defaults: &MatchOptions) -> Self {
        let active: Vec<&Side> = sides.iter().filter(|side| !side.no_show).collect();

        match root {
            Some(round) if !round.matches.is_empty() => Self::played(&active, round, defaults),
            _ => Self::unplayed(&active, defaults),
        }
    }

    /// The hint layout shown before any match exists: one round named
    /// `Final` pairing up the sides, regardless of real bracket size.
    fn unplayed(active: &[&Side], defaults: &MatchOptions) -> Self {
        let mut cells = Vec::new();

        if active.len() >= 2 {
            for pair in active.chunks(2) {
                let second = match pair.get(1) {
                    Some(side) => CellSpot::Side {
                        name: side.name.clone(),
                    },
                    None => CellSpot::Empty,
                };

                cells.push(MatchCell {
                    spots: [
                        CellSpot::Side {
                            name: pair[0].name.clone(),
                        },
                        second,
                    ],
                    scores: [None, None],
                    winner: None,
                    number_of_legs: defaults.number_of_legs,
                    synthetic: true,
                });
            }
        }

        log::debug!(
            "Unplayed layout with {} sides and {} cells",
            active.len(),
            cells.len()
        );

        Self {
            rounds: vec![RoundLayout {
                name: "Final".to_string(),
                cells,
            }],
            winner: None,
        }
    }

    fn played(active: &[&Side], root: &Round, defaults: &MatchOptions) -> Self {
        let mut rounds: Vec<Vec<MatchCell>> = Vec::new();

        // The pool of sides feeding the round currently being walked.
        let mut pool: Vec<Side> = active.iter().map(|side| (*side).clone()).collect();
        let mut last = root;

        for round in root.iter() {
            if !std::ptr::eq(round, root) {
                pool = last.sides_for_next_round(&pool);
            }
            rounds.push(round.matches.iter().map(Self::cell).collect());
            last = round;
        }

        let actual_rounds = rounds.len();

        // What the deepest created round passes on: sides it never engaged
        // (byes), plus one feed per match.
        let engaged: Vec<_> = last
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
        let mut feeds: Vec<Feed> = pool
            .iter()
            .filter(|side| !engaged.contains(&side.id))
            .map(|side| Feed::Decided(side.name.clone()))
            .collect();
        for (index, entry) in last.matches.iter().enumerate() {
            feeds.push(match entry.winning_side() {
                Some(side) => Feed::Decided(side.name.clone()),
                None => Feed::Winner {
                    label: format!("winner(M{})", index + 1),
                    carried: false,
                },
            });
        }

        // Preview rounds down to a single final cell. An odd leftover
        // carries to the following round, like a bye in the side pool.
        while feeds.len() > 1 {
            let mut cells = Vec::new();
            let mut next = Vec::new();

            for pair in feeds.chunks(2) {
                if pair.len() == 2 {
                    cells.push(MatchCell {
                        spots: [pair[0].spot(), pair[1].spot()],
                        scores: [None, None],
                        winner: None,
                        number_of_legs: defaults.number_of_legs,
                        synthetic: true,
                    });
                    next.push(Feed::Winner {
                        label: format!("winner(M{})", cells.len()),
                        carried: false,
                    });
                } else {
                    next.push(pair[0].carry());
                }
            }

            rounds.push(cells);
            feeds = next;
        }

        // A grand winner exists only when nothing had to be synthesized
        // and the deepest created round is a decided one-match round.
        let winner = if rounds.len() == actual_rounds && last.matches.len() == 1 {
            last.matches[0].winning_side().cloned()
        } else {
            None
        };

        log::debug!(
            "Played layout with {} sides, {} rounds ({} created), winner: {}",
            active.len(),
            rounds.len(),
            actual_rounds,
            winner.is_some()
        );

        let total = rounds.len();
        let rounds = rounds
            .into_iter()
            .enumerate()
            .map(|(index, cells)| RoundLayout {
                name: round_name(active.len(), total, index),
                cells,
            })
            .collect();

        Self { rounds, winner }
    }

    fn cell(entry: &MatchEntry) -> MatchCell {
        let spot = |spot: &SideSpot| match spot {
            SideSpot::Side(side) => CellSpot::Side {
                name: side.name.clone(),
            },
            SideSpot::Mnemonic { mnemonic } => CellSpot::Mnemonic {
                label: mnemonic.clone(),
                hidden: false,
            },
            SideSpot::Unset => CellSpot::Empty,
        };

        MatchCell {
            spots: [spot(&entry.r#match.side_a), spot(&entry.r#match.side_b)],
            scores: [entry.r#match.score_a, entry.r#match.score_b],
            winner: entry.winner(),
            number_of_legs: entry.options.number_of_legs,
            synthetic: false,
        }
    }
}

/// The display name of round `index` in a bracket of `total_rounds` rounds
/// played by `side_count` sides.
///
/// The first round is named after the actual side count; later rounds
/// follow the power-of-two progression down to the final.
fn round_name(side_count: usize, total_rounds: usize, index: usize) -> String {
    let entering = if index == 0 {
        side_count
    } else {
        1usize << (total_rounds - index)
    };

    match entering {
        0..=2 => "Final".to_string(),
        4 => "Semi-Final".to_string(),
        8 => "Quarter-Final".to_string(),
        n => format!("Round of {}", n),
    }
}
