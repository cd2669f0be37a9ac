//! Picks the single best eligible content item.

use crate::eligibility::ScoredContent;
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use tracing::warn;

/// How to choose between items sharing the highest click-through rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// The earliest item in candidate order wins
    #[default]
    FirstWins,
    /// The latest item in candidate order wins
    LastWins,
}

impl FromStr for TieBreak {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "first" => Ok(TieBreak::FirstWins),
            "last" => Ok(TieBreak::LastWins),
            _ => Err(format!("unknown tie-break policy '{}', expected first or last", s)),
        }
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TieBreak::FirstWins => write!(f, "first"),
            TieBreak::LastWins => write!(f, "last"),
        }
    }
}

/// Selects the item with the highest click-through rate.
///
/// Comparison is strictly numeric. Items whose rate is NaN cannot be
/// ordered and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct Ranker {
    tie_break: TieBreak,
}

impl Ranker {
    pub fn new(tie_break: TieBreak) -> Self {
        Self { tie_break }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Returns `None` when nothing is eligible
    pub fn select(&self, eligible: Vec<ScoredContent>) -> Option<ScoredContent> {
        let mut best: Option<ScoredContent> = None;

        for candidate in eligible {
            if candidate.click_through_rate.is_nan() {
                warn!(
                    "Skipping content {:?} with NaN click-through rate",
                    candidate.content.content_id
                );
                continue;
            }

            let replace = match &best {
                None => true,
                Some(current) => match candidate
                    .click_through_rate
                    .partial_cmp(&current.click_through_rate)
                {
                    Some(Ordering::Greater) => true,
                    Some(Ordering::Equal) => self.tie_break == TieBreak::LastWins,
                    _ => false,
                },
            };

            if replace {
                best = Some(candidate);
            }
        }

        best
    }
}
