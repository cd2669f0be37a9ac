//! Eligibility filtering and ranking of advertisement content.
//!
//! This crate provides:
//! - EligibilityFilter, which keeps content that some targeting group matches
//! - Ranker, which picks the eligible item with the highest click-through rate
//!
//! ## Architecture
//! Selection runs in two stages:
//! 1. The filter scores each candidate with the rate of its first matching group
//! 2. The ranker keeps the best score, breaking ties with an explicit policy
//!
//! ## Example Usage
//! ```ignore
//! use selection::{EligibilityFilter, Ranker, TieBreak};
//!
//! let filter = EligibilityFilter::new(index.clone(), evaluator.clone());
//! let eligible = filter.apply(candidates, &context)?;
//!
//! let winner = Ranker::new(TieBreak::FirstWins).select(eligible);
//! ```

pub mod eligibility;
pub mod ranker;

pub use eligibility::{EligibilityFilter, ScoredContent};
pub use ranker::{Ranker, TieBreak};
