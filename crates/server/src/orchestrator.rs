//! # Advertisement Selector
//!
//! Coordinates one selection decision:
//! 1. Validate the marketplace id
//! 2. Fetch candidate content for the marketplace
//! 3. Build the request context
//! 4. Keep candidates some targeting group matches
//! 5. Rank by click-through rate and wrap the winner
//!
//! The selector holds no per-request state. Its collaborators are shared
//! read-only, so a single instance can serve concurrent requests.

use std::sync::Arc;

use anyhow::Result;
use tracing::{debug, instrument, warn};

use crate::advertisement::GeneratedAdvertisement;
use data_loader::{AdIndex, ContentRepository, TargetingGroupRepository};
use selection::{EligibilityFilter, Ranker, ScoredContent, TieBreak};
use targeting::{PredicateEvaluator, RequestContext, TargetingEvaluator};

#[derive(Clone)]
pub struct AdvertisementSelector {
    content: Arc<dyn ContentRepository>,
    eligibility: EligibilityFilter,
    ranker: Ranker,
}

impl AdvertisementSelector {
    /// Create a selector from its collaborators, breaking ties with
    /// [`TieBreak::FirstWins`].
    pub fn new(
        content: Arc<dyn ContentRepository>,
        targeting_groups: Arc<dyn TargetingGroupRepository>,
        evaluator: Arc<dyn TargetingEvaluator>,
    ) -> Self {
        Self {
            content,
            eligibility: EligibilityFilter::new(targeting_groups, evaluator),
            ranker: Ranker::default(),
        }
    }

    /// Wire every collaborator to an in-memory index
    pub fn from_index(index: Arc<AdIndex>) -> Self {
        let evaluator = Arc::new(PredicateEvaluator::new(index.clone()));
        Self::new(index.clone(), index, evaluator)
    }

    /// Configure the tie-break policy (default: first wins)
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.ranker = Ranker::new(tie_break);
        self
    }

    pub fn tie_break(&self) -> TieBreak {
        self.ranker.tie_break()
    }

    /// Main entry point: pick the advertisement to render.
    ///
    /// A missing or empty marketplace id yields `Empty` with a warning.
    /// Repository and evaluator failures are returned as errors.
    pub fn select_advertisement(
        &self,
        customer_id: Option<&str>,
        marketplace_id: Option<&str>,
    ) -> Result<GeneratedAdvertisement> {
        let winner = self.select_scored(customer_id, marketplace_id)?;
        Ok(winner.map(|scored| scored.content).into())
    }

    /// Same as [`select_advertisement`](Self::select_advertisement), but
    /// keeps the winning score and targeting group.
    #[instrument(level = "debug", skip(self))]
    pub fn select_scored(
        &self,
        customer_id: Option<&str>,
        marketplace_id: Option<&str>,
    ) -> Result<Option<ScoredContent>> {
        let Some(marketplace_id) = marketplace_id.filter(|id| !id.is_empty()) else {
            warn!("MarketplaceId cannot be null or empty. Returning empty ad.");
            return Ok(None);
        };

        let candidates = self.content.get(marketplace_id)?;
        debug!(
            "Fetched {} candidates for marketplace {}",
            candidates.len(),
            marketplace_id
        );
        if candidates.is_empty() {
            return Ok(None);
        }

        let context = RequestContext::new(customer_id.map(str::to_string), marketplace_id);
        let eligible = self.eligibility.apply(candidates, &context)?;

        let winner = self.ranker.select(eligible);
        match &winner {
            Some(scored) => debug!(
                "Selected content {:?} (ctr {:.4}, group {})",
                scored.content.content_id, scored.click_through_rate, scored.targeting_group_id
            ),
            None => debug!("No eligible content for marketplace {}", marketplace_id),
        }

        Ok(winner)
    }
}
