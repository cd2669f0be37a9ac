//! Targeting rule evaluation.
//!
//! ## Group semantics
//! A group's predicates are combined with AND:
//! 1. Any predicate that is `NoMatch` makes the group `NoMatch`
//! 2. Otherwise any `Indeterminate` predicate makes it `Indeterminate`
//! 3. Otherwise the group is a `Match` (including the empty group)
//!
//! ## Predicate semantics
//! - `recognized`: the request carries a customer id
//! - `marketplace=..`: the request marketplace is listed
//! - `prime`, `segment=..`: need the customer's profile, `Indeterminate`
//!   when the customer is anonymous or has no profile

use crate::types::{RequestContext, Verdict};
use anyhow::Result;
use data_loader::{
    CustomerProfile, CustomerProfileRepository, PredicateKind, TargetingGroup, TargetingPredicate,
};
use std::sync::Arc;
use tracing::debug;

/// Decides whether a targeting group applies to a request.
///
/// `Send + Sync` so one evaluator can be shared by concurrent selections.
pub trait TargetingEvaluator: Send + Sync {
    fn evaluate(&self, context: &RequestContext, group: &TargetingGroup) -> Result<Verdict>;
}

/// Rule engine for the predicates stored alongside targeting groups.
#[derive(Clone)]
pub struct PredicateEvaluator {
    customers: Arc<dyn CustomerProfileRepository>,
}

impl PredicateEvaluator {
    pub fn new(customers: Arc<dyn CustomerProfileRepository>) -> Self {
        Self { customers }
    }

    fn evaluate_predicate(
        &self,
        predicate: &TargetingPredicate,
        context: &RequestContext,
        profile: &mut ProfileLookup,
    ) -> Result<Verdict> {
        let verdict = match &predicate.kind {
            PredicateKind::Recognized => Verdict::from_bool(context.customer_id().is_some()),
            PredicateKind::Marketplace(ids) => {
                Verdict::from_bool(ids.iter().any(|id| id == context.marketplace_id()))
            }
            PredicateKind::Prime => match profile.get(self.customers.as_ref(), context)? {
                Some(p) => Verdict::from_bool(p.prime_member),
                None => Verdict::Indeterminate,
            },
            PredicateKind::Segment(name) => match profile.get(self.customers.as_ref(), context)? {
                Some(p) => Verdict::from_bool(p.segments.contains(name)),
                None => Verdict::Indeterminate,
            },
        };

        Ok(if predicate.inverted { verdict.invert() } else { verdict })
    }
}

impl TargetingEvaluator for PredicateEvaluator {
    fn evaluate(&self, context: &RequestContext, group: &TargetingGroup) -> Result<Verdict> {
        let mut profile = ProfileLookup::Pending;
        let mut verdict = Verdict::Match;

        for predicate in &group.predicates {
            match self.evaluate_predicate(predicate, context, &mut profile)? {
                Verdict::NoMatch => {
                    verdict = Verdict::NoMatch;
                    break;
                }
                Verdict::Indeterminate => verdict = Verdict::Indeterminate,
                Verdict::Match => {}
            }
        }

        debug!(
            "Targeting group {} evaluated to {:?}",
            group.targeting_group_id, verdict
        );
        Ok(verdict)
    }
}

/// Fetches the customer profile at most once per group evaluation
enum ProfileLookup {
    Pending,
    Done(Option<CustomerProfile>),
}

impl ProfileLookup {
    fn get(
        &mut self,
        customers: &dyn CustomerProfileRepository,
        context: &RequestContext,
    ) -> Result<Option<&CustomerProfile>> {
        if let ProfileLookup::Pending = self {
            let profile = match context.customer_id() {
                Some(id) => customers.get(id)?,
                None => None,
            };
            *self = ProfileLookup::Done(profile);
        }
        match self {
            ProfileLookup::Done(profile) => Ok(profile.as_ref()),
            ProfileLookup::Pending => Ok(None),
        }
    }
}
