//! Request context and verdict types.

use data_loader::{CustomerId, MarketplaceId};
use serde::{Deserialize, Serialize};

/// The scope of one selection decision: who is asking, and where.
///
/// Built once per request and never modified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestContext {
    customer_id: Option<CustomerId>,
    marketplace_id: MarketplaceId,
}

impl RequestContext {
    pub fn new(customer_id: Option<CustomerId>, marketplace_id: impl Into<MarketplaceId>) -> Self {
        Self {
            customer_id,
            marketplace_id: marketplace_id.into(),
        }
    }

    /// The customer id, if the request carried a non-empty one
    pub fn customer_id(&self) -> Option<&str> {
        self.customer_id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn marketplace_id(&self) -> &str {
        &self.marketplace_id
    }
}

/// Outcome of evaluating a targeting rule against a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Verdict {
    Match,
    NoMatch,
    /// The rule could not be decided with the data available
    /// (e.g. it needs a customer profile and none exists).
    Indeterminate,
}

impl Verdict {
    /// Whether this verdict makes content eligible.
    ///
    /// Only `Match` counts. `NoMatch` and `Indeterminate` are both treated
    /// as "does not satisfy".
    pub fn is_match(self) -> bool {
        matches!(self, Verdict::Match)
    }

    /// Swap `Match` and `NoMatch`; `Indeterminate` stays as is
    pub fn invert(self) -> Self {
        match self {
            Verdict::Match => Verdict::NoMatch,
            Verdict::NoMatch => Verdict::Match,
            Verdict::Indeterminate => Verdict::Indeterminate,
        }
    }

    pub fn from_bool(matched: bool) -> Self {
        if matched { Verdict::Match } else { Verdict::NoMatch }
    }
}
