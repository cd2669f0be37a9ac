//! Core domain types for advertisement content and targeting data.
//!
//! This module defines the data structures shared by every other crate:
//! - Type aliases for the identifiers (ContentId, MarketplaceId, ...)
//! - Content, targeting groups and the predicates attached to them
//! - Customer profiles consulted by the targeting rules
//! - AdIndex, the in-memory store built from the data files

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

// =============================================================================
// Type Aliases
// =============================================================================

/// Identifier of a piece of advertisement content
pub type ContentId = String;

/// Identifier of a marketplace (e.g. "US", "1")
pub type MarketplaceId = String;

/// Identifier of a customer
pub type CustomerId = String;

/// Identifier of a targeting group
pub type TargetingGroupId = String;

// =============================================================================
// Content
// =============================================================================

/// A piece of creative content that can be rendered as an advertisement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvertisementContent {
    /// `None` when the source record carried no identifier.
    /// Such content is never eligible for selection.
    pub content_id: Option<ContentId>,
    pub marketplace_id: MarketplaceId,
    /// Marketplace-scoped payload, rendered as-is by the caller
    pub renderable_content: String,
}

impl AdvertisementContent {
    pub fn new(
        content_id: impl Into<ContentId>,
        marketplace_id: impl Into<MarketplaceId>,
        renderable_content: impl Into<String>,
    ) -> Self {
        Self {
            content_id: Some(content_id.into()),
            marketplace_id: marketplace_id.into(),
            renderable_content: renderable_content.into(),
        }
    }
}

// =============================================================================
// Targeting
// =============================================================================

/// The condition checked by a single targeting predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredicateKind {
    /// The request carries a customer id
    Recognized,
    /// The customer is a prime member
    Prime,
    /// The customer belongs to the named segment
    Segment(String),
    /// The request targets one of the listed marketplaces
    Marketplace(Vec<MarketplaceId>),
}

/// A predicate with an optional inversion flag (`!` in the data files).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetingPredicate {
    pub kind: PredicateKind,
    pub inverted: bool,
}

impl TargetingPredicate {
    pub fn new(kind: PredicateKind) -> Self {
        Self {
            kind,
            inverted: false,
        }
    }

    pub fn inverted(kind: PredicateKind) -> Self {
        Self {
            kind,
            inverted: true,
        }
    }
}

/// A targeting rule bound to one content item.
///
/// All predicates must hold for the group to match. A group without
/// predicates matches every request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetingGroup {
    pub targeting_group_id: TargetingGroupId,
    pub content_id: ContentId,
    /// Predicted click-through rate, finite and non-negative
    pub click_through_rate: f64,
    pub predicates: Vec<TargetingPredicate>,
}

impl TargetingGroup {
    pub fn new(
        targeting_group_id: impl Into<TargetingGroupId>,
        content_id: impl Into<ContentId>,
        click_through_rate: f64,
        predicates: Vec<TargetingPredicate>,
    ) -> Self {
        Self {
            targeting_group_id: targeting_group_id.into(),
            content_id: content_id.into(),
            click_through_rate,
            predicates,
        }
    }
}

// =============================================================================
// Customers
// =============================================================================

/// What the targeting rules know about a customer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub customer_id: CustomerId,
    pub prime_member: bool,
    pub segments: HashSet<String>,
}

// =============================================================================
// AdIndex - The In-Memory Store
// =============================================================================

/// Holds all content, targeting groups and customer profiles.
///
/// Lookups by marketplace, content id and customer id are O(1). Lists keep
/// the order in which records were inserted, which is the order the
/// targeting groups are evaluated in.
#[derive(Debug, Default)]
pub struct AdIndex {
    pub(crate) content_by_marketplace: HashMap<MarketplaceId, Vec<AdvertisementContent>>,
    pub(crate) groups_by_content: HashMap<ContentId, Vec<TargetingGroup>>,
    pub(crate) customers: HashMap<CustomerId, CustomerProfile>,
}

impl AdIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// All content for a marketplace; empty when the marketplace is unknown
    pub fn get_content(&self, marketplace_id: &str) -> &[AdvertisementContent] {
        self.content_by_marketplace
            .get(marketplace_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Targeting groups for a content item, in insertion order
    pub fn get_targeting_groups(&self, content_id: &str) -> &[TargetingGroup] {
        self.groups_by_content
            .get(content_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    pub fn get_customer(&self, customer_id: &str) -> Option<&CustomerProfile> {
        self.customers.get(customer_id)
    }

    /// Known marketplace ids, sorted
    pub fn marketplace_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .content_by_marketplace
            .keys()
            .map(|id| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Known customer ids, sorted
    pub fn customer_ids(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.customers.keys().map(|id| id.as_str()).collect();
        ids.sort_unstable();
        ids
    }

    pub fn insert_content(&mut self, content: AdvertisementContent) {
        self.content_by_marketplace
            .entry(content.marketplace_id.clone())
            .or_default()
            .push(content);
    }

    pub fn insert_targeting_group(&mut self, group: TargetingGroup) {
        self.groups_by_content
            .entry(group.content_id.clone())
            .or_default()
            .push(group);
    }

    pub fn insert_customer(&mut self, customer: CustomerProfile) {
        self.customers.insert(customer.customer_id.clone(), customer);
    }

    /// (content, targeting groups, customers)
    pub fn counts(&self) -> (usize, usize, usize) {
        let content = self.content_by_marketplace.values().map(|v| v.len()).sum();
        let groups = self.groups_by_content.values().map(|v| v.len()).sum();
        (content, groups, self.customers.len())
    }
}
