//! Key-value lookup traits used by the selection path.
//!
//! Lookups for unknown keys return an empty list, never an error. An `Err`
//! means the backing store itself failed and is passed through to the
//! caller untouched.

use crate::types::{AdIndex, AdvertisementContent, CustomerProfile, TargetingGroup};
use anyhow::Result;

/// Candidate content per marketplace
pub trait ContentRepository: Send + Sync {
    fn get(&self, marketplace_id: &str) -> Result<Vec<AdvertisementContent>>;
}

/// Targeting groups per content item, in evaluation order
pub trait TargetingGroupRepository: Send + Sync {
    fn get(&self, content_id: &str) -> Result<Vec<TargetingGroup>>;
}

/// Customer profiles consulted by targeting predicates
pub trait CustomerProfileRepository: Send + Sync {
    fn get(&self, customer_id: &str) -> Result<Option<CustomerProfile>>;
}

impl ContentRepository for AdIndex {
    fn get(&self, marketplace_id: &str) -> Result<Vec<AdvertisementContent>> {
        Ok(self.get_content(marketplace_id).to_vec())
    }
}

impl TargetingGroupRepository for AdIndex {
    fn get(&self, content_id: &str) -> Result<Vec<TargetingGroup>> {
        Ok(self.get_targeting_groups(content_id).to_vec())
    }
}

impl CustomerProfileRepository for AdIndex {
    fn get(&self, customer_id: &str) -> Result<Option<CustomerProfile>> {
        Ok(self.get_customer(customer_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unknown_keys_are_empty() {
        let index = AdIndex::new();
        assert!(ContentRepository::get(&index, "XX").unwrap().is_empty());
        assert!(TargetingGroupRepository::get(&index, "nope").unwrap().is_empty());
        assert!(CustomerProfileRepository::get(&index, "nobody").unwrap().is_none());
    }
}
