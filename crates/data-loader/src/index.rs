//! AdIndex building and validation.
//!
//! Loads the three data files in parallel and indexes them for the
//! repository lookups used during selection.

use crate::error::{DataLoadError, Result};
use crate::parser;
use crate::types::*;
use std::path::Path;
use tracing::info;

impl AdIndex {
    /// Load all advertisement data from a directory
    ///
    /// Steps:
    /// 1. Parse content, targeting groups and customers in parallel
    /// 2. Insert everything into the index (file order is preserved)
    /// 3. Validate references between groups and content
    pub fn load_from_files(data_dir: &Path) -> Result<Self> {
        info!("Loading advertisement data from {:?}", data_dir);

        let content_path = data_dir.join(parser::CONTENT_FILE);
        let groups_path = data_dir.join(parser::TARGETING_GROUPS_FILE);
        let customers_path = data_dir.join(parser::CUSTOMERS_FILE);

        let ((content, groups), customers) = rayon::join(
            || {
                rayon::join(
                    || parser::parse_content(&content_path),
                    || parser::parse_targeting_groups(&groups_path),
                )
            },
            || parser::parse_customers(&customers_path),
        );

        let content = content?;
        let groups = groups?;
        let customers = customers?;

        info!(
            "Loaded {} content items, {} targeting groups, {} customers",
            content.len(),
            groups.len(),
            customers.len()
        );

        let index = Self::from_parts(content, groups, customers);
        index.validate()?;

        Ok(index)
    }

    /// Build an index from already-parsed records
    pub fn from_parts(
        content: Vec<AdvertisementContent>,
        groups: Vec<TargetingGroup>,
        customers: Vec<CustomerProfile>,
    ) -> Self {
        let mut index = AdIndex::new();
        for item in content {
            index.insert_content(item);
        }
        for group in groups {
            index.insert_targeting_group(group);
        }
        for customer in customers {
            index.insert_customer(customer);
        }
        index
    }

    /// Validate data integrity
    ///
    /// Every targeting group must reference content that exists in some
    /// marketplace, and every click-through rate must be finite and
    /// non-negative.
    pub fn validate(&self) -> Result<()> {
        let known: std::collections::HashSet<&str> = self
            .content_by_marketplace
            .values()
            .flatten()
            .filter_map(|c| c.content_id.as_deref())
            .collect();

        for (content_id, groups) in &self.groups_by_content {
            if !known.contains(content_id.as_str()) {
                return Err(DataLoadError::MissingReference {
                    entity: "AdvertisementContent".to_string(),
                    id: content_id.clone(),
                });
            }
            for group in groups {
                let ctr = group.click_through_rate;
                if !ctr.is_finite() || ctr < 0.0 {
                    return Err(DataLoadError::InvalidValue {
                        field: "clickThroughRate".to_string(),
                        value: ctr.to_string(),
                    });
                }
            }
        }
        Ok(())
    }
}
