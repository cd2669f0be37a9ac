//! # Data Loader Crate
//!
//! Loads advertisement content, targeting groups and customer profiles and
//! serves them through the repository traits the selector depends on.
//!
//! ## Main Components
//!
//! - **types**: Domain types (AdvertisementContent, TargetingGroup, AdIndex)
//! - **parser**: Parse `.dat` files into Rust structs
//! - **index**: Build and validate the AdIndex
//! - **repository**: Lookup traits, implemented by AdIndex
//! - **error**: Error types for data loading
//!
//! ## Example Usage
//!
//! ```ignore
//! use data_loader::AdIndex;
//! use std::path::Path;
//!
//! let index = AdIndex::load_from_files(Path::new("data/sample"))?;
//! for content in index.get_content("US") {
//!     println!("{:?}", content.content_id);
//! }
//! ```

pub mod error;
pub mod index;
pub mod parser;
pub mod repository;
pub mod types;

pub use error::{DataLoadError, Result};
pub use repository::{ContentRepository, CustomerProfileRepository, TargetingGroupRepository};
pub use types::{
    // Type aliases
    ContentId,
    CustomerId,
    MarketplaceId,
    TargetingGroupId,
    // Core types
    AdIndex,
    AdvertisementContent,
    CustomerProfile,
    PredicateKind,
    TargetingGroup,
    TargetingPredicate,
};
