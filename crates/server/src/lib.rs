//! Selector crate for the advertisement selection engine.
//!
//! This crate contains the orchestrator that runs retrieval, eligibility
//! filtering and ranking for one request, and the result type it returns.

pub mod advertisement;
pub mod orchestrator;

pub use advertisement::GeneratedAdvertisement;
pub use orchestrator::AdvertisementSelector;
