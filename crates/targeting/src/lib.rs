//! # Targeting Crate
//!
//! Decides whether a targeting group applies to a request.
//!
//! ## Components
//!
//! ### RequestContext
//! The (customer, marketplace) pair a selection is made for.
//!
//! ### Verdict
//! Three-valued outcome of a rule: `Match`, `NoMatch` or `Indeterminate`.
//! Callers that only care about eligibility use [`Verdict::is_match`],
//! which treats `Indeterminate` like `NoMatch`.
//!
//! ### TargetingEvaluator
//! The trait the selector calls for every targeting group it considers.
//! [`PredicateEvaluator`] implements it for the predicates loaded from the
//! data files.
//!
//! ## Example Usage
//!
//! ```ignore
//! use targeting::{PredicateEvaluator, RequestContext, TargetingEvaluator};
//!
//! let evaluator = PredicateEvaluator::new(index.clone());
//! let context = RequestContext::new(Some("c-reader".to_string()), "US");
//!
//! for group in index.get_targeting_groups("kindle-deal") {
//!     println!("{} -> {:?}", group.targeting_group_id, evaluator.evaluate(&context, group)?);
//! }
//! ```

pub mod evaluator;
pub mod types;

pub use evaluator::{PredicateEvaluator, TargetingEvaluator};
pub use types::{RequestContext, Verdict};
