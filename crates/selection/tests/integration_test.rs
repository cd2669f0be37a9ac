//! Integration tests for the selection stages.
//!
//! These tests run the eligibility filter and the ranker together against
//! an in-memory index and the predicate rule engine.

use data_loader::{
    AdIndex, AdvertisementContent, CustomerProfile, PredicateKind, TargetingGroup,
    TargetingPredicate,
};
use selection::{EligibilityFilter, Ranker, TieBreak};
use std::collections::HashSet;
use std::sync::Arc;
use targeting::{PredicateEvaluator, RequestContext};

fn create_test_setup() -> (Arc<AdIndex>, EligibilityFilter) {
    let content = vec![
        AdvertisementContent::new("A", "US", "ad A"),
        AdvertisementContent::new("B", "US", "ad B"),
        AdvertisementContent::new("C", "US", "ad C"),
        AdvertisementContent::new("D", "US", "ad D"),
    ];

    let groups = vec![
        // A: open to everyone
        TargetingGroup::new("ga", "A", 0.5, vec![]),
        // B: recognized customers only
        TargetingGroup::new(
            "gb",
            "B",
            0.9,
            vec![TargetingPredicate::new(PredicateKind::Recognized)],
        ),
        // C: never matches in US
        TargetingGroup::new(
            "gc",
            "C",
            0.99,
            vec![TargetingPredicate::new(PredicateKind::Marketplace(vec![
                "CA".to_string(),
            ]))],
        ),
        // D: a cheap catch-all after a lucrative segment rule
        TargetingGroup::new(
            "gd1",
            "D",
            0.95,
            vec![TargetingPredicate::new(PredicateKind::Segment(
                "outdoors".to_string(),
            ))],
        ),
        TargetingGroup::new("gd2", "D", 0.1, vec![]),
    ];

    let customers = vec![
        CustomerProfile {
            customer_id: "hiker".to_string(),
            prime_member: false,
            segments: HashSet::from(["outdoors".to_string()]),
        },
        CustomerProfile {
            customer_id: "reader".to_string(),
            prime_member: true,
            segments: HashSet::from(["books".to_string()]),
        },
    ];

    let index = Arc::new(AdIndex::from_parts(content, groups, customers));
    let evaluator = Arc::new(PredicateEvaluator::new(index.clone()));
    let filter = EligibilityFilter::new(index.clone(), evaluator);

    (index, filter)
}

fn select(index: &AdIndex, filter: &EligibilityFilter, customer: Option<&str>) -> Option<String> {
    let context = RequestContext::new(customer.map(str::to_string), "US");
    let eligible = filter
        .apply(index.get_content("US").to_vec(), &context)
        .unwrap();
    Ranker::default()
        .select(eligible)
        .and_then(|s| s.content.content_id)
}

#[test]
fn test_anonymous_request_gets_open_content() {
    let (index, filter) = create_test_setup();

    // B needs a customer, C is CA-only, D falls back to its 0.1 group
    assert_eq!(select(&index, &filter, None).as_deref(), Some("A"));
}

#[test]
fn test_recognized_request_gets_higher_ctr() {
    let (index, filter) = create_test_setup();

    assert_eq!(select(&index, &filter, Some("reader")).as_deref(), Some("B"));
}

#[test]
fn test_segment_rule_lifts_content() {
    let (index, filter) = create_test_setup();

    // D's first group matches for the hiker at 0.95
    assert_eq!(select(&index, &filter, Some("hiker")).as_deref(), Some("D"));
}

#[test]
fn test_eligible_scores_use_first_matching_group() {
    let (index, filter) = create_test_setup();
    let context = RequestContext::new(None, "US");

    let eligible = filter
        .apply(index.get_content("US").to_vec(), &context)
        .unwrap();

    let d = eligible
        .iter()
        .find(|s| s.content.content_id.as_deref() == Some("D"))
        .expect("D should be eligible through its catch-all group");
    assert_eq!(d.click_through_rate, 0.1);
    assert_eq!(d.targeting_group_id, "gd2");

    assert!(
        eligible
            .iter()
            .all(|s| s.content.content_id.as_deref() != Some("C")),
        "C never matches in US"
    );
}

#[test]
fn test_tie_break_policies() {
    let content = vec![
        AdvertisementContent::new("X", "US", "x"),
        AdvertisementContent::new("Y", "US", "y"),
    ];
    let groups = vec![
        TargetingGroup::new("gx", "X", 0.4, vec![]),
        TargetingGroup::new("gy", "Y", 0.4, vec![]),
    ];
    let index = Arc::new(AdIndex::from_parts(content, groups, vec![]));
    let filter = EligibilityFilter::new(
        index.clone(),
        Arc::new(PredicateEvaluator::new(index.clone())),
    );
    let context = RequestContext::new(None, "US");

    let first = Ranker::new(TieBreak::FirstWins)
        .select(filter.apply(index.get_content("US").to_vec(), &context).unwrap())
        .unwrap();
    let last = Ranker::new(TieBreak::LastWins)
        .select(filter.apply(index.get_content("US").to_vec(), &context).unwrap())
        .unwrap();

    assert_eq!(first.content.content_id.as_deref(), Some("X"));
    assert_eq!(last.content.content_id.as_deref(), Some("Y"));
}
