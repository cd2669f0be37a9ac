//! Filter that keeps only content some targeting group matches.
//!
//! ## Algorithm
//! For each candidate with a content id:
//! 1. Fetch its targeting groups from the repository
//! 2. Evaluate them in repository order
//! 3. Stop at the first `Match` and record that group's click-through rate
//!
//! A later group is never consulted once an earlier one matched, even if
//! its click-through rate is higher. Candidates without a content id, or
//! whose groups never match, are dropped.

use anyhow::Result;
use data_loader::{AdvertisementContent, TargetingGroupId, TargetingGroupRepository};
use std::sync::Arc;
use targeting::{RequestContext, TargetingEvaluator};
use tracing::debug;

/// Content that passed the eligibility filter, with its ranking score.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredContent {
    pub content: AdvertisementContent,
    /// Click-through rate of the first matching targeting group
    pub click_through_rate: f64,
    /// The targeting group that made the content eligible
    pub targeting_group_id: TargetingGroupId,
}

#[derive(Clone)]
pub struct EligibilityFilter {
    targeting_groups: Arc<dyn TargetingGroupRepository>,
    evaluator: Arc<dyn TargetingEvaluator>,
}

impl EligibilityFilter {
    pub fn new(
        targeting_groups: Arc<dyn TargetingGroupRepository>,
        evaluator: Arc<dyn TargetingEvaluator>,
    ) -> Self {
        Self {
            targeting_groups,
            evaluator,
        }
    }

    /// Returns the eligible candidates, in candidate order.
    ///
    /// Repository and evaluator errors are returned as-is.
    pub fn apply(
        &self,
        candidates: Vec<AdvertisementContent>,
        context: &RequestContext,
    ) -> Result<Vec<ScoredContent>> {
        let input_count = candidates.len();
        let mut eligible = Vec::new();

        for content in candidates {
            if let Some(scored) = self.score(content, context)? {
                eligible.push(scored);
            }
        }

        debug!(
            "Eligibility filter kept {} of {} candidates",
            eligible.len(),
            input_count
        );
        Ok(eligible)
    }

    fn score(
        &self,
        content: AdvertisementContent,
        context: &RequestContext,
    ) -> Result<Option<ScoredContent>> {
        let Some(content_id) = content.content_id.as_deref() else {
            return Ok(None);
        };

        for group in self.targeting_groups.get(content_id)? {
            // Indeterminate counts the same as NoMatch here
            if self.evaluator.evaluate(context, &group)?.is_match() {
                return Ok(Some(ScoredContent {
                    content,
                    click_through_rate: group.click_through_rate,
                    targeting_group_id: group.targeting_group_id,
                }));
            }
        }

        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use data_loader::{AdIndex, TargetingGroup};
    use std::collections::HashMap;
    use std::sync::Mutex;
    use targeting::Verdict;

    /// Evaluator with a fixed verdict per targeting group id.
    /// Records every group it is asked about.
    struct ScriptedEvaluator {
        verdicts: HashMap<String, Verdict>,
        calls: Mutex<Vec<String>>,
    }

    impl ScriptedEvaluator {
        fn new(verdicts: &[(&str, Verdict)]) -> Self {
            Self {
                verdicts: verdicts
                    .iter()
                    .map(|(id, v)| (id.to_string(), *v))
                    .collect(),
                calls: Mutex::new(Vec::new()),
            }
        }
    }

    impl TargetingEvaluator for ScriptedEvaluator {
        fn evaluate(&self, _context: &RequestContext, group: &TargetingGroup) -> Result<Verdict> {
            self.calls
                .lock()
                .unwrap()
                .push(group.targeting_group_id.clone());
            self.verdicts
                .get(&group.targeting_group_id)
                .copied()
                .ok_or_else(|| anyhow!("no verdict for {}", group.targeting_group_id))
        }
    }

    fn context() -> RequestContext {
        RequestContext::new(Some("c1".to_string()), "US")
    }

    fn build(
        groups: Vec<TargetingGroup>,
        evaluator: Arc<ScriptedEvaluator>,
    ) -> EligibilityFilter {
        let index = AdIndex::from_parts(vec![], groups, vec![]);
        EligibilityFilter::new(Arc::new(index), evaluator)
    }

    #[test]
    fn test_first_matching_group_wins() {
        let evaluator = Arc::new(ScriptedEvaluator::new(&[
            ("g1", Verdict::NoMatch),
            ("g2", Verdict::Match),
            ("g3", Verdict::Match),
        ]));
        let filter = build(
            vec![
                TargetingGroup::new("g1", "A", 0.9, vec![]),
                TargetingGroup::new("g2", "A", 0.4, vec![]),
                TargetingGroup::new("g3", "A", 0.8, vec![]),
            ],
            evaluator.clone(),
        );

        let eligible = filter
            .apply(vec![AdvertisementContent::new("A", "US", "a")], &context())
            .unwrap();

        assert_eq!(eligible.len(), 1);
        assert_eq!(eligible[0].click_through_rate, 0.4);
        assert_eq!(eligible[0].targeting_group_id, "g2");
        // g3 is never evaluated once g2 matched
        assert_eq!(*evaluator.calls.lock().unwrap(), vec!["g1", "g2"]);
    }

    #[test]
    fn test_indeterminate_is_not_eligible() {
        let evaluator = Arc::new(ScriptedEvaluator::new(&[
            ("g1", Verdict::Indeterminate),
            ("g2", Verdict::NoMatch),
        ]));
        let filter = build(
            vec![
                TargetingGroup::new("g1", "A", 0.9, vec![]),
                TargetingGroup::new("g2", "B", 0.9, vec![]),
            ],
            evaluator,
        );

        let eligible = filter
            .apply(
                vec![
                    AdvertisementContent::new("A", "US", "a"),
                    AdvertisementContent::new("B", "US", "b"),
                ],
                &context(),
            )
            .unwrap();
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_content_without_id_is_skipped() {
        let evaluator = Arc::new(ScriptedEvaluator::new(&[("g1", Verdict::Match)]));
        let filter = build(vec![TargetingGroup::new("g1", "A", 0.9, vec![])], evaluator.clone());

        let orphan = AdvertisementContent {
            content_id: None,
            marketplace_id: "US".to_string(),
            renderable_content: "orphan".to_string(),
        };
        let eligible = filter.apply(vec![orphan], &context()).unwrap();

        assert!(eligible.is_empty());
        assert!(evaluator.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_content_without_groups_is_skipped() {
        let evaluator = Arc::new(ScriptedEvaluator::new(&[]));
        let filter = build(vec![], evaluator);

        let eligible = filter
            .apply(vec![AdvertisementContent::new("A", "US", "a")], &context())
            .unwrap();
        assert!(eligible.is_empty());
    }

    #[test]
    fn test_keeps_candidate_order() {
        let evaluator = Arc::new(ScriptedEvaluator::new(&[
            ("ga", Verdict::Match),
            ("gb", Verdict::Match),
            ("gc", Verdict::Match),
        ]));
        let filter = build(
            vec![
                TargetingGroup::new("ga", "A", 0.1, vec![]),
                TargetingGroup::new("gb", "B", 0.3, vec![]),
                TargetingGroup::new("gc", "C", 0.2, vec![]),
            ],
            evaluator,
        );

        let eligible = filter
            .apply(
                vec![
                    AdvertisementContent::new("C", "US", "c"),
                    AdvertisementContent::new("A", "US", "a"),
                    AdvertisementContent::new("B", "US", "b"),
                ],
                &context(),
            )
            .unwrap();

        let ids: Vec<_> = eligible
            .iter()
            .map(|s| s.content.content_id.as_deref().unwrap())
            .collect();
        assert_eq!(ids, vec!["C", "A", "B"]);
    }

    #[test]
    fn test_evaluator_error_propagates() {
        // No scripted verdict for g1, so the evaluator fails
        let evaluator = Arc::new(ScriptedEvaluator::new(&[]));
        let filter = build(vec![TargetingGroup::new("g1", "A", 0.9, vec![])], evaluator);

        let result = filter.apply(vec![AdvertisementContent::new("A", "US", "a")], &context());
        assert!(result.is_err());
    }
}
