//! Sample pipeline synthesis over a field classification.
//!
//! The tier and the collection are explicit caller input; randomness is
//! injected so tests can seed it. Degenerate classifications (no
//! dimensions, or too few metrics for the tier) yield an empty pipeline.

use std::collections::BTreeMap;

use rand::seq::{index, IndexedRandom};
use rand::Rng;
use rand::RngExt;
use serde::Deserialize;

use crate::document::profiler::FieldClassification;
use crate::document::{FieldPredicate, SortDirection, Stage};
use crate::nlp::CmpOp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    Simple,
    Medium,
    Complex,
}

pub fn synthesize(
    profile: &FieldClassification,
    complexity: Complexity,
    rng: &mut impl Rng,
) -> Vec<Stage> {
    match complexity {
        Complexity::Simple => simple(profile, rng),
        Complexity::Medium => medium(profile, rng),
        Complexity::Complex => complex(profile, rng),
    }
}

/// One equality match on a randomly chosen dimension value.
fn simple(profile: &FieldClassification, rng: &mut impl Rng) -> Vec<Stage> {
    let Some(dimension) = profile.dimensions.choose(rng) else {
        return Vec::new();
    };
    let Some(value) = profile.samples(dimension).choose(rng) else {
        return Vec::new();
    };
    let mut predicates = BTreeMap::new();
    predicates.insert(dimension.clone(), FieldPredicate::Eq(value.clone()));
    vec![Stage::Match(predicates)]
}

/// Dimension equality combined with a random comparison against one of the
/// metric's observed values.
fn medium(profile: &FieldClassification, rng: &mut impl Rng) -> Vec<Stage> {
    let (Some(dimension), Some(metric)) =
        (profile.dimensions.choose(rng), profile.metrics.choose(rng))
    else {
        return Vec::new();
    };
    let (Some(dim_value), Some(metric_value)) = (
        profile.samples(dimension).choose(rng),
        profile.samples(metric).choose(rng),
    ) else {
        return Vec::new();
    };
    let op = *[CmpOp::Gt, CmpOp::Lt].choose(rng).expect("two candidates");

    let mut predicates = BTreeMap::new();
    predicates.insert(dimension.clone(), FieldPredicate::Eq(dim_value.clone()));
    predicates.insert(metric.clone(), FieldPredicate::Cmp(op, metric_value.clone()));
    vec![Stage::Match(predicates)]
}

/// Group by a dimension summing two distinct metrics, sort by one of the
/// sums in a random direction, and limit on a coin flip.
fn complex(profile: &FieldClassification, rng: &mut impl Rng) -> Vec<Stage> {
    let Some(dimension) = profile.dimensions.choose(rng) else {
        return Vec::new();
    };
    if profile.metrics.len() < 2 {
        return Vec::new();
    }

    let picked = index::sample(rng, profile.metrics.len(), 2);
    let first = profile.metrics[picked.index(0)].clone();
    let second = profile.metrics[picked.index(1)].clone();

    let sort_metric = [first.as_str(), second.as_str()]
        .choose(rng)
        .expect("two candidates")
        .to_string();
    let direction = if rng.random_bool(0.5) {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };

    let mut stages = vec![
        Stage::Group {
            key: dimension.clone(),
            metrics: vec![first, second],
        },
        Stage::Sort {
            field: format!("total_{sort_metric}"),
            direction,
        },
    ];
    if rng.random_bool(0.5) {
        stages.push(Stage::Limit(rng.random_range(5..=20)));
    }
    stages
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use serde_json::json;

    use super::*;
    use crate::document::profiler::classify;

    fn game_sales_profile() -> FieldClassification {
        classify(&[
            json!({"Genre": "Platform", "Year": "1985", "NA_Sales": 29, "EU_Sales": 3, "JP_Sales": 6}),
            json!({"Genre": "Racing", "Year": "1996", "NA_Sales": 11, "EU_Sales": 9, "JP_Sales": 4}),
            json!({"Genre": "Sports", "Year": "2006", "NA_Sales": 41, "EU_Sales": 29, "JP_Sales": 3}),
        ])
    }

    #[test]
    fn simple_tier_matches_one_observed_dimension_value() {
        let profile = game_sales_profile();
        let mut rng = StdRng::seed_from_u64(7);
        let pipeline = synthesize(&profile, Complexity::Simple, &mut rng);
        assert_eq!(pipeline.len(), 1);
        let Stage::Match(predicates) = &pipeline[0] else {
            panic!("expected a match stage");
        };
        let (field, predicate) = predicates.iter().next().unwrap();
        let FieldPredicate::Eq(value) = predicate else {
            panic!("expected an equality predicate");
        };
        assert!(profile.dimensions.contains(field));
        assert!(profile.samples(field).contains(value));
    }

    #[test]
    fn medium_tier_combines_dimension_and_metric() {
        let profile = game_sales_profile();
        let mut rng = StdRng::seed_from_u64(11);
        let pipeline = synthesize(&profile, Complexity::Medium, &mut rng);
        let Stage::Match(predicates) = &pipeline[0] else {
            panic!("expected a match stage");
        };
        assert_eq!(predicates.len(), 2);
        let comparisons = predicates
            .values()
            .filter(|p| matches!(p, FieldPredicate::Cmp(CmpOp::Gt | CmpOp::Lt, _)))
            .count();
        assert_eq!(comparisons, 1);
    }

    #[test]
    fn complex_tier_never_repeats_a_metric() {
        let profile = game_sales_profile();
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pipeline = synthesize(&profile, Complexity::Complex, &mut rng);
            let Stage::Group { metrics, .. } = &pipeline[0] else {
                panic!("expected a group stage");
            };
            assert_ne!(metrics[0], metrics[1]);
        }
    }

    #[test]
    fn complex_tier_sorts_by_one_of_the_summed_totals() {
        let profile = game_sales_profile();
        let mut rng = StdRng::seed_from_u64(3);
        let pipeline = synthesize(&profile, Complexity::Complex, &mut rng);
        let Stage::Group { metrics, .. } = &pipeline[0] else {
            panic!("expected a group stage");
        };
        let Stage::Sort { field, .. } = &pipeline[1] else {
            panic!("expected a sort stage");
        };
        assert!(metrics.iter().any(|m| field == &format!("total_{m}")));
    }

    #[test]
    fn complex_tier_takes_both_limit_branches_over_seeded_trials() {
        let profile = game_sales_profile();
        let mut with_limit = 0;
        let mut without_limit = 0;
        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let pipeline = synthesize(&profile, Complexity::Complex, &mut rng);
            match pipeline.last().unwrap() {
                Stage::Limit(n) => {
                    assert!((5..=20).contains(n));
                    with_limit += 1;
                }
                _ => without_limit += 1,
            }
        }
        assert!(with_limit > 0);
        assert!(without_limit > 0);
    }

    #[test]
    fn degenerate_classifications_yield_empty_pipelines() {
        let no_dimensions = classify(&[json!({"a": 1}), json!({"a": 2})]);
        let one_metric = classify(&[json!({"g": "x", "a": 1}), json!({"g": "y", "a": 2})]);
        let mut rng = StdRng::seed_from_u64(0);

        for tier in [Complexity::Simple, Complexity::Medium, Complexity::Complex] {
            assert!(synthesize(&no_dimensions, tier, &mut rng).is_empty());
        }
        assert!(synthesize(&one_metric, Complexity::Complex, &mut rng).is_empty());
        assert!(synthesize(&classify(&[]), Complexity::Medium, &mut rng).is_empty());
    }
}
