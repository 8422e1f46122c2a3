use proptest::prelude::*;

use super::*;
use crate::record::tests::record;

fn names(ranked: &[ScoredLocation]) -> Vec<&str> {
    ranked.iter().map(ScoredLocation::name).collect()
}

// -----------------------------------------------------------------------
// audience reach / efficiency score
// -----------------------------------------------------------------------

#[test]
fn reach_and_score_for_reference_locations() {
    let mut scorer = LocationScorer::new();
    scorer.add_location("A", 100.0, 1000, 800, 1000).unwrap();
    scorer.add_location("B", 50.0, 500, 100, 1000).unwrap();

    let a = &scorer.locations()[0];
    assert_eq!(a.audience_reach(), 800);
    assert!((a.score() - 8.0).abs() < 1e-12);

    let b = &scorer.locations()[1];
    assert_eq!(b.audience_reach(), 50);
    assert!((b.score() - 1.0).abs() < 1e-12);

    assert_eq!(names(&scorer.rank(2)), vec!["A", "B"]);
}

#[test]
fn reach_rounds_half_to_even() {
    // 5 * 1/2 = 2.5 -> 2, 7 * 1/2 = 3.5 -> 4
    assert_eq!(audience_reach("x", 5, 1, 2).unwrap(), 2);
    assert_eq!(audience_reach("x", 7, 1, 2).unwrap(), 4);
    // 10 * 2/3 = 6.67 -> 7
    assert_eq!(audience_reach("x", 10, 2, 3).unwrap(), 7);
}

#[test]
fn zero_population_is_division_error() {
    let mut scorer = LocationScorer::new();
    let err = scorer.add_location("ghost", 10.0, 100, 0, 0).unwrap_err();
    assert!(
        matches!(err, PlanError::Division { ref location, quantity: "audience reach" } if location == "ghost"),
        "expected division error, got: {err:?}"
    );
    assert!(scorer.is_empty());
}

#[test]
fn negative_inputs_are_validation_errors() {
    let mut scorer = LocationScorer::new();
    let cases = [
        (-1.0, 100, 10, 100, "ad_cost"),
        (1.0, -100, 10, 100, "foot_traffic"),
        (1.0, 100, -10, 100, "employed_population"),
        (1.0, 100, 10, -100, "population"),
    ];
    for (ad_cost, ft, ep, pop, expected) in cases {
        let err = scorer.add_location("bad", ad_cost, ft, ep, pop).unwrap_err();
        assert!(
            matches!(err, PlanError::Validation { field, .. } if field == expected),
            "expected validation error on {expected}, got: {err:?}"
        );
    }
    assert!(scorer.is_empty());
}

#[test]
fn zero_cost_scores_no_cost_sentinel() {
    let mut scorer = LocationScorer::new();
    scorer.add_location("free", 0.0, 10_000, 900, 1000).unwrap();
    let free = &scorer.locations()[0];
    assert_eq!(free.audience_reach(), 9000);
    assert_eq!(free.efficiency(), EfficiencyScore::NoCost);
    assert_eq!(free.score(), NO_COST_SCORE);
}

#[test]
fn cost_too_small_to_score_is_validation_error() {
    let mut scorer = LocationScorer::new();
    let err = scorer
        .add_location("tiny", 1e-310, 1000, 800, 1000)
        .unwrap_err();
    assert!(
        matches!(err, PlanError::Validation { ref subject, field: "ad_cost", .. } if subject == "tiny"),
        "got: {err:?}"
    );
    assert!(scorer.is_empty());
}

#[test]
fn duplicate_names_are_appended_independently() {
    let mut scorer = LocationScorer::new();
    scorer.add_location("dup", 10.0, 100, 50, 100).unwrap();
    scorer.add_location("dup", 20.0, 100, 50, 100).unwrap();
    assert_eq!(scorer.len(), 2);
}

#[test]
fn add_record_uses_record_fields() {
    let mut scorer = LocationScorer::new();
    scorer
        .add_record("mall", &record(30, 50_000, 600, 1200, 40.0, 2400))
        .unwrap();
    let mall = &scorer.locations()[0];
    assert_eq!(mall.name(), "mall");
    assert_eq!(mall.audience_reach(), 1200);
    assert!((mall.score() - 30.0).abs() < 1e-12);
    assert_eq!(mall.state(), AllocationState::Scored);
}

// -----------------------------------------------------------------------
// rank
// -----------------------------------------------------------------------

#[test]
fn rank_truncates_and_defaults_to_twenty_four() {
    let mut scorer = LocationScorer::new();
    for i in 0..30 {
        scorer
            .add_location(&format!("loc-{i}"), 10.0, 100 + i, 1, 1)
            .unwrap();
    }
    assert_eq!(scorer.rank(DEFAULT_TOP_N).len(), 24);
    assert_eq!(scorer.rank(3).len(), 3);
    assert_eq!(scorer.rank(100).len(), 30);
    assert!(scorer.rank(0).is_empty());
    assert_eq!(scorer.rank(1)[0].name(), "loc-29");
}

#[test]
fn rank_keeps_insertion_order_for_ties() {
    let mut scorer = LocationScorer::new();
    scorer.add_location("first", 10.0, 100, 1, 1).unwrap();
    scorer.add_location("free", 0.0, 100, 1, 1).unwrap();
    scorer.add_location("second", 10.0, 100, 1, 1).unwrap();
    scorer.add_location("best", 1.0, 100, 1, 1).unwrap();
    scorer.add_location("third", 20.0, 200, 1, 1).unwrap();

    assert_eq!(
        names(&scorer.rank(5)),
        vec!["best", "first", "second", "third", "free"]
    );
}

#[test]
fn rank_does_not_mutate_scorer() {
    let mut scorer = LocationScorer::new();
    scorer.add_location("low", 10.0, 10, 1, 1).unwrap();
    scorer.add_location("high", 1.0, 10, 1, 1).unwrap();

    let first = scorer.rank(2);
    let second = scorer.rank(2);
    assert_eq!(first, second);
    assert_eq!(scorer.locations()[0].name(), "low");
}

// -----------------------------------------------------------------------
// average_metrics
// -----------------------------------------------------------------------

fn table() -> LocationTable {
    let mut table = LocationTable::new();
    table
        .insert("a", record(30, 40_000, 500, 1000, 10.0, 100))
        .unwrap();
    table
        .insert("b", record(40, 60_000, 300, 1000, 10.0, 100))
        .unwrap();
    table
        .insert("c", record(50, 80_000, 100, 1000, 10.0, 100))
        .unwrap();
    table
}

#[test]
fn average_metrics_over_subset() {
    let metrics = average_metrics(&table(), &["a".to_string(), "b".to_string()]).unwrap();
    assert!((metrics.avg_age - 35.0).abs() < 1e-9);
    assert!((metrics.avg_income - 50_000.0).abs() < 1e-9);
    assert!((metrics.avg_employed_percentage - 40.0).abs() < 1e-9);
}

#[test]
fn average_metrics_empty_subset_is_all_zero() {
    let metrics = average_metrics(&table(), &[]).unwrap();
    assert_eq!(metrics, AverageMetrics::default());
}

#[test]
fn average_metrics_unknown_name_is_validation_error() {
    let err = average_metrics(&table(), &["zzz".to_string()]).unwrap_err();
    assert!(matches!(err, PlanError::Validation { ref subject, .. } if subject == "zzz"));
}

// -----------------------------------------------------------------------
// properties
// -----------------------------------------------------------------------

proptest! {
    #![proptest_config(ProptestConfig { cases: 128, failure_persistence: None, .. ProptestConfig::default() })]

    #[test]
    fn prop_reach_matches_formula(ft in 0_i64..1_000_000, pop in 1_i64..1_000_000, frac in 0.0_f64..=1.0) {
        #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
        let ep = (pop as f64 * frac) as i64;
        let first = audience_reach("p", ft, ep, pop).unwrap();
        let second = audience_reach("p", ft, ep, pop).unwrap();
        prop_assert_eq!(first, second);
        #[allow(clippy::cast_precision_loss)]
        let expected = (ft as f64 * (ep as f64 / pop as f64)).round_ties_even();
        #[allow(clippy::cast_precision_loss)]
        let got = first as f64;
        prop_assert_eq!(got, expected);
    }

    #[test]
    fn prop_zero_cost_always_scores_zero(reach in 0_i64..10_000_000) {
        prop_assert_eq!(efficiency_score(reach, 0.0).value(), 0.0);
    }

    #[test]
    fn prop_rank_is_sorted_stable_and_truncated(
        entries in prop::collection::vec((0_u8..5, 0_i64..50), 0..40),
        top_n in 0_usize..50,
    ) {
        // Small cost/traffic domains force plenty of ties.
        let mut scorer = LocationScorer::new();
        for (i, (cost, traffic)) in entries.iter().enumerate() {
            scorer
                .add_location(&format!("{i}"), f64::from(*cost), *traffic, 1, 1)
                .unwrap();
        }

        let ranked = scorer.rank(top_n);
        prop_assert_eq!(ranked.len(), top_n.min(entries.len()));

        for pair in ranked.windows(2) {
            prop_assert!(pair[0].score() >= pair[1].score());
            if pair[0].score() == pair[1].score() {
                let left: usize = pair[0].name().parse().unwrap();
                let right: usize = pair[1].name().parse().unwrap();
                prop_assert!(left < right, "tie order broken: {left} before {right}");
            }
        }
    }
}
