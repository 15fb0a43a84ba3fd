// Property-based tests for the feature pipeline and filter engine.
// CI: 256 cases (default). Soak: PROPTEST_CASES=10000 cargo test --release

use std::collections::BTreeSet;

use proptest::prelude::*;

use disaster_monitor::aggregates::seasonal_distribution;
use disaster_monitor::pipeline::{enrich, repair_month};
use disaster_monitor::types::RawEvent;
use disaster_monitor::{apply, FilterSpec};

// ---------------------------------------------------------------------------
// Config
// ---------------------------------------------------------------------------

fn config_256() -> ProptestConfig {
    ProptestConfig {
        cases: std::env::var("PROPTEST_CASES")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(256),
        failure_persistence: None,
        ..ProptestConfig::default()
    }
}

// ---------------------------------------------------------------------------
// Generators
// ---------------------------------------------------------------------------

const COUNTRIES: [&str; 4] = ["Peru", "Japan", "India", "Chile"];
const TYPES: [&str; 4] = ["Flood", "Storm", "Earthquake", "Wildfire"];

/// Months: mostly valid, sometimes missing, zero, or out of range.
fn arb_month() -> impl Strategy<Value = Option<i32>> {
    prop_oneof![
        4 => (1..=12i32).prop_map(Some),
        1 => Just(None),
        1 => Just(Some(0)),
        1 => (-5..40i32).prop_map(Some),
    ]
}

fn arb_impact() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        3 => (0.0..1e10f64).prop_map(Some),
        1 => Just(Some(0.0)),
        1 => Just(None),
    ]
}

fn arb_event() -> impl Strategy<Value = RawEvent> {
    (
        2018..=2024i32,
        arb_month(),
        0..COUNTRIES.len(),
        0..TYPES.len(),
        arb_impact(),
        arb_impact(),
    )
        .prop_map(|(year, month, c, t, casualties, loss)| RawEvent {
            month,
            casualties,
            economic_loss_usd: loss,
            ..RawEvent::new(year, COUNTRIES[c], TYPES[t])
        })
}

fn arb_spec() -> impl Strategy<Value = FilterSpec> {
    (
        2017..=2025i32,
        0..=4i32,
        proptest::collection::btree_set(0..TYPES.len(), 0..=3),
        proptest::option::of(0..COUNTRIES.len()),
        0.0..=100.0f64,
    )
        .prop_map(|(lo, width, types, country, floor)| {
            let spec = FilterSpec::default()
                .with_years(lo, lo + width)
                .with_types(types.into_iter().map(|t| TYPES[t]))
                .with_severity_floor(floor);
            match country {
                Some(c) => spec.with_country(COUNTRIES[c]),
                None => spec,
            }
        })
}

// ---------------------------------------------------------------------------
// Properties
// ---------------------------------------------------------------------------

proptest! {
    #![proptest_config(config_256())]

    #[test]
    fn every_row_gets_a_date(events in proptest::collection::vec(arb_event(), 0..40)) {
        let ds = enrich(events);
        prop_assert!(ds.records().iter().all(|r| r.date.is_some()));
    }

    #[test]
    fn month_clean_follows_the_literal_rule(month in arb_month()) {
        let clean = repair_month(month);
        match month {
            None | Some(0) => prop_assert_eq!(clean, 1),
            Some(m) => prop_assert_eq!(clean, m),
        }
    }

    #[test]
    fn scores_stay_in_bounds(events in proptest::collection::vec(arb_event(), 1..40)) {
        let ds = enrich(events);
        let scores: Vec<f64> = ds.records().iter().map(|r| r.severity_score).collect();
        prop_assert!(scores.iter().all(|s| (0.0..=100.0).contains(s)));
        let any_impact = ds
            .records()
            .iter()
            .any(|r| r.casualties_or_zero() > 0.0 || r.economic_loss_or_zero() > 0.0);
        if any_impact {
            prop_assert!(scores.iter().any(|s| *s == 100.0));
        } else {
            prop_assert!(scores.iter().all(|s| *s == 0.0));
        }
    }

    #[test]
    fn score_is_monotonic_in_impact(
        events in proptest::collection::vec(arb_event(), 2..30),
    ) {
        let ds = enrich(events);
        let rows = ds.records();
        for a in rows {
            for b in rows {
                if a.casualties_or_zero() <= b.casualties_or_zero()
                    && a.economic_loss_or_zero() <= b.economic_loss_or_zero()
                {
                    prop_assert!(a.severity_score <= b.severity_score);
                }
            }
        }
    }

    #[test]
    fn filtering_is_idempotent(
        events in proptest::collection::vec(arb_event(), 0..40),
        spec in arb_spec(),
    ) {
        let ds = enrich(events);
        let once = apply(&ds, &spec);
        let twice = once.refine(&spec);
        prop_assert_eq!(&once, &twice);
        prop_assert_eq!(apply(&ds, &spec), once);
    }

    #[test]
    fn subset_preserves_source_order(
        events in proptest::collection::vec(arb_event(), 0..40),
        spec in arb_spec(),
    ) {
        let ds = enrich(events);
        let subset = apply(&ds, &spec);
        let positions: Vec<usize> = subset
            .iter()
            .filter_map(|r| ds.records().iter().position(|x| std::ptr::eq(x, r)))
            .collect();
        prop_assert_eq!(positions.len(), subset.len());
        prop_assert!(positions.windows(2).all(|w| w[0] < w[1]));
        prop_assert!(subset.iter().all(|r| spec.matches(r)));
    }

    #[test]
    fn empty_type_set_means_all_types(
        events in proptest::collection::vec(arb_event(), 0..40),
    ) {
        let ds = enrich(events);
        let none = FilterSpec::default().with_types(BTreeSet::<String>::new());
        let every = FilterSpec::default().with_types(TYPES);
        prop_assert_eq!(apply(&ds, &none).len(), ds.len());
        prop_assert_eq!(apply(&ds, &every).len(), ds.len());
    }

    #[test]
    fn seasonal_view_always_has_twelve_months(
        events in proptest::collection::vec(arb_event(), 0..40),
        spec in arb_spec(),
    ) {
        let ds = enrich(events);
        let subset = apply(&ds, &spec);
        let seasonal = seasonal_distribution(&subset);
        prop_assert_eq!(seasonal.len(), 12);
        let in_range = subset.iter().filter(|r| (1..=12).contains(&r.month_clean)).count();
        prop_assert_eq!(seasonal.iter().map(|s| s.count).sum::<usize>(), in_range);
    }
}
