//! Invariants and worked scenarios for the tabulation engine.

use polars::prelude::{Column, DataFrame};
use proptest::prelude::*;
use survey_core::{compute_indicators, crosstab, crosstab_binned, freq, summarize_numeric};
use survey_model::{IndicatorRule, IndicatorRules, Normalize};

const CATEGORIES: [&str; 4] = ["Urbano", "Rural", "Periurbano", "Costero"];

fn category_column(name: &str, codes: &[Option<usize>]) -> Column {
    let values: Vec<Option<&str>> = codes.iter().map(|code| code.map(|c| CATEGORIES[c])).collect();
    Column::new(name.into(), values)
}

fn codes() -> impl Strategy<Value = Vec<Option<usize>>> {
    proptest::collection::vec(proptest::option::of(0usize..4), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 128,
        rng_seed: proptest::test_runner::RngSeed::Fixed(0),
        failure_persistence: None,
        .. ProptestConfig::default()
    })]

    #[test]
    fn freq_counts_every_present_row(codes in codes()) {
        let df = DataFrame::new(vec![category_column("area", &codes)]).unwrap();
        let table = freq(&df, "area", None);
        let present = codes.iter().flatten().count();
        prop_assert_eq!(table.total(), present as f64);
        if present > 0 {
            let percent: f64 = table.rows.iter().map(|row| row.percent).sum();
            prop_assert!((percent - 100.0).abs() < 1e-6);
        } else {
            prop_assert!(table.is_empty());
        }
        for pair in table.rows.windows(2) {
            prop_assert!(pair[0].n >= pair[1].n);
        }
    }

    #[test]
    fn weighted_freq_percentages_sum_to_hundred(
        rows in proptest::collection::vec((0usize..4, 0.0f64..10.0), 1..60)
    ) {
        let codes: Vec<Option<usize>> = rows.iter().map(|(c, _)| Some(*c)).collect();
        let weights: Vec<f64> = rows.iter().map(|(_, w)| *w).collect();
        let total: f64 = weights.iter().sum();
        let df = DataFrame::new(vec![
            category_column("area", &codes),
            Column::new("peso".into(), weights),
        ])
        .unwrap();
        let table = freq(&df, "area", Some("peso"));
        prop_assert!(table.weighted);
        prop_assert!((table.total() - total).abs() < 1e-9);
        let percent: f64 = table.rows.iter().map(|row| row.percent).sum();
        if total > 0.0 {
            prop_assert!((percent - 100.0).abs() < 1e-6);
        } else {
            prop_assert_eq!(percent, 0.0);
        }
    }

    #[test]
    fn row_percentages_sum_to_hundred(
        rows in proptest::collection::vec((0usize..4, 0usize..4, 0u8..3), 1..80)
    ) {
        let a: Vec<Option<usize>> = rows.iter().map(|(a, _, _)| Some(*a)).collect();
        let b: Vec<Option<usize>> = rows.iter().map(|(_, b, _)| Some(*b)).collect();
        let w: Vec<f64> = rows.iter().map(|(_, _, w)| f64::from(*w)).collect();
        let df = DataFrame::new(vec![
            category_column("a", &a),
            category_column("b", &b),
            Column::new("w".into(), w),
        ])
        .unwrap();
        let table = crosstab(&df, "a", "b", Some("w"), Normalize::Index);
        let tolerance = 0.005 * table.col_labels.len() as f64 + 1e-9;
        for row in &table.cells {
            let sum: f64 = row.iter().sum();
            if row.iter().all(|cell| *cell == 0.0) {
                continue;
            }
            prop_assert!((sum - 100.0).abs() <= tolerance, "row sums to {}", sum);
        }
    }

    #[test]
    fn default_bins_cap_axis_labels(
        rows in proptest::collection::vec((-5i64..40, 0i64..25), 1..80)
    ) {
        let miembros: Vec<i64> = rows.iter().map(|(m, _)| *m).collect();
        let cuartos: Vec<i64> = rows.iter().map(|(_, c)| *c).collect();
        let df = DataFrame::new(vec![
            Column::new("miembros".into(), miembros),
            Column::new("cuartos".into(), cuartos),
        ])
        .unwrap();
        let table = crosstab_binned(&df, "miembros", "cuartos", None, Normalize::None);
        prop_assert!(table.row_labels.len() <= 5);
        prop_assert!(table.col_labels.len() <= 5);
        let count: f64 = table.cells.iter().flatten().sum();
        prop_assert_eq!(count, rows.len() as f64);
    }
}

#[test]
fn sector_frequencies() {
    let df = DataFrame::new(vec![
        Column::new("sector".into(), ["A", "A", "B"]),
        Column::new("ingreso".into(), [100i64, 200, 300]),
    ])
    .unwrap();
    let table = freq(&df, "sector", None);
    assert_eq!(table.rows.len(), 2);
    assert_eq!(table.rows[0].value, "A");
    assert_eq!(table.rows[0].n, 2.0);
    assert!((table.rows[0].percent - 66.67).abs() < 0.01);
    assert_eq!(table.rows[1].value, "B");
    assert!((table.rows[1].percent - 33.33).abs() < 0.01);
}

#[test]
fn poverty_threshold_indicator() {
    let df = DataFrame::new(vec![Column::new("num_carencias".into(), [0i64, 1, 2, 3])]).unwrap();
    let mut rules = IndicatorRules::default();
    rules.rules.insert(
        "pobreza".to_string(),
        IndicatorRule::threshold("num_carencias", 2.0),
    );
    let out = compute_indicators(&df, &rules);
    assert_eq!(out.get("pobreza"), Some(&Some(50.0)));
}

#[test]
fn weighted_median_with_equal_weights() {
    let df = DataFrame::new(vec![
        Column::new("x".into(), [1.0, 2.0, 3.0, 4.0]),
        Column::new("w".into(), [1.0, 1.0, 1.0, 1.0]),
    ])
    .unwrap();
    let weighted = summarize_numeric(&df, "x", Some("w")).unwrap();
    assert_eq!(weighted.median, 2.0);
    let summary = summarize_numeric(&df, "x", None).unwrap();
    assert_eq!(summary.median, 2.5);
    assert_eq!(summary.count, 4);
}
