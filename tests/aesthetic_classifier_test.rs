//! Aesthetic classifier scenarios and properties.
//!
//! Run: cargo test --test aesthetic_classifier_test

#![allow(clippy::unwrap_used, missing_docs)]

use brandplot::aesthetic::{check_palette_usage, classify, AdvisoryKind, AestheticArg, AestheticKind, Classification};
use brandplot::color::{is_hex_color, is_valid_color};
use brandplot::data::Dataset;
use brandplot::prelude::ScatterChart;
use brandplot::Error;
use proptest::prelude::*;

fn mtcars() -> Dataset {
    Dataset::new()
        .with_numeric("wt", &[2.62, 2.875, 2.32, 3.215])
        .unwrap()
        .with_numeric("mpg", &[21.0, 21.0, 22.8, 21.4])
        .unwrap()
        .with_numeric("hp", &[110.0, 110.0, 93.0, 110.0])
        .unwrap()
        .with_numeric("cyl", &[6.0, 6.0, 4.0, 6.0])
        .unwrap()
        .with_factor("Species", &["setosa", "setosa", "virginica", "versicolor"])
        .unwrap()
        .with_numeric("red", &[0.1, 0.4, 0.2, 0.9])
        .unwrap()
}

// ============================================================================
// Concrete scenarios
// ============================================================================

#[test]
fn scenario_1_omitted_with_palette_is_silent() {
    let c = classify(None, Some(&mtcars())).unwrap();
    assert_eq!(c, Classification::Absent);
    assert!(check_palette_usage("color", &c, Some("bright")).is_none());
}

#[test]
fn scenario_2_short_hex_is_rejected() {
    let err = classify(Some(&AestheticArg::literal("#FFFF")), Some(&mtcars())).unwrap_err();
    match err {
        Error::InvalidColorSpec(value) => assert_eq!(value, "#FFFF"),
        other => panic!("unexpected error {other}"),
    }
}

#[test]
fn scenario_3_named_color_is_static() {
    let c = classify(Some(&AestheticArg::literal("steelblue")), None).unwrap();
    assert_eq!(c.kind(), AestheticKind::StaticColor);
    assert_eq!(c.literal_value(), Some("steelblue"));
}

#[test]
fn scenario_4_numeric_column_is_continuous() {
    let c = classify(Some(&AestheticArg::column("hp")), Some(&mtcars())).unwrap();
    assert_eq!(c.kind(), AestheticKind::ColumnMapping);
    assert!(c.is_continuous());
}

#[test]
fn scenario_5_factor_column_is_discrete() {
    let c = classify(Some(&AestheticArg::column("Species")), Some(&mtcars())).unwrap();
    assert_eq!(c.kind(), AestheticKind::ColumnMapping);
    assert!(!c.is_continuous());
}

#[test]
fn scenario_6_static_with_palette_warns_once() {
    let c = classify(Some(&AestheticArg::literal("blue")), None).unwrap();
    assert_eq!(c.kind(), AestheticKind::StaticColor);
    let advisory = check_palette_usage("color", &c, Some("bright")).unwrap();
    assert_eq!(advisory.kind, AdvisoryKind::PaletteIgnored);
    assert!(advisory.message.contains("palette"));
    assert!(advisory.message.contains("ignored"));
}

// ============================================================================
// Properties
// ============================================================================

#[test]
fn column_named_like_a_color() {
    let data = mtcars();
    let bare = classify(Some(&AestheticArg::column("red")), Some(&data)).unwrap();
    assert_eq!(bare.kind(), AestheticKind::ColumnMapping);
    assert_eq!(bare.column(), Some("red"));

    let quoted = classify(Some(&AestheticArg::literal("red")), Some(&data)).unwrap();
    assert_eq!(quoted.kind(), AestheticKind::StaticColor);
}

#[test]
fn coerced_factor_is_discrete() {
    let data = mtcars().as_factor("cyl").unwrap();
    let c = classify(Some(&AestheticArg::column("cyl")), Some(&data)).unwrap();
    assert!(!c.is_continuous());
}

#[test]
fn column_without_dataset_defaults_to_discrete() {
    let c = classify(Some(&AestheticArg::column("hp")), None).unwrap();
    assert_eq!(c.kind(), AestheticKind::ColumnMapping);
    assert!(!c.is_continuous());
}

#[test]
fn mapping_with_palette_is_silent() {
    let c = classify(Some(&AestheticArg::column("hp")), Some(&mtcars())).unwrap();
    assert!(check_palette_usage("color", &c, Some("bright")).is_none());
}

#[test]
fn numeric_looking_strings_are_not_colors() {
    for spec in ["#1234", "#12345", "#1234567", "123", "0", "#"] {
        assert!(!is_valid_color(spec), "{spec} should be invalid");
    }
}

#[test]
fn recipe_reports_one_palette_advisory() {
    let chart = ScatterChart::new(&mtcars(), "wt", "mpg")
        .color(AestheticArg::literal("blue"))
        .palette("bright")
        .build()
        .unwrap();
    let ignored = chart
        .advisories()
        .iter()
        .filter(|a| a.kind == AdvisoryKind::PaletteIgnored)
        .count();
    assert_eq!(ignored, 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_valid_hex_lengths(digits in "[0-9A-Fa-f]{3}|[0-9A-Fa-f]{6}|[0-9A-Fa-f]{8}") {
        let spec = format!("#{digits}");
        prop_assert!(is_hex_color(&spec));
        prop_assert!(is_valid_color(&spec));
        let c = classify(Some(&AestheticArg::literal(spec.clone())), None).unwrap();
        prop_assert_eq!(c.literal_value(), Some(spec.as_str()));
    }

    #[test]
    fn prop_invalid_hex_lengths(digits in "[0-9A-Fa-f]{4,5}|[0-9A-Fa-f]{7}|[0-9A-Fa-f]{9,12}") {
        let spec = format!("#{digits}");
        prop_assert!(!is_valid_color(&spec));
        let is_invalid_spec = matches!(
            classify(Some(&AestheticArg::literal(spec)), None),
            Err(Error::InvalidColorSpec(_))
        );
        prop_assert!(is_invalid_spec);
    }

    #[test]
    fn prop_classification_is_idempotent(name in "[a-zA-Z]{1,8}", literal in any::<bool>()) {
        let data = mtcars();
        let arg = if literal { AestheticArg::literal(name) } else { AestheticArg::column(name) };
        let first = classify(Some(&arg), Some(&data));
        let second = classify(Some(&arg), Some(&data));
        match (first, second) {
            (Ok(a), Ok(b)) => prop_assert_eq!(a, b),
            (Err(a), Err(b)) => prop_assert_eq!(a.to_string(), b.to_string()),
            _ => prop_assert!(false, "classification changed between calls"),
        }
    }
}
