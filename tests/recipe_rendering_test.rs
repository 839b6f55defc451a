//! End-to-end recipe rendering tests.
//!
//! Run: cargo test --test recipe_rendering_test

#![allow(clippy::unwrap_used, missing_docs)]

use brandplot::prelude::*;
use brandplot::recipes::ChartKind;
use serde_json::json;

fn survey() -> Dataset {
    let rows = json!([
        {"team": "ops",   "tenure": 1.0, "score": 62.0, "hours": 38.0},
        {"team": "ops",   "tenure": 3.0, "score": 70.0, "hours": 41.0},
        {"team": "ops",   "tenure": 4.5, "score": 75.0, "hours": 40.0},
        {"team": "dev",   "tenure": 2.0, "score": 81.0, "hours": 44.0},
        {"team": "dev",   "tenure": 6.0, "score": 88.0, "hours": 45.5},
        {"team": "dev",   "tenure": 7.5, "score": 84.0, "hours": 39.0},
        {"team": "sales", "tenure": 0.5, "score": 55.0, "hours": 47.0},
        {"team": "sales", "tenure": 2.5, "score": 60.0, "hours": 50.0},
        {"team": "sales", "tenure": 5.0, "score": 72.0, "hours": 46.0},
    ]);
    Dataset::from_json(&rows).unwrap().as_factor("team").unwrap()
}

fn assert_renders(chart: &BrandChart) {
    let (w, h) = chart.dimensions();
    let fb = chart.to_framebuffer().unwrap();
    assert_eq!((fb.width(), fb.height()), (w, h));
    let png = chart.to_png_bytes().unwrap();
    assert_eq!(&png[1..4], b"PNG");
    let svg = chart.to_svg().unwrap();
    assert!(svg.starts_with("<svg") || svg.starts_with("<?xml"));
}

#[test]
fn every_recipe_renders() {
    let data = survey();
    let team = || AestheticArg::column("team");
    let charts = vec![
        BarChart::new(&data, "team").y("score").fill(team()).position("dodge").build().unwrap(),
        ScatterChart::new(&data, "tenure", "score").color(AestheticArg::column("hours")).build().unwrap(),
        TimeseriesChart::new(&data, "tenure", "hours").color(team()).points(true).build().unwrap(),
        AreaChart::new(&data, "tenure", "hours").fill(team()).build().unwrap(),
        BoxplotChart::new(&data, "score").x("team").fill(team()).build().unwrap(),
        ViolinChart::new(&data, "score").x("team").build().unwrap(),
        HistogramChart::new(&data, "score").fill(team()).build().unwrap(),
        DensityChart::new(&data, "hours").fill(team()).kernel("epanechnikov").build().unwrap(),
        HeatmapChart::new(&data, "team", "team").fill(AestheticArg::column("score")).build().unwrap(),
    ];
    let kinds: Vec<ChartKind> = charts.iter().map(BrandChart::kind).collect();
    assert_eq!(
        kinds,
        vec![
            ChartKind::Bar,
            ChartKind::Scatter,
            ChartKind::Timeseries,
            ChartKind::Area,
            ChartKind::Boxplot,
            ChartKind::Violin,
            ChartKind::Histogram,
            ChartKind::Density,
            ChartKind::Heatmap,
        ]
    );
    for chart in &charts {
        assert_renders(chart);
    }
}

#[test]
fn svg_carries_titles_caption_and_legend() {
    let data = survey();
    let chart = ScatterChart::new(&data, "tenure", "score")
        .color(AestheticArg::column("team"))
        .title("Score by tenure")
        .subtitle("All teams")
        .build()
        .unwrap()
        .with_caption("Internal survey")
        .with_source("HR");
    assert_eq!(chart.labels().caption.as_deref(), Some("Internal survey\nSource: HR"));

    let svg = chart.to_svg().unwrap();
    for text in ["Score by tenure", "All teams", "Source: HR", "tenure", "dev", "ops", "sales"] {
        assert!(svg.contains(text), "missing '{text}' in svg");
    }
}

#[test]
fn config_drives_theme_palette_and_size() {
    let config = Config::parse(
        "defaults:\n  palette: bright\n  width_in: 4\n  height_in: 3\n  dpi: 100\ntheme:\n  dark: true\n  grid: none\n",
    )
    .unwrap();
    let data = survey();
    let chart = BarChart::new(&data, "team").fill(AestheticArg::column("team")).config(&config).build().unwrap();

    assert_eq!(chart.dimensions(), (400, 300));
    assert!(chart.theme().dark);
    assert_eq!(chart.theme().grid, GridLines::None);
    let bright = palette("bright").unwrap().colors(3, false);
    let legend: Vec<Rgba> = chart.legend().entries().iter().map(|e| e.color).collect();
    assert_eq!(legend, bright);
}

#[test]
fn configured_font_reaches_svg_text() {
    let config = Config::parse("fonts:\n  family: Inter\n  enabled: true\n").unwrap();
    let data = survey();
    let chart = BarChart::new(&data, "team").title("Headcount").config(&config).build().unwrap();
    assert_eq!(chart.theme().font_family, "Inter");

    let svg = chart.to_svg().unwrap();
    assert!(svg.contains("Headcount"));
    assert!(svg.contains(r#"font-family="Inter, sans-serif""#));
    assert!(!svg.contains(r#"font-family="sans-serif""#));
}

#[test]
fn boxplot_without_x_has_no_x_label() {
    let data = survey();
    let chart = BoxplotChart::new(&data, "score").build().unwrap();
    assert_eq!(chart.labels().x, None);
    assert!(!chart.to_svg().unwrap().contains("></text>"));
}

#[test]
fn explicit_theme_overrides_config() {
    let data = survey();
    let theme = BrandTheme::default().base_size(14.0).legend_position(LegendPosition::Right);
    let chart = HistogramChart::new(&data, "score").theme(theme).dimensions(640, 400).build().unwrap();
    assert_eq!(chart.dimensions(), (640, 400));
    assert_eq!(chart.legend_position(), LegendPosition::Right);
    assert_renders(&chart);
}

#[test]
fn reversed_palette_flips_level_colors() {
    let data = survey();
    let forward = BarChart::new(&data, "team").fill(AestheticArg::column("team")).build().unwrap();
    let reversed = BarChart::new(&data, "team")
        .fill(AestheticArg::column("team"))
        .reverse_palette(true)
        .build()
        .unwrap();
    let f: Vec<Rgba> = forward.legend().entries().iter().map(|e| e.color).collect();
    let mut r: Vec<Rgba> = reversed.legend().entries().iter().map(|e| e.color).collect();
    r.reverse();
    assert_eq!(f, r);
}

#[test]
fn errors_surface_unmodified() {
    let data = survey();
    assert!(matches!(
        BarChart::new(&data, "team").position("jitter").build(),
        Err(Error::InvalidParameterValue { parameter: "position", .. })
    ));
    assert!(matches!(
        HistogramChart::new(&data, "score").method("manual").build(),
        Err(Error::MissingRequiredParameter { parameter: "bins", .. })
    ));
    assert!(matches!(
        ScatterChart::new(&data, "tenure", "missing").build(),
        Err(Error::ColumnNotFound(_))
    ));
    assert!(matches!(
        BarChart::new(&data, "team").fill(AestheticArg::literal("#12345")).build(),
        Err(Error::InvalidColorSpec(_))
    ));
    assert!(matches!(
        Dataset::from_json(&json!("not a table")),
        Err(Error::InvalidInputType { .. })
    ));
}
