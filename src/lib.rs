//! # Brandplot
//!
//! Branded chart recipes on top of the [trueno-viz](https://crates.io/crates/trueno-viz)
//! grammar of graphics.
//!
//! Every recipe applies the same brand palette, theme and label conventions,
//! and accepts its color or fill argument in whichever form is natural: a
//! literal color, a column name, or nothing at all. The [`aesthetic`]
//! classifier decides which one was meant before any plotting call is made.
//!
//! ## Features
//!
//! - **Smart aesthetics**: literal colors, discrete and continuous column
//!   mappings share one argument
//! - **Brand palettes**: discrete, sequential and diverging palettes with
//!   Oklab interpolation
//! - **Nine recipes**: bar, scatter, timeseries, area, boxplot, violin,
//!   histogram, density and heatmap
//! - **Config file**: fonts, default sizes and theme options from YAML
//! - **Outputs**: framebuffer, PNG bytes, and SVG with text overlays
//!
//! ## Quick Start
//!
//! ```rust
//! use brandplot::prelude::*;
//!
//! let sales = Dataset::new()
//!     .with_factor("region", &["north", "south", "north", "east"])
//!     .unwrap()
//!     .with_numeric("revenue", &[12.0, 7.5, 3.0, 9.0])
//!     .unwrap();
//!
//! let chart = BarChart::new(&sales, "region")
//!     .y("revenue")
//!     .fill(AestheticArg::literal("#2A9D8F"))
//!     .title("Revenue by region")
//!     .build()
//!     .unwrap();
//!
//! let png = chart.to_png_bytes().unwrap();
//! assert!(!png.is_empty());
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![warn(missing_docs)]
// Allow unwrap() in tests only
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::many_single_char_names)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Core Modules
// ============================================================================

/// Aesthetic argument classification and advisories.
pub mod aesthetic;

/// Color literal validation and parsing.
pub mod color;

/// Minimal tabular data model.
pub mod data;

/// Label and number formatting.
pub mod format;

// ============================================================================
// Brand Modules
// ============================================================================

/// YAML configuration.
pub mod config;

/// Brand colors and palettes.
pub mod palettes;

/// Brand theme.
pub mod theme;

/// Chart recipes.
pub mod recipes;

// ============================================================================
// Error Types
// ============================================================================

/// Error types for brandplot operations.
pub mod error;

pub use error::{Error, Result};

// ============================================================================
// Prelude
// ============================================================================

/// Commonly used types for convenient imports.
///
/// ```rust
/// use brandplot::prelude::*;
/// ```
pub mod prelude {
    pub use crate::aesthetic::{classify, AestheticArg, AestheticKind, Classification};
    pub use crate::config::Config;
    pub use crate::data::{Column, Dataset};
    pub use crate::error::{Error, Result};
    pub use crate::palettes::{brand_color, palette, palette_names, Palette, PRIMARY};
    pub use crate::recipes::{
        AreaChart, BarChart, BoxplotChart, BrandChart, DensityChart, HeatmapChart, HistogramChart, Legend, Position,
        ScatterChart, Series, TimeseriesChart, ViolinChart,
    };
    pub use crate::theme::{BrandTheme, GridLines, LegendPosition};
    pub use trueno_viz::color::Rgba;
}

// ============================================================================
// Re-exports
// ============================================================================

/// Re-export trueno-viz for direct access to the underlying plots.
pub use trueno_viz;
