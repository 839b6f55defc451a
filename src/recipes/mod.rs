//! Branded chart recipes.
//!
//! Every recipe is a builder borrowing a [`Dataset`]. `build()` classifies
//! the recipe's color or fill argument, resolves brand colors for it and
//! hands the resulting layers to the plotting library. The returned
//! [`BrandChart`] keeps what was handed over (series, legend, labels,
//! advisories) next to the built library plot, so it can be inspected as
//! well as rendered.
//!
//! # Example
//!
//! ```
//! use brandplot::prelude::*;
//!
//! let cars = Dataset::new()
//!     .with_numeric("wt", &[2.6, 2.9, 3.2, 3.4])
//!     .unwrap()
//!     .with_numeric("mpg", &[21.0, 22.8, 21.4, 18.7])
//!     .unwrap()
//!     .with_factor("cyl", &["6", "4", "6", "8"])
//!     .unwrap();
//!
//! let chart = ScatterChart::new(&cars, "wt", "mpg")
//!     .color(AestheticArg::column("cyl"))
//!     .palette("bright")
//!     .title("Fuel economy")
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(chart.series().len(), 3);
//! assert!(chart.advisories().is_empty());
//! ```

mod area;
mod bar;
mod boxplot;
mod density;
mod heatmap;
mod histogram;
mod scatter;
mod timeseries;

pub use area::AreaChart;
pub use bar::BarChart;
pub use boxplot::{BoxplotChart, ViolinChart};
pub use density::{silverman_bandwidth, DensityChart, Kernel};
pub use heatmap::HeatmapChart;
pub use histogram::{BinMethod, HistogramChart, MAX_BINS};
pub use scatter::ScatterChart;
pub use timeseries::TimeseriesChart;

use std::fmt;
use std::str::FromStr;

use indexmap::IndexMap;
use trueno_viz::color::Rgba;
use trueno_viz::framebuffer::Framebuffer;
use trueno_viz::grammar::{Aes, BuiltGGPlot, Coord, DataFrame, GGPlot, Geom, Layer};
use trueno_viz::output::{PngEncoder, SvgEncoder, TextAnchor};
use trueno_viz::plots::{BuiltBoxPlot, BuiltViolinPlot, Heatmap};
use trueno_viz::scale::{ColorScale, Scale};

use crate::aesthetic::{check_palette_usage, classify, Advisory, AdvisoryKind, AestheticArg, Classification};
use crate::color::parse_color;
use crate::config::Config;
use crate::data::{Dataset, Discrete};
use crate::error::{Error, Result};
use crate::format;
use crate::palettes::{self, PRIMARY};
use crate::theme::{BrandTheme, LegendPosition};

/// Color for rows whose mapped value is missing.
pub const NA_COLOR: Rgba = Rgba::rgb(173, 181, 189);

/// Which recipe produced a chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    /// Bar chart.
    Bar,
    /// Scatter plot.
    Scatter,
    /// Time series.
    Timeseries,
    /// Area chart.
    Area,
    /// Box plot.
    Boxplot,
    /// Violin plot.
    Violin,
    /// Histogram.
    Histogram,
    /// Density plot.
    Density,
    /// Heatmap.
    Heatmap,
}

impl fmt::Display for ChartKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Bar => "bar",
            Self::Scatter => "scatter",
            Self::Timeseries => "timeseries",
            Self::Area => "area",
            Self::Boxplot => "boxplot",
            Self::Violin => "violin",
            Self::Histogram => "histogram",
            Self::Density => "density",
            Self::Heatmap => "heatmap",
        };
        f.write_str(name)
    }
}

/// Chart text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Labels {
    /// Title.
    pub title: Option<String>,
    /// Subtitle under the title.
    pub subtitle: Option<String>,
    /// X axis label.
    pub x: Option<String>,
    /// Y axis label.
    pub y: Option<String>,
    /// Legend title.
    pub legend: Option<String>,
    /// Caption in the bottom corner.
    pub caption: Option<String>,
}

/// One legend key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LegendEntry {
    /// Key label.
    pub label: String,
    /// Key color.
    pub color: Rgba,
}

/// Legend content.
#[derive(Debug, Clone, PartialEq)]
pub enum Legend {
    /// No legend: the color or fill is not mapped.
    None,
    /// One key per level of a discrete mapping.
    Discrete {
        /// Legend title.
        title: String,
        /// Keys in level order.
        entries: Vec<LegendEntry>,
    },
    /// Labelled breaks along a continuous color scale.
    Continuous {
        /// Legend title.
        title: String,
        /// Mapped data range.
        domain: (f64, f64),
        /// Keys at round break values inside the domain.
        breaks: Vec<LegendEntry>,
    },
}

impl Legend {
    /// Legend keys, empty for [`Legend::None`].
    #[must_use]
    pub fn entries(&self) -> &[LegendEntry] {
        match self {
            Legend::None => &[],
            Legend::Discrete { entries, .. } => entries,
            Legend::Continuous { breaks, .. } => breaks,
        }
    }
}

/// A group of marks drawn in one color.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    /// Group name (level label, or the column name for ungrouped data).
    pub name: String,
    /// Color handed to the plotting library.
    pub color: Rgba,
    /// Data-space points handed to the plotting library.
    pub points: Vec<(f64, f64)>,
}

/// A text label in data coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct Annotation {
    /// X position.
    pub x: f64,
    /// Y position.
    pub y: f64,
    /// Label text.
    pub text: String,
}

/// Data ranges mapped onto the panel.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlotFrame {
    /// X range.
    pub xlim: (f64, f64),
    /// Y range.
    pub ylim: (f64, f64),
}

impl PlotFrame {
    /// Frame covering all series points plus 5% padding on each side.
    pub(crate) fn around(series: &[Series]) -> Self {
        let mut xs = (f64::INFINITY, f64::NEG_INFINITY);
        let mut ys = (f64::INFINITY, f64::NEG_INFINITY);
        for (x, y) in series.iter().flat_map(|s| s.points.iter()) {
            if x.is_finite() && y.is_finite() {
                xs = (xs.0.min(*x), xs.1.max(*x));
                ys = (ys.0.min(*y), ys.1.max(*y));
            }
        }
        Self {
            xlim: padded(xs),
            ylim: padded(ys),
        }
    }

    /// Frame around `series` whose y range starts at zero for
    /// non-negative data and ends at zero for non-positive data.
    ///
    /// The zero side is not padded.
    pub(crate) fn with_zero_baseline(series: &[Series]) -> Self {
        let mut frame = Self::around(series);
        let ys = series.iter().flat_map(|s| s.points.iter().map(|p| p.1));
        let (lo, hi) = ys
            .filter(|y| y.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), y| (lo.min(y), hi.max(y)));
        if lo.is_finite() && hi.is_finite() {
            if lo >= 0.0 {
                frame.ylim.0 = 0.0;
            } else if hi <= 0.0 {
                frame.ylim.1 = 0.0;
            }
        }
        frame
    }

    fn coord(&self) -> Coord {
        Coord::cartesian()
            .xlim(self.xlim.0 as f32, self.xlim.1 as f32)
            .ylim(self.ylim.0 as f32, self.ylim.1 as f32)
    }

    fn to_pixels(&self, x: f64, y: f64, width: u32, height: u32, margin: u32) -> (f32, f32) {
        let plot_w = f64::from(width.saturating_sub(2 * margin));
        let plot_h = f64::from(height.saturating_sub(2 * margin));
        let tx = (x - self.xlim.0) / (self.xlim.1 - self.xlim.0);
        let ty = (y - self.ylim.0) / (self.ylim.1 - self.ylim.0);
        (
            (f64::from(margin) + tx * plot_w) as f32,
            (f64::from(margin) + plot_h - ty * plot_h) as f32,
        )
    }
}

/// Put `family` ahead of the generic family on every SVG text element.
fn with_font_family(svg: &str, family: &str) -> String {
    const GENERIC: &str = r#"font-family="sans-serif""#;
    let family = family.trim();
    if family.is_empty() || family == "sans-serif" {
        return svg.to_string();
    }
    let escaped = family
        .replace('&', "&amp;")
        .replace('"', "&quot;")
        .replace('<', "&lt;");
    svg.replace(GENERIC, &format!(r#"font-family="{escaped}, sans-serif""#))
}

fn padded((lo, hi): (f64, f64)) -> (f64, f64) {
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let (lo, hi) = if hi - lo < f64::EPSILON { (lo - 1.0, hi + 1.0) } else { (lo, hi) };
    let pad = (hi - lo) * 0.05;
    (lo - pad, hi + pad)
}

#[derive(Debug)]
pub(crate) enum ChartPlot {
    Grammar(BuiltGGPlot),
    /// One plot per fill color; a single plot when every group shares one.
    Box(Vec<BuiltBoxPlot>),
    Violin(Vec<BuiltViolinPlot>),
    Heatmap(Heatmap),
}

/// A built branded chart.
#[derive(Debug)]
pub struct BrandChart {
    kind: ChartKind,
    labels: Labels,
    legend: Legend,
    series: Vec<Series>,
    annotations: Vec<Annotation>,
    advisories: Vec<Advisory>,
    theme: BrandTheme,
    frame: Option<PlotFrame>,
    flipped: bool,
    width: u32,
    height: u32,
    plot: ChartPlot,
}

impl BrandChart {
    /// Recipe that produced the chart.
    #[must_use]
    pub fn kind(&self) -> ChartKind {
        self.kind
    }

    /// Chart text, with axis and legend defaults filled in.
    #[must_use]
    pub fn labels(&self) -> &Labels {
        &self.labels
    }

    /// Legend content.
    #[must_use]
    pub fn legend(&self) -> &Legend {
        &self.legend
    }

    /// Legend position from the theme.
    #[must_use]
    pub fn legend_position(&self) -> LegendPosition {
        self.theme.legend_position
    }

    /// Series handed to the plotting library, in drawing order.
    #[must_use]
    pub fn series(&self) -> &[Series] {
        &self.series
    }

    /// Value labels.
    #[must_use]
    pub fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Non-fatal warnings raised while building.
    #[must_use]
    pub fn advisories(&self) -> &[Advisory] {
        &self.advisories
    }

    /// Theme the chart was built with.
    #[must_use]
    pub fn theme(&self) -> &BrandTheme {
        &self.theme
    }

    /// Data ranges mapped onto the panel, when the recipe fixes them.
    #[must_use]
    pub fn frame(&self) -> Option<PlotFrame> {
        self.frame
    }

    /// Whether the x and y axes were swapped.
    #[must_use]
    pub fn is_flipped(&self) -> bool {
        self.flipped
    }

    /// Output size in pixels.
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Set the caption.
    #[must_use]
    pub fn with_caption(mut self, caption: impl Into<String>) -> Self {
        self.labels.caption = Some(caption.into());
        self
    }

    /// Add a "Source: ..." line to the caption.
    #[must_use]
    pub fn with_source(mut self, source: &str) -> Self {
        let line = format!("Source: {source}");
        self.labels.caption = Some(match self.labels.caption.take() {
            Some(caption) => format!("{caption}\n{line}"),
            None => line,
        });
        self
    }

    /// Render the plot area to a framebuffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if the plotting library fails.
    pub fn to_framebuffer(&self) -> Result<Framebuffer> {
        let fb = match &self.plot {
            ChartPlot::Grammar(plot) => plot.to_framebuffer()?,
            ChartPlot::Box(plots) => self.composite_slots(plots.len(), |i, fb| Ok(plots[i].render(fb)?))?,
            ChartPlot::Violin(plots) => self.composite_slots(plots.len(), |i, fb| Ok(plots[i].render(fb)?))?,
            ChartPlot::Heatmap(plot) => {
                let mut fb = self.blank_framebuffer()?;
                plot.render(&mut fb)?;
                fb
            }
        };
        Ok(fb)
    }

    /// Render to PNG bytes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if rendering or encoding fails.
    pub fn to_png_bytes(&self) -> Result<Vec<u8>> {
        let fb = self.to_framebuffer()?;
        Ok(PngEncoder::to_bytes(&fb)?)
    }

    /// Render to an SVG document: the raster plot with titles, legend and
    /// value labels laid over it as text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Render`] if rendering or encoding fails.
    pub fn to_svg(&self) -> Result<String> {
        let fb = self.to_framebuffer()?;
        let mut svg = SvgEncoder::from_framebuffer(&fb)?;

        let margin = self.theme.margin();
        let size = self.theme.base_size;
        let ink = self.theme.colors.text;
        let (w, h) = (self.width as f32, self.height as f32);
        let m = margin as f32;

        if let Some(title) = &self.labels.title {
            svg = svg.text(m, m * 0.4, title, size * 1.4, ink);
        }
        if let Some(subtitle) = &self.labels.subtitle {
            svg = svg.text(m, m * 0.4 + size * 1.3, subtitle, size, self.theme.colors.axis);
        }
        if let Some(x) = &self.labels.x {
            svg = svg.text_anchored(w / 2.0, h - m * 0.35, x, size, ink, TextAnchor::Middle);
        }
        if let Some(y) = &self.labels.y {
            svg = svg.text(4.0, m - size * 0.5, y, size, ink);
        }
        if let Some(caption) = &self.labels.caption {
            for (i, line) in caption.lines().rev().enumerate() {
                let baseline = h - 4.0 - i as f32 * size;
                svg = svg.text_anchored(w - 4.0, baseline, line, size * 0.8, self.theme.colors.axis, TextAnchor::End);
            }
        }

        if let Some(frame) = self.frame {
            for a in &self.annotations {
                let (px, py) = frame.to_pixels(a.x, a.y, self.width, self.height, margin);
                svg = svg.text_anchored(px, py - 3.0, &a.text, size * 0.8, ink, TextAnchor::Middle);
            }
        }

        svg = self.overlay_legend(svg, w, h, m, size);
        Ok(with_font_family(&svg.render(), &self.theme.font_family))
    }

    fn overlay_legend(&self, mut svg: SvgEncoder, w: f32, h: f32, m: f32, size: f32) -> SvgEncoder {
        let entries = self.legend.entries();
        if entries.is_empty() || self.theme.legend_position == LegendPosition::None {
            return svg;
        }
        let ink = self.theme.colors.text;
        let key = size * 0.9;
        let step_x = key + size * 6.0;
        let step_y = key + 4.0;

        let (mut x, mut y, horizontal) = match self.theme.legend_position {
            LegendPosition::Top => (m, m - key - 4.0, true),
            LegendPosition::Bottom => (m, h - m * 0.35 - size * 1.6, true),
            LegendPosition::Left => (2.0, m, false),
            LegendPosition::Right | LegendPosition::None => (w - m + 2.0, m, false),
        };
        for entry in entries {
            svg = svg
                .rect(x, y, key, key, entry.color)
                .text(x + key + 3.0, y + key, &entry.label, size * 0.8, ink);
            if horizontal {
                x += step_x;
            } else {
                y += step_y;
            }
        }
        svg
    }

    /// Render `layers` copies of a slotted plot and keep slot `i` from copy `i`.
    ///
    /// Box and violin plots split the panel into equal slots per group and
    /// take a single fill color, so each group is taken from the copy built
    /// with its own color.
    fn composite_slots(
        &self,
        layers: usize,
        render: impl Fn(usize, &mut Framebuffer) -> Result<()>,
    ) -> Result<Framebuffer> {
        let mut fb = self.blank_framebuffer()?;
        render(0, &mut fb)?;
        if layers < 2 {
            return Ok(fb);
        }

        let margin = self.theme.margin();
        let slot = self.width.saturating_sub(2 * margin) as f32 / layers as f32;
        for i in 1..layers {
            let mut scratch = self.blank_framebuffer()?;
            render(i, &mut scratch)?;
            let x0 = margin + (i as f32 * slot) as u32;
            let x1 = (margin + ((i + 1) as f32 * slot) as u32).min(self.width);
            for x in x0..x1 {
                for y in 0..self.height {
                    if let Some(pixel) = scratch.get_pixel(x, y) {
                        fb.set_pixel(x, y, pixel);
                    }
                }
            }
        }
        Ok(fb)
    }

    fn blank_framebuffer(&self) -> Result<Framebuffer> {
        let mut fb = Framebuffer::new(self.width, self.height)?;
        fb.clear(self.theme.colors.background);
        Ok(fb)
    }
}

/// Settings shared by every recipe builder.
#[derive(Debug, Clone, Default)]
pub(crate) struct Settings {
    pub(crate) config: Config,
    pub(crate) palette: Option<String>,
    pub(crate) reverse: bool,
    pub(crate) labels: Labels,
    pub(crate) dimensions: Option<(u32, u32)>,
    pub(crate) theme: Option<BrandTheme>,
}

impl Settings {
    pub(crate) fn theme(&self) -> Result<BrandTheme> {
        match &self.theme {
            Some(theme) => Ok(theme.clone()),
            None => BrandTheme::from_config(&self.config),
        }
    }

    pub(crate) fn dimensions(&self, theme: &BrandTheme) -> Result<(u32, u32)> {
        let (width, height) = self.dimensions.unwrap_or_else(|| self.config.pixel_dimensions());
        let min = 2 * theme.margin() + 16;
        if width < min || height < min {
            return Err(Error::InvalidParameterValue {
                parameter: "dimensions",
                value: format!("{width}x{height}"),
                allowed: format!("at least {min}x{min} pixels for base size {}", theme.base_size),
            });
        }
        Ok((width, height))
    }

    fn discrete_palette(&self) -> &str {
        self.palette.as_deref().unwrap_or(&self.config.defaults.palette)
    }

    fn continuous_palette(&self) -> &str {
        self.palette.as_deref().unwrap_or(&self.config.defaults.continuous_palette)
    }
}

/// Generates the setters every recipe builder shares.
macro_rules! shared_setters {
    ($builder:ident) => {
        impl<'a> $builder<'a> {
            /// Use `config` for palettes, theme and output size.
            #[must_use]
            pub fn config(mut self, config: &$crate::config::Config) -> Self {
                self.settings.config = config.clone();
                self
            }

            /// Palette for the mapped color or fill.
            #[must_use]
            pub fn palette(mut self, name: impl Into<String>) -> Self {
                self.settings.palette = Some(name.into());
                self
            }

            /// Reverse the palette order.
            #[must_use]
            pub fn reverse_palette(mut self, reverse: bool) -> Self {
                self.settings.reverse = reverse;
                self
            }

            /// Chart title.
            #[must_use]
            pub fn title(mut self, title: impl Into<String>) -> Self {
                self.settings.labels.title = Some(title.into());
                self
            }

            /// Chart subtitle.
            #[must_use]
            pub fn subtitle(mut self, subtitle: impl Into<String>) -> Self {
                self.settings.labels.subtitle = Some(subtitle.into());
                self
            }

            /// X axis label.
            #[must_use]
            pub fn x_label(mut self, label: impl Into<String>) -> Self {
                self.settings.labels.x = Some(label.into());
                self
            }

            /// Y axis label.
            #[must_use]
            pub fn y_label(mut self, label: impl Into<String>) -> Self {
                self.settings.labels.y = Some(label.into());
                self
            }

            /// Legend title.
            #[must_use]
            pub fn legend_title(mut self, title: impl Into<String>) -> Self {
                self.settings.labels.legend = Some(title.into());
                self
            }

            /// Caption.
            #[must_use]
            pub fn caption(mut self, caption: impl Into<String>) -> Self {
                self.settings.labels.caption = Some(caption.into());
                self
            }

            /// Output size in pixels, overriding the configured size.
            #[must_use]
            pub fn dimensions(mut self, width: u32, height: u32) -> Self {
                self.settings.dimensions = Some((width, height));
                self
            }

            /// Theme, overriding the configured theme.
            #[must_use]
            pub fn theme(mut self, theme: $crate::theme::BrandTheme) -> Self {
                self.settings.theme = Some(theme);
                self
            }
        }
    };
}
pub(crate) use shared_setters;

/// How a color or fill argument turned into colors.
#[derive(Debug, Clone)]
pub(crate) enum ColorResolution {
    /// One color for everything.
    Uniform(Rgba),
    /// One color per level.
    Discrete {
        column: String,
        levels: Vec<String>,
        colors: Vec<Rgba>,
        codes: Vec<Option<usize>>,
    },
    /// A continuous scale over a numeric column.
    Continuous {
        column: String,
        scale: ColorScale,
        domain: (f64, f64),
        values: Vec<f64>,
    },
}

impl ColorResolution {
    /// Color of row `i`.
    pub(crate) fn row_color(&self, i: usize) -> Rgba {
        match self {
            ColorResolution::Uniform(color) => *color,
            ColorResolution::Discrete { colors, codes, .. } => {
                codes.get(i).copied().flatten().map_or(NA_COLOR, |c| colors[c])
            }
            ColorResolution::Continuous { scale, values, .. } => match values.get(i) {
                Some(v) if v.is_finite() => scale.scale(*v as f32),
                _ => NA_COLOR,
            },
        }
    }

    /// Legend for this resolution.
    pub(crate) fn legend(&self, title: Option<&str>) -> Legend {
        match self {
            ColorResolution::Uniform(_) => Legend::None,
            ColorResolution::Discrete {
                column, levels, colors, ..
            } => Legend::Discrete {
                title: title.unwrap_or(column).to_string(),
                entries: levels
                    .iter()
                    .zip(colors)
                    .map(|(label, color)| LegendEntry {
                        label: label.clone(),
                        color: *color,
                    })
                    .collect(),
            },
            ColorResolution::Continuous {
                column, scale, domain, ..
            } => {
                let mut breaks: Vec<f64> = format::pretty_breaks(domain.0, domain.1, 5)
                    .into_iter()
                    .filter(|b| *b >= domain.0 - 1e-9 && *b <= domain.1 + 1e-9)
                    .collect();
                if breaks.is_empty() {
                    breaks = vec![domain.0, domain.1];
                }
                Legend::Continuous {
                    title: title.unwrap_or(column).to_string(),
                    domain: *domain,
                    breaks: breaks
                        .into_iter()
                        .map(|b| LegendEntry {
                            label: format::number(b, None),
                            color: scale.scale(b as f32),
                        })
                        .collect(),
                }
            }
        }
    }
}

/// Classify a color or fill argument and resolve it to brand colors.
///
/// An explicit palette alongside a static color adds a palette-ignored
/// advisory.
pub(crate) fn resolve_color(
    aesthetic: &'static str,
    arg: Option<&AestheticArg>,
    data: &Dataset,
    settings: &Settings,
    advisories: &mut Vec<Advisory>,
) -> Result<(Classification, ColorResolution)> {
    let classification = classify(arg, Some(data))?;
    if let Some(advisory) = check_palette_usage(aesthetic, &classification, settings.palette.as_deref()) {
        advisories.push(advisory);
    }

    let resolution = match &classification {
        Classification::Absent => ColorResolution::Uniform(PRIMARY),
        Classification::Static(value) => ColorResolution::Uniform(parse_color(value)?),
        Classification::Mapped {
            column,
            continuous: false,
        } => {
            let Discrete { levels, codes } = data.discrete(column)?;
            let palette = palettes::palette(settings.discrete_palette())?;
            ColorResolution::Discrete {
                column: column.clone(),
                colors: palette.colors(levels.len(), settings.reverse),
                levels,
                codes,
            }
        }
        Classification::Mapped {
            column,
            continuous: true,
        } => {
            let values = data.numeric(column)?;
            let domain = finite_range(&values)
                .ok_or_else(|| Error::EmptyData(format!("column '{column}' has no finite values")))?;
            let palette = palettes::palette(settings.continuous_palette())?;
            ColorResolution::Continuous {
                column: column.clone(),
                scale: palette.color_scale(domain, settings.reverse)?,
                domain,
                values,
            }
        }
    };
    Ok((classification, resolution))
}

/// Reject a continuous mapping where the recipe needs groups.
pub(crate) fn require_discrete(resolution: &ColorResolution) -> Result<()> {
    match resolution {
        ColorResolution::Continuous { column, .. } => Err(Error::ColumnType {
            column: column.clone(),
            expected: "discrete (factor, text or date) for this chart's fill",
        }),
        _ => Ok(()),
    }
}

/// Discrete reading of a category axis.
///
/// A plain numeric column is coerced to a factor with a
/// [`AdvisoryKind::NonFactorAxis`] advisory.
pub(crate) fn category_axis(
    data: &Dataset,
    column: &str,
    chart: ChartKind,
    advisories: &mut Vec<Advisory>,
) -> Result<Discrete> {
    let col = data.require(column)?;
    if col.is_continuous() {
        advisories.push(Advisory::emit(
            AdvisoryKind::NonFactorAxis,
            format!("{chart} chart: '{column}' is numeric, not a factor; treating its values as categories"),
        ));
    }
    Ok(col.to_discrete())
}

/// Positioning of overlapping groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    /// Stack groups on top of each other.
    Stack,
    /// Place groups side by side.
    Dodge,
    /// Stack and normalize each stack to 1.
    Fill,
    /// Draw groups over each other unchanged.
    Identity,
}

impl Position {
    fn name(self) -> &'static str {
        match self {
            Self::Stack => "stack",
            Self::Dodge => "dodge",
            Self::Fill => "fill",
            Self::Identity => "identity",
        }
    }

    /// Parse `value`, accepting only the positions in `allowed`.
    pub(crate) fn parse_allowed(value: &str, allowed: &[Position]) -> Result<Self> {
        value
            .parse::<Position>()
            .ok()
            .filter(|p| allowed.contains(p))
            .ok_or_else(|| {
                let names: Vec<&str> = allowed.iter().map(|p| p.name()).collect();
                Error::invalid_parameter("position", value, &names)
            })
    }
}

impl FromStr for Position {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let all = [Self::Stack, Self::Dodge, Self::Fill, Self::Identity];
        all.into_iter()
            .find(|p| p.name() == s)
            .ok_or_else(|| Error::invalid_parameter("position", s, &all.map(Position::name)))
    }
}

/// Finite `(min, max)` of `values`.
pub(crate) fn finite_range(values: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
}

/// Layer of `geom` over its own `x`/`y` data frame in a single color.
pub(crate) fn layer(geom: Geom, points: &[(f64, f64)], color: Rgba, size: Option<f32>) -> Layer {
    let x: Vec<f32> = points.iter().map(|p| p.0 as f32).collect();
    let y: Vec<f32> = points.iter().map(|p| p.1 as f32).collect();
    let mut df = DataFrame::new();
    df.add_column_f32("x", &x);
    df.add_column_f32("y", &y);
    let mut aes = Aes::new().x("x").y("y").color_value(color);
    if let Some(size) = size {
        aes = aes.size_value(size);
    }
    Layer::new(geom).data(df).aes(aes)
}

/// Bar layer whose bars span `width` data units.
///
/// The library sizes bars relative to the panel width divided by the number
/// of bars in the layer, so the geom width is rescaled by `slots`, the
/// number of unit-wide positions across the frame.
pub(crate) fn bar_layer(points: &[(f64, f64)], color: Rgba, width: f64, slots: f64) -> Layer {
    let geom_width = (width * points.len() as f64 / slots.max(1.0)) as f32;
    layer(Geom::bar().width(geom_width), points, color, None)
}

/// Group row-level points by their color, keeping first-seen order.
pub(crate) fn group_by_color(points: impl IntoIterator<Item = ((f64, f64), Rgba)>) -> Vec<(Rgba, Vec<(f64, f64)>)> {
    let mut groups: IndexMap<[u8; 4], (Rgba, Vec<(f64, f64)>)> = IndexMap::new();
    for (point, color) in points {
        groups.entry(color.to_array()).or_insert_with(|| (color, Vec::new())).1.push(point);
    }
    groups.into_values().collect()
}

/// Copy of `color` with its alpha channel set from `alpha` in `[0, 1]`.
pub(crate) fn with_alpha(color: Rgba, alpha: f32) -> Rgba {
    Rgba::new(color.r, color.g, color.b, (alpha.clamp(0.0, 1.0) * 255.0).round() as u8)
}

/// Reject values outside `(0, ∞)`.
pub(crate) fn require_positive(parameter: &'static str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(Error::invalid_parameter(parameter, value.to_string(), &["a positive number"]))
    }
}

/// Reject values outside `[0, 1]`.
pub(crate) fn require_unit(parameter: &'static str, value: f64) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(Error::invalid_parameter(parameter, value.to_string(), &["a number between 0 and 1"]))
    }
}

/// Parts a recipe assembles before the chart is built.
pub(crate) struct ChartParts {
    pub(crate) kind: ChartKind,
    pub(crate) labels: Labels,
    pub(crate) legend: Legend,
    pub(crate) series: Vec<Series>,
    pub(crate) annotations: Vec<Annotation>,
    pub(crate) advisories: Vec<Advisory>,
    pub(crate) theme: BrandTheme,
    pub(crate) flipped: bool,
    pub(crate) width: u32,
    pub(crate) height: u32,
}

impl ChartParts {
    pub(crate) fn new(kind: ChartKind, settings: &Settings) -> Result<Self> {
        let theme = settings.theme()?;
        let (width, height) = settings.dimensions(&theme)?;
        Ok(Self {
            kind,
            labels: settings.labels.clone(),
            legend: Legend::None,
            series: Vec::new(),
            annotations: Vec::new(),
            advisories: Vec::new(),
            theme,
            flipped: false,
            width,
            height,
        })
    }

    /// Fill in axis labels the caller left unset.
    pub(crate) fn default_axis_labels(&mut self, x: &str, y: &str) {
        self.labels.x.get_or_insert_with(|| x.to_string());
        self.labels.y.get_or_insert_with(|| y.to_string());
    }

    /// Build through the grammar API, one layer per entry.
    pub(crate) fn finish_grammar(self, layers: Vec<Layer>, frame: PlotFrame) -> Result<BrandChart> {
        if layers.is_empty() {
            return Err(Error::EmptyData(format!("{} chart has nothing to draw", self.kind)));
        }
        let n_layers = layers.len();
        let coord = if self.flipped { frame.coord().flip() } else { frame.coord() };
        let mut plot = GGPlot::new()
            .coord(coord)
            .theme(self.theme.to_theme())
            .dimensions(self.width, self.height);
        if let Some(title) = &self.labels.title {
            plot = plot.title(title.clone());
        }
        if let Some(x) = &self.labels.x {
            plot = plot.xlab(x.clone());
        }
        if let Some(y) = &self.labels.y {
            plot = plot.ylab(y.clone());
        }
        for layer in layers {
            plot = plot.layer(layer);
        }
        let built = plot.build()?;
        log::debug!(target: "brandplot", "built {} chart with {n_layers} layers", self.kind);
        Ok(self.into_chart(ChartPlot::Grammar(built), Some(frame)))
    }

    pub(crate) fn into_chart(self, plot: ChartPlot, frame: Option<PlotFrame>) -> BrandChart {
        BrandChart {
            kind: self.kind,
            labels: self.labels,
            legend: self.legend,
            series: self.series,
            annotations: self.annotations,
            advisories: self.advisories,
            theme: self.theme,
            frame,
            flipped: self.flipped,
            width: self.width,
            height: self.height,
            plot,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Dataset {
        Dataset::new()
            .with_numeric("hp", &[110.0, 93.0, 175.0, 105.0])
            .unwrap()
            .with_factor("cyl", &["6", "4", "8", "6"])
            .unwrap()
    }

    #[test]
    fn test_resolve_absent_uses_primary() {
        let mut advisories = Vec::new();
        let (c, r) = resolve_color("color", None, &sample(), &Settings::default(), &mut advisories).unwrap();
        assert_eq!(c, Classification::Absent);
        assert!(matches!(r, ColorResolution::Uniform(color) if color == PRIMARY));
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_resolve_static_with_palette_warns_once() {
        let settings = Settings {
            palette: Some("bright".to_string()),
            ..Settings::default()
        };
        let mut advisories = Vec::new();
        let arg = AestheticArg::literal("blue");
        let (_, r) = resolve_color("color", Some(&arg), &sample(), &settings, &mut advisories).unwrap();
        assert!(matches!(r, ColorResolution::Uniform(c) if c == Rgba::rgb(0, 0, 255)));
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::PaletteIgnored);
    }

    #[test]
    fn test_resolve_discrete_levels() {
        let mut advisories = Vec::new();
        let arg = AestheticArg::column("cyl");
        let (_, r) = resolve_color("fill", Some(&arg), &sample(), &Settings::default(), &mut advisories).unwrap();
        let legend = r.legend(None);
        let labels: Vec<&str> = legend.entries().iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, vec!["4", "6", "8"]);
        assert_eq!(r.row_color(0), r.row_color(3));
        assert_ne!(r.row_color(0), r.row_color(1));
    }

    #[test]
    fn test_resolve_continuous_legend_breaks() {
        let mut advisories = Vec::new();
        let arg = AestheticArg::column("hp");
        let (_, r) = resolve_color("color", Some(&arg), &sample(), &Settings::default(), &mut advisories).unwrap();
        match r.legend(Some("Horsepower")) {
            Legend::Continuous { title, domain, breaks } => {
                assert_eq!(title, "Horsepower");
                assert_eq!(domain, (93.0, 175.0));
                assert!(breaks.iter().any(|b| b.label == "100"));
            }
            other => panic!("expected continuous legend, got {other:?}"),
        }
    }

    #[test]
    fn test_resolve_missing_column() {
        let mut advisories = Vec::new();
        let arg = AestheticArg::column("gear");
        let err = resolve_color("fill", Some(&arg), &sample(), &Settings::default(), &mut advisories).unwrap_err();
        assert!(matches!(err, Error::ColumnNotFound(ref c) if c == "gear"));
    }

    #[test]
    fn test_position_parsing() {
        let allowed = [Position::Stack, Position::Identity];
        assert_eq!(Position::parse_allowed("identity", &allowed).unwrap(), Position::Identity);
        let err = Position::parse_allowed("dodge", &allowed).unwrap_err();
        match err {
            Error::InvalidParameterValue { parameter, allowed, .. } => {
                assert_eq!(parameter, "position");
                assert_eq!(allowed, "stack, identity");
            }
            other => panic!("unexpected error {other}"),
        }
    }

    #[test]
    fn test_category_axis_advisory() {
        let mut advisories = Vec::new();
        let d = category_axis(&sample(), "hp", ChartKind::Bar, &mut advisories).unwrap();
        assert_eq!(d.levels.len(), 4);
        assert_eq!(advisories.len(), 1);
        assert_eq!(advisories[0].kind, AdvisoryKind::NonFactorAxis);

        advisories.clear();
        category_axis(&sample(), "cyl", ChartKind::Bar, &mut advisories).unwrap();
        assert!(advisories.is_empty());
    }

    #[test]
    fn test_group_by_color_preserves_order() {
        let red = Rgba::rgb(255, 0, 0);
        let blue = Rgba::rgb(0, 0, 255);
        let groups = group_by_color(vec![((0.0, 1.0), blue), ((1.0, 2.0), red), ((2.0, 3.0), blue)]);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, blue);
        assert_eq!(groups[0].1.len(), 2);
    }

    #[test]
    fn test_frame_padding() {
        let series = vec![Series {
            name: "s".to_string(),
            color: PRIMARY,
            points: vec![(0.0, 10.0), (10.0, 20.0)],
        }];
        let frame = PlotFrame::around(&series);
        assert!((frame.xlim.0 + 0.5).abs() < 1e-12);
        assert!((frame.ylim.1 - 20.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_baseline_not_padded_below_zero() {
        let series = vec![Series {
            name: "s".to_string(),
            color: PRIMARY,
            points: vec![(0.0, 0.0), (1.0, 0.4), (2.0, 0.0)],
        }];
        let frame = PlotFrame::with_zero_baseline(&series);
        assert_eq!(frame.ylim.0, 0.0);
        assert!((frame.ylim.1 - 0.42).abs() < 1e-12);

        let negative = vec![Series {
            name: "s".to_string(),
            color: PRIMARY,
            points: vec![(0.0, -2.0), (1.0, -1.0)],
        }];
        assert_eq!(PlotFrame::with_zero_baseline(&negative).ylim.1, 0.0);
    }

    #[test]
    fn test_font_family_applied_to_text() {
        let svg = r#"<text x="1" font-family="sans-serif">a</text>"#;
        assert_eq!(
            with_font_family(svg, "Inter"),
            r#"<text x="1" font-family="Inter, sans-serif">a</text>"#
        );
        assert_eq!(with_font_family(svg, "sans-serif"), svg);
        assert!(with_font_family(svg, r#"A "B""#).contains("A &quot;B&quot;, sans-serif"));
    }

    #[test]
    fn test_dimensions_too_small() {
        let settings = Settings {
            dimensions: Some((50, 50)),
            ..Settings::default()
        };
        let theme = settings.theme().unwrap();
        assert!(matches!(
            settings.dimensions(&theme),
            Err(Error::InvalidParameterValue { parameter: "dimensions", .. })
        ));
    }
}
