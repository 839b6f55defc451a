//! Scatter plot recipe.

use trueno_viz::grammar::Geom;

use super::{
    group_by_color, layer, require_positive, require_unit, resolve_color, shared_setters, with_alpha, BrandChart,
    ChartKind, ChartParts, ColorResolution, PlotFrame, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::palettes;

/// Points over two numeric axes.
#[derive(Debug, Clone)]
pub struct ScatterChart<'a> {
    data: &'a Dataset,
    x: String,
    y: String,
    color: Option<AestheticArg>,
    size: f64,
    alpha: f64,
    trend: bool,
    settings: Settings,
}

shared_setters!(ScatterChart);

impl<'a> ScatterChart<'a> {
    /// Plot `y` against `x`.
    pub fn new(data: &'a Dataset, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            y: y.into(),
            color: None,
            size: 6.0,
            alpha: 0.85,
            trend: false,
            settings: Settings::default(),
        }
    }

    /// Point color: a literal color or a column.
    #[must_use]
    pub fn color(mut self, color: AestheticArg) -> Self {
        self.color = Some(color);
        self
    }

    /// Point diameter in pixels.
    #[must_use]
    pub fn point_size(mut self, size: f64) -> Self {
        self.size = size;
        self
    }

    /// Point opacity in `[0, 1]`.
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Overlay a least-squares line.
    #[must_use]
    pub fn trend(mut self, show: bool) -> Self {
        self.trend = show;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] or [`Error::ColumnType`] for bad
    /// axis columns, [`Error::InvalidParameterValue`] for a non-positive
    /// size or an alpha outside `[0, 1]`, and [`Error::EmptyData`] when no
    /// row has finite coordinates.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Scatter, &self.settings)?;
        require_positive("point_size", self.size)?;
        require_unit("alpha", self.alpha)?;

        let xs = self.data.numeric(&self.x)?;
        let ys = self.data.numeric(&self.y)?;
        let (_, color) = resolve_color("color", self.color.as_ref(), self.data, &self.settings, &mut parts.advisories)?;

        let rows: Vec<usize> = (0..xs.len()).filter(|&i| xs[i].is_finite() && ys[i].is_finite()).collect();
        if rows.is_empty() {
            return Err(Error::EmptyData(format!("no rows with finite '{}' and '{}'", self.x, self.y)));
        }

        let alpha = self.alpha as f32;
        let size = Some(self.size as f32);
        let mut layers = Vec::new();

        match &color {
            ColorResolution::Discrete { levels, colors, codes, .. } => {
                for (level, (name, c)) in levels.iter().zip(colors).enumerate() {
                    let points: Vec<(f64, f64)> =
                        rows.iter().filter(|&&i| codes[i] == Some(level)).map(|&i| (xs[i], ys[i])).collect();
                    if points.is_empty() {
                        continue;
                    }
                    layers.push(layer(Geom::point(), &points, with_alpha(*c, alpha), size));
                    parts.series.push(Series {
                        name: name.clone(),
                        color: *c,
                        points,
                    });
                }
                let missing: Vec<(f64, f64)> =
                    rows.iter().filter(|&&i| codes[i].is_none()).map(|&i| (xs[i], ys[i])).collect();
                if !missing.is_empty() {
                    layers.push(layer(Geom::point(), &missing, with_alpha(super::NA_COLOR, alpha), size));
                    parts.series.push(Series {
                        name: "NA".to_string(),
                        color: super::NA_COLOR,
                        points: missing,
                    });
                }
            }
            ColorResolution::Uniform(_) | ColorResolution::Continuous { .. } => {
                let name = match &color {
                    ColorResolution::Continuous { column, .. } => column.clone(),
                    _ => self.y.clone(),
                };
                let groups = group_by_color(rows.iter().map(|&i| ((xs[i], ys[i]), color.row_color(i))));
                for (c, points) in groups {
                    layers.push(layer(Geom::point(), &points, with_alpha(c, alpha), size));
                    parts.series.push(Series {
                        name: name.clone(),
                        color: c,
                        points,
                    });
                }
            }
        }

        let frame = PlotFrame::around(&parts.series);

        if self.trend {
            let pairs: Vec<(f64, f64)> = rows.iter().map(|&i| (xs[i], ys[i])).collect();
            match least_squares(&pairs) {
                Some((slope, intercept)) => {
                    let (x0, x1) = pairs
                        .iter()
                        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), (x, _)| (lo.min(*x), hi.max(*x)));
                    let points = vec![(x0, intercept + slope * x0), (x1, intercept + slope * x1)];
                    let line_color = palettes::brand_color("charcoal")?;
                    layers.push(layer(Geom::line().width(1.5), &points, line_color, None));
                    parts.series.push(Series {
                        name: "trend".to_string(),
                        color: line_color,
                        points,
                    });
                }
                None => log::debug!(target: "brandplot", "scatter trend skipped: x has no spread"),
            }
        }

        parts.default_axis_labels(&self.x, &self.y);
        parts.legend = color.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }
}

/// Slope and intercept of the least-squares line through `points`.
///
/// `None` when fewer than two points or all x values are equal.
fn least_squares(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.len() < 2 {
        return None;
    }
    let n = points.len() as f64;
    let mean_x = points.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = points.iter().map(|p| p.1).sum::<f64>() / n;
    let sxx: f64 = points.iter().map(|p| (p.0 - mean_x).powi(2)).sum();
    let sxy: f64 = points.iter().map(|p| (p.0 - mean_x) * (p.1 - mean_y)).sum();
    if sxx.abs() < f64::EPSILON {
        return None;
    }
    let slope = sxy / sxx;
    Some((slope, mean_y - slope * mean_x))
}
