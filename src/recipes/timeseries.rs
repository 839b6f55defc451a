//! Time series recipe.

use trueno_viz::grammar::Geom;

use super::{
    group_by_color, layer, require_positive, resolve_color, shared_setters, BrandChart, ChartKind, ChartParts,
    ColorResolution, PlotFrame, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::{Column, Dataset};
use crate::error::{Error, Result};
use crate::palettes;

/// Lines over a numeric or date x axis.
///
/// A discrete color mapping draws one line per level. A continuous mapping
/// draws a single neutral line and colors the markers along it.
#[derive(Debug, Clone)]
pub struct TimeseriesChart<'a> {
    data: &'a Dataset,
    x: String,
    y: String,
    color: Option<AestheticArg>,
    line_width: f64,
    points: bool,
    settings: Settings,
}

shared_setters!(TimeseriesChart);

impl<'a> TimeseriesChart<'a> {
    /// Plot `y` over `x`, which may be numeric or a date column.
    pub fn new(data: &'a Dataset, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            y: y.into(),
            color: None,
            line_width: 1.5,
            points: false,
            settings: Settings::default(),
        }
    }

    /// Line color: a literal color or a column.
    #[must_use]
    pub fn color(mut self, color: AestheticArg) -> Self {
        self.color = Some(color);
        self
    }

    /// Line width in pixels.
    #[must_use]
    pub fn line_width(mut self, width: f64) -> Self {
        self.line_width = width;
        self
    }

    /// Draw a marker at each observation.
    #[must_use]
    pub fn points(mut self, show: bool) -> Self {
        self.points = show;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnType`] when `x` is neither numeric nor a date,
    /// [`Error::InvalidParameterValue`] for a non-positive line width and
    /// [`Error::EmptyData`] when no row has finite coordinates.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Timeseries, &self.settings)?;
        require_positive("line_width", self.line_width)?;

        let xs = self.data.numeric(&self.x)?;
        let ys = self.data.numeric(&self.y)?;
        let (_, color) = resolve_color("color", self.color.as_ref(), self.data, &self.settings, &mut parts.advisories)?;

        let mut rows: Vec<usize> = (0..xs.len()).filter(|&i| xs[i].is_finite() && ys[i].is_finite()).collect();
        if rows.is_empty() {
            return Err(Error::EmptyData(format!("no rows with finite '{}' and '{}'", self.x, self.y)));
        }
        rows.sort_by(|&a, &b| xs[a].total_cmp(&xs[b]));

        let line = Geom::line().width(self.line_width as f32);
        let marker_size = Some((self.line_width * 3.0) as f32);
        let mut layers = Vec::new();

        match &color {
            ColorResolution::Uniform(c) => {
                let points: Vec<(f64, f64)> = rows.iter().map(|&i| (xs[i], ys[i])).collect();
                layers.push(layer(line, &points, *c, None));
                if self.points {
                    layers.push(layer(Geom::point(), &points, *c, marker_size));
                }
                parts.series.push(Series {
                    name: self.y.clone(),
                    color: *c,
                    points,
                });
            }
            ColorResolution::Discrete { levels, colors, codes, .. } => {
                for (level, (name, c)) in levels.iter().zip(colors).enumerate() {
                    let points: Vec<(f64, f64)> =
                        rows.iter().filter(|&&i| codes[i] == Some(level)).map(|&i| (xs[i], ys[i])).collect();
                    if points.is_empty() {
                        continue;
                    }
                    layers.push(layer(line.clone(), &points, *c, None));
                    if self.points {
                        layers.push(layer(Geom::point(), &points, *c, marker_size));
                    }
                    parts.series.push(Series {
                        name: name.clone(),
                        color: *c,
                        points,
                    });
                }
            }
            ColorResolution::Continuous { column, .. } => {
                let neutral = palettes::brand_color("slate")?;
                let points: Vec<(f64, f64)> = rows.iter().map(|&i| (xs[i], ys[i])).collect();
                layers.push(layer(line, &points, neutral, None));
                parts.series.push(Series {
                    name: self.y.clone(),
                    color: neutral,
                    points,
                });
                for (c, marks) in group_by_color(rows.iter().map(|&i| ((xs[i], ys[i]), color.row_color(i)))) {
                    layers.push(layer(Geom::point(), &marks, c, marker_size));
                    parts.series.push(Series {
                        name: column.clone(),
                        color: c,
                        points: marks,
                    });
                }
            }
        }

        let frame = PlotFrame::around(&parts.series);
        parts.default_axis_labels(&self.x, &self.y);
        parts.legend = color.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }

    /// Whether the x column holds dates.
    #[must_use]
    pub fn has_date_axis(&self) -> bool {
        matches!(self.data.column(&self.x), Some(Column::Date(_)))
    }
}
