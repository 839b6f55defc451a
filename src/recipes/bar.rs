//! Bar chart recipe.

use trueno_viz::color::Rgba;
use trueno_viz::scale::Scale;

use super::{
    bar_layer, category_axis, require_positive, require_unit, resolve_color, shared_setters, Annotation,
    BrandChart, ChartKind, ChartParts, ColorResolution, PlotFrame, Position, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::format;

/// Bars over a categorical x axis.
///
/// With a `y` column, bar heights are the sum of `y` per category;
/// without one, they count rows.
#[derive(Debug, Clone)]
pub struct BarChart<'a> {
    data: &'a Dataset,
    x: String,
    y: Option<String>,
    fill: Option<AestheticArg>,
    position: String,
    width: f64,
    horizontal: bool,
    value_labels: bool,
    settings: Settings,
}

shared_setters!(BarChart);

struct Group {
    name: String,
    color: Rgba,
    values: Vec<f64>,
}

impl<'a> BarChart<'a> {
    /// Count rows per level of `x`.
    pub fn new(data: &'a Dataset, x: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            y: None,
            fill: None,
            position: "stack".to_string(),
            width: 0.8,
            horizontal: false,
            value_labels: false,
            settings: Settings::default(),
        }
    }

    /// Sum this column per level instead of counting rows.
    #[must_use]
    pub fn y(mut self, column: impl Into<String>) -> Self {
        self.y = Some(column.into());
        self
    }

    /// Bar fill: a literal color or a column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Group positioning: `stack`, `dodge` or `fill`.
    #[must_use]
    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    /// Bar width as a fraction of the category spacing.
    #[must_use]
    pub fn bar_width(mut self, width: f64) -> Self {
        self.width = width;
        self
    }

    /// Lay bars out horizontally.
    #[must_use]
    pub fn horizontal(mut self, horizontal: bool) -> Self {
        self.horizontal = horizontal;
        self
    }

    /// Label each bar with its value.
    #[must_use]
    pub fn value_labels(mut self, show: bool) -> Self {
        self.value_labels = show;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameterValue`] for an unknown position or a
    /// width outside `(0, 1]`, [`Error::ColumnNotFound`] for missing columns,
    /// [`Error::InvalidColorSpec`] for a bad literal fill and
    /// [`Error::EmptyData`] when there is nothing to draw.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Bar, &self.settings)?;
        let mut position =
            Position::parse_allowed(&self.position, &[Position::Stack, Position::Dodge, Position::Fill])?;
        require_positive("bar_width", self.width)?;
        require_unit("bar_width", self.width)?;

        let axis = category_axis(self.data, &self.x, ChartKind::Bar, &mut parts.advisories)?;
        let heights = match &self.y {
            Some(y) => self.data.numeric(y)?,
            None => vec![1.0; self.data.nrow()],
        };
        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;

        let n_x = axis.levels.len();
        if n_x == 0 {
            return Err(Error::EmptyData(format!("x column '{}' has no values", self.x)));
        }

        let groups = match &fill {
            ColorResolution::Uniform(color) => {
                let mut values = vec![0.0; n_x];
                for (code, h) in axis.codes.iter().zip(&heights) {
                    if let (Some(i), true) = (code, h.is_finite()) {
                        values[*i] += h;
                    }
                }
                let name = self.y.clone().unwrap_or_else(|| "count".to_string());
                vec![Group {
                    name,
                    color: *color,
                    values,
                }]
            }
            ColorResolution::Discrete { levels, colors, codes, .. } => {
                let mut groups: Vec<Group> = levels
                    .iter()
                    .zip(colors)
                    .map(|(name, color)| Group {
                        name: name.clone(),
                        color: *color,
                        values: vec![0.0; n_x],
                    })
                    .collect();
                for ((x, g), h) in axis.codes.iter().zip(codes).zip(&heights) {
                    if let (Some(x), Some(g), true) = (x, g, h.is_finite()) {
                        groups[*g].values[*x] += h;
                    }
                }
                groups
            }
            ColorResolution::Continuous { values: shade, .. } => {
                // One bar per category, shaded by the mean of the mapped column.
                position = Position::Stack;
                let mut sums = vec![0.0; n_x];
                let mut shade_sum = vec![0.0; n_x];
                let mut shade_n = vec![0usize; n_x];
                for ((x, h), s) in axis.codes.iter().zip(&heights).zip(shade) {
                    let Some(x) = x else { continue };
                    if h.is_finite() {
                        sums[*x] += h;
                    }
                    if s.is_finite() {
                        shade_sum[*x] += s;
                        shade_n[*x] += 1;
                    }
                }
                (0..n_x)
                    .map(|i| {
                        let mean = if shade_n[i] > 0 { shade_sum[i] / shade_n[i] as f64 } else { f64::NAN };
                        let mut values = vec![0.0; n_x];
                        values[i] = sums[i];
                        Group {
                            name: axis.levels[i].clone(),
                            color: continuous_color(&fill, mean),
                            values,
                        }
                    })
                    .collect()
            }
        };

        let totals: Vec<f64> = (0..n_x).map(|i| groups.iter().map(|g| g.values[i]).sum()).collect();
        let slots = n_x as f64 + 0.2;
        let mut layers = Vec::new();
        let mut top = f64::NEG_INFINITY;
        let mut bottom: f64 = 0.0;

        match position {
            Position::Stack | Position::Fill => {
                let normalize = position == Position::Fill;
                let mut cumulative = vec![0.0; n_x];
                let mut stacked: Vec<(usize, Vec<(f64, f64)>)> = Vec::new();
                for (g, group) in groups.iter().enumerate() {
                    let mut points = Vec::new();
                    for i in 0..n_x {
                        let v = group.values[i];
                        if v == 0.0 {
                            continue;
                        }
                        let share = if normalize && totals[i] != 0.0 { v / totals[i] } else { v };
                        let start = cumulative[i];
                        cumulative[i] += share;
                        points.push((i as f64, cumulative[i]));
                        top = top.max(cumulative[i]);
                        bottom = bottom.min(cumulative[i]);
                        if self.value_labels && normalize {
                            parts.annotations.push(Annotation {
                                x: i as f64,
                                y: (start + cumulative[i]) / 2.0,
                                text: format::percent(share, None),
                            });
                        }
                    }
                    stacked.push((g, points));
                }
                // Tallest segments first so lower segments paint over them.
                for (g, points) in stacked.iter().rev() {
                    if !points.is_empty() {
                        layers.push(bar_layer(points, groups[*g].color, self.width, slots));
                    }
                }
                for (g, points) in stacked {
                    parts.series.push(Series {
                        name: groups[g].name.clone(),
                        color: groups[g].color,
                        points,
                    });
                }
                if self.value_labels && !normalize {
                    for (i, total) in totals.iter().enumerate() {
                        if *total != 0.0 {
                            parts.annotations.push(Annotation {
                                x: i as f64,
                                y: *total,
                                text: format::number(*total, None),
                            });
                        }
                    }
                }
            }
            Position::Dodge | Position::Identity => {
                let k = groups.len() as f64;
                let sub = self.width / k;
                for (g, group) in groups.iter().enumerate() {
                    let offset = -self.width / 2.0 + (g as f64 + 0.5) * sub;
                    let points: Vec<(f64, f64)> = group
                        .values
                        .iter()
                        .enumerate()
                        .filter(|(_, v)| **v != 0.0)
                        .map(|(i, v)| (i as f64 + offset, *v))
                        .collect();
                    for (x, v) in &points {
                        top = top.max(*v);
                        bottom = bottom.min(*v);
                        if self.value_labels {
                            parts.annotations.push(Annotation {
                                x: *x,
                                y: *v,
                                text: format::number(*v, None),
                            });
                        }
                    }
                    if !points.is_empty() {
                        layers.push(bar_layer(&points, group.color, sub, slots));
                    }
                    parts.series.push(Series {
                        name: group.name.clone(),
                        color: group.color,
                        points,
                    });
                }
            }
        }

        if !(top.is_finite() && top > 0.0) {
            top = 1.0;
        }
        let frame = PlotFrame {
            xlim: (-0.6, n_x as f64 - 0.4),
            ylim: (bottom * 1.05, top * 1.05),
        };

        parts.flipped = self.horizontal;
        let value_label = match (position, &self.y) {
            (Position::Fill, _) => "proportion".to_string(),
            (_, Some(y)) => y.clone(),
            (_, None) => "count".to_string(),
        };
        if self.horizontal {
            parts.default_axis_labels(&value_label, &self.x);
        } else {
            parts.default_axis_labels(&self.x, &value_label);
        }
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }
}

fn continuous_color(fill: &ColorResolution, value: f64) -> Rgba {
    match fill {
        ColorResolution::Continuous { scale, .. } if value.is_finite() => scale.scale(value as f32),
        _ => super::NA_COLOR,
    }
}
