//! Area chart recipe.

use trueno_viz::color::Rgba;
use trueno_viz::grammar::Geom;

use super::{
    layer, require_discrete, require_unit, resolve_color, shared_setters, BrandChart, ChartKind, ChartParts,
    ColorResolution, PlotFrame, Position, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};

/// Filled areas over a numeric or date x axis.
#[derive(Debug, Clone)]
pub struct AreaChart<'a> {
    data: &'a Dataset,
    x: String,
    y: String,
    fill: Option<AestheticArg>,
    position: String,
    alpha: f64,
    settings: Settings,
}

shared_setters!(AreaChart);

impl<'a> AreaChart<'a> {
    /// Fill the area under `y` over `x`.
    pub fn new(data: &'a Dataset, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            y: y.into(),
            fill: None,
            position: "stack".to_string(),
            alpha: 0.7,
            settings: Settings::default(),
        }
    }

    /// Area fill: a literal color or a discrete column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Group positioning: `stack` or `identity`.
    #[must_use]
    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    /// Fill opacity in `[0, 1]`.
    #[must_use]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameterValue`] for an unknown position or
    /// alpha, [`Error::ColumnType`] for a continuous fill mapping and
    /// [`Error::EmptyData`] when no row has finite coordinates.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Area, &self.settings)?;
        let position = Position::parse_allowed(&self.position, &[Position::Stack, Position::Identity])?;
        require_unit("alpha", self.alpha)?;

        let xs = self.data.numeric(&self.x)?;
        let ys = self.data.numeric(&self.y)?;
        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;
        require_discrete(&fill)?;

        let rows: Vec<usize> = (0..xs.len()).filter(|&i| xs[i].is_finite() && ys[i].is_finite()).collect();
        if rows.is_empty() {
            return Err(Error::EmptyData(format!("no rows with finite '{}' and '{}'", self.x, self.y)));
        }

        // (name, color, row indices) per group, in level order.
        let groups: Vec<(String, Rgba, Vec<usize>)> = match &fill {
            ColorResolution::Discrete { levels, colors, codes, .. } => levels
                .iter()
                .zip(colors)
                .enumerate()
                .map(|(g, (name, c))| {
                    let members: Vec<usize> = rows.iter().copied().filter(|&i| codes[i] == Some(g)).collect();
                    (name.clone(), *c, members)
                })
                .filter(|(_, _, members)| !members.is_empty())
                .collect(),
            _ => vec![(self.y.clone(), fill.row_color(0), rows.clone())],
        };

        let mut grid: Vec<f64> = rows.iter().map(|&i| xs[i]).collect();
        grid.sort_by(f64::total_cmp);
        grid.dedup();

        let mut cumulative = vec![0.0; grid.len()];
        for (name, color, members) in &groups {
            let points: Vec<(f64, f64)> = match position {
                Position::Stack => {
                    let mut totals = vec![0.0; grid.len()];
                    for &i in members {
                        if let Ok(slot) = grid.binary_search_by(|g| g.total_cmp(&xs[i])) {
                            totals[slot] += ys[i];
                        }
                    }
                    grid.iter()
                        .zip(cumulative.iter_mut().zip(&totals))
                        .map(|(x, (acc, v))| {
                            *acc += v;
                            (*x, *acc)
                        })
                        .collect()
                }
                _ => {
                    let mut points: Vec<(f64, f64)> = members.iter().map(|&i| (xs[i], ys[i])).collect();
                    points.sort_by(|a, b| a.0.total_cmp(&b.0));
                    points
                }
            };
            parts.series.push(Series {
                name: name.clone(),
                color: *color,
                points,
            });
        }

        let geom = Geom::area().alpha(self.alpha as f32);
        let layers: Vec<_> = match position {
            // Outermost band first so inner bands paint over it.
            Position::Stack => parts
                .series
                .iter()
                .rev()
                .map(|s| layer(geom.clone(), &s.points, s.color, None))
                .collect(),
            _ => parts.series.iter().map(|s| layer(geom.clone(), &s.points, s.color, None)).collect(),
        };

        let frame = PlotFrame::with_zero_baseline(&parts.series);
        parts.default_axis_labels(&self.x, &self.y);
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }
}
