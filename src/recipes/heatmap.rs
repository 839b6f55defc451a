//! Heatmap recipe.

use batuta_common::display::WithDimensions;
use trueno_viz::plots::Heatmap;
use trueno_viz::scale::Scale;

use super::{
    category_axis, finite_range, group_by_color, shared_setters, Annotation, BrandChart, ChartKind, ChartParts,
    ChartPlot, ColorResolution, PlotFrame, Series, Settings,
};
use crate::aesthetic::{classify, AestheticArg, Classification};
use crate::data::Dataset;
use crate::error::{Error, Result};
use crate::{format, palettes};

/// Mean of a numeric column over a grid of two discrete columns.
///
/// The first level of `y` sits on the bottom row. Cells without
/// observations are painted with the low end of the scale.
#[derive(Debug, Clone)]
pub struct HeatmapChart<'a> {
    data: &'a Dataset,
    x: String,
    y: String,
    fill: Option<AestheticArg>,
    value_labels: bool,
    accuracy: Option<f64>,
    settings: Settings,
}

shared_setters!(HeatmapChart);

impl<'a> HeatmapChart<'a> {
    /// Grid of `x` by `y` cells.
    pub fn new(data: &'a Dataset, x: impl Into<String>, y: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            y: y.into(),
            fill: None,
            value_labels: false,
            accuracy: None,
            settings: Settings::default(),
        }
    }

    /// Numeric column whose cell means color the grid. Required.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Print each cell's mean inside it.
    #[must_use]
    pub fn value_labels(mut self, show: bool) -> Self {
        self.value_labels = show;
        self
    }

    /// Rounding step for value labels, e.g. `0.1`.
    #[must_use]
    pub fn accuracy(mut self, accuracy: f64) -> Self {
        self.accuracy = Some(accuracy);
        self
    }

    /// Name of the numeric fill column, after validating the argument.
    fn fill_column(&self) -> Result<String> {
        let arg = self.fill.as_ref().ok_or_else(|| Error::MissingRequiredParameter {
            parameter: "fill",
            reason: "a heatmap colors its cells from a numeric column".to_string(),
        })?;
        if let AestheticArg::Literal(value) = arg {
            return Err(Error::invalid_parameter("fill", value.clone(), &["a numeric column name"]));
        }
        match classify(Some(arg), Some(self.data))? {
            Classification::Mapped {
                column,
                continuous: true,
            } => Ok(column),
            Classification::Mapped { column, .. } => {
                self.data.require(&column)?;
                Err(Error::ColumnType {
                    column,
                    expected: "numeric for a heatmap fill",
                })
            }
            Classification::Absent | Classification::Static(_) => {
                Err(Error::invalid_parameter("fill", format!("{arg:?}"), &["a numeric column name"]))
            }
        }
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredParameter`] without a fill,
    /// [`Error::InvalidParameterValue`] for a literal fill,
    /// [`Error::ColumnNotFound`] or [`Error::ColumnType`] for a bad fill
    /// column and [`Error::EmptyData`] when no cell has a finite value.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Heatmap, &self.settings)?;
        let column = self.fill_column()?;
        if let Some(accuracy) = self.accuracy {
            super::require_positive("accuracy", accuracy)?;
        }

        let xs = category_axis(self.data, &self.x, ChartKind::Heatmap, &mut parts.advisories)?;
        let ys = category_axis(self.data, &self.y, ChartKind::Heatmap, &mut parts.advisories)?;
        let values = self.data.numeric(&column)?;
        let (nx, ny) = (xs.levels.len(), ys.levels.len());

        let mut sums = vec![0.0; nx * ny];
        let mut counts = vec![0_usize; nx * ny];
        for (i, v) in values.iter().enumerate() {
            if let (Some(cx), Some(cy), true) = (xs.codes[i], ys.codes[i], v.is_finite()) {
                sums[cy * nx + cx] += v;
                counts[cy * nx + cx] += 1;
            }
        }
        let means: Vec<f64> = sums
            .iter()
            .zip(&counts)
            .map(|(s, &n)| if n == 0 { f64::NAN } else { s / n as f64 })
            .collect();
        let domain = finite_range(&means)
            .ok_or_else(|| Error::EmptyData(format!("no cell of '{}' by '{}' has a finite '{column}'", self.x, self.y)))?;

        let palette = palettes::palette(self.settings.continuous_palette())?;
        let scale = palette.color_scale(domain, self.settings.reverse)?;

        // Library rows run top to bottom.
        let mut grid = Vec::with_capacity(nx * ny);
        for row in (0..ny).rev() {
            grid.extend(means[row * nx..(row + 1) * nx].iter().map(|m| {
                let m = if m.is_finite() { *m } else { domain.0 };
                m as f32
            }));
        }
        let margin = parts.theme.margin();
        let heatmap = Heatmap::new()
            .data(&grid, ny, nx)
            .color_scale(scale.clone())
            .dimensions(parts.width, parts.height)
            .margin(margin)
            .borders(true)
            .border_color(parts.theme.colors.background)
            .build()?;
        log::debug!(target: "brandplot", "built heatmap chart with {nx}x{ny} cells");

        let cells = (0..ny).flat_map(|cy| (0..nx).map(move |cx| (cx, cy)));
        let filled: Vec<((f64, f64), f64)> = cells
            .filter_map(|(cx, cy)| {
                let m = means[cy * nx + cx];
                m.is_finite().then_some(((cx as f64, cy as f64), m))
            })
            .collect();
        for (color, points) in group_by_color(filled.iter().map(|(p, m)| (*p, scale.scale(*m as f32)))) {
            parts.series.push(Series {
                name: column.clone(),
                color,
                points,
            });
        }
        if self.value_labels {
            parts.annotations.extend(filled.iter().map(|((x, y), m)| Annotation {
                x: *x,
                y: *y,
                text: format::number(*m, self.accuracy),
            }));
        }

        let plot_w = f64::from(parts.width - 2 * margin);
        let plot_h = f64::from(parts.height - 2 * margin);
        let cell_w = (plot_w / nx as f64).floor().max(1.0);
        let cell_h = (plot_h / ny as f64).floor().max(1.0);
        let frame = PlotFrame {
            xlim: (-0.5, -0.5 + plot_w / cell_w),
            ylim: (ny as f64 - 0.5 - plot_h / cell_h, ny as f64 - 0.5),
        };

        parts.default_axis_labels(&self.x, &self.y);
        let resolution = ColorResolution::Continuous {
            column,
            scale,
            domain,
            values: means,
        };
        parts.legend = resolution.legend(parts.labels.legend.as_deref());
        Ok(parts.into_chart(ChartPlot::Heatmap(heatmap), Some(frame)))
    }
}
