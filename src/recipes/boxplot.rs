//! Box plot and violin recipes.
//!
//! Both draw one shape per level of an optional discrete x column. The
//! plotting library fills every shape with a single color, so a mapped fill
//! builds one plot per level color and the chart keeps each level's slot
//! from its own plot.

use batuta_common::display::WithDimensions;
use trueno_viz::color::Rgba;
use trueno_viz::plots::{BoxPlot, ViolinPlot};

use super::{
    category_axis, require_discrete, require_positive, require_unit, resolve_color, shared_setters, BrandChart,
    ChartKind, ChartParts, ChartPlot, ColorResolution, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};

/// Finite y values split by the levels of x.
struct Groups {
    labels: Vec<String>,
    values: Vec<Vec<f32>>,
    colors: Vec<Rgba>,
}

impl Groups {
    fn collect(
        data: &Dataset,
        x: Option<&str>,
        y: &str,
        fill: &ColorResolution,
        kind: ChartKind,
        parts: &mut ChartParts,
    ) -> Result<Self> {
        let ys = data.numeric(y)?;
        let mut groups = Groups {
            labels: Vec::new(),
            values: Vec::new(),
            colors: Vec::new(),
        };

        match x {
            Some(x) => {
                let axis = category_axis(data, x, kind, &mut parts.advisories)?;
                for (level, label) in axis.levels.iter().enumerate() {
                    let rows: Vec<usize> = (0..ys.len())
                        .filter(|&i| axis.codes[i] == Some(level) && ys[i].is_finite())
                        .collect();
                    let Some(&first) = rows.first() else {
                        continue;
                    };
                    groups.labels.push(label.clone());
                    groups.values.push(rows.iter().map(|&i| ys[i] as f32).collect());
                    groups.colors.push(fill.row_color(first));
                }
            }
            None => {
                let values: Vec<f32> = ys.iter().filter(|v| v.is_finite()).map(|&v| v as f32).collect();
                if !values.is_empty() {
                    groups.labels.push(y.to_string());
                    groups.values.push(values);
                    groups.colors.push(fill.row_color(0));
                }
            }
        }

        if groups.values.is_empty() {
            return Err(Error::EmptyData(format!("'{y}' has no finite values")));
        }
        Ok(groups)
    }

    fn record(&self, parts: &mut ChartParts) {
        for (idx, ((label, values), color)) in self.labels.iter().zip(&self.values).zip(&self.colors).enumerate() {
            parts.series.push(Series {
                name: label.clone(),
                color: *color,
                points: values.iter().map(|&v| (idx as f64, f64::from(v))).collect(),
            });
        }
    }

    /// Fill color of each plot to build: one when every group shares it,
    /// else one per group.
    fn fills(&self) -> Vec<Rgba> {
        if self.colors.windows(2).all(|w| w[0] == w[1]) {
            self.colors.iter().take(1).copied().collect()
        } else {
            self.colors.clone()
        }
    }

    fn default_axis_labels(x: Option<&str>, y: &str, parts: &mut ChartParts) {
        if let Some(x) = x {
            parts.labels.x.get_or_insert_with(|| x.to_string());
        }
        parts.labels.y.get_or_insert_with(|| y.to_string());
    }
}

/// Box-and-whisker summaries of a numeric column.
#[derive(Debug, Clone)]
pub struct BoxplotChart<'a> {
    data: &'a Dataset,
    x: Option<String>,
    y: String,
    fill: Option<AestheticArg>,
    outliers: bool,
    box_width: f64,
    settings: Settings,
}

shared_setters!(BoxplotChart);

impl<'a> BoxplotChart<'a> {
    /// Summarize the distribution of `y`.
    pub fn new(data: &'a Dataset, y: impl Into<String>) -> Self {
        Self {
            data,
            x: None,
            y: y.into(),
            fill: None,
            outliers: true,
            box_width: 0.6,
            settings: Settings::default(),
        }
    }

    /// Split into one box per level of `x`.
    #[must_use]
    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    /// Box fill: a literal color or a discrete column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Draw points beyond the whiskers.
    #[must_use]
    pub fn outliers(mut self, show: bool) -> Self {
        self.outliers = show;
        self
    }

    /// Box width as a fraction of each slot.
    #[must_use]
    pub fn box_width(mut self, width: f64) -> Self {
        self.box_width = width;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnType`] for a non-numeric `y` or a continuous
    /// fill, [`Error::InvalidParameterValue`] for a box width outside
    /// `(0, 1]` and [`Error::EmptyData`] when `y` has no finite values.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Boxplot, &self.settings)?;
        require_positive("box_width", self.box_width)?;
        require_unit("box_width", self.box_width)?;

        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;
        require_discrete(&fill)?;
        let groups = Groups::collect(self.data, self.x.as_deref(), &self.y, &fill, ChartKind::Boxplot, &mut parts)?;

        let mut plots = Vec::new();
        for color in groups.fills() {
            let mut plot = BoxPlot::new()
                .fill_color(color)
                .outline_color(parts.theme.colors.text)
                .median_color(parts.theme.colors.text)
                .margin(parts.theme.margin())
                .box_width(self.box_width as f32)
                .show_outliers(self.outliers);
            for (values, label) in groups.values.iter().zip(&groups.labels) {
                plot = plot.add_group(values, label);
            }
            plot.set_dimensions(parts.width, parts.height);
            plots.push(plot.build()?);
        }
        log::debug!(target: "brandplot", "built boxplot chart with {} groups in {} colors", groups.values.len(), plots.len());

        groups.record(&mut parts);
        Groups::default_axis_labels(self.x.as_deref(), &self.y, &mut parts);
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        Ok(parts.into_chart(ChartPlot::Box(plots), None))
    }
}

/// Kernel density outlines of a numeric column, mirrored per group.
#[derive(Debug, Clone)]
pub struct ViolinChart<'a> {
    data: &'a Dataset,
    x: Option<String>,
    y: String,
    fill: Option<AestheticArg>,
    bandwidth: Option<f64>,
    show_box: bool,
    settings: Settings,
}

shared_setters!(ViolinChart);

impl<'a> ViolinChart<'a> {
    /// Draw the distribution of `y`.
    pub fn new(data: &'a Dataset, y: impl Into<String>) -> Self {
        Self {
            data,
            x: None,
            y: y.into(),
            fill: None,
            bandwidth: None,
            show_box: true,
            settings: Settings::default(),
        }
    }

    /// Split into one violin per level of `x`.
    #[must_use]
    pub fn x(mut self, column: impl Into<String>) -> Self {
        self.x = Some(column.into());
        self
    }

    /// Violin fill: a literal color or a discrete column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Kernel bandwidth in data units; `None` picks one from the data.
    #[must_use]
    pub fn bandwidth(mut self, bandwidth: Option<f64>) -> Self {
        self.bandwidth = bandwidth;
        self
    }

    /// Draw a narrow box plot inside each violin.
    #[must_use]
    pub fn show_box(mut self, show: bool) -> Self {
        self.show_box = show;
        self
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Same as [`BoxplotChart::build`], plus
    /// [`Error::InvalidParameterValue`] for a non-positive bandwidth.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Violin, &self.settings)?;
        if let Some(bw) = self.bandwidth {
            require_positive("bandwidth", bw)?;
        }

        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;
        require_discrete(&fill)?;
        let groups = Groups::collect(self.data, self.x.as_deref(), &self.y, &fill, ChartKind::Violin, &mut parts)?;

        let mut plots = Vec::new();
        for color in groups.fills() {
            let mut plot = ViolinPlot::new()
                .fill_color(color)
                .show_box(self.show_box)
                .bandwidth(self.bandwidth.map(|bw| bw as f32))
                .margin(parts.theme.margin());
            for (values, label) in groups.values.iter().zip(&groups.labels) {
                plot = plot.add_group(values, label);
            }
            plot.set_dimensions(parts.width, parts.height);
            plots.push(plot.build()?);
        }
        log::debug!(target: "brandplot", "built violin chart with {} groups in {} colors", groups.values.len(), plots.len());

        groups.record(&mut parts);
        Groups::default_axis_labels(self.x.as_deref(), &self.y, &mut parts);
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        Ok(parts.into_chart(ChartPlot::Violin(plots), None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aesthetic::AdvisoryKind;
    use crate::palettes;
    use crate::recipes::Legend;

    fn salaries() -> Dataset {
        Dataset::new()
            .with_factor("team", &["ops", "ops", "ops", "dev", "dev", "dev", "qa"])
            .unwrap()
            .with_numeric("pay", &[50.0, 55.0, 60.0, 70.0, 72.0, 90.0, f64::NAN])
            .unwrap()
            .with_numeric("level", &[1.0, 1.0, 2.0, 2.0, 3.0, 3.0, 1.0])
            .unwrap()
    }

    #[test]
    fn test_single_box() {
        let chart = BoxplotChart::new(&salaries(), "pay").build().unwrap();
        assert_eq!(chart.series().len(), 1);
        assert_eq!(chart.series()[0].name, "pay");
        assert_eq!(chart.series()[0].points.len(), 6);
        assert_eq!(chart.series()[0].color, palettes::PRIMARY);
        assert!(chart.frame().is_none());
        assert_eq!(chart.labels().x, None);
        assert_eq!(chart.labels().y.as_deref(), Some("pay"));
    }

    #[test]
    fn test_box_per_level_skips_empty_group() {
        let chart = BoxplotChart::new(&salaries(), "pay")
            .x("team")
            .fill(AestheticArg::column("team"))
            .build()
            .unwrap();
        let names: Vec<&str> = chart.series().iter().map(|s| s.name.as_str()).collect();
        // "qa" only has a NaN value.
        assert_eq!(names, vec!["dev", "ops"]);
        assert!(chart.series()[1].points.iter().all(|p| p.0 == 1.0));
        assert_eq!(chart.legend().entries().len(), 3);
        assert_eq!(chart.labels().x.as_deref(), Some("team"));
    }

    #[test]
    fn test_numeric_x_advisory() {
        let chart = BoxplotChart::new(&salaries(), "pay").x("level").build().unwrap();
        assert_eq!(chart.advisories()[0].kind, AdvisoryKind::NonFactorAxis);
        assert_eq!(chart.series().len(), 3);
    }

    #[test]
    fn test_continuous_fill_rejected() {
        let err = BoxplotChart::new(&salaries(), "pay")
            .fill(AestheticArg::column("level"))
            .build()
            .unwrap_err();
        assert!(matches!(err, Error::ColumnType { .. }));
    }

    #[test]
    fn test_box_width_range() {
        for bad in [0.0, 1.5] {
            let err = BoxplotChart::new(&salaries(), "pay").box_width(bad).build().unwrap_err();
            assert!(matches!(err, Error::InvalidParameterValue { parameter: "box_width", .. }));
        }
    }

    #[test]
    fn test_all_missing() {
        let ds = Dataset::new().with_numeric("v", &[f64::NAN, f64::NAN]).unwrap();
        assert!(matches!(BoxplotChart::new(&ds, "v").build(), Err(Error::EmptyData(_))));
    }

    #[test]
    fn test_box_renders() {
        let chart = BoxplotChart::new(&salaries(), "pay").x("team").dimensions(320, 240).build().unwrap();
        let fb = chart.to_framebuffer().unwrap();
        assert_eq!(fb.width(), 320);
    }

    fn count_pixels(fb: &trueno_viz::framebuffer::Framebuffer, color: Rgba) -> usize {
        (0..fb.width())
            .flat_map(|x| (0..fb.height()).map(move |y| (x, y)))
            .filter(|&(x, y)| fb.get_pixel(x, y) == Some(color))
            .count()
    }

    #[test]
    fn test_box_fill_per_level_in_raster() {
        let chart = BoxplotChart::new(&salaries(), "pay")
            .x("team")
            .fill(AestheticArg::column("team"))
            .dimensions(400, 300)
            .build()
            .unwrap();
        let fb = chart.to_framebuffer().unwrap();
        let (dev, ops) = (chart.series()[0].color, chart.series()[1].color);
        assert_ne!(dev, ops);
        assert!(count_pixels(&fb, dev) > 0);
        assert!(count_pixels(&fb, ops) > 0);
    }

    #[test]
    fn test_violin_fill_per_level_in_raster() {
        let chart = ViolinChart::new(&salaries(), "pay")
            .x("team")
            .fill(AestheticArg::column("team"))
            .show_box(false)
            .dimensions(400, 300)
            .build()
            .unwrap();
        let fb = chart.to_framebuffer().unwrap();
        for series in chart.series() {
            assert!(count_pixels(&fb, series.color) > 0, "no pixels for '{}'", series.name);
        }
    }

    #[test]
    fn test_violin_groups() {
        let chart = ViolinChart::new(&salaries(), "pay")
            .x("team")
            .fill(AestheticArg::literal("teal"))
            .build()
            .unwrap();
        assert_eq!(chart.kind(), ChartKind::Violin);
        assert_eq!(chart.series().len(), 2);
        assert_eq!(*chart.legend(), Legend::None);
    }

    #[test]
    fn test_violin_bad_bandwidth() {
        let err = ViolinChart::new(&salaries(), "pay").bandwidth(Some(-1.0)).build().unwrap_err();
        assert!(matches!(err, Error::InvalidParameterValue { parameter: "bandwidth", .. }));
    }
}
