//! Kernel density recipe.

use std::f64::consts::PI;
use std::fmt;
use std::str::FromStr;

use trueno_viz::color::Rgba;
use trueno_viz::grammar::Geom;

use super::{
    layer, require_discrete, require_positive, require_unit, resolve_color, shared_setters, BrandChart, ChartKind,
    ChartParts, ColorResolution, PlotFrame, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};

/// Points in each estimated curve.
const GRID_POINTS: usize = 512;

/// Bandwidths past either end of the data the curve extends.
const CUT: f64 = 3.0;

/// Smoothing kernel, scaled so its standard deviation equals the bandwidth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Kernel {
    /// Normal kernel.
    #[default]
    Gaussian,
    /// Parabolic kernel on `[-bw * sqrt(5), bw * sqrt(5)]`.
    Epanechnikov,
    /// Uniform kernel on `[-bw * sqrt(3), bw * sqrt(3)]`.
    Rectangular,
}

impl Kernel {
    /// Weight at distance `d` for bandwidth `bw`.
    fn weight(self, d: f64, bw: f64) -> f64 {
        match self {
            Kernel::Gaussian => {
                let u = d / bw;
                (-0.5 * u * u).exp() / (bw * (2.0 * PI).sqrt())
            }
            Kernel::Epanechnikov => {
                let a = bw * 5.0_f64.sqrt();
                if d.abs() < a {
                    0.75 / a * (1.0 - (d / a).powi(2))
                } else {
                    0.0
                }
            }
            Kernel::Rectangular => {
                let a = bw * 3.0_f64.sqrt();
                if d.abs() < a {
                    0.5 / a
                } else {
                    0.0
                }
            }
        }
    }
}

impl FromStr for Kernel {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "gaussian" => Ok(Kernel::Gaussian),
            "epanechnikov" => Ok(Kernel::Epanechnikov),
            "rectangular" => Ok(Kernel::Rectangular),
            other => Err(Error::invalid_parameter("kernel", other, &["gaussian", "epanechnikov", "rectangular"])),
        }
    }
}

impl fmt::Display for Kernel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Kernel::Gaussian => "gaussian",
            Kernel::Epanechnikov => "epanechnikov",
            Kernel::Rectangular => "rectangular",
        })
    }
}

/// Silverman's rule-of-thumb bandwidth (`bw.nrd0`).
///
/// Needs at least two values. When both the standard deviation and the
/// scaled IQR are zero, falls back to `|x[0]|` and then to 1.
pub fn silverman_bandwidth(values: &[f64]) -> Option<f64> {
    let n = values.len();
    if n < 2 {
        return None;
    }
    let mean = values.iter().sum::<f64>() / n as f64;
    let sd = (values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt();

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let iqr = quantile(&sorted, 0.75) - quantile(&sorted, 0.25);

    let mut lo = sd.min(iqr / 1.34);
    if lo <= 0.0 {
        lo = [sd, values[0].abs(), 1.0].into_iter().find(|v| *v > 0.0).unwrap_or(1.0);
    }
    Some(0.9 * lo * (n as f64).powf(-0.2))
}

/// Linear-interpolated quantile of sorted data.
fn quantile(sorted: &[f64], p: f64) -> f64 {
    let h = (sorted.len() - 1) as f64 * p;
    let below = h.floor() as usize;
    let above = (below + 1).min(sorted.len() - 1);
    sorted[below] + (h - below as f64) * (sorted[above] - sorted[below])
}

/// Density estimate of `values` on an evenly spaced grid.
fn estimate(values: &[f64], bw: f64, kernel: Kernel) -> Vec<(f64, f64)> {
    let (lo, hi) = super::finite_range(values).unwrap_or((0.0, 0.0));
    let (from, to) = (lo - CUT * bw, hi + CUT * bw);
    let step = (to - from) / (GRID_POINTS - 1) as f64;
    let n = values.len() as f64;
    (0..GRID_POINTS)
        .map(|k| {
            let x = from + step * k as f64;
            let y = values.iter().map(|v| kernel.weight(x - v, bw)).sum::<f64>() / n;
            (x, y)
        })
        .collect()
}

/// Smoothed distributions of a numeric column.
#[derive(Debug, Clone)]
pub struct DensityChart<'a> {
    data: &'a Dataset,
    x: String,
    fill: Option<AestheticArg>,
    kernel: String,
    adjust: f64,
    alpha: f64,
    settings: Settings,
}

shared_setters!(DensityChart);

impl<'a> DensityChart<'a> {
    /// Estimate the density of `x`.
    pub fn new(data: &'a Dataset, x: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            fill: None,
            kernel: "gaussian".to_string(),
            adjust: 1.0,
            alpha: 0.5,
            settings: Settings::default(),
        }
    }

    /// Curve fill: a literal color or a discrete column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Smoothing kernel: `gaussian`, `epanechnikov` or `rectangular`.
    #[must_use]
    pub fn kernel(mut self, kernel: impl Into<String>) -> Self {
        self.kernel = kernel.into();
        self
    }

    /// Multiplier on the automatic bandwidth.
    #[must_use]
    pub fn adjust(mut self, adjust: f64) -> Self {
        self.adjust = adjust;
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
    /// Groups with fewer than two finite values are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameterValue`] for an unknown kernel, a
    /// non-positive adjust or an alpha outside `[0, 1]`,
    /// [`Error::ColumnType`] for a continuous fill and [`Error::EmptyData`]
    /// when no group has two finite values.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Density, &self.settings)?;
        let kernel: Kernel = self.kernel.parse()?;
        require_positive("adjust", self.adjust)?;
        require_unit("alpha", self.alpha)?;

        let xs = self.data.numeric(&self.x)?;
        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;
        require_discrete(&fill)?;

        let rows: Vec<usize> = (0..xs.len()).filter(|&i| xs[i].is_finite()).collect();
        let groups: Vec<(String, Rgba, Vec<f64>)> = match &fill {
            ColorResolution::Discrete { levels, colors, codes, .. } => levels
                .iter()
                .zip(colors)
                .enumerate()
                .map(|(g, (name, c))| {
                    let values: Vec<f64> = rows.iter().filter(|&&i| codes[i] == Some(g)).map(|&i| xs[i]).collect();
                    (name.clone(), *c, values)
                })
                .collect(),
            _ => vec![(self.x.clone(), fill.row_color(0), rows.iter().map(|&i| xs[i]).collect())],
        };

        for (name, color, values) in groups {
            let Some(bw) = silverman_bandwidth(&values) else {
                log::debug!(target: "brandplot", "density: group '{name}' has {} values, skipped", values.len());
                continue;
            };
            let bw = bw * self.adjust;
            parts.series.push(Series {
                name,
                color,
                points: estimate(&values, bw, kernel),
            });
        }
        if parts.series.is_empty() {
            return Err(Error::EmptyData(format!("'{}' has no group with two finite values", self.x)));
        }

        let geom = Geom::area().alpha(self.alpha as f32);
        let layers: Vec<_> = parts.series.iter().map(|s| layer(geom.clone(), &s.points, s.color, None)).collect();

        let frame = PlotFrame::with_zero_baseline(&parts.series);
        parts.default_axis_labels(&self.x, "density");
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }
}
