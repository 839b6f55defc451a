//! Histogram recipe.

use std::fmt;
use std::str::FromStr;

use trueno_viz::color::Rgba;
use trueno_viz::plots::{BinStrategy, Histogram};

use super::{
    bar_layer, require_discrete, resolve_color, shared_setters, with_alpha, BrandChart, ChartKind, ChartParts,
    ColorResolution, PlotFrame, Position, Series, Settings,
};
use crate::aesthetic::AestheticArg;
use crate::data::Dataset;
use crate::error::{Error, Result};

/// Most bins a histogram may have.
pub const MAX_BINS: usize = 10_000;

/// How the number of bins is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BinMethod {
    /// `ceil(log2(n)) + 1` bins.
    #[default]
    Sturges,
    /// Scott's normal reference rule.
    Scott,
    /// Freedman-Diaconis rule.
    FreedmanDiaconis,
    /// Caller-supplied bin count.
    Manual,
}

impl FromStr for BinMethod {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sturges" => Ok(BinMethod::Sturges),
            "scott" => Ok(BinMethod::Scott),
            "fd" => Ok(BinMethod::FreedmanDiaconis),
            "manual" => Ok(BinMethod::Manual),
            other => Err(Error::invalid_parameter("method", other, &["sturges", "scott", "fd", "manual"])),
        }
    }
}

impl fmt::Display for BinMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BinMethod::Sturges => "sturges",
            BinMethod::Scott => "scott",
            BinMethod::FreedmanDiaconis => "fd",
            BinMethod::Manual => "manual",
        })
    }
}

/// Equal-width bins shared by every group.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Breaks {
    start: f64,
    width: f64,
    count: usize,
}

impl Breaks {
    fn over(values: &[f64], count: usize) -> Self {
        let (lo, hi) = super::finite_range(values).unwrap_or((0.0, 1.0));
        let (lo, hi) = if hi - lo < f64::EPSILON { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        Self {
            start: lo,
            width: (hi - lo) / count as f64,
            count,
        }
    }

    /// Bin of `v`; the upper edge belongs to the last bin.
    fn index(&self, v: f64) -> usize {
        (((v - self.start) / self.width).floor().max(0.0) as usize).min(self.count - 1)
    }

    fn center(&self, bin: usize) -> f64 {
        self.start + (bin as f64 + 0.5) * self.width
    }

    fn span(&self) -> (f64, f64) {
        (self.start, self.start + self.width * self.count as f64)
    }
}

/// Counts of a numeric column over shared bins.
#[derive(Debug, Clone)]
pub struct HistogramChart<'a> {
    data: &'a Dataset,
    x: String,
    fill: Option<AestheticArg>,
    method: String,
    bins: Option<usize>,
    position: String,
    settings: Settings,
}

shared_setters!(HistogramChart);

impl<'a> HistogramChart<'a> {
    /// Bin the values of `x`.
    pub fn new(data: &'a Dataset, x: impl Into<String>) -> Self {
        Self {
            data,
            x: x.into(),
            fill: None,
            method: "sturges".to_string(),
            bins: None,
            position: "stack".to_string(),
            settings: Settings::default(),
        }
    }

    /// Bar fill: a literal color or a discrete column.
    #[must_use]
    pub fn fill(mut self, fill: AestheticArg) -> Self {
        self.fill = Some(fill);
        self
    }

    /// Binning rule: `sturges`, `scott`, `fd` or `manual`.
    #[must_use]
    pub fn method(mut self, method: impl Into<String>) -> Self {
        self.method = method.into();
        self
    }

    /// Bin count, used by the `manual` method.
    #[must_use]
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Group positioning: `stack` or `identity`.
    #[must_use]
    pub fn position(mut self, position: impl Into<String>) -> Self {
        self.position = position.into();
        self
    }

    fn bin_count(&self, method: BinMethod, pooled: &[f64]) -> Result<usize> {
        let strategy = match method {
            BinMethod::Manual => {
                let bins = self.bins.ok_or_else(|| Error::MissingRequiredParameter {
                    parameter: "bins",
                    reason: "method 'manual' needs an explicit bin count".to_string(),
                })?;
                if bins == 0 || bins > MAX_BINS {
                    let allowed = format!("an integer from 1 to {MAX_BINS}");
                    return Err(Error::invalid_parameter("bins", bins.to_string(), &[&allowed]));
                }
                return Ok(bins);
            }
            BinMethod::Sturges => BinStrategy::Sturges,
            BinMethod::Scott => BinStrategy::Scott,
            BinMethod::FreedmanDiaconis => BinStrategy::FreedmanDiaconis,
        };
        if let Some(bins) = self.bins {
            log::warn!(target: "brandplot", "histogram: bins = {bins} ignored with method '{method}'");
        }
        let values: Vec<f32> = pooled.iter().map(|&v| v as f32).collect();
        let count = Histogram::new().data(&values).bins(strategy).bin_count();
        if count > MAX_BINS {
            log::warn!(target: "brandplot", "histogram: method '{method}' asked for {count} bins, capped at {MAX_BINS}");
        }
        Ok(count.min(MAX_BINS))
    }

    /// Build the chart.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingRequiredParameter`] for `manual` without
    /// bins, [`Error::InvalidParameterValue`] for an unknown method or
    /// position or a bin count outside `1..=MAX_BINS`,
    /// [`Error::ColumnType`] for a continuous fill and [`Error::EmptyData`]
    /// when `x` has no finite values. Rule-based counts above [`MAX_BINS`]
    /// are capped with a warning.
    pub fn build(&self) -> Result<BrandChart> {
        let mut parts = ChartParts::new(ChartKind::Histogram, &self.settings)?;
        let method: BinMethod = self.method.parse()?;
        let position = Position::parse_allowed(&self.position, &[Position::Stack, Position::Identity])?;

        let xs = self.data.numeric(&self.x)?;
        let (_, fill) = resolve_color("fill", self.fill.as_ref(), self.data, &self.settings, &mut parts.advisories)?;
        require_discrete(&fill)?;

        let rows: Vec<usize> = (0..xs.len()).filter(|&i| xs[i].is_finite()).collect();
        if rows.is_empty() {
            return Err(Error::EmptyData(format!("'{}' has no finite values", self.x)));
        }
        let pooled: Vec<f64> = rows.iter().map(|&i| xs[i]).collect();
        let breaks = Breaks::over(&pooled, self.bin_count(method, &pooled)?);

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
            _ => vec![(self.x.clone(), fill.row_color(0), rows.clone())],
        };

        let mut cumulative = vec![0.0; breaks.count];
        for (name, color, members) in &groups {
            let mut counts = vec![0.0; breaks.count];
            for &i in members {
                counts[breaks.index(xs[i])] += 1.0;
            }
            if position == Position::Stack {
                for (acc, c) in cumulative.iter_mut().zip(counts.iter_mut()) {
                    *acc += *c;
                    *c = *acc;
                }
            }
            parts.series.push(Series {
                name: name.clone(),
                color: *color,
                points: counts.iter().enumerate().map(|(b, c)| (breaks.center(b), *c)).collect(),
            });
        }

        let (x0, x1) = breaks.span();
        let top = parts
            .series
            .iter()
            .flat_map(|s| s.points.iter().map(|p| p.1))
            .fold(0.0_f64, f64::max)
            .max(1.0);
        let frame = PlotFrame {
            xlim: (x0, x1),
            ylim: (0.0, top * 1.05),
        };
        let slots = breaks.count as f64;
        let layers: Vec<_> = match position {
            Position::Stack => parts
                .series
                .iter()
                .rev()
                .map(|s| bar_layer(&s.points, s.color, 1.0, slots))
                .collect(),
            _ => parts
                .series
                .iter()
                .map(|s| bar_layer(&s.points, with_alpha(s.color, 0.6), 1.0, slots))
                .collect(),
        };

        parts.default_axis_labels(&self.x, "count");
        parts.legend = fill.legend(parts.labels.legend.as_deref());
        parts.finish_grammar(layers, frame)
    }
}
