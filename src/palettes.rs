//! Brand colors and palettes.
//!
//! Qualitative palettes feed discrete mappings; sequential and diverging
//! palettes feed continuous ones. Any palette can be stretched to more
//! colors than it has stops by interpolating in Oklab.

use palette::{FromColor, IntoColor, LinSrgb, Mix, Oklab, Srgb};
use trueno_viz::color::Rgba;
use trueno_viz::scale::ColorScale;

use crate::error::{Error, Result};

/// Named brand colors.
pub const BRAND_COLORS: &[(&str, Rgba)] = &[
    ("navy", Rgba::rgb(31, 58, 95)),
    ("teal", Rgba::rgb(42, 157, 143)),
    ("gold", Rgba::rgb(233, 196, 106)),
    ("orange", Rgba::rgb(244, 162, 97)),
    ("coral", Rgba::rgb(231, 111, 81)),
    ("plum", Rgba::rgb(123, 45, 142)),
    ("sky", Rgba::rgb(142, 202, 230)),
    ("slate", Rgba::rgb(108, 117, 125)),
    ("charcoal", Rgba::rgb(38, 42, 48)),
    ("cloud", Rgba::rgb(238, 242, 247)),
];

/// Primary brand color, used when no color is given.
pub const PRIMARY: Rgba = Rgba::rgb(31, 58, 95);

/// Look up a brand color by name.
///
/// # Errors
///
/// Returns [`Error::InvalidParameterValue`] for unknown names.
pub fn brand_color(name: &str) -> Result<Rgba> {
    BRAND_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
        .ok_or_else(|| {
            let names: Vec<&str> = BRAND_COLORS.iter().map(|(n, _)| *n).collect();
            Error::invalid_parameter("color", name, &names)
        })
}

/// How a palette is meant to be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaletteKind {
    /// Distinct hues for unordered categories.
    Qualitative,
    /// Light-to-dark progression for ordered values.
    Sequential,
    /// Two hues diverging from a light midpoint.
    Diverging,
}

/// A named palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Palette {
    /// Palette name.
    pub name: &'static str,
    /// Palette kind.
    pub kind: PaletteKind,
    /// Color stops.
    pub stops: &'static [Rgba],
}

const PALETTES: &[Palette] = &[
    Palette {
        name: "main",
        kind: PaletteKind::Qualitative,
        stops: &[
            Rgba::rgb(31, 58, 95),
            Rgba::rgb(42, 157, 143),
            Rgba::rgb(233, 196, 106),
            Rgba::rgb(231, 111, 81),
            Rgba::rgb(123, 45, 142),
            Rgba::rgb(142, 202, 230),
            Rgba::rgb(108, 117, 125),
        ],
    },
    Palette {
        name: "bright",
        kind: PaletteKind::Qualitative,
        stops: &[
            Rgba::rgb(0, 119, 182),
            Rgba::rgb(249, 65, 68),
            Rgba::rgb(144, 190, 109),
            Rgba::rgb(249, 199, 79),
            Rgba::rgb(157, 78, 221),
            Rgba::rgb(0, 180, 216),
            Rgba::rgb(243, 114, 44),
        ],
    },
    Palette {
        name: "muted",
        kind: PaletteKind::Qualitative,
        stops: &[
            Rgba::rgb(92, 122, 153),
            Rgba::rgb(127, 169, 155),
            Rgba::rgb(201, 179, 126),
            Rgba::rgb(201, 132, 116),
            Rgba::rgb(156, 137, 184),
            Rgba::rgb(163, 163, 163),
        ],
    },
    Palette {
        name: "cool",
        kind: PaletteKind::Sequential,
        stops: &[Rgba::rgb(142, 202, 230), Rgba::rgb(42, 157, 143), Rgba::rgb(31, 58, 95)],
    },
    Palette {
        name: "warm",
        kind: PaletteKind::Sequential,
        stops: &[
            Rgba::rgb(233, 196, 106),
            Rgba::rgb(244, 162, 97),
            Rgba::rgb(231, 111, 81),
            Rgba::rgb(157, 2, 8),
        ],
    },
    Palette {
        name: "sequential",
        kind: PaletteKind::Sequential,
        stops: &[
            Rgba::rgb(238, 242, 247),
            Rgba::rgb(142, 202, 230),
            Rgba::rgb(42, 157, 143),
            Rgba::rgb(31, 58, 95),
        ],
    },
    Palette {
        name: "diverging",
        kind: PaletteKind::Diverging,
        stops: &[Rgba::rgb(231, 111, 81), Rgba::rgb(238, 242, 247), Rgba::rgb(42, 157, 143)],
    },
];

/// Names of all palettes.
#[must_use]
pub fn palette_names() -> Vec<&'static str> {
    PALETTES.iter().map(|p| p.name).collect()
}

/// Look up a palette by name.
///
/// # Errors
///
/// Returns [`Error::InvalidParameterValue`] for unknown names.
pub fn palette(name: &str) -> Result<Palette> {
    PALETTES
        .iter()
        .find(|p| p.name == name)
        .copied()
        .ok_or_else(|| Error::invalid_parameter("palette", name, &palette_names()))
}

impl Palette {
    /// Produce `n` colors.
    ///
    /// Qualitative palettes hand out their stops in order and only
    /// interpolate once `n` exceeds the stop count. Sequential and diverging
    /// palettes always spread `n` colors evenly from the first stop to the
    /// last.
    #[must_use]
    pub fn colors(&self, n: usize, reverse: bool) -> Vec<Rgba> {
        let mut colors = match self.kind {
            PaletteKind::Qualitative if n <= self.stops.len() => self.stops[..n].to_vec(),
            _ => interpolate_oklab(self.stops, n),
        };
        if reverse {
            colors.reverse();
        }
        colors
    }

    /// A continuous color scale over `domain`.
    ///
    /// A degenerate domain is widened by 0.5 on each side.
    pub fn color_scale(&self, domain: (f64, f64), reverse: bool) -> Result<ColorScale> {
        let (lo, hi) = (domain.0 as f32, domain.1 as f32);
        let (lo, hi) = if (hi - lo).abs() < f32::EPSILON { (lo - 0.5, hi + 0.5) } else { (lo, hi) };
        let mut stops = self.stops.to_vec();
        if reverse {
            stops.reverse();
        }
        Ok(ColorScale::new(stops, (lo, hi))?)
    }
}

fn interpolate_oklab(stops: &[Rgba], count: usize) -> Vec<Rgba> {
    if count == 0 || stops.is_empty() {
        return Vec::new();
    }
    if stops.len() == 1 {
        return vec![stops[0]; count];
    }

    let lab: Vec<Oklab<f32>> = stops
        .iter()
        .map(|c| {
            let srgb = Srgb::new(f32::from(c.r) / 255.0, f32::from(c.g) / 255.0, f32::from(c.b) / 255.0);
            Oklab::from_color(srgb.into_linear::<f32>())
        })
        .collect();

    if count == 1 {
        return vec![stops[0]];
    }

    let segments = lab.len() - 1;
    (0..count)
        .map(|i| {
            let t = i as f32 / (count - 1) as f32;
            let pos = t * segments as f32;
            let segment = (pos.floor() as usize).min(segments - 1);
            let mixed = lab[segment].mix(lab[segment + 1], pos - segment as f32);
            let lin: LinSrgb<f32> = mixed.into_color();
            let srgb: Srgb<f32> = Srgb::from_linear(lin);
            Rgba::rgb(to_byte(srgb.red), to_byte(srgb.green), to_byte(srgb.blue))
        })
        .collect()
}

fn to_byte(channel: f32) -> u8 {
    (channel.clamp(0.0, 1.0) * 255.0).round() as u8
}

#[cfg(test)]
mod tests {
    use super::*;
    use trueno_viz::scale::Scale;

    #[test]
    fn test_brand_color_lookup() {
        assert_eq!(brand_color("navy").unwrap(), PRIMARY);
        assert!(matches!(brand_color("mauve"), Err(Error::InvalidParameterValue { .. })));
    }

    #[test]
    fn test_unknown_palette() {
        let err = palette("neon").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("neon"));
        assert!(msg.contains("bright"));
    }

    #[test]
    fn test_qualitative_takes_stops_in_order() {
        let p = palette("main").unwrap();
        let colors = p.colors(3, false);
        assert_eq!(colors, p.stops[..3].to_vec());
    }

    #[test]
    fn test_qualitative_extends_past_stop_count() {
        let p = palette("muted").unwrap();
        let colors = p.colors(10, false);
        assert_eq!(colors.len(), 10);
        assert_eq!(colors[0], p.stops[0]);
        assert_eq!(colors[9], p.stops[p.stops.len() - 1]);
    }

    #[test]
    fn test_sequential_spans_endpoints() {
        let p = palette("sequential").unwrap();
        let colors = p.colors(2, false);
        assert_eq!(colors[0], p.stops[0]);
        assert_eq!(colors[1], p.stops[p.stops.len() - 1]);
    }

    #[test]
    fn test_reverse() {
        let p = palette("bright").unwrap();
        let fwd = p.colors(4, false);
        let mut rev = p.colors(4, true);
        rev.reverse();
        assert_eq!(fwd, rev);
    }

    #[test]
    fn test_zero_colors() {
        assert!(palette("main").unwrap().colors(0, false).is_empty());
    }

    #[test]
    fn test_color_scale_endpoints() {
        let p = palette("sequential").unwrap();
        let scale = p.color_scale((0.0, 10.0), false).unwrap();
        assert_eq!(scale.scale(0.0), p.stops[0]);
        assert_eq!(scale.scale(10.0), p.stops[p.stops.len() - 1]);
    }

    #[test]
    fn test_color_scale_degenerate_domain() {
        let p = palette("cool").unwrap();
        assert!(p.color_scale((3.0, 3.0), false).is_ok());
    }
}
