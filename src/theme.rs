//! Brand theme.
//!
//! Controls the non-data appearance of every recipe and converts to the
//! plotting library's [`Theme`].

use std::fmt;
use std::str::FromStr;

use trueno_viz::color::Rgba;
use trueno_viz::grammar::Theme;

use crate::config::Config;
use crate::error::{Error, Result};

/// Which grid lines to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GridLines {
    /// No grid.
    None,
    /// Major grid lines on both axes.
    #[default]
    Major,
    /// Vertical lines only (x breaks).
    X,
    /// Horizontal lines only (y breaks).
    Y,
}

impl FromStr for GridLines {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "none" => Ok(Self::None),
            "major" => Ok(Self::Major),
            "x" => Ok(Self::X),
            "y" => Ok(Self::Y),
            other => Err(Error::invalid_parameter("grid", other, &["none", "major", "x", "y"])),
        }
    }
}

/// Where the legend sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LegendPosition {
    /// Above the panel.
    Top,
    /// Below the panel.
    #[default]
    Bottom,
    /// Left of the panel.
    Left,
    /// Right of the panel.
    Right,
    /// No legend.
    None,
}

impl FromStr for LegendPosition {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "top" => Ok(Self::Top),
            "bottom" => Ok(Self::Bottom),
            "left" => Ok(Self::Left),
            "right" => Ok(Self::Right),
            "none" => Ok(Self::None),
            other => Err(Error::invalid_parameter(
                "legend_position",
                other,
                &["top", "bottom", "left", "right", "none"],
            )),
        }
    }
}

impl fmt::Display for LegendPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Top => "top",
            Self::Bottom => "bottom",
            Self::Left => "left",
            Self::Right => "right",
            Self::None => "none",
        };
        f.write_str(s)
    }
}

/// Non-data colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThemeColors {
    /// Plot background.
    pub background: Rgba,
    /// Panel background.
    pub panel: Rgba,
    /// Grid lines.
    pub grid: Rgba,
    /// Axis lines.
    pub axis: Rgba,
    /// Titles and labels.
    pub text: Rgba,
}

impl ThemeColors {
    /// Light brand colors.
    pub const LIGHT: Self = Self {
        background: Rgba::rgb(255, 255, 255),
        panel: Rgba::rgb(255, 255, 255),
        grid: Rgba::rgb(226, 232, 240),
        axis: Rgba::rgb(108, 117, 125),
        text: Rgba::rgb(38, 42, 48),
    };

    /// Dark brand colors.
    pub const DARK: Self = Self {
        background: Rgba::rgb(24, 28, 34),
        panel: Rgba::rgb(31, 36, 44),
        grid: Rgba::rgb(52, 60, 72),
        axis: Rgba::rgb(160, 170, 182),
        text: Rgba::rgb(238, 242, 247),
    };
}

/// Brand theme specification.
#[derive(Debug, Clone, PartialEq)]
pub struct BrandTheme {
    /// Base font size in points; margins scale with it.
    pub base_size: f32,
    /// Font family for titles and labels.
    pub font_family: String,
    /// Grid lines.
    pub grid: GridLines,
    /// Legend position.
    pub legend_position: LegendPosition,
    /// Dark variant.
    pub dark: bool,
    /// Non-data colors.
    pub colors: ThemeColors,
}

impl Default for BrandTheme {
    fn default() -> Self {
        Self {
            base_size: 11.0,
            font_family: "sans".to_string(),
            grid: GridLines::Major,
            legend_position: LegendPosition::Bottom,
            dark: false,
            colors: ThemeColors::LIGHT,
        }
    }
}

impl BrandTheme {
    /// Theme described by a configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidParameterValue`] for an unknown grid or legend
    /// position.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::default()
            .base_size(config.theme.base_size)
            .font_family(config.fonts.effective_family())
            .grid(config.theme.grid.parse()?)
            .legend_position(config.theme.legend_position.parse()?)
            .dark(config.theme.dark))
    }

    /// Set base font size.
    #[must_use]
    pub fn base_size(mut self, size: f32) -> Self {
        self.base_size = size;
        self
    }

    /// Set font family.
    #[must_use]
    pub fn font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Set grid lines.
    #[must_use]
    pub fn grid(mut self, grid: GridLines) -> Self {
        self.grid = grid;
        self
    }

    /// Set legend position.
    #[must_use]
    pub fn legend_position(mut self, position: LegendPosition) -> Self {
        self.legend_position = position;
        self
    }

    /// Switch between light and dark colors.
    #[must_use]
    pub fn dark(mut self, dark: bool) -> Self {
        self.dark = dark;
        self.colors = if dark { ThemeColors::DARK } else { ThemeColors::LIGHT };
        self
    }

    /// Margin in pixels around the panel.
    #[must_use]
    pub fn margin(&self) -> u32 {
        (self.base_size.max(1.0) * 4.0).round() as u32
    }

    /// Convert to the plotting library's theme.
    ///
    /// The library draws grid lines on both axes or not at all, so
    /// [`GridLines::X`] and [`GridLines::Y`] both enable the grid.
    #[must_use]
    pub fn to_theme(&self) -> Theme {
        let mut theme = Theme::minimal()
            .background(self.colors.background)
            .panel_background(self.colors.panel)
            .grid_color(self.colors.grid)
            .margin(self.margin())
            .grid(self.grid != GridLines::None)
            .axis(true);
        theme.axis_color = self.colors.axis;
        theme.text_color = self.colors.text;
        theme.show_panel_border = false;
        theme.grid_width = 0.5;
        theme.axis_width = 0.75;
        theme
    }
}
