//! Configuration for chart recipes.
//!
//! Loaded from YAML and passed explicitly to each chart builder. Font state
//! lives here instead of in process-wide flags.
//!
//! ```yaml
//! version: 1
//! fonts:
//!   family: Inter
//!   enabled: true
//! defaults:
//!   palette: bright
//!   dpi: 150
//! theme:
//!   grid: y
//!   legend_position: right
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Font selection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontConfig {
    /// Brand font family.
    #[serde(default = "default_family")]
    pub family: String,

    /// Family used when the brand font is not enabled.
    #[serde(default = "default_fallback")]
    pub fallback: String,

    /// Whether the brand font has been made available to the renderer.
    #[serde(default)]
    pub enabled: bool,
}

fn default_family() -> String {
    "Inter".to_string()
}
fn default_fallback() -> String {
    "sans".to_string()
}

impl Default for FontConfig {
    fn default() -> Self {
        Self {
            family: default_family(),
            fallback: default_fallback(),
            enabled: false,
        }
    }
}

impl FontConfig {
    /// The family charts should use.
    #[must_use]
    pub fn effective_family(&self) -> &str {
        if self.enabled {
            &self.family
        } else {
            &self.fallback
        }
    }
}

/// Defaults applied when a chart builder leaves a setting unset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Defaults {
    /// Palette for discrete mappings.
    #[serde(default = "default_palette")]
    pub palette: String,

    /// Palette for continuous mappings.
    #[serde(default = "default_continuous_palette")]
    pub continuous_palette: String,

    /// Output width in inches.
    #[serde(default = "default_width_in")]
    pub width_in: f32,

    /// Output height in inches.
    #[serde(default = "default_height_in")]
    pub height_in: f32,

    /// Output resolution.
    #[serde(default = "default_dpi")]
    pub dpi: u32,
}

fn default_palette() -> String {
    "main".to_string()
}
fn default_continuous_palette() -> String {
    "sequential".to_string()
}
fn default_width_in() -> f32 {
    8.0
}
fn default_height_in() -> f32 {
    5.0
}
fn default_dpi() -> u32 {
    100
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            palette: default_palette(),
            continuous_palette: default_continuous_palette(),
            width_in: default_width_in(),
            height_in: default_height_in(),
            dpi: default_dpi(),
        }
    }
}

/// Theme settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThemeConfig {
    /// Base font size in points.
    #[serde(default = "default_base_size")]
    pub base_size: f32,

    /// Grid lines: `none`, `major`, `x` or `y`.
    #[serde(default = "default_grid")]
    pub grid: String,

    /// Legend position: `top`, `bottom`, `left`, `right` or `none`.
    #[serde(default = "default_legend_position")]
    pub legend_position: String,

    /// Dark background variant.
    #[serde(default)]
    pub dark: bool,
}

fn default_base_size() -> f32 {
    11.0
}
fn default_grid() -> String {
    "major".to_string()
}
fn default_legend_position() -> String {
    "bottom".to_string()
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            base_size: default_base_size(),
            grid: default_grid(),
            legend_position: default_legend_position(),
            dark: false,
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Configuration version.
    #[serde(default = "default_version")]
    pub version: u32,

    /// Fonts.
    #[serde(default)]
    pub fonts: FontConfig,

    /// Builder defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Theme settings.
    #[serde(default)]
    pub theme: ThemeConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            fonts: FontConfig::default(),
            defaults: Defaults::default(),
            theme: ThemeConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| Error::ConfigNotFound(path.display().to_string()))?;

        Self::parse(&content)
    }

    /// Parses configuration from a YAML string.
    ///
    /// # Errors
    ///
    /// Returns an error with line number if parsing fails.
    pub fn parse(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml).map_err(|e| {
            let line = e.location().map_or(0, |l| l.line());
            Error::ConfigParse {
                line,
                message: e.to_string(),
            }
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Loads configuration with fallback to defaults.
    #[must_use]
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Conventional per-user config location, `<config dir>/brandplot/config.yaml`.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("brandplot").join("config.yaml"))
    }

    /// Output size in pixels derived from inches and DPI.
    #[must_use]
    pub fn pixel_dimensions(&self) -> (u32, u32) {
        let dpi = self.defaults.dpi as f32;
        (
            (self.defaults.width_in * dpi).round().max(1.0) as u32,
            (self.defaults.height_in * dpi).round().max(1.0) as u32,
        )
    }

    fn validate(&self) -> Result<()> {
        crate::palettes::palette(&self.defaults.palette)?;
        crate::palettes::palette(&self.defaults.continuous_palette)?;
        if self.defaults.dpi == 0 {
            return Err(Error::invalid_parameter("dpi", "0", &["a positive integer"]));
        }
        if self.defaults.width_in <= 0.0 || self.defaults.height_in <= 0.0 {
            return Err(Error::invalid_parameter(
                "width_in/height_in",
                format!("{}x{}", self.defaults.width_in, self.defaults.height_in),
                &["positive sizes in inches"],
            ));
        }
        self.theme.grid.parse::<crate::theme::GridLines>()?;
        self.theme.legend_position.parse::<crate::theme::LegendPosition>()?;
        Ok(())
    }
}
