//! Color and fill aesthetic classification.
//!
//! Chart recipes accept their `color`/`fill` argument as an [`AestheticArg`]:
//! either a quoted literal (`"steelblue"`, `"#1F3A5F"`) or a reference to a
//! dataset column. [`classify`] turns that argument into a
//! [`Classification`] that decides how the recipe talks to the plotting
//! library:
//!
//! | argument | dataset column | result |
//! |----------|----------------|--------|
//! | omitted | – | [`Classification::Absent`] |
//! | `Literal` valid color | – | [`Classification::Static`] |
//! | `Literal` anything else | – | [`Error::InvalidColorSpec`] |
//! | `Column` | numeric | [`Classification::Mapped`], continuous |
//! | `Column` | factor / text / date / missing | [`Classification::Mapped`], discrete |
//!
//! The shape of the argument alone separates a literal from a column: a
//! column named `red` is still a mapping, and the literal `"red"` is still a
//! static color.

use std::fmt;

use crate::color::is_valid_color;
use crate::data::Dataset;
use crate::error::{Error, Result};

/// An aesthetic argument as written at the call site.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum AestheticArg {
    /// A quoted string: must be a color.
    Literal(String),
    /// A bare column reference.
    Column(String),
}

impl AestheticArg {
    /// A quoted literal.
    pub fn literal(value: impl Into<String>) -> Self {
        AestheticArg::Literal(value.into())
    }

    /// A column reference.
    pub fn column(name: impl Into<String>) -> Self {
        AestheticArg::Column(name.into())
    }
}

/// Which of the three classifications applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AestheticKind {
    /// No argument supplied.
    Absent,
    /// A literal color applied uniformly.
    StaticColor,
    /// A column mapped through a scale.
    ColumnMapping,
}

/// Result of classifying an aesthetic argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Classification {
    /// No argument supplied.
    Absent,
    /// A literal color, as supplied.
    Static(String),
    /// A column mapping.
    Mapped {
        /// Referenced column.
        column: String,
        /// Whether the column takes a continuous scale.
        continuous: bool,
    },
}

impl Classification {
    /// The classification kind.
    #[must_use]
    pub fn kind(&self) -> AestheticKind {
        match self {
            Classification::Absent => AestheticKind::Absent,
            Classification::Static(_) => AestheticKind::StaticColor,
            Classification::Mapped { .. } => AestheticKind::ColumnMapping,
        }
    }

    /// The literal color, for static classifications.
    #[must_use]
    pub fn literal_value(&self) -> Option<&str> {
        match self {
            Classification::Static(value) => Some(value),
            _ => None,
        }
    }

    /// Whether a column mapping is continuous. `false` for other kinds.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Classification::Mapped { continuous: true, .. })
    }

    /// The mapped column, for column mappings.
    #[must_use]
    pub fn column(&self) -> Option<&str> {
        match self {
            Classification::Mapped { column, .. } => Some(column),
            _ => None,
        }
    }
}

/// Classify an aesthetic argument.
///
/// # Errors
///
/// Returns [`Error::InvalidColorSpec`] carrying the literal unchanged when a
/// `Literal` is not a valid color. Every other input classifies.
///
/// # Example
///
/// ```
/// use brandplot::aesthetic::{classify, AestheticArg, AestheticKind};
/// use brandplot::data::Dataset;
///
/// let mtcars = Dataset::new().with_numeric("hp", &[110.0, 93.0]).unwrap();
///
/// let mapped = classify(Some(&AestheticArg::column("hp")), Some(&mtcars)).unwrap();
/// assert_eq!(mapped.kind(), AestheticKind::ColumnMapping);
/// assert!(mapped.is_continuous());
///
/// let fixed = classify(Some(&AestheticArg::literal("steelblue")), None).unwrap();
/// assert_eq!(fixed.literal_value(), Some("steelblue"));
/// ```
pub fn classify(arg: Option<&AestheticArg>, data: Option<&Dataset>) -> Result<Classification> {
    match arg {
        None => Ok(Classification::Absent),
        Some(AestheticArg::Literal(value)) => {
            if is_valid_color(value) {
                Ok(Classification::Static(value.clone()))
            } else {
                Err(Error::InvalidColorSpec(value.clone()))
            }
        }
        Some(AestheticArg::Column(name)) => {
            let continuous = data
                .and_then(|ds| ds.column(name))
                .is_some_and(|col| col.is_continuous());
            Ok(Classification::Mapped {
                column: name.clone(),
                continuous,
            })
        }
    }
}

/// Kinds of non-fatal advisory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdvisoryKind {
    /// A palette was chosen for an aesthetic that is not mapped.
    PaletteIgnored,
    /// A numeric axis was treated as categorical.
    NonFactorAxis,
}

/// A non-fatal warning produced while building a chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Advisory {
    /// Advisory kind.
    pub kind: AdvisoryKind,
    /// Message shown to the user.
    pub message: String,
}

impl Advisory {
    /// Create an advisory and log it at warn level.
    pub fn emit(kind: AdvisoryKind, message: impl Into<String>) -> Self {
        let message = message.into();
        log::warn!(target: "brandplot", "{message}");
        Self { kind, message }
    }
}

impl fmt::Display for Advisory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Check whether an explicit palette choice will have any effect.
///
/// Palettes only apply to column mappings. A palette supplied alongside a
/// static color yields one [`AdvisoryKind::PaletteIgnored`] advisory. An
/// omitted aesthetic stays silent: the recipe falls back to its brand
/// default and a palette may legitimately come from shared defaults.
pub fn check_palette_usage(
    aesthetic: &str,
    classification: &Classification,
    palette: Option<&str>,
) -> Option<Advisory> {
    let palette = palette?;
    match classification {
        Classification::Static(value) => Some(Advisory::emit(
            AdvisoryKind::PaletteIgnored,
            format!(
                "palette '{palette}' is ignored: {aesthetic} is the static color '{value}'; \
                 palettes only apply when {aesthetic} maps a column"
            ),
        )),
        Classification::Absent | Classification::Mapped { .. } => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::Column;

    fn iris_like() -> Dataset {
        Dataset::new()
            .with_numeric("hp", &[110.0, 93.0, 175.0])
            .unwrap()
            .with_factor("Species", &["setosa", "versicolor", "setosa"])
            .unwrap()
            .with_numeric("red", &[1.0, 2.0, 3.0])
            .unwrap()
            .with_text("label", &["a", "b", "c"])
            .unwrap()
    }

    #[test]
    fn test_absent() {
        let c = classify(None, Some(&iris_like())).unwrap();
        assert_eq!(c, Classification::Absent);
        assert_eq!(c.kind(), AestheticKind::Absent);
        assert!(!c.is_continuous());
        assert_eq!(c.literal_value(), None);
    }

    #[test]
    fn test_static_named() {
        let c = classify(Some(&AestheticArg::literal("steelblue")), None).unwrap();
        assert_eq!(c.kind(), AestheticKind::StaticColor);
        assert_eq!(c.literal_value(), Some("steelblue"));
    }

    #[test]
    fn test_static_hex() {
        let c = classify(Some(&AestheticArg::literal("#1F3A5F")), None).unwrap();
        assert_eq!(c, Classification::Static("#1F3A5F".to_string()));
    }

    #[test]
    fn test_invalid_literal_errors() {
        let err = classify(Some(&AestheticArg::literal("#FFFF")), None).unwrap_err();
        assert!(matches!(err, Error::InvalidColorSpec(ref s) if s == "#FFFF"));

        // A literal never falls back to a column lookup, even if such a column exists.
        let err = classify(Some(&AestheticArg::literal("hp")), Some(&iris_like())).unwrap_err();
        assert!(matches!(err, Error::InvalidColorSpec(ref s) if s == "hp"));
    }

    #[test]
    fn test_numeric_column_continuous() {
        let c = classify(Some(&AestheticArg::column("hp")), Some(&iris_like())).unwrap();
        assert_eq!(
            c,
            Classification::Mapped {
                column: "hp".to_string(),
                continuous: true
            }
        );
    }

    #[test]
    fn test_factor_and_text_columns_discrete() {
        let ds = iris_like();
        for col in ["Species", "label"] {
            let c = classify(Some(&AestheticArg::column(col)), Some(&ds)).unwrap();
            assert_eq!(c.kind(), AestheticKind::ColumnMapping);
            assert!(!c.is_continuous(), "{col}");
        }
    }

    #[test]
    fn test_numeric_coerced_to_factor_discrete() {
        let ds = iris_like().as_factor("hp").unwrap();
        let c = classify(Some(&AestheticArg::column("hp")), Some(&ds)).unwrap();
        assert!(!c.is_continuous());
    }

    #[test]
    fn test_no_dataset_defaults_discrete() {
        let c = classify(Some(&AestheticArg::column("hp")), None).unwrap();
        assert_eq!(c.column(), Some("hp"));
        assert!(!c.is_continuous());
    }

    #[test]
    fn test_column_named_like_color() {
        let ds = iris_like();
        let mapped = classify(Some(&AestheticArg::column("red")), Some(&ds)).unwrap();
        assert_eq!(mapped.kind(), AestheticKind::ColumnMapping);
        assert!(mapped.is_continuous());

        let literal = classify(Some(&AestheticArg::literal("red")), Some(&ds)).unwrap();
        assert_eq!(literal.kind(), AestheticKind::StaticColor);
    }

    #[test]
    fn test_idempotent() {
        let ds = iris_like();
        let arg = AestheticArg::column("Species");
        let a = classify(Some(&arg), Some(&ds)).unwrap();
        let b = classify(Some(&arg), Some(&ds)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_date_column_discrete() {
        let mut ds = Dataset::new();
        ds.add_column("day", Column::Date(vec![None])).unwrap();
        let c = classify(Some(&AestheticArg::column("day")), Some(&ds)).unwrap();
        assert!(!c.is_continuous());
    }

    #[test]
    fn test_palette_advisory_static() {
        let c = Classification::Static("blue".to_string());
        let advisory = check_palette_usage("color", &c, Some("bright")).unwrap();
        assert_eq!(advisory.kind, AdvisoryKind::PaletteIgnored);
        assert!(advisory.message.contains("palette"));
        assert!(advisory.message.contains("ignored"));
    }

    #[test]
    fn test_palette_advisory_silent_cases() {
        assert!(check_palette_usage("color", &Classification::Absent, Some("bright")).is_none());
        let mapped = Classification::Mapped {
            column: "cyl".to_string(),
            continuous: false,
        };
        assert!(check_palette_usage("color", &mapped, Some("bright")).is_none());
        let fixed = Classification::Static("blue".to_string());
        assert!(check_palette_usage("color", &fixed, None).is_none());
    }
}
