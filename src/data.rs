//! Tabular data for chart recipes.
//!
//! A [`Dataset`] is an insertion-ordered set of equally long named columns.
//! Columns carry enough type information to decide whether a color mapping
//! is continuous (numeric) or discrete (factor, text, date).

use std::collections::BTreeSet;

use chrono::{Datelike, NaiveDate};
use indexmap::IndexMap;
use serde_json::Value;

use crate::error::{Error, Result};

/// A single column of data.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    /// Numeric values; `NaN` marks a missing value.
    Numeric(Vec<f64>),
    /// Categorical values stored as level codes.
    Factor {
        /// Level labels, in display order.
        levels: Vec<String>,
        /// Per-row index into `levels`, `None` when missing.
        codes: Vec<Option<usize>>,
    },
    /// Free text values.
    Text(Vec<Option<String>>),
    /// Calendar dates.
    Date(Vec<Option<NaiveDate>>),
}

impl Column {
    /// Numeric column from any iterator of values.
    pub fn numeric(values: impl IntoIterator<Item = f64>) -> Self {
        Column::Numeric(values.into_iter().collect())
    }

    /// Factor whose levels are the sorted distinct values.
    pub fn factor<S: AsRef<str>>(values: &[S]) -> Self {
        let levels: Vec<String> = values
            .iter()
            .map(|v| v.as_ref().to_string())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        Self::factor_with_levels(values, &levels)
    }

    /// Factor with an explicit level order. Values outside `levels` become missing.
    pub fn factor_with_levels<S: AsRef<str>, L: AsRef<str>>(values: &[S], levels: &[L]) -> Self {
        let levels: Vec<String> = levels.iter().map(|l| l.as_ref().to_string()).collect();
        let codes = values
            .iter()
            .map(|v| levels.iter().position(|l| l == v.as_ref()))
            .collect();
        Column::Factor { levels, codes }
    }

    /// Text column.
    pub fn text<S: AsRef<str>>(values: &[S]) -> Self {
        Column::Text(values.iter().map(|v| Some(v.as_ref().to_string())).collect())
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Column::Numeric(v) => v.len(),
            Column::Factor { codes, .. } => codes.len(),
            Column::Text(v) => v.len(),
            Column::Date(v) => v.len(),
        }
    }

    /// Whether the column has no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether a mapping onto this column should use a continuous scale.
    ///
    /// Only plain numeric columns are continuous; factors, text and dates are
    /// treated as discrete.
    #[must_use]
    pub fn is_continuous(&self) -> bool {
        matches!(self, Column::Numeric(_))
    }

    /// Short type name used in error messages.
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Column::Numeric(_) => "numeric",
            Column::Factor { .. } => "factor",
            Column::Text(_) => "text",
            Column::Date(_) => "date",
        }
    }

    /// Values on a numeric axis. Dates become days since 1970-01-01.
    ///
    /// Returns `None` for factor and text columns.
    #[must_use]
    pub fn as_f64(&self) -> Option<Vec<f64>> {
        match self {
            Column::Numeric(v) => Some(v.clone()),
            Column::Date(v) => Some(
                v.iter()
                    .map(|d| d.map_or(f64::NAN, |d| f64::from(days_since_epoch(d))))
                    .collect(),
            ),
            _ => None,
        }
    }

    /// Convert to a factor whose levels are the sorted distinct values.
    ///
    /// Factors are returned unchanged.
    #[must_use]
    pub fn to_factor(&self) -> Column {
        let Discrete { levels, codes } = self.to_discrete();
        Column::Factor { levels, codes }
    }

    /// Level labels and per-row codes for a discrete reading of the column.
    #[must_use]
    pub fn to_discrete(&self) -> Discrete {
        match self {
            Column::Factor { levels, codes } => Discrete {
                levels: levels.clone(),
                codes: codes.clone(),
            },
            Column::Numeric(values) => {
                let mut distinct: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
                distinct.sort_by(f64::total_cmp);
                distinct.dedup();
                Discrete {
                    levels: distinct.iter().map(|v| format_level(*v)).collect(),
                    codes: values.iter().map(|v| distinct.iter().position(|d| d == v)).collect(),
                }
            }
            Column::Text(values) => {
                let levels: Vec<String> =
                    values.iter().flatten().cloned().collect::<BTreeSet<_>>().into_iter().collect();
                let codes = values
                    .iter()
                    .map(|v| v.as_ref().and_then(|v| levels.iter().position(|l| l == v)))
                    .collect();
                Discrete { levels, codes }
            }
            Column::Date(values) => {
                let distinct: Vec<NaiveDate> =
                    values.iter().flatten().copied().collect::<BTreeSet<_>>().into_iter().collect();
                Discrete {
                    levels: distinct.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect(),
                    codes: values
                        .iter()
                        .map(|v| v.and_then(|v| distinct.iter().position(|d| *d == v)))
                        .collect(),
                }
            }
        }
    }
}

/// A discrete view of a column: level labels plus per-row codes.
#[derive(Debug, Clone, PartialEq)]
pub struct Discrete {
    /// Level labels in display order.
    pub levels: Vec<String>,
    /// Per-row level index, `None` when missing.
    pub codes: Vec<Option<usize>>,
}

/// Named, equally long columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    columns: IndexMap<String, Column>,
    n_rows: usize,
}

impl Dataset {
    /// Create an empty dataset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a dataset from `(name, column)` pairs.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] when column lengths disagree.
    pub fn from_columns<N: Into<String>>(columns: impl IntoIterator<Item = (N, Column)>) -> Result<Self> {
        let mut ds = Self::new();
        for (name, column) in columns {
            ds.add_column(name, column)?;
        }
        Ok(ds)
    }

    /// Add or replace a column.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if the column length differs
    /// from the existing row count.
    pub fn add_column(&mut self, name: impl Into<String>, column: Column) -> Result<()> {
        let name = name.into();
        let replacing_only = self.columns.len() == 1 && self.columns.contains_key(&name);
        if !self.columns.is_empty() && !replacing_only && column.len() != self.n_rows {
            return Err(Error::DataLengthMismatch {
                column: name,
                expected: self.n_rows,
                found: column.len(),
            });
        }
        self.n_rows = column.len();
        self.columns.insert(name, column);
        Ok(())
    }

    /// Add a numeric column.
    pub fn with_numeric(mut self, name: &str, values: &[f64]) -> Result<Self> {
        self.add_column(name, Column::numeric(values.iter().copied()))?;
        Ok(self)
    }

    /// Add a factor column with sorted levels.
    pub fn with_factor<S: AsRef<str>>(mut self, name: &str, values: &[S]) -> Result<Self> {
        self.add_column(name, Column::factor(values))?;
        Ok(self)
    }

    /// Add a factor column with an explicit level order.
    pub fn with_factor_levels<S: AsRef<str>, L: AsRef<str>>(
        mut self,
        name: &str,
        values: &[S],
        levels: &[L],
    ) -> Result<Self> {
        self.add_column(name, Column::factor_with_levels(values, levels))?;
        Ok(self)
    }

    /// Add a text column.
    pub fn with_text<S: AsRef<str>>(mut self, name: &str, values: &[S]) -> Result<Self> {
        self.add_column(name, Column::text(values))?;
        Ok(self)
    }

    /// Add a date column.
    pub fn with_dates(mut self, name: &str, values: &[NaiveDate]) -> Result<Self> {
        self.add_column(name, Column::Date(values.iter().copied().map(Some).collect()))?;
        Ok(self)
    }

    /// Replace a column with its factor conversion.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if the column does not exist.
    pub fn as_factor(mut self, name: &str) -> Result<Self> {
        let converted = self.require(name)?.to_factor();
        self.columns.insert(name.to_string(), converted);
        Ok(self)
    }

    /// Look up a column.
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.get(name)
    }

    /// Look up a column that must exist.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if the column does not exist.
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| Error::ColumnNotFound(name.to_string()))
    }

    /// Numeric values of a column (dates as day numbers).
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] or [`Error::ColumnType`].
    pub fn numeric(&self, name: &str) -> Result<Vec<f64>> {
        self.require(name)?.as_f64().ok_or_else(|| Error::ColumnType {
            column: name.to_string(),
            expected: "numeric or date",
        })
    }

    /// Discrete view of a column. Non-factor columns are factorized.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ColumnNotFound`] if the column does not exist.
    pub fn discrete(&self, name: &str) -> Result<Discrete> {
        Ok(self.require(name)?.to_discrete())
    }

    /// Number of rows.
    #[must_use]
    pub fn nrow(&self) -> usize {
        self.n_rows
    }

    /// Number of columns.
    #[must_use]
    pub fn ncol(&self) -> usize {
        self.columns.len()
    }

    /// Column names in insertion order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    /// Build a dataset from JSON.
    ///
    /// Accepts either an array of row objects or an object of equally long
    /// column arrays. A column holding only numbers (or nulls) is numeric,
    /// anything else becomes text; nulls are missing values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInputType`] for any other JSON shape and
    /// [`Error::DataLengthMismatch`] for ragged column arrays.
    pub fn from_json(value: &Value) -> Result<Self> {
        match value {
            Value::Array(rows) => Self::from_json_rows(rows),
            Value::Object(cols) => {
                let mut ds = Self::new();
                for (name, cells) in cols {
                    let Value::Array(cells) = cells else {
                        return Err(Error::InvalidInputType {
                            expected: "an array of values for each column",
                            found: format!("{} for column '{name}'", json_kind(cells)),
                        });
                    };
                    ds.add_column(name.clone(), json_column(cells.iter()))?;
                }
                Ok(ds)
            }
            other => Err(Error::InvalidInputType {
                expected: "a tabular dataset (array of rows or object of columns)",
                found: json_kind(other).to_string(),
            }),
        }
    }

    fn from_json_rows(rows: &[Value]) -> Result<Self> {
        let mut names: IndexMap<String, ()> = IndexMap::new();
        for row in rows {
            let Value::Object(fields) = row else {
                return Err(Error::InvalidInputType {
                    expected: "an array of row objects",
                    found: format!("array containing {}", json_kind(row)),
                });
            };
            for key in fields.keys() {
                names.insert(key.clone(), ());
            }
        }

        let mut ds = Self::new();
        for name in names.keys() {
            let cells = rows.iter().map(|row| row.get(name).unwrap_or(&Value::Null));
            ds.add_column(name.clone(), json_column(cells))?;
        }
        Ok(ds)
    }
}

fn json_column<'a>(cells: impl Iterator<Item = &'a Value> + Clone) -> Column {
    let numeric = cells.clone().all(|c| c.is_number() || c.is_null());
    if numeric {
        Column::Numeric(cells.map(|c| c.as_f64().unwrap_or(f64::NAN)).collect())
    } else {
        Column::Text(
            cells
                .map(|c| match c {
                    Value::Null => None,
                    Value::String(s) => Some(s.clone()),
                    other => Some(other.to_string()),
                })
                .collect(),
        )
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Day number of 1970-01-01 counted from 0001-01-01.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

fn format_level(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        format!("{v}")
    }
}
