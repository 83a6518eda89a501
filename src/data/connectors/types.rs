use crate::error::ColumnError;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a dataset comes from
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// The configured default dataset (a relative path by default)
    DefaultFile,
    File(PathBuf),
    /// Raw bytes of an uploaded file claiming CSV format
    Upload { name: String, bytes: Vec<u8> },
}

impl DataSource {
    pub fn label(&self) -> String {
        match self {
            Self::DefaultFile => "default dataset".to_string(),
            Self::File(path) => path.to_string_lossy().to_string(),
            Self::Upload { name, .. } => format!("upload '{}'", name),
        }
    }
}

/// Ordered named columns of untyped string cells.
///
/// Every column of the wrapped frame has `String` dtype; a cell is `None`
/// when the source field was empty.
#[derive(Debug, Clone)]
pub struct RawTable {
    df: DataFrame,
}

impl RawTable {
    /// Wrap an existing frame, casting every column to strings
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let columns = df
            .get_columns()
            .iter()
            .map(|column| column.cast(&DataType::String))
            .collect::<PolarsResult<Vec<Column>>>()?;

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    /// Build a table from named columns of optional cells
    pub fn from_columns(columns: Vec<(String, Vec<Option<String>>)>) -> PolarsResult<Self> {
        let columns: Vec<Column> = columns
            .into_iter()
            .map(|(name, cells)| Series::new(name.as_str().into(), cells).into())
            .collect();

        Ok(Self {
            df: DataFrame::new(columns)?,
        })
    }

    pub(crate) fn from_string_frame(df: DataFrame) -> Self {
        Self { df }
    }

    pub fn height(&self) -> usize {
        self.df.height()
    }

    pub fn width(&self) -> usize {
        self.df.width()
    }

    pub fn column_names(&self) -> Vec<String> {
        self.df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.df
            .get_column_names()
            .iter()
            .any(|col| col.as_str() == name)
    }

    /// Cells of one column, in row order
    pub fn cells(&self, name: &str) -> Option<Vec<Option<&str>>> {
        let column = self.df.column(name).ok()?;
        let strings = column.str().ok()?;
        Some(strings.into_iter().collect())
    }

    /// One column as numbers.
    ///
    /// Cells are trimmed and cast to `Float64`; empty, non-numeric, NaN
    /// and infinite cells become null.
    pub fn numeric(&self, name: &str) -> PolarsResult<Float64Chunked> {
        let strings = self.df.column(name)?.str()?;
        let trimmed: StringChunked = strings.into_iter().map(|cell| cell.map(str::trim)).collect();
        let cast = trimmed
            .with_name(name.into())
            .into_series()
            .cast(&DataType::Float64)?;

        Ok(cast
            .f64()?
            .into_iter()
            .map(|value| value.filter(|v| v.is_finite()))
            .collect::<Float64Chunked>()
            .with_name(name.into()))
    }

    pub fn as_dataframe(&self) -> &DataFrame {
        &self.df
    }
}

/// A validated (time axis, value) column pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnSelection {
    time_column: String,
    value_column: String,
}

impl ColumnSelection {
    pub(crate) fn new(time_column: &str, value_column: &str) -> Result<Self, ColumnError> {
        if time_column == value_column {
            return Err(ColumnError::DuplicateSelection(time_column.to_string()));
        }
        Ok(Self {
            time_column: time_column.to_string(),
            value_column: value_column.to_string(),
        })
    }

    pub fn time_column(&self) -> &str {
        &self.time_column
    }

    pub fn value_column(&self) -> &str {
        &self.value_column
    }
}

/// Metadata about a loaded dataset
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetMetadata {
    pub source: String,
    pub num_rows: usize,
    pub num_columns: usize,
    pub columns: Vec<String>,
}

/// Data preview for UI display
#[derive(Debug, Clone)]
pub struct DataPreview {
    pub metadata: DatasetMetadata,
    pub first_rows: Vec<Vec<String>>, // First 10 rows as strings
    pub column_stats: Vec<ColumnStats>,
}

#[derive(Debug, Clone)]
pub struct ColumnStats {
    pub name: String,
    pub null_count: usize,
    pub numeric_count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub mean: Option<f64>,
}
