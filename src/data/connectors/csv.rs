use crate::error::LoadError;
use polars::prelude::*;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use super::{
    types::{ColumnStats, DataPreview, DataSource, DatasetMetadata, RawTable},
    validator::DataValidator,
};

/// Loads CSV datasets into string-typed tables
#[derive(Debug, Clone)]
pub struct CsvConnector {
    default_dataset: PathBuf,
}

impl CsvConnector {
    pub fn new<P: Into<PathBuf>>(default_dataset: P) -> Self {
        Self {
            default_dataset: default_dataset.into(),
        }
    }

    pub fn default_dataset(&self) -> &Path {
        &self.default_dataset
    }

    /// Load a dataset from the given source
    pub fn load(&self, source: &DataSource) -> Result<RawTable, LoadError> {
        let df = match source {
            DataSource::DefaultFile => Self::read_path(&self.default_dataset)?,
            DataSource::File(path) => Self::read_path(path)?,
            DataSource::Upload { bytes, .. } => Self::read_bytes(bytes)?,
        };

        let table = Self::finish(df)?;
        log::info!(
            "Loaded {} rows x {} columns from {}",
            table.height(),
            table.width(),
            source.label()
        );

        let null_report = DataValidator::check_nulls(&table);
        if !null_report.is_empty() {
            log::warn!("Null values detected: {:?}", null_report);
        }

        Ok(table)
    }

    fn read_path(path: &Path) -> Result<DataFrame, LoadError> {
        Self::string_options()
            .try_into_reader_with_file_path(Some(path.to_path_buf()))
            .and_then(|reader| reader.finish())
            .map_err(|e| {
                LoadError::Unreadable(format!("Failed to read CSV '{}': {}", path.display(), e))
            })
    }

    fn read_bytes(bytes: &[u8]) -> Result<DataFrame, LoadError> {
        if bytes.iter().all(|b| b.is_ascii_whitespace()) {
            return Err(LoadError::Unreadable("Uploaded file is empty".to_string()));
        }

        Self::string_options()
            .into_reader_with_file_handle(Cursor::new(bytes.to_vec()))
            .finish()
            .map_err(|e| LoadError::Unreadable(format!("Failed to parse uploaded CSV: {}", e)))
    }

    // Schema inference disabled: every column is read as strings
    fn string_options() -> CsvReadOptions {
        CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(0))
    }

    fn finish(mut df: DataFrame) -> Result<RawTable, LoadError> {
        let trimmed: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|name| name.trim().to_string())
            .collect();
        for (i, name) in trimmed.iter().enumerate() {
            if trimmed[..i].contains(name) {
                return Err(LoadError::Unreadable(format!(
                    "Duplicate column header '{}'",
                    name
                )));
            }
        }
        df.set_column_names(trimmed)
            .map_err(|e| LoadError::Unreadable(format!("Invalid header: {}", e)))?;

        if df.height() == 0 {
            return Err(LoadError::Empty);
        }

        Ok(RawTable::from_string_frame(df))
    }

    /// Create metadata for a loaded table
    pub fn create_metadata(source: &DataSource, table: &RawTable) -> DatasetMetadata {
        DatasetMetadata {
            source: source.label(),
            num_rows: table.height(),
            num_columns: table.width(),
            columns: table.column_names(),
        }
    }

    /// Create a preview of the data for UI display
    pub fn create_preview(source: &DataSource, table: &RawTable) -> DataPreview {
        let metadata = Self::create_metadata(source, table);
        let columns: Vec<Vec<Option<&str>>> = metadata
            .columns
            .iter()
            .map(|name| table.cells(name).unwrap_or_default())
            .collect();

        let num_preview_rows = 10.min(table.height());
        let first_rows = (0..num_preview_rows)
            .map(|i| {
                columns
                    .iter()
                    .map(|cells| {
                        cells
                            .get(i)
                            .copied()
                            .flatten()
                            .unwrap_or("null")
                            .to_string()
                    })
                    .collect()
            })
            .collect();

        let column_stats = metadata
            .columns
            .iter()
            .map(|name| Self::column_stats(table, name))
            .collect();

        DataPreview {
            metadata,
            first_rows,
            column_stats,
        }
    }

    fn column_stats(table: &RawTable, name: &str) -> ColumnStats {
        let null_count = table
            .as_dataframe()
            .column(name)
            .map(|column| column.null_count())
            .unwrap_or(0);

        match table.numeric(name) {
            Ok(numeric) => ColumnStats {
                name: name.to_string(),
                null_count,
                numeric_count: numeric.len() - numeric.null_count(),
                min: numeric.min(),
                max: numeric.max(),
                mean: numeric.mean(),
            },
            Err(e) => {
                log::debug!("No numeric stats for column '{}': {}", name, e);
                ColumnStats {
                    name: name.to_string(),
                    null_count,
                    numeric_count: 0,
                    min: None,
                    max: None,
                    mean: None,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn upload(text: &str) -> DataSource {
        DataSource::Upload {
            name: "sales.csv".to_string(),
            bytes: text.as_bytes().to_vec(),
        }
    }

    #[test]
    fn test_load_upload_reads_strings_and_trims_headers() {
        let connector = CsvConnector::new("data/sales.csv");
        let table = connector
            .load(&upload(" Date ,Sales,Region\n2024-01-01,10.5,North\n2024-01-02,N/A,South\n"))
            .unwrap();

        assert_eq!(table.column_names(), vec!["Date", "Sales", "Region"]);
        assert_eq!(table.height(), 2);
        let sales = table.cells("Sales").unwrap();
        assert_eq!(sales, vec![Some("10.5"), Some("N/A")]);
    }

    #[test]
    fn test_header_only_is_empty() {
        let connector = CsvConnector::new("data/sales.csv");
        let err = connector.load(&upload("Date,Sales\n")).unwrap_err();
        assert_eq!(err.reason(), "empty");
    }

    #[test]
    fn test_blank_upload_is_unreadable() {
        let connector = CsvConnector::new("data/sales.csv");
        let err = connector.load(&upload("   \n")).unwrap_err();
        assert_eq!(err.reason(), "unreadable");
    }

    #[test]
    fn test_headers_equal_after_trim_are_unreadable() {
        let connector = CsvConnector::new("data/sales.csv");
        let err = connector
            .load(&upload("Date, Sales ,Sales\n2024-01-01,1,2\n"))
            .unwrap_err();
        assert_eq!(err.reason(), "unreadable");
    }

    #[test]
    fn test_missing_default_file_is_unreadable() {
        let connector = CsvConnector::new("does/not/exist.csv");
        let err = connector.load(&DataSource::DefaultFile).unwrap_err();
        assert_eq!(err.reason(), "unreadable");
    }

    #[test]
    fn test_create_preview() {
        let source = upload("Date,Sales\n2024-01-01,1\n2024-01-02,3\n2024-01-03,\n");
        let connector = CsvConnector::new("data/sales.csv");
        let table = connector.load(&source).unwrap();

        let preview = CsvConnector::create_preview(&source, &table);
        assert_eq!(preview.first_rows.len(), 3);
        assert_eq!(preview.metadata.num_rows, 3);
        assert_eq!(preview.first_rows[2][1], "null");

        let sales = &preview.column_stats[1];
        assert_eq!(sales.null_count, 1);
        assert_eq!(sales.numeric_count, 2);
        assert_eq!(sales.mean, Some(2.0));
    }
}
