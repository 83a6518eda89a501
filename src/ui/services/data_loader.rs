use crate::data::{CsvConnector, DataPreview, DataSource, DataValidator, RawTable};
use crate::error::LoadError;
use std::path::Path;

pub struct DataLoader;

impl DataLoader {
    /// Load a source and build its preview
    pub fn load(connector: &CsvConnector, source: &DataSource) -> Result<(RawTable, DataPreview), LoadError> {
        let table = connector.load(source)?;
        let preview = CsvConnector::create_preview(source, &table);
        Ok((table, preview))
    }

    /// Read a picked file as an upload
    pub fn read_upload(path: &Path) -> Result<DataSource, LoadError> {
        let bytes = std::fs::read(path).map_err(|e| {
            LoadError::Unreadable(format!("Failed to read '{}': {}", path.display(), e))
        })?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.csv".to_string());
        Ok(DataSource::Upload { name, bytes })
    }

    /// Column pair to preselect after a load, when the current one does not fit
    pub fn suggest_columns(
        table: &RawTable,
        time_column: &str,
        value_column: &str,
    ) -> Option<(String, String)> {
        if DataValidator::resolve(table, time_column, value_column).is_ok() {
            return None;
        }
        DataValidator::suggest(table, time_column, value_column)
    }
}
