use super::traits::{ConfigSection, ConfigManifest, FieldManifest};
use crate::error::SalescastError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Dataset used when nothing is uploaded, relative to the working directory
    pub default_dataset: PathBuf,
    pub min_length: usize,
    pub default_time_column: String,
    pub default_value_column: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            default_dataset: PathBuf::from("data/sales.csv"),
            min_length: 30,
            default_time_column: "Date".to_string(),
            default_value_column: "Sales".to_string(),
        }
    }
}

impl ConfigSection for DataConfig {
    fn section_name() -> &'static str {
        "data"
    }

    fn validate(&self) -> Result<(), SalescastError> {
        if self.default_dataset.as_os_str().is_empty() {
            return Err(SalescastError::Configuration(
                "Default dataset path must not be empty".to_string()
            ));
        }
        if self.min_length < 2 {
            return Err(SalescastError::Configuration(
                "Minimum series length must be at least 2".to_string()
            ));
        }
        if self.default_time_column.trim().is_empty() || self.default_value_column.trim().is_empty() {
            return Err(SalescastError::Configuration(
                "Default column names must not be blank".to_string()
            ));
        }
        Ok(())
    }

    fn to_manifest(&self) -> ConfigManifest {
        ConfigManifest {
            section: "Data".to_string(),
            fields: vec![
                FieldManifest::new(
                    "default_dataset",
                    "path",
                    serde_json::json!(self.default_dataset.display().to_string()),
                    "CSV file loaded when no file is uploaded",
                ),
                FieldManifest::new(
                    "min_length",
                    "integer",
                    serde_json::json!(self.min_length),
                    "Minimum number of clean rows required to fit",
                )
                .with_range(2.0, 100_000.0),
                FieldManifest::new(
                    "default_time_column",
                    "string",
                    serde_json::json!(self.default_time_column),
                    "Preferred time column",
                ),
                FieldManifest::new(
                    "default_value_column",
                    "string",
                    serde_json::json!(self.default_value_column),
                    "Preferred value column",
                ),
            ],
        }
    }
}
