mod csv;
mod types;
mod validator;

pub use csv::CsvConnector;
pub use types::{
    ColumnSelection,
    ColumnStats,
    DataPreview,
    DataSource,
    DatasetMetadata,
    RawTable,
};
pub use validator::DataValidator;
