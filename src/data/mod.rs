pub mod cache;
pub mod cleaner;
pub mod connectors;
pub mod timestamp;

pub use cache::ModelCache;
pub use cleaner::{CleanReport, CleanSeries, SeriesCleaner};
pub use connectors::{
    ColumnSelection,
    CsvConnector,
    DataPreview,
    DataSource,
    DataValidator,
    DatasetMetadata,
    RawTable,
};
