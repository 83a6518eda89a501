pub mod data_selector;
pub mod column_selector;
pub mod breakdown_table;
pub mod forecast_table;
pub mod line_chart;

pub use data_selector::DataSelector;
pub use column_selector::ColumnSelector;
pub use breakdown_table::BreakdownTable;
pub use forecast_table::ForecastTable;
pub use line_chart::LineChart;
