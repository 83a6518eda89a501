//! Sales forecasting: load a CSV, pick a time and value column, clean the
//! series and forecast it with ARIMA.

pub mod config;
pub mod data;
pub mod engines;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod ui;

pub use error::{Result, SalescastError};
pub use pipeline::{ForecastPipeline, ForecastReport, ForecastRequest};
