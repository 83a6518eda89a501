pub mod config_bridge;
pub mod data_loader;
pub mod forecast_runner;

pub use config_bridge::ConfigBridge;
pub use data_loader::DataLoader;
pub use forecast_runner::{ForecastRunner, ProgressUpdate};
