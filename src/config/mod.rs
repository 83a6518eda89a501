pub mod traits;
pub mod data;
pub mod forecast;
pub mod manager;

pub use manager::{ConfigManager, AppConfig, DEFAULT_CONFIG_FILE, ENV_PREFIX};
pub use data::DataConfig;
pub use forecast::ForecastConfig;
pub use traits::{ConfigSection, ConfigManifest, FieldManifest};
