use super::{
    data::DataConfig,
    forecast::ForecastConfig,
    traits::{ConfigManifest, ConfigSection},
};
use crate::error::SalescastError;
use config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

pub const DEFAULT_CONFIG_FILE: &str = "salescast.toml";
pub const ENV_PREFIX: &str = "SALESCAST";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub data: DataConfig,
    pub forecast: ForecastConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), SalescastError> {
        self.data.validate()?;
        self.forecast.validate()?;
        Ok(())
    }

    pub fn manifests(&self) -> Vec<ConfigManifest> {
        vec![self.data.to_manifest(), self.forecast.to_manifest()]
    }
}

fn config_error(context: &str, e: impl std::fmt::Display) -> SalescastError {
    SalescastError::Configuration(format!("{}: {}", context, e))
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    /// Defaults, then the optional TOML file, then `SALESCAST_<SECTION>__<FIELD>` variables
    pub fn load_layered<P: AsRef<Path>>(path: P) -> Result<Self, SalescastError> {
        Self::load_with_env_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_env_prefix<P: AsRef<Path>>(path: P, env_prefix: &str) -> Result<Self, SalescastError> {
        let path = path.as_ref();
        let defaults = Config::try_from(&AppConfig::default())
            .map_err(|e| config_error("Failed to build defaults", e))?;

        let settings = Config::builder()
            .add_source(defaults)
            .add_source(File::from(path).format(FileFormat::Toml).required(false))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| config_error("Failed to load config", e))?;

        let config: AppConfig = settings
            .try_deserialize()
            .map_err(|e| config_error("Failed to parse config", e))?;
        config.validate()?;

        log::info!(
            "Configuration loaded (file: {}, present: {})",
            path.display(),
            path.exists()
        );
        Ok(Self {
            config: Arc::new(RwLock::new(config)),
        })
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SalescastError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| config_error("Failed to read config", e))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| config_error("Failed to parse config", e))?;

        config.validate()?;

        *self.config.write().unwrap_or_else(PoisonError::into_inner) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), SalescastError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| config_error("Failed to serialize", e))?;

        std::fs::write(path, toml_str)
            .map_err(|e| config_error("Failed to write config", e))?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// Apply `f` to a copy and keep it only if the result validates
    pub fn update<F>(&self, f: F) -> Result<(), SalescastError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.config.write().unwrap_or_else(PoisonError::into_inner);
        let mut candidate = config.clone();
        f(&mut candidate);
        candidate.validate()?;
        *config = candidate;
        Ok(())
    }
}
