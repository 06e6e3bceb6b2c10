use super::{
    coevolution::CoevolutionConfig, data::DataConfig, traits::ConfigSection,
    wrapper::WrapperConfig,
};
use crate::error::CcfsError;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment overrides, e.g. `CCFS__COEVOLUTION__ALPHA=0.9`.
pub const ENV_PREFIX: &str = "CCFS";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub coevolution: CoevolutionConfig,
    pub wrapper: WrapperConfig,
    pub data: DataConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), CcfsError> {
        self.coevolution.validate()?;
        self.wrapper.validate()?;
        self.data.validate()?;
        Ok(())
    }
}

fn env_source() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
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

    /// Load a TOML or JSON file (chosen by extension), apply environment
    /// overrides on top, validate and install the result.
    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CcfsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CcfsError::Configuration(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(env_source())
            .build()?
            .try_deserialize()?;

        self.install(config)
    }

    /// Defaults plus environment overrides, for runs without a config file.
    pub fn load_from_env(&self) -> Result<(), CcfsError> {
        let config: AppConfig = config::Config::builder()
            .add_source(env_source())
            .build()?
            .try_deserialize()?;

        self.install(config)
    }

    fn install(&self, config: AppConfig) -> Result<(), CcfsError> {
        config.validate()?;
        log::debug!("Configuration loaded: {:?}", config);
        *self.config.write().unwrap_or_else(|e| e.into_inner()) = config;
        Ok(())
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), CcfsError> {
        let config = self.get();
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| CcfsError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)?;

        Ok(())
    }

    pub fn get(&self) -> AppConfig {
        self.config.read().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Apply `f` to a copy of the configuration; the change is kept only if it validates.
    pub fn update<F>(&self, f: F) -> Result<(), CcfsError>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut guard = self.config.write().unwrap_or_else(|e| e.into_inner());
        let mut candidate = guard.clone();
        f(&mut candidate);
        candidate.validate()?;
        *guard = candidate;
        Ok(())
    }
}
