//! Configuration Loader
//!
//! Environment-aware loading: a base `pipeline.yaml`, an optional
//! `pipeline.<environment>.yaml` overlay, then `PIPELINE__SECTION__KEY`
//! environment variables, merged in that order by the `config` crate.

use super::error::{ConfigResult, ConfigurationError};
use super::PipelineConfig;
use crate::cache::EvictionPolicy;
use config::{Config, Environment, File, FileFormat};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

const CONFIG_FILE_NAMES: [&str; 2] = ["pipeline.yaml", "pipeline.yml"];
const ENV_PREFIX: &str = "PIPELINE";
const ENV_SEPARATOR: &str = "__";

/// Loaded configuration together with where it came from
#[derive(Debug)]
pub struct ConfigManager {
    config: PipelineConfig,
    environment: String,
    config_directory: PathBuf,
}

impl ConfigManager {
    /// Load configuration with environment auto-detection
    pub fn load() -> ConfigResult<Arc<ConfigManager>> {
        Self::load_from_directory(None)
    }

    /// Load configuration from a specific directory
    pub fn load_from_directory(config_dir: Option<PathBuf>) -> ConfigResult<Arc<ConfigManager>> {
        let environment = Self::detect_environment();
        Self::load_from_directory_with_env(config_dir, &environment)
    }

    /// Load configuration from a specific directory with explicit environment
    /// This is useful for testing without modifying global environment variables
    pub fn load_from_directory_with_env(
        config_dir: Option<PathBuf>,
        environment: &str,
    ) -> ConfigResult<Arc<ConfigManager>> {
        Self::load_with_overrides(config_dir, environment, None)
    }

    /// Load with an explicit variable map standing in for the process environment
    pub(crate) fn load_with_overrides(
        config_dir: Option<PathBuf>,
        environment: &str,
        overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<Arc<ConfigManager>> {
        let config_directory = config_dir.unwrap_or_else(Self::default_config_directory);

        debug!(
            "Loading configuration for environment '{}' from directory: {}",
            environment,
            config_directory.display()
        );

        let config = Self::load_and_merge_config(&config_directory, environment, overrides)?;
        config.validate()?;

        info!(
            environment = %environment,
            max_attempts = config.retry.max_attempts,
            max_requests_per_window = config.rate_limit.max_requests_per_window,
            cache_max_entries = config.cache.max_entries,
            cache_policy = %config.cache.eviction_policy,
            "Configuration loaded successfully"
        );

        Ok(Arc::new(ConfigManager {
            config,
            environment: environment.to_string(),
            config_directory,
        }))
    }

    /// Get the loaded configuration
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Get the current environment
    pub fn environment(&self) -> &str {
        &self.environment
    }

    /// Get the configuration directory
    pub fn config_directory(&self) -> &Path {
        &self.config_directory
    }

    /// Detect current environment: PIPELINE_ENV || APP_ENV || 'development'
    pub fn detect_environment() -> String {
        env::var("PIPELINE_ENV")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string())
            .to_lowercase()
    }

    fn default_config_directory() -> PathBuf {
        env::var("PIPELINE_CONFIG_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config"))
    }

    fn find_config_file(config_directory: &Path) -> ConfigResult<PathBuf> {
        let mut searched_paths = Vec::new();

        for name in CONFIG_FILE_NAMES {
            let config_path = config_directory.join(name);
            searched_paths.push(config_path.clone());

            if config_path.is_file() {
                debug!("Found configuration file: {}", config_path.display());
                return Ok(config_path);
            }
        }

        Err(ConfigurationError::config_file_not_found(searched_paths))
    }

    fn load_and_merge_config(
        config_directory: &Path,
        environment: &str,
        overrides: Option<HashMap<String, String>>,
    ) -> ConfigResult<PipelineConfig> {
        let config_file = Self::find_config_file(config_directory)?;
        let env_file = config_directory.join(format!("pipeline.{environment}.yaml"));

        if env_file.is_file() {
            debug!(
                "Applying environment-specific overrides from: {}",
                env_file.display()
            );
        }

        let settings = Config::builder()
            .add_source(File::from(config_file.clone()).format(FileFormat::Yaml))
            .add_source(
                File::from(env_file)
                    .format(FileFormat::Yaml)
                    .required(false),
            )
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator(ENV_SEPARATOR)
                    .try_parsing(true)
                    .source(overrides),
            )
            .build()
            .map_err(|e| ConfigurationError::invalid_yaml(config_file.display().to_string(), e))?;

        // Report an unknown policy against its field
        if let Ok(policy) = settings.get_string("cache.eviction_policy") {
            if policy.parse::<EvictionPolicy>().is_err() {
                return Err(ConfigurationError::invalid_value(
                    "cache.eviction_policy",
                    policy,
                    "expected one of lru, lfu, fifo",
                ));
            }
        }

        settings
            .try_deserialize()
            .map_err(|e| ConfigurationError::environment_config_error(environment, e))
    }
}
