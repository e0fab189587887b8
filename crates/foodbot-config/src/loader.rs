//! Configuration loading utilities

use crate::schema::Config;
use foodbot_common::{FoodbotError, Result as FoodbotResult};
use std::env;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info};

/// Environment variable naming an explicit configuration file.
pub const CONFIG_PATH_VAR: &str = "FOODBOT_CONFIG_PATH";

/// Configuration file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "foodbot.yaml";

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O error when reading configuration file
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML configuration: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("Failed to parse TOML configuration: {0}")]
    TomlError(#[from] toml::de::Error),

    /// File extension is neither YAML nor TOML
    #[error("Unsupported configuration format: {0}")]
    UnsupportedFormat(String),

    /// Configuration validation error
    #[error("Configuration validation failed: {0}")]
    ValidationError(#[source] FoodbotError),

    /// Environment variable parsing error
    #[error("Failed to parse environment variable '{var}': {source}")]
    EnvParseError {
        /// Name of the variable
        var: String,
        /// Parse failure
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

impl From<ConfigError> for FoodbotError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::ValidationError(inner) => inner,
            other => Self::config(other.to_string()),
        }
    }
}

/// File formats understood by the loader.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// `.yaml` or `.yml`
    Yaml,
    /// `.toml`
    Toml,
}

impl ConfigFormat {
    /// Picks the format from a file extension.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("yaml" | "yml") => Ok(Self::Yaml),
            Some("toml") => Ok(Self::Toml),
            _ => Err(ConfigError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Configuration loader for the application
pub struct ConfigLoader;

impl ConfigLoader {
    /// Parses configuration text without touching the environment.
    pub fn parse(content: &str, format: ConfigFormat) -> Result<Config, ConfigError> {
        let config = match format {
            ConfigFormat::Yaml => serde_yaml::from_str(content)?,
            ConfigFormat::Toml => toml::from_str(content)?,
        };
        Ok(config)
    }

    /// Load configuration from a YAML or TOML file with environment variable overrides
    pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        Self::load_config_with(path, |var| env::var(var).ok())
    }

    /// Same as [`ConfigLoader::load_config`] with an explicit variable lookup.
    pub fn load_config_with<P, F>(path: P, lookup: F) -> Result<Config, ConfigError>
    where
        P: AsRef<Path>,
        F: Fn(&str) -> Option<String>,
    {
        let path = path.as_ref();
        let format = ConfigFormat::from_path(path)?;
        let content = std::fs::read_to_string(path)?;
        let mut config = Self::parse(&content, format)?;
        debug!(path = %path.display(), ?format, "Parsed configuration file");

        Self::apply_overrides_from(&mut config, lookup)?;
        config.validate().map_err(ConfigError::ValidationError)?;

        Ok(config)
    }

    /// Load configuration from an explicit path, the environment, or defaults
    pub fn load(path: Option<&Path>) -> FoodbotResult<Config> {
        let config = match Self::resolve_path(path) {
            Some(config_path) => {
                info!(path = %config_path.display(), "Loading configuration");
                Self::load_config(&config_path)?
            }
            None => {
                info!("No configuration file found, using defaults");
                let mut config = Config::default();
                Self::apply_env_overrides(&mut config)?;
                config.validate()?;
                config
            }
        };

        Ok(config)
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> FoodbotResult<Config> {
        Ok(Self::load_config(path)?)
    }

    fn resolve_path(path: Option<&Path>) -> Option<PathBuf> {
        if let Some(path) = path {
            return Some(path.to_path_buf());
        }
        if let Ok(config_path) = env::var(CONFIG_PATH_VAR) {
            return Some(PathBuf::from(config_path));
        }
        let fallback = Path::new(DEFAULT_CONFIG_FILE);
        fallback.exists().then(|| fallback.to_path_buf())
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(config: &mut Config) -> Result<(), ConfigError> {
        Self::apply_overrides_from(config, |var| env::var(var).ok())
    }

    /// Apply overrides using `lookup` in place of the process environment.
    pub fn apply_overrides_from<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Telegram configuration overrides
        if let Some(token) = lookup("FOODBOT_TELEGRAM_TOKEN").or_else(|| lookup("TELEGRAM_TOKEN")) {
            config.telegram.token = token;
        }

        if let Some(debug) = lookup("FOODBOT_TELEGRAM_DEBUG") {
            config.telegram.debug = parse_var("FOODBOT_TELEGRAM_DEBUG", &debug)?;
        }

        // Database configuration overrides
        if let Some(path) = lookup("FOODBOT_DATABASE_PATH") {
            config.database.path = path;
        }

        if let Some(max_connections) = lookup("FOODBOT_DATABASE_MAX_CONNECTIONS") {
            config.database.max_connections =
                parse_var("FOODBOT_DATABASE_MAX_CONNECTIONS", &max_connections)?;
        }

        // Dialogue configuration overrides
        if let Some(recent) = lookup("FOODBOT_RECENT_PRODUCTS") {
            config.dialogue.recent_products = parse_var("FOODBOT_RECENT_PRODUCTS", &recent)?;
        }

        if let Some(offset) = lookup("FOODBOT_TIMEZONE_OFFSET") {
            config.dialogue.default_timezone_offset_seconds =
                parse_var("FOODBOT_TIMEZONE_OFFSET", &offset)?;
        }

        // Logging configuration overrides
        if let Some(level) = lookup("FOODBOT_LOG_LEVEL") {
            config.logging.level = level;
        }

        if let Some(json) = lookup("FOODBOT_LOG_JSON") {
            config.logging.json = parse_var("FOODBOT_LOG_JSON", &json)?;
        }

        if let Some(directory) = lookup("FOODBOT_LOG_DIR") {
            config.logging.directory = Some(directory);
        }

        Ok(())
    }
}

fn parse_var<T>(var: &str, value: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value.trim().parse().map_err(|e| ConfigError::EnvParseError {
        var: var.to_string(),
        source: Box::new(e),
    })
}
