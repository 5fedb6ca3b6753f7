mod loader;
pub mod value;

use std::collections::HashMap;
use std::path::Path;

pub use value::{ConfigValue, FromConfigValue};

/// Prefix of environment variables overlaid on the file configuration.
pub const ENV_PREFIX: &str = "APIDOC_";

/// Error type for configuration operations.
#[derive(Debug)]
pub enum ConfigError {
    /// The requested key was not found in the configuration.
    NotFound(String),
    /// The value could not be converted to the requested type.
    TypeMismatch { key: String, expected: &'static str },
    /// An I/O or YAML parsing error occurred while loading config files.
    Load(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::NotFound(key) => write!(f, "Config key not found: {key}"),
            ConfigError::TypeMismatch { key, expected } => {
                write!(f, "Config type mismatch for '{key}': expected {expected}")
            }
            ConfigError::Load(msg) => write!(f, "Config load error: {msg}"),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Configuration loaded from a YAML file, `.env` files and environment variables.
///
/// Resolution order (lowest to highest priority):
/// 1. the YAML file given to [`ApidocConfig::load`]
/// 2. `.env` file (loaded into the process environment)
/// 3. environment variables prefixed with `APIDOC_`
///    (`APIDOC_OPENAPI_TITLE` overrides `openapi.title`)
///
/// `.env` files never overwrite already-set environment variables.
#[derive(Debug, Clone, Default)]
pub struct ApidocConfig {
    values: HashMap<String, ConfigValue>,
}

impl ApidocConfig {
    /// Load configuration from `path`, then overlay `.env` and environment
    /// variables. A missing file yields an environment-only configuration.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut values = HashMap::new();
        loader::load_yaml_file(path, &mut values)?;

        let _ = dotenvy::dotenv();
        overlay_env(&mut values, std::env::vars());

        tracing::debug!(path = %path.display(), keys = values.len(), "Configuration loaded");
        Ok(Self { values })
    }

    /// Create a config from a YAML string, without environment overlay.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, ConfigError> {
        let mut values = HashMap::new();
        loader::load_yaml_str(yaml, &mut values)?;
        Ok(Self { values })
    }

    /// Create an empty config.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Set a value programmatically.
    pub fn set(&mut self, key: &str, value: ConfigValue) {
        self.values.insert(key.to_string(), value);
    }

    /// Overlay `APIDOC_`-prefixed variables from `vars` on top of the current values.
    pub fn overlay_env(&mut self, vars: impl IntoIterator<Item = (String, String)>) {
        overlay_env(&mut self.values, vars);
    }

    /// Get a typed value for the given dot-separated key.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound` if the key does not exist, or
    /// `ConfigError::TypeMismatch` if the value cannot be converted.
    pub fn get<V: FromConfigValue>(&self, key: &str) -> Result<V, ConfigError> {
        let value = self
            .values
            .get(key)
            .ok_or_else(|| ConfigError::NotFound(key.to_string()))?;
        V::from_config_value(value, key)
    }

    /// Get a typed value, or `None` when the key is missing.
    ///
    /// A present key whose value cannot be converted is still an error.
    pub fn get_opt<V: FromConfigValue>(&self, key: &str) -> Result<Option<V>, ConfigError> {
        match self.values.get(key) {
            Some(value) => V::from_config_value(value, key).map(Some),
            None => Ok(None),
        }
    }

    /// Get a typed value, returning a default if the key is missing or invalid.
    pub fn get_or<V: FromConfigValue>(&self, key: &str, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Check whether a key exists in the config.
    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }
}

// Convention: `APIDOC_OPENAPI_TITLE` <-> `openapi.title`
fn overlay_env(
    values: &mut HashMap<String, ConfigValue>,
    vars: impl IntoIterator<Item = (String, String)>,
) {
    for (env_key, env_val) in vars {
        if let Some(rest) = env_key.strip_prefix(ENV_PREFIX) {
            let config_key = rest.to_lowercase().replace('_', ".");
            values.insert(config_key, ConfigValue::String(env_val));
        }
    }
}
