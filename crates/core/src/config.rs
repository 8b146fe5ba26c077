use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

/// Runtime configuration for the catalog store. Loaded from an optional TOML
/// file, then overridden by `KARDEX_*` environment variables, then by
/// explicit programmatic overrides.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StoreConfig {
    /// Path of the JSON data file. Absence of the file means an empty catalog.
    pub data_path: PathBuf,
    /// When true, saves go through a temp file and rename so a failed write
    /// can never truncate a previously valid catalog.
    pub atomic_writes: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            store: StoreConfig { data_path: PathBuf::from("products.json"), atomic_writes: true },
            logging: LoggingConfig { level: "info".to_string() },
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub data_path: Option<PathBuf>,
    pub atomic_writes: Option<bool>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    #[serde(default)]
    store: StorePatch,
    #[serde(default)]
    logging: LoggingPatch,
}

#[derive(Debug, Default, Deserialize)]
struct StorePatch {
    data_path: Option<PathBuf>,
    atomic_writes: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
}

const ENV_DATA_PATH: &str = "KARDEX_DATA_PATH";
const ENV_ATOMIC_WRITES: &str = "KARDEX_ATOMIC_WRITES";
const ENV_LOG_LEVEL: &str = "KARDEX_LOG_LEVEL";

impl CatalogConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(path) = options.config_path.as_deref() {
            if path.exists() {
                config.apply_patch(read_patch(path)?);
            } else if options.require_file {
                return Err(ConfigError::MissingConfigFile(path.to_path_buf()));
            }
        }

        config.apply_env()?;
        config.apply_overrides(options.overrides);
        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(data_path) = patch.store.data_path {
            self.store.data_path = data_path;
        }
        if let Some(atomic_writes) = patch.store.atomic_writes {
            self.store.atomic_writes = atomic_writes;
        }
        if let Some(level) = patch.logging.level {
            self.logging.level = level;
        }
    }

    fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(value) = env::var(ENV_DATA_PATH) {
            self.store.data_path = PathBuf::from(value);
        }
        if let Ok(value) = env::var(ENV_ATOMIC_WRITES) {
            self.store.atomic_writes = parse_bool(ENV_ATOMIC_WRITES, &value)?;
        }
        if let Ok(value) = env::var(ENV_LOG_LEVEL) {
            self.logging.level = value;
        }
        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(data_path) = overrides.data_path {
            self.store.data_path = data_path;
        }
        if let Some(atomic_writes) = overrides.atomic_writes {
            self.store.atomic_writes = atomic_writes;
        }
        if let Some(level) = overrides.log_level {
            self.logging.level = level;
        }
    }
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;
    toml::from_str(&raw)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn parse_bool(key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" => Ok(true),
        "false" | "0" | "no" => Ok(false),
        _ => Err(ConfigError::InvalidEnvOverride {
            key: key.to_string(),
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use std::env;
    use std::fs;
    use std::path::PathBuf;
    use std::sync::{Mutex, OnceLock};

    use tempfile::TempDir;

    use super::{CatalogConfig, ConfigError, ConfigOverrides, LoadOptions};

    static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

    fn env_lock() -> &'static Mutex<()> {
        ENV_LOCK.get_or_init(|| Mutex::new(()))
    }

    fn clear_vars() {
        for var in ["KARDEX_DATA_PATH", "KARDEX_ATOMIC_WRITES", "KARDEX_LOG_LEVEL"] {
            env::remove_var(var);
        }
    }

    #[test]
    fn defaults_apply_without_file_or_env() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        let config = CatalogConfig::load(LoadOptions::default()).expect("load defaults");

        assert_eq!(config.store.data_path, PathBuf::from("products.json"));
        assert!(config.store.atomic_writes);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn file_values_override_defaults() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        let dir = TempDir::new().expect("temp dir");
        let path = dir.path().join("kardex.toml");
        fs::write(
            &path,
            r#"
[store]
data_path = "data/catalog.json"
atomic_writes = false

[logging]
level = "debug"
"#,
        )
        .expect("write config");

        let config =
            CatalogConfig::load(LoadOptions { config_path: Some(path), ..LoadOptions::default() })
                .expect("load from file");

        assert_eq!(config.store.data_path, PathBuf::from("data/catalog.json"));
        assert!(!config.store.atomic_writes);
        assert_eq!(config.logging.level, "debug");
    }

    #[test]
    fn env_overrides_beat_file_and_programmatic_beats_env() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        env::set_var("KARDEX_DATA_PATH", "/tmp/env.json");
        env::set_var("KARDEX_LOG_LEVEL", "warn");

        let result = CatalogConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                log_level: Some("trace".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });
        clear_vars();

        let config = result.expect("load with env");
        assert_eq!(config.store.data_path, PathBuf::from("/tmp/env.json"));
        assert_eq!(config.logging.level, "trace");
    }

    #[test]
    fn malformed_bool_override_is_rejected() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();
        env::set_var("KARDEX_ATOMIC_WRITES", "maybe");

        let result = CatalogConfig::load(LoadOptions::default());
        clear_vars();

        assert!(matches!(result, Err(ConfigError::InvalidEnvOverride { .. })));
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let _guard = env_lock().lock().expect("env lock");
        clear_vars();

        let result = CatalogConfig::load(LoadOptions {
            config_path: Some(PathBuf::from("/nonexistent/kardex.toml")),
            require_file: true,
            ..LoadOptions::default()
        });

        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }
}
