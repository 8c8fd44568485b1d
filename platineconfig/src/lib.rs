//! # Platine Configuration Module
//!
//! This module provides configuration management for Platine, including:
//! - Loading configuration from YAML files
//! - Merging with embedded default configuration
//! - Environment variable overrides
//! - Type-safe getters and setters for configuration values
//! - Thread-safe singleton access pattern
//!
//! ## Usage
//!
//! ```no_run
//! use platineconfig::get_config;
//!
//! // Get the global configuration
//! let config = get_config();
//!
//! // Access configuration values
//! let period = config.get_poll_interval_ms();
//! let rfid = config.get_rfid_base_url();
//!
//! // Update configuration values
//! config.set_poll_interval_ms(1000)?;
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{anyhow, Result};
use dirs::home_dir;
use lazy_static::lazy_static;
use serde_yaml::{Mapping, Number, Value};
use std::{
    env, fs,
    path::Path,
    sync::{Arc, Mutex, MutexGuard},
};
use tracing::{info, warn};

// Configuration par défaut intégrée
const DEFAULT_CONFIG: &str = include_str!("platine.yaml");

lazy_static! {
    static ref CONFIG: Arc<Config> =
        Arc::new(Config::load_config("").expect("Failed to load Platine configuration"));
}

const ENV_CONFIG_DIR: &str = "PLATINE_CONFIG";
const ENV_PREFIX: &str = "PLATINE_CONFIG__";

// Default values for configuration
pub const DEFAULT_SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";
const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_POLL_INTERVAL_MS: u64 = 2_000;
const DEFAULT_CONVERGENCE_INTERVAL_MS: u64 = 1_000;
const DEFAULT_CONVERGENCE_MAX_ATTEMPTS: u64 = 15;
const DEFAULT_IGNORE_ZERO_VOLUME: bool = true;
const DEFAULT_RFID_ENABLED: bool = false;
const DEFAULT_RFID_POLL_INTERVAL_MS: u64 = 1_000;
const DEFAULT_DISK_DIAMETER: f64 = 400.0;
const DEFAULT_LABEL_RADIUS_RATIO: f64 = 0.35;
const DEFAULT_LOG_MIN_LEVEL: &str = "info";

/// Macro to generate getter/setter for u64 values with default
macro_rules! impl_u64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> u64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) if n.is_u64() => n.as_u64().unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or_else(|_| {
                    warn!(path = %$path.join("."), value = %s, "Invalid integer, using default");
                    $default
                }),
                _ => $default,
            }
        }

        pub fn $setter(&self, value: u64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for f64 values with default
macro_rules! impl_f64_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> f64 {
            match self.get_value($path) {
                Ok(Value::Number(n)) => n.as_f64().unwrap_or($default),
                Ok(Value::String(s)) => s.trim().parse().unwrap_or($default),
                _ => $default,
            }
        }

        pub fn $setter(&self, value: f64) -> Result<()> {
            self.set_value($path, Value::Number(Number::from(value)))
        }
    };
}

/// Macro to generate getter/setter for bool values with default
macro_rules! impl_bool_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> bool {
            match self.get_value($path) {
                Ok(Value::Bool(b)) => b,
                _ => $default,
            }
        }

        pub fn $setter(&self, value: bool) -> Result<()> {
            self.set_value($path, Value::Bool(value))
        }
    };
}

/// Macro to generate getter/setter for string values with default
macro_rules! impl_string_config {
    ($getter:ident, $setter:ident, $path:expr, $default:expr) => {
        pub fn $getter(&self) -> String {
            match self.get_value($path) {
                Ok(Value::String(s)) => s,
                _ => $default.to_string(),
            }
        }

        pub fn $setter(&self, value: impl Into<String>) -> Result<()> {
            self.set_value($path, Value::String(value.into()))
        }
    };
}

/// Configuration manager for Platine
///
/// This structure manages the application configuration, including:
/// - Loading configuration from YAML files
/// - Merging with default configuration
/// - Handling environment variable overrides
/// - Providing typed getters/setters for configuration values
///
/// # Examples
///
/// ```no_run
/// use platineconfig::get_config;
///
/// let config = get_config();
/// println!("Polling every {} ms", config.get_poll_interval_ms());
/// ```
#[derive(Debug)]
pub struct Config {
    config_dir: String,
    path: String,
    data: Mutex<Value>,
}

impl Config {
    /// Finds a config directory by trying different locations in order
    fn find_config_dir(directory: &str) -> String {
        // 1. Try provided directory
        if !directory.is_empty() {
            return directory.to_string();
        }

        // 2. Try environment variable
        if let Ok(env_path) = env::var(ENV_CONFIG_DIR) {
            info!(env_var=ENV_CONFIG_DIR, path=%env_path, "Trying to load config from env");
            return env_path;
        }

        // 3. Try current directory
        if Path::new(".platine").exists() {
            return ".platine".to_string();
        }

        // 4. Try home directory
        if let Some(home) = home_dir() {
            let home_config = home.join(".platine");
            if home_config.exists() {
                return home_config.to_string_lossy().to_string();
            }
        }

        ".platine".to_string()
    }

    /// Validates and prepares a config directory
    fn validate_config_dir(path: &Path) -> Result<()> {
        if !path.exists() {
            fs::create_dir_all(path)?;
        }

        if !path.is_dir() {
            return Err(anyhow!("Le chemin spécifié n'est pas un répertoire"));
        }

        // Test write permission
        let test_file = path.join(".write_test");
        fs::write(&test_file, b"test")?;
        fs::remove_file(&test_file)?;

        fs::read_dir(path)?;

        Ok(())
    }

    /// Determines and validates the configuration directory
    ///
    /// The directory is searched in the following order:
    /// 1. The provided `directory` parameter if not empty
    /// 2. The `PLATINE_CONFIG` environment variable
    /// 3. `.platine` in the current directory
    /// 4. `.platine` in the user's home directory
    ///
    /// The directory is created if it doesn't exist, and validated for read/write permissions.
    pub fn config_dir(directory: &str) -> Result<String> {
        let dir_path = Self::find_config_dir(directory);
        Self::validate_config_dir(Path::new(&dir_path))?;
        Ok(dir_path)
    }

    /// Loads the configuration from the specified directory
    ///
    /// This method:
    /// 1. Determines the configuration directory
    /// 2. Loads the default embedded configuration
    /// 3. Merges it with the external config.yaml file if present
    /// 4. Applies environment variable overrides
    /// 5. Saves the merged configuration
    ///
    /// # Arguments
    ///
    /// * `directory` - The directory containing the config.yaml file, or empty to use defaults
    pub fn load_config(directory: &str) -> Result<Self> {
        let config_dir = Self::config_dir(directory)?;
        info!(config_dir=%config_dir, "Using config directory");

        let config_file_path = Path::new(&config_dir).join("config.yaml");
        let path = config_file_path.to_string_lossy().to_string();

        let mut config_value = lower_keys_value(serde_yaml::from_str(DEFAULT_CONFIG)?);

        let yaml_data = if let Ok(data) = fs::read(&path) {
            info!(config_file=%path, "Loaded config file");
            data
        } else {
            info!(config_file=%path, "Config file not found, using default embedded config");
            DEFAULT_CONFIG.as_bytes().to_vec()
        };

        // Un fichier vide se désérialise en Null : on garde alors les défauts
        let external_value = lower_keys_value(serde_yaml::from_slice(&yaml_data)?);
        merge_yaml(&mut config_value, &external_value);

        apply_overrides(&mut config_value, env::vars());

        let config = Config {
            config_dir,
            path,
            data: Mutex::new(config_value),
        };

        config.save()?;
        Ok(config)
    }

    /// Returns the directory this configuration was loaded from
    pub fn dir(&self) -> &str {
        &self.config_dir
    }

    /// Returns the path of the config.yaml file backing this configuration
    pub fn file_path(&self) -> &str {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, Value>> {
        self.data
            .lock()
            .map_err(|_| anyhow!("Configuration lock poisoned"))
    }

    /// Saves the current configuration to the config.yaml file
    pub fn save(&self) -> Result<()> {
        let yaml = {
            let data = self.lock()?;
            serde_yaml::to_string(&*data)?
        };
        fs::write(&self.path, yaml)?;
        Ok(())
    }

    /// Sets a configuration value at the specified path and saves it
    ///
    /// # Arguments
    ///
    /// * `path` - Array of keys representing the path (e.g., `&["player", "poll_interval_ms"]`)
    /// * `value` - The YAML value to set
    pub fn set_value(&self, path: &[&str], value: Value) -> Result<()> {
        {
            let mut data = self.lock()?;
            set_value_internal(&mut data, path, value)?;
        }
        self.save()
    }

    /// Gets a configuration value at the specified path
    ///
    /// Returns an error if the path doesn't exist.
    pub fn get_value(&self, path: &[&str]) -> Result<Value> {
        let data = self.lock()?;
        get_value_internal(&data, path)
    }

    impl_string_config!(
        get_spotify_api_base,
        set_spotify_api_base,
        &["spotify", "api_base"],
        DEFAULT_SPOTIFY_API_BASE
    );

    impl_string_config!(
        get_spotify_access_token,
        set_spotify_access_token,
        &["spotify", "access_token"],
        ""
    );

    impl_u64_config!(
        get_request_timeout_ms,
        set_request_timeout_ms,
        &["spotify", "request_timeout_ms"],
        DEFAULT_REQUEST_TIMEOUT_MS
    );

    impl_u64_config!(
        get_poll_interval_ms,
        set_poll_interval_ms,
        &["player", "poll_interval_ms"],
        DEFAULT_POLL_INTERVAL_MS
    );

    impl_u64_config!(
        get_convergence_interval_ms,
        set_convergence_interval_ms,
        &["player", "convergence", "interval_ms"],
        DEFAULT_CONVERGENCE_INTERVAL_MS
    );

    impl_u64_config!(
        get_convergence_max_attempts,
        set_convergence_max_attempts,
        &["player", "convergence", "max_attempts"],
        DEFAULT_CONVERGENCE_MAX_ATTEMPTS
    );

    impl_bool_config!(
        get_ignore_zero_volume,
        set_ignore_zero_volume,
        &["player", "volume", "ignore_zero"],
        DEFAULT_IGNORE_ZERO_VOLUME
    );

    impl_bool_config!(
        get_rfid_enabled,
        set_rfid_enabled,
        &["rfid", "enabled"],
        DEFAULT_RFID_ENABLED
    );

    impl_string_config!(get_rfid_base_url, set_rfid_base_url, &["rfid", "base_url"], "");

    impl_u64_config!(
        get_rfid_poll_interval_ms,
        set_rfid_poll_interval_ms,
        &["rfid", "poll_interval_ms"],
        DEFAULT_RFID_POLL_INTERVAL_MS
    );

    impl_f64_config!(
        get_disk_diameter,
        set_disk_diameter,
        &["disk", "diameter"],
        DEFAULT_DISK_DIAMETER
    );

    impl_f64_config!(
        get_label_radius_ratio,
        set_label_radius_ratio,
        &["disk", "label_radius_ratio"],
        DEFAULT_LABEL_RADIUS_RATIO
    );

    impl_string_config!(
        get_log_min_level,
        set_log_min_level,
        &["host", "logger", "min_level"],
        DEFAULT_LOG_MIN_LEVEL
    );
}

/// Returns the global configuration instance
///
/// The instance is lazily loaded on first access.
pub fn get_config() -> Arc<Config> {
    CONFIG.clone()
}

fn set_value_internal(data: &mut Value, path: &[&str], value: Value) -> Result<()> {
    if path.is_empty() {
        *data = value;
        return Ok(());
    }
    if let Value::Mapping(map) = data {
        let key_value = Value::String(path[0].to_lowercase());
        if path.len() == 1 {
            map.insert(key_value, value);
        } else {
            let entry = map
                .entry(key_value)
                .or_insert(Value::Mapping(Mapping::new()));
            set_value_internal(entry, &path[1..], value)?;
        }
        Ok(())
    } else {
        Err(anyhow!("Current node is not a map"))
    }
}

fn get_value_internal(data: &Value, path: &[&str]) -> Result<Value> {
    let mut current = data;
    for (i, key) in path.iter().enumerate() {
        if let Value::Mapping(map) = current {
            match map.get(&Value::String(key.to_lowercase())) {
                Some(next) => current = next,
                None => return Err(anyhow!("Path {} does not exist", path[..=i].join("."))),
            }
        } else {
            return Err(anyhow!("Path {} is not a Config", path[..i].join(".")));
        }
    }
    Ok(current.clone())
}

/// Applique les surcharges `PLATINE_CONFIG__A__B=valeur`
fn apply_overrides<I>(config: &mut Value, vars: I)
where
    I: IntoIterator<Item = (String, String)>,
{
    for (key, value) in vars {
        if let Some(stripped) = key.strip_prefix(ENV_PREFIX) {
            let key_path = stripped.split("__").collect::<Vec<_>>();
            let yaml_value = convert_env_value(&value);
            if let Err(err) = set_value_internal(config, &key_path, yaml_value) {
                warn!(variable = %key, "Ignoring environment override: {}", err);
            }
        }
    }
}

fn convert_env_value(value: &str) -> Value {
    match serde_yaml::from_str::<Value>(value) {
        Ok(Value::Null) if !value.trim().is_empty() => Value::String(value.to_string()),
        Ok(parsed) => parsed,
        Err(_) => Value::String(value.to_string()),
    }
}

fn lower_keys_value(value: Value) -> Value {
    match value {
        Value::Mapping(map) => {
            let mut new_map = Mapping::new();
            for (k, v) in map {
                let new_key = match k {
                    Value::String(s) => Value::String(s.to_lowercase()),
                    other => other,
                };
                new_map.insert(new_key, lower_keys_value(v));
            }
            Value::Mapping(new_map)
        }
        Value::Sequence(seq) => Value::Sequence(seq.into_iter().map(lower_keys_value).collect()),
        _ => value,
    }
}

/// Merges external YAML configuration into default configuration
///
/// - For mappings (objects), it merges keys from external into default
/// - For scalars and sequences, external values replace default values
/// - A null external document leaves the defaults untouched
fn merge_yaml(default: &mut Value, external: &Value) {
    match (default, external) {
        (_, Value::Null) => {}
        (Value::Mapping(dmap), Value::Mapping(emap)) => {
            for (k, v) in emap {
                match dmap.get_mut(k) {
                    Some(dv) => merge_yaml(dv, v),
                    None => {
                        dmap.insert(k.clone(), v.clone());
                    }
                }
            }
        }
        (d, e) => *d = e.clone(), // pour les scalaires ou séquences, on remplace
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn load_in(dir: &tempfile::TempDir) -> Config {
        Config::load_config(dir.path().to_str().unwrap()).unwrap()
    }

    #[test]
    fn test_defaults_from_embedded_config() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);

        assert_eq!(config.get_spotify_api_base(), DEFAULT_SPOTIFY_API_BASE);
        assert_eq!(config.get_poll_interval_ms(), 2000);
        assert_eq!(config.get_convergence_interval_ms(), 1000);
        assert_eq!(config.get_convergence_max_attempts(), 15);
        assert!(config.get_ignore_zero_volume());
        assert!(!config.get_rfid_enabled());
        assert_eq!(config.get_rfid_poll_interval_ms(), 1000);
        assert!((config.get_label_radius_ratio() - 0.35).abs() < f64::EPSILON);
        assert!(dir.path().join("config.yaml").exists());
    }

    #[test]
    fn test_external_file_is_merged() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join("config.yaml"),
            "Player:\n  Poll_Interval_Ms: 5000\nrfid:\n  base_url: http://10.0.0.7\n",
        )
        .unwrap();

        let config = load_in(&dir);

        assert_eq!(config.get_poll_interval_ms(), 5000);
        assert_eq!(config.get_rfid_base_url(), "http://10.0.0.7");
        // Les clés absentes du fichier gardent leur valeur par défaut
        assert_eq!(config.get_convergence_max_attempts(), 15);
    }

    #[test]
    fn test_set_value_is_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);
        config.set_poll_interval_ms(1000).unwrap();
        config.set_spotify_access_token("token-xyz").unwrap();

        let reloaded = load_in(&dir);
        assert_eq!(reloaded.get_poll_interval_ms(), 1000);
        assert_eq!(reloaded.get_spotify_access_token(), "token-xyz");
    }

    #[test]
    fn test_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_in(&dir);
        assert!(config.get_value(&["nope", "missing"]).is_err());
    }

    #[test]
    fn test_overrides_from_variables() {
        let mut value: Value = serde_yaml::from_str(DEFAULT_CONFIG).unwrap();
        apply_overrides(
            &mut value,
            vec![
                (
                    "PLATINE_CONFIG__PLAYER__POLL_INTERVAL_MS".to_string(),
                    "1500".to_string(),
                ),
                ("PLATINE_CONFIG__RFID__ENABLED".to_string(), "true".to_string()),
                ("UNRELATED".to_string(), "x".to_string()),
            ],
        );

        assert_eq!(
            get_value_internal(&value, &["player", "poll_interval_ms"]).unwrap(),
            Value::Number(Number::from(1500u64))
        );
        assert_eq!(
            get_value_internal(&value, &["rfid", "enabled"]).unwrap(),
            Value::Bool(true)
        );
    }

    #[test]
    fn test_merge_yaml_replaces_scalars_and_keeps_siblings() {
        let mut default: Value = serde_yaml::from_str("a:\n  b: 1\n  c: 2\n").unwrap();
        let external: Value = serde_yaml::from_str("a:\n  b: 10\n").unwrap();
        merge_yaml(&mut default, &external);

        assert_eq!(
            get_value_internal(&default, &["a", "b"]).unwrap(),
            Value::Number(Number::from(10))
        );
        assert_eq!(
            get_value_internal(&default, &["a", "c"]).unwrap(),
            Value::Number(Number::from(2))
        );
    }
}
