// src/config/loader.rs

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::model::{ConfigFile, RawConfigFile};
use crate::errors::Result;

/// Environment variable naming the config file when `--config` is absent.
pub const CONFIG_ENV: &str = "BLAKER_CONFIG";

/// Load a configuration file from a given path and return the raw `RawConfigFile`.
///
/// This only performs TOML deserialization; use [`load_and_validate`] for the
/// semantic checks.
pub fn load_from_path(path: impl AsRef<Path>) -> Result<RawConfigFile> {
    let path = path.as_ref();
    let contents = fs::read_to_string(path)?;

    let config: RawConfigFile = toml::from_str(&contents)?;

    Ok(config)
}

/// Load a configuration file from path and validate it.
pub fn load_and_validate(path: impl AsRef<Path>) -> Result<ConfigFile> {
    let raw_config = load_from_path(&path)?;
    let config = ConfigFile::try_from(raw_config)?;
    Ok(config)
}

/// `blaker.toml` in the current working directory.
pub fn default_config_path() -> PathBuf {
    PathBuf::from("blaker.toml")
}

/// Pick the config file to load.
///
/// An explicit path (flag or `BLAKER_CONFIG`) is always returned, so a typo
/// surfaces as a read error. The default path is only used if it exists.
pub fn resolve_config_path(explicit: Option<&Path>, env_value: Option<String>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_value.filter(|v| !v.trim().is_empty()) {
        return Some(PathBuf::from(path));
    }
    let default = default_config_path();
    default.is_file().then_some(default)
}

/// Load the resolved config, or fall back to defaults when there is none.
pub fn load_or_default(explicit: Option<&Path>) -> Result<ConfigFile> {
    match resolve_config_path(explicit, std::env::var(CONFIG_ENV).ok()) {
        Some(path) => load_and_validate(path),
        None => Ok(ConfigFile::default()),
    }
}
