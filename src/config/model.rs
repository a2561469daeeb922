// src/config/model.rs

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::deadline::{
    DEFAULT_KEY, DEFAULT_KEY_ATTRIBUTE, DEFAULT_TABLE, DEFAULT_VALUE_ATTRIBUTE, DeadlineKey,
};

/// Configuration as read from a TOML file, before validation.
///
/// ```toml
/// [store]
/// path = "/etc/blaker/store.toml"
/// table = "blaker_config"
/// key = "break_time"
///
/// [run]
/// wait = "30m"
/// ```
///
/// Every section and field is optional.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RawConfigFile {
    #[serde(default)]
    pub store: StoreSection,

    #[serde(default)]
    pub run: RunSection,
}

/// `[store]` section: where the break time lives.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreSection {
    /// Path of the TOML store document. `None` means no store is configured,
    /// which is only acceptable if one is given on the command line.
    #[serde(default)]
    pub path: Option<PathBuf>,

    #[serde(default = "default_table")]
    pub table: String,

    /// Attribute holding the item's name.
    #[serde(default = "default_key_attribute")]
    pub key_attribute: String,

    #[serde(default = "default_key")]
    pub key: String,

    /// Attribute holding the RFC 3339 timestamp.
    #[serde(default = "default_value_attribute")]
    pub value_attribute: String,
}

fn default_table() -> String {
    DEFAULT_TABLE.to_string()
}

fn default_key_attribute() -> String {
    DEFAULT_KEY_ATTRIBUTE.to_string()
}

fn default_key() -> String {
    DEFAULT_KEY.to_string()
}

fn default_value_attribute() -> String {
    DEFAULT_VALUE_ATTRIBUTE.to_string()
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: None,
            table: default_table(),
            key_attribute: default_key_attribute(),
            key: default_key(),
            value_attribute: default_value_attribute(),
        }
    }
}

/// `[run]` section.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct RunSection {
    /// Hard timeout for the command, e.g. `"30m"`. `"0s"` disables it.
    #[serde(default)]
    pub wait: Option<String>,
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub store_path: Option<PathBuf>,
    pub deadline_key: DeadlineKey,
    pub wait: Option<Duration>,
}

impl ConfigFile {
    pub(crate) fn new_unchecked(
        store_path: Option<PathBuf>,
        deadline_key: DeadlineKey,
        wait: Option<Duration>,
    ) -> Self {
        Self {
            store_path,
            deadline_key,
            wait,
        }
    }
}

impl Default for ConfigFile {
    fn default() -> Self {
        Self::new_unchecked(None, DeadlineKey::default(), None)
    }
}
