// src/config/validate.rs

use crate::config::duration::parse_duration;
use crate::config::model::{ConfigFile, RawConfigFile};
use crate::deadline::DeadlineKey;
use crate::errors::{BlakerError, Result};

impl TryFrom<RawConfigFile> for ConfigFile {
    type Error = crate::errors::BlakerError;

    fn try_from(raw: RawConfigFile) -> std::result::Result<Self, Self::Error> {
        validate_store_names(&raw)?;
        let wait = validate_wait(&raw)?;

        let store = raw.store;
        let key = DeadlineKey {
            table: store.table,
            key_attribute: store.key_attribute,
            key: store.key,
            value_attribute: store.value_attribute,
        };

        Ok(ConfigFile::new_unchecked(store.path, key, wait))
    }
}

fn validate_store_names(cfg: &RawConfigFile) -> Result<()> {
    let names = [
        ("table", &cfg.store.table),
        ("key_attribute", &cfg.store.key_attribute),
        ("key", &cfg.store.key),
        ("value_attribute", &cfg.store.value_attribute),
    ];

    for (field, value) in names {
        if value.trim().is_empty() {
            return Err(BlakerError::ConfigError(format!(
                "[store].{} must not be empty",
                field
            )));
        }
    }

    if cfg.store.key_attribute == cfg.store.value_attribute {
        return Err(BlakerError::ConfigError(format!(
            "[store].key_attribute and [store].value_attribute must differ (both '{}')",
            cfg.store.key_attribute
        )));
    }

    Ok(())
}

/// Zero disables the timeout.
fn validate_wait(cfg: &RawConfigFile) -> Result<Option<std::time::Duration>> {
    let Some(ref wait) = cfg.run.wait else {
        return Ok(None);
    };

    let duration = parse_duration(wait)
        .map_err(|e| BlakerError::ConfigError(format!("[run].wait: {}", e)))?;

    Ok((!duration.is_zero()).then_some(duration))
}
