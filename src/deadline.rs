// src/deadline.rs

//! Reads the break time from the key-value store.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, SecondsFormat};
use tracing::debug;

use crate::errors::{BlakerError, Result};
use crate::store::KeyValueStore;

pub const DEFAULT_TABLE: &str = "blaker_config";
pub const DEFAULT_KEY_ATTRIBUTE: &str = "name";
pub const DEFAULT_KEY: &str = "break_time";
pub const DEFAULT_VALUE_ATTRIBUTE: &str = "value";

/// Where the break time lives in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadlineKey {
    pub table: String,
    pub key_attribute: String,
    pub key: String,
    pub value_attribute: String,
}

impl Default for DeadlineKey {
    fn default() -> Self {
        Self {
            table: DEFAULT_TABLE.to_string(),
            key_attribute: DEFAULT_KEY_ATTRIBUTE.to_string(),
            key: DEFAULT_KEY.to_string(),
            value_attribute: DEFAULT_VALUE_ATTRIBUTE.to_string(),
        }
    }
}

/// Fetches and parses the deadline. Every call hits the store; nothing is
/// cached and nothing is retried.
#[derive(Debug, Clone)]
pub struct DeadlineSource {
    store: Arc<dyn KeyValueStore>,
    key: DeadlineKey,
}

impl DeadlineSource {
    pub fn new(store: Arc<dyn KeyValueStore>, key: DeadlineKey) -> Self {
        Self { store, key }
    }

    pub fn key(&self) -> &DeadlineKey {
        &self.key
    }

    /// `Ok(None)` when no break time is configured.
    pub async fn get_deadline(&self) -> Result<Option<DateTime<FixedOffset>>> {
        let item = self
            .store
            .get_item(&self.key.table, &self.key.key_attribute, &self.key.key)
            .await
            .map_err(|source| BlakerError::StoreUnavailable {
                table: self.key.table.clone(),
                key: self.key.key.clone(),
                source,
            })?;

        let raw = item
            .as_ref()
            .and_then(|item| item.get(&self.key.value_attribute))
            .map(String::as_str)
            .unwrap_or_default();

        // Blank means unset; anything else must be a bare RFC 3339 value.
        if raw.trim().is_empty() {
            debug!(table = %self.key.table, key = %self.key.key, "no break time configured");
            return Ok(None);
        }

        let deadline = parse_deadline(raw).map_err(|source| BlakerError::InvalidDeadlineFormat {
            key: self.key.key.clone(),
            value: raw.to_string(),
            source,
        })?;

        debug!(
            table = %self.key.table,
            key = %self.key.key,
            deadline = %format_deadline(&deadline),
            "break time loaded"
        );
        Ok(Some(deadline))
    }
}

pub fn parse_deadline(s: &str) -> std::result::Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(s)
}

/// Canonical rendering: whole seconds, `Z` for UTC, the stored offset otherwise.
pub fn format_deadline(deadline: &DateTime<FixedOffset>) -> String {
    deadline.to_rfc3339_opts(SecondsFormat::Secs, true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::{TimeZone, Utc};

    fn source_with(store: &MemoryStore) -> DeadlineSource {
        DeadlineSource::new(Arc::new(store.clone()), DeadlineKey::default())
    }

    #[tokio::test]
    async fn absent_item_means_no_deadline() {
        let store = MemoryStore::new();
        assert_eq!(source_with(&store).get_deadline().await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_value_means_no_deadline() {
        let store = MemoryStore::new();
        store.put_value(DEFAULT_TABLE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_KEY, DEFAULT_VALUE_ATTRIBUTE, "");
        assert_eq!(source_with(&store).get_deadline().await.unwrap(), None);
    }

    #[tokio::test]
    async fn item_without_value_attribute_means_no_deadline() {
        let store = MemoryStore::new();
        let mut item = crate::store::Item::new();
        item.insert("name".into(), "break_time".into());
        store.put_item(DEFAULT_TABLE, DEFAULT_KEY_ATTRIBUTE, item);
        assert_eq!(source_with(&store).get_deadline().await.unwrap(), None);
    }

    #[tokio::test]
    async fn whitespace_only_value_means_no_deadline() {
        let store = MemoryStore::new();
        store.put_value(DEFAULT_TABLE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_KEY, DEFAULT_VALUE_ATTRIBUTE, "  \t ");
        assert_eq!(source_with(&store).get_deadline().await.unwrap(), None);
    }

    #[tokio::test]
    async fn padded_value_is_invalid_format() {
        let store = MemoryStore::new();
        store.put_value(
            DEFAULT_TABLE,
            DEFAULT_KEY_ATTRIBUTE,
            DEFAULT_KEY,
            DEFAULT_VALUE_ATTRIBUTE,
            " 2000-01-01T00:00:00Z ",
        );
        match source_with(&store).get_deadline().await {
            Err(BlakerError::InvalidDeadlineFormat { value, .. }) => {
                assert_eq!(value, " 2000-01-01T00:00:00Z ");
            }
            other => panic!("expected InvalidDeadlineFormat, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn parses_rfc3339_value() {
        let store = MemoryStore::new();
        store.put_value(
            DEFAULT_TABLE,
            DEFAULT_KEY_ATTRIBUTE,
            DEFAULT_KEY,
            DEFAULT_VALUE_ATTRIBUTE,
            "2000-01-01T09:00:00+09:00",
        );
        let deadline = source_with(&store).get_deadline().await.unwrap().unwrap();
        assert_eq!(deadline, Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap());
        assert_eq!(format_deadline(&deadline), "2000-01-01T09:00:00+09:00");
    }

    #[tokio::test]
    async fn unparseable_value_is_invalid_format() {
        let store = MemoryStore::new();
        store.put_value(DEFAULT_TABLE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_KEY, DEFAULT_VALUE_ATTRIBUTE, "not-a-date");
        match source_with(&store).get_deadline().await {
            Err(BlakerError::InvalidDeadlineFormat { key, value, .. }) => {
                assert_eq!(key, "break_time");
                assert_eq!(value, "not-a-date");
            }
            other => panic!("expected InvalidDeadlineFormat, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn store_failure_is_store_unavailable() {
        let store = MemoryStore::new();
        store.fail_with("connection reset");
        let err = source_with(&store).get_deadline().await.unwrap_err();
        match err {
            BlakerError::StoreUnavailable { ref table, ref key, .. } => {
                assert_eq!(table, "blaker_config");
                assert_eq!(key, "break_time");
            }
            ref other => panic!("expected StoreUnavailable, got {:?}", other),
        }
        let msg = err.to_string();
        assert!(msg.contains("break_time") && msg.contains("blaker_config"));
        assert!(msg.contains("connection reset"));
    }

    #[tokio::test]
    async fn custom_key_is_honoured() {
        let store = MemoryStore::new();
        store.put_value("ops", "id", "cutover", "at", "2031-05-05T05:05:05Z");
        let key = DeadlineKey {
            table: "ops".into(),
            key_attribute: "id".into(),
            key: "cutover".into(),
            value_attribute: "at".into(),
        };
        let source = DeadlineSource::new(Arc::new(store.clone()), key);
        let deadline = source.get_deadline().await.unwrap().unwrap();
        assert_eq!(format_deadline(&deadline), "2031-05-05T05:05:05Z");
    }

    #[tokio::test]
    async fn every_call_hits_the_store() {
        let store = MemoryStore::new();
        let source = source_with(&store);
        source.get_deadline().await.unwrap();
        store.put_value(DEFAULT_TABLE, DEFAULT_KEY_ATTRIBUTE, DEFAULT_KEY, DEFAULT_VALUE_ATTRIBUTE, "2000-01-01T00:00:00Z");
        assert!(source.get_deadline().await.unwrap().is_some());
        assert_eq!(store.lookups(), 2);
    }

    #[test]
    fn utc_formats_with_z() {
        let d = parse_deadline("2000-01-01T00:00:00+00:00").unwrap();
        assert_eq!(format_deadline(&d), "2000-01-01T00:00:00Z");
    }
}
