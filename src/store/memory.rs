// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::anyhow;

use super::{Item, KeyValueStore, StoreFuture};

#[derive(Debug, Default)]
struct Inner {
    // table -> items
    tables: HashMap<String, Vec<Item>>,
    failure: Option<String>,
    lookups: usize,
}

/// In-memory store.
///
/// Clones share the same data, so a test can keep a handle and change the
/// break time between runs.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the item whose `key_attribute` matches the new item's.
    pub fn put_item(&self, table: &str, key_attribute: &str, item: Item) {
        let mut inner = self.inner.lock().unwrap();
        let rows = inner.tables.entry(table.to_string()).or_default();
        let key = item.get(key_attribute).cloned();
        rows.retain(|row| row.get(key_attribute) != key.as_ref());
        rows.push(item);
    }

    /// Shorthand for the common two-attribute item (`name` / `value` style).
    pub fn put_value(&self, table: &str, key_attribute: &str, key: &str, value_attribute: &str, value: &str) {
        let mut item = Item::new();
        item.insert(key_attribute.to_string(), key.to_string());
        item.insert(value_attribute.to_string(), value.to_string());
        self.put_item(table, key_attribute, item);
    }

    pub fn remove_item(&self, table: &str, key_attribute: &str, key: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(rows) = inner.tables.get_mut(table) {
            rows.retain(|row| row.get(key_attribute).map(String::as_str) != Some(key));
        }
    }

    /// Make every following lookup fail with `message` until [`recover`] is called.
    ///
    /// [`recover`]: MemoryStore::recover
    pub fn fail_with(&self, message: impl Into<String>) {
        self.inner.lock().unwrap().failure = Some(message.into());
    }

    pub fn recover(&self) {
        self.inner.lock().unwrap().failure = None;
    }

    /// Number of lookups served (or failed) so far.
    pub fn lookups(&self) -> usize {
        self.inner.lock().unwrap().lookups
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item<'a>(
        &'a self,
        table: &'a str,
        key_attribute: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<Item>> {
        let result = {
            let mut inner = self.inner.lock().unwrap();
            inner.lookups += 1;
            match inner.failure {
                Some(ref msg) => Err(anyhow!("{}", msg)),
                None => Ok(inner.tables.get(table).and_then(|rows| {
                    rows.iter()
                        .find(|row| row.get(key_attribute).map(String::as_str) == Some(key))
                        .cloned()
                })),
            }
        };

        Box::pin(async move { result })
    }
}
