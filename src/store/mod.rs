// src/store/mod.rs

//! Key-value store abstraction holding the break time.
//!
//! The deadline lives in a remote store as an item inside a table:
//! a map of attribute name to string value, looked up by one key attribute.
//!
//! - [`KeyValueStore`] is the trait the deadline source talks to.
//! - [`FileStore`] reads items from a TOML document on every lookup.
//! - [`MemoryStore`] keeps items in memory and can simulate outages.

use std::collections::BTreeMap;
use std::fmt::Debug;
use std::future::Future;
use std::pin::Pin;

use anyhow::Result;

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

/// One stored item: attribute name -> string value.
pub type Item = BTreeMap<String, String>;

/// Boxed future returned by store lookups.
pub type StoreFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T>> + Send + 'a>>;

/// Read access to a table-oriented key-value store.
pub trait KeyValueStore: Send + Sync + Debug {
    /// Fetch the item in `table` whose `key_attribute` equals `key`.
    ///
    /// `Ok(None)` means the table or the item does not exist. `Err` is
    /// reserved for transport or service failures.
    fn get_item<'a>(
        &'a self,
        table: &'a str,
        key_attribute: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<Item>>;
}
