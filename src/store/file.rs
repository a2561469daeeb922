// src/store/file.rs

use std::path::{Path, PathBuf};

use anyhow::{Context, anyhow};
use tracing::debug;

use super::{Item, KeyValueStore, StoreFuture};

/// Store backed by a TOML document.
///
/// Each top-level key is a table name holding an array of items:
///
/// ```toml
/// [[blaker_config]]
/// name = "break_time"
/// value = "2030-01-01T00:00:00Z"
/// ```
///
/// The file is re-read on every lookup, so editing it takes effect on the
/// next run without restarting anything.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl KeyValueStore for FileStore {
    fn get_item<'a>(
        &'a self,
        table: &'a str,
        key_attribute: &'a str,
        key: &'a str,
    ) -> StoreFuture<'a, Option<Item>> {
        Box::pin(async move {
            let contents = tokio::fs::read_to_string(&self.path)
                .await
                .with_context(|| format!("reading store file {:?}", self.path))?;

            let doc: toml::Table = toml::from_str(&contents)
                .with_context(|| format!("parsing store file {:?}", self.path))?;

            debug!(path = ?self.path, table, key, "looking up item in file store");
            find_item(&doc, table, key_attribute, key)
        })
    }
}

fn find_item(
    doc: &toml::Table,
    table: &str,
    key_attribute: &str,
    key: &str,
) -> anyhow::Result<Option<Item>> {
    let Some(rows) = doc.get(table) else {
        return Ok(None);
    };

    let rows = rows
        .as_array()
        .ok_or_else(|| anyhow!("table '{}' must be an array of items ([[{}]])", table, table))?;

    for row in rows {
        let Some(row) = row.as_table() else {
            continue;
        };
        let matches = row
            .get(key_attribute)
            .map(value_to_string)
            .is_some_and(|v| v == key);
        if matches {
            let item = row
                .iter()
                .map(|(k, v)| (k.clone(), value_to_string(v)))
                .collect();
            return Ok(Some(item));
        }
    }

    Ok(None)
}

/// Strings are taken verbatim; bare TOML datetimes and other scalars use
/// their TOML rendering.
fn value_to_string(value: &toml::Value) -> String {
    match value {
        toml::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn store_with(contents: &str) -> (NamedTempFile, FileStore) {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "{}", contents).unwrap();
        let store = FileStore::new(file.path());
        (file, store)
    }

    #[tokio::test]
    async fn finds_item_by_key_attribute() {
        let (_file, store) = store_with(
            r#"
[[blaker_config]]
name = "other"
value = "x"

[[blaker_config]]
name = "break_time"
value = "2030-01-01T00:00:00Z"
"#,
        );

        let item = store
            .get_item("blaker_config", "name", "break_time")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item.get("value").map(String::as_str), Some("2030-01-01T00:00:00Z"));
    }

    #[tokio::test]
    async fn missing_table_or_item_is_none() {
        let (_file, store) = store_with(
            r#"
[[blaker_config]]
name = "something_else"
value = "x"
"#,
        );

        assert!(store.get_item("blaker_config", "name", "break_time").await.unwrap().is_none());
        assert!(store.get_item("nope", "name", "break_time").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn bare_toml_datetime_is_rendered_as_rfc3339() {
        let (_file, store) = store_with(
            r#"
[[blaker_config]]
name = "break_time"
value = 2000-01-01T00:00:00Z
"#,
        );

        let item = store
            .get_item("blaker_config", "name", "break_time")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(item["value"], "2000-01-01T00:00:00Z");
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let store = FileStore::new("/definitely/not/here/store.toml");
        assert!(store.get_item("blaker_config", "name", "break_time").await.is_err());
    }

    #[tokio::test]
    async fn table_that_is_not_an_array_is_an_error() {
        let (_file, store) = store_with(
            r#"
[blaker_config]
name = "break_time"
"#,
        );
        let err = store
            .get_item("blaker_config", "name", "break_time")
            .await
            .unwrap_err();
        assert!(err.to_string().contains("array of items"));
    }
}
