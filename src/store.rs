// src/store.rs
//! Narrow table-store interface.
//!
//! The production deployment keeps its tables in a spreadsheet-like store;
//! everything the core needs from it is "read all rows", "append rows" and
//! (for the registration collaborator) "replace everything". Records are
//! flat string maps, one per row.

use anyhow::{Context, Result};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::Mutex;

pub type Record = BTreeMap<String, String>;

#[async_trait::async_trait]
pub trait TableStore: Send + Sync {
    async fn read_all(&self, table: &str) -> Result<Vec<Record>>;
    async fn append_rows(&self, table: &str, rows: Vec<Record>) -> Result<()>;
    async fn replace_all(&self, table: &str, rows: Vec<Record>) -> Result<()>;
}

/// File-backed store: one `<table>.jsonl` per table under a data directory.
/// A missing file reads as an empty table.
pub struct JsonlStore {
    dir: PathBuf,
}

impl JsonlStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.jsonl"))
    }

    fn encode(rows: &[Record]) -> Result<String> {
        let mut buf = String::new();
        for row in rows {
            buf.push_str(&serde_json::to_string(row).context("encoding store row")?);
            buf.push('\n');
        }
        Ok(buf)
    }
}

#[async_trait::async_trait]
impl TableStore for JsonlStore {
    async fn read_all(&self, table: &str) -> Result<Vec<Record>> {
        let path = self.table_path(table);
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(e).with_context(|| format!("reading table {}", path.display()))
            }
        };

        let mut rows = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            rows.push(
                serde_json::from_str(line)
                    .with_context(|| format!("decoding row in {}", path.display()))?,
            );
        }
        Ok(rows)
    }

    async fn append_rows(&self, table: &str, rows: Vec<Record>) -> Result<()> {
        if rows.is_empty() {
            return Ok(());
        }
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;

        let path = self.table_path(table);
        let buf = Self::encode(&rows)?;

        use tokio::io::AsyncWriteExt;
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .await
            .with_context(|| format!("opening {}", path.display()))?;
        file.write_all(buf.as_bytes())
            .await
            .with_context(|| format!("appending to {}", path.display()))?;
        file.flush().await.context("flushing table append")?;
        Ok(())
    }

    async fn replace_all(&self, table: &str, rows: Vec<Record>) -> Result<()> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("creating {}", self.dir.display()))?;
        let path = self.table_path(table);
        tokio::fs::write(&path, Self::encode(&rows)?)
            .await
            .with_context(|| format!("rewriting {}", path.display()))
    }
}

/// In-memory store for tests and the demo bin.
#[derive(Default)]
pub struct MemStore {
    tables: Mutex<HashMap<String, Vec<Record>>>,
}

impl MemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl TableStore for MemStore {
    async fn read_all(&self, table: &str) -> Result<Vec<Record>> {
        let tables = self.tables.lock().expect("store mutex poisoned");
        Ok(tables.get(table).cloned().unwrap_or_default())
    }

    async fn append_rows(&self, table: &str, rows: Vec<Record>) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables.entry(table.to_string()).or_default().extend(rows);
        Ok(())
    }

    async fn replace_all(&self, table: &str, rows: Vec<Record>) -> Result<()> {
        let mut tables = self.tables.lock().expect("store mutex poisoned");
        tables.insert(table.to_string(), rows);
        Ok(())
    }
}

pub fn record(fields: &[(&str, &str)]) -> Record {
    fields
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn mem_store_appends_and_replaces() {
        let store = MemStore::new();
        assert!(store.read_all("t").await.unwrap().is_empty());

        store
            .append_rows("t", vec![record(&[("a", "1")]), record(&[("a", "2")])])
            .await
            .unwrap();
        assert_eq!(store.read_all("t").await.unwrap().len(), 2);

        store.replace_all("t", vec![record(&[("a", "3")])]).await.unwrap();
        let rows = store.read_all("t").await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], "3");
    }

    #[tokio::test]
    async fn jsonl_store_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonlStore::new(dir.path());

        assert!(store.read_all("works").await.unwrap().is_empty());

        store
            .append_rows("works", vec![record(&[("id", "abc00111"), ("title", "新作")])])
            .await
            .unwrap();
        store
            .append_rows("works", vec![record(&[("id", "abc00112")])])
            .await
            .unwrap();

        let rows = store.read_all("works").await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["id"], "abc00111");
        assert_eq!(rows[0]["title"], "新作");

        store
            .replace_all("works", vec![record(&[("id", "only")])])
            .await
            .unwrap();
        assert_eq!(store.read_all("works").await.unwrap().len(), 1);
    }
}
