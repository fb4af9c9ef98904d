// src/store.rs
//! Document-store seam.
//!
//! The service only needs two capabilities from its document database:
//! bulk insert and full-collection read. They live behind a trait so the
//! actual driver stays out of the core; `JsonFileStore` keeps one JSON-lines
//! file per collection for local use, and `MemoryStore` backs tests.

use std::collections::HashMap;
use std::fs::{self, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde_json::Value;

/// Collection holding normalized ingested articles.
pub const DAILY_NEWS: &str = "DailyNews";
/// Collection holding per-analysis polarity records.
pub const POLARITY_DATA: &str = "PolarityData";

#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Insert records into a collection; returns the number inserted.
    async fn insert_many(&self, collection: &str, records: &[Value]) -> Result<usize>;

    /// Fetch every document in a collection.
    async fn find_all(&self, collection: &str) -> Result<Vec<Value>>;
}

/// One `<collection>.jsonl` file per collection under a root directory.
pub struct JsonFileStore {
    root: PathBuf,
}

impl JsonFileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.root.join(format!("{collection}.jsonl"))
    }
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn insert_many(&self, collection: &str, records: &[Value]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        fs::create_dir_all(&self.root)
            .with_context(|| format!("creating store root {}", self.root.display()))?;
        let path = self.collection_path(collection);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("opening {}", path.display()))?;
        for rec in records {
            let line = serde_json::to_string(rec).context("serializing record")?;
            writeln!(file, "{line}").with_context(|| format!("writing {}", path.display()))?;
        }
        Ok(records.len())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let path = self.collection_path(collection);
        if !path.exists() {
            return Ok(Vec::new());
        }
        let file =
            fs::File::open(&path).with_context(|| format!("opening {}", path.display()))?;
        let mut out = Vec::new();
        for line in BufReader::new(file).lines() {
            let line = line.with_context(|| format!("reading {}", path.display()))?;
            if line.trim().is_empty() {
                continue;
            }
            let rec: Value = serde_json::from_str(&line)
                .with_context(|| format!("parsing record in {}", path.display()))?;
            out.push(rec);
        }
        Ok(out)
    }
}

/// In-memory store for tests and offline runs.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<HashMap<String, Vec<Value>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn insert_many(&self, collection: &str, records: &[Value]) -> Result<usize> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard
            .entry(collection.to_string())
            .or_default()
            .extend_from_slice(records);
        Ok(records.len())
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<Value>> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.get(collection).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn memory_store_round_trips() {
        let store = MemoryStore::new();
        let n = store
            .insert_many(POLARITY_DATA, &[json!({"compound": 0.5})])
            .await
            .unwrap();
        assert_eq!(n, 1);
        let all = store.find_all(POLARITY_DATA).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0]["compound"], json!(0.5));
    }

    #[tokio::test]
    async fn file_store_appends_and_reads_back() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());

        store
            .insert_many(DAILY_NEWS, &[json!({"title": "a"}), json!({"title": "b"})])
            .await
            .unwrap();
        store
            .insert_many(DAILY_NEWS, &[json!({"title": "c"})])
            .await
            .unwrap();

        let all = store.find_all(DAILY_NEWS).await.unwrap();
        assert_eq!(all.len(), 3);
        assert_eq!(all[2]["title"], json!("c"));
    }

    #[tokio::test]
    async fn missing_collection_reads_as_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert!(store.find_all("Nothing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_insert_is_a_no_op() {
        let tmp = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(tmp.path());
        assert_eq!(store.insert_many(DAILY_NEWS, &[]).await.unwrap(), 0);
        assert!(!tmp.path().join("DailyNews.jsonl").exists());
    }
}
