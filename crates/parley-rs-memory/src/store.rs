//! Bounded, append-only memory store persisted to a single JSON file.

use crate::error::MemoryError;
use crate::model::MemoryRecord;
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Chronologically ordered interaction log.
///
/// All mutations (append, capacity truncation, the durable rewrite) happen
/// under one lock, so concurrent appends never lose records or interleave
/// partial files. The in-memory sequence is authoritative: a failed write is
/// logged and the process keeps serving from memory.
#[derive(Debug)]
pub struct MemoryStore {
    path: PathBuf,
    capacity: Option<usize>,
    records: Mutex<Vec<MemoryRecord>>,
}

impl MemoryStore {
    /// Open the store at `path`, loading any records already persisted there.
    ///
    /// A missing or unreadable file starts an empty store. When the file holds
    /// more than `capacity` records only the most recent ones are kept.
    pub fn open(path: impl AsRef<Path>, capacity: Option<usize>) -> Self {
        let path = path.as_ref().to_path_buf();
        let mut records = match read_records(&path) {
            Ok(Some(records)) => records,
            Ok(None) => {
                debug!("memory file absent; starting empty (path={})", path.display());
                Vec::new()
            }
            Err(err) => {
                warn!(
                    "memory file unreadable; starting empty (path={}, err={})",
                    path.display(),
                    err
                );
                Vec::new()
            }
        };
        enforce_capacity(&mut records, capacity);
        info!(
            "memory store opened (path={}, records={}, capacity={:?})",
            path.display(),
            records.len(),
            capacity
        );
        Self {
            path,
            capacity,
            records: Mutex::new(records),
        }
    }

    /// Location of the durable copy.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a record, drop the oldest beyond capacity, and rewrite the file.
    pub fn append(
        &self,
        content: impl Into<String>,
        metadata: BTreeMap<String, String>,
    ) -> MemoryRecord {
        let record = MemoryRecord::new(content, metadata);
        let mut records = self.records.lock();
        records.push(record.clone());
        let evicted = enforce_capacity(&mut records, self.capacity);
        let persisted = match write_records(&self.path, &records) {
            Ok(()) => true,
            Err(err) => {
                warn!(
                    "memory write failed; keeping in-memory state (path={}, err={})",
                    self.path.display(),
                    err
                );
                false
            }
        };
        debug!(
            "memory appended (records={}, evicted={}, persisted={})",
            records.len(),
            evicted,
            persisted
        );
        record
    }

    /// Up to `limit` records whose content contains `query`, ignoring case,
    /// most recent first. The empty query matches every record.
    pub fn search(&self, query: &str, limit: usize) -> Vec<MemoryRecord> {
        let needle = query.to_lowercase();
        let records = self.records.lock();
        records
            .iter()
            .rev()
            .filter(|record| record.matches_lowercase(&needle))
            .take(limit)
            .cloned()
            .collect()
    }

    /// The `limit` most recent records, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<MemoryRecord> {
        let records = self.records.lock();
        records.iter().rev().take(limit).cloned().collect()
    }

    pub fn count(&self) -> usize {
        self.records.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Drop every record and persist the empty sequence.
    pub fn clear(&self) -> Result<(), MemoryError> {
        let mut records = self.records.lock();
        records.clear();
        info!("memory cleared (path={})", self.path.display());
        write_records(&self.path, &records)
    }
}

/// Trim from the front until `records` fits. Returns how many were dropped.
fn enforce_capacity(records: &mut Vec<MemoryRecord>, capacity: Option<usize>) -> usize {
    let Some(capacity) = capacity else {
        return 0;
    };
    let excess = records.len().saturating_sub(capacity);
    if excess > 0 {
        records.drain(..excess);
    }
    excess
}

fn read_records(path: &Path) -> Result<Option<Vec<MemoryRecord>>, MemoryError> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = fs::read_to_string(path)?;
    if contents.trim().is_empty() {
        return Ok(Some(Vec::new()));
    }
    let records: Vec<MemoryRecord> = serde_json::from_str(&contents)?;
    Ok(Some(
        records.into_iter().map(MemoryRecord::repaired).collect(),
    ))
}

/// Rewrite the file via a sibling temp file and rename.
fn write_records(path: &Path, records: &[MemoryRecord]) -> Result<(), MemoryError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let temp_path = path.with_extension("json.tmp");
    {
        let mut file = OpenOptions::new()
            .create(true)
            .truncate(true)
            .write(true)
            .open(&temp_path)?;
        serde_json::to_writer_pretty(&mut file, records)?;
        file.write_all(b"\n")?;
        file.sync_all()?;
    }
    fs::rename(temp_path, path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;
    use std::fs;
    use tempfile::TempDir;

    fn store(temp: &TempDir, capacity: Option<usize>) -> MemoryStore {
        MemoryStore::open(temp.path().join("memory").join("store.json"), capacity)
    }

    #[test]
    fn count_is_capped_and_keeps_most_recent() {
        let temp = TempDir::new().expect("tmp");
        let store = store(&temp, Some(3));
        for idx in 0..5 {
            store.append(format!("entry {idx}"), BTreeMap::new());
        }
        assert_eq!(store.count(), 3);
        let contents: Vec<_> = store
            .recent(10)
            .into_iter()
            .map(|record| record.content)
            .collect();
        assert_eq!(contents, vec!["entry 4", "entry 3", "entry 2"]);
    }

    #[test]
    fn unbounded_store_keeps_everything() {
        let temp = TempDir::new().expect("tmp");
        let store = store(&temp, None);
        for idx in 0..150 {
            store.append(format!("entry {idx}"), BTreeMap::new());
        }
        assert_eq!(store.count(), 150);
    }

    #[test]
    fn search_is_reverse_chronological_and_case_insensitive() {
        let temp = TempDir::new().expect("tmp");
        let store = store(&temp, None);
        store.append("Rust is fun", BTreeMap::new());
        store.append("python", BTreeMap::new());
        store.append("more RUST", BTreeMap::new());
        store.append("rusty nails", BTreeMap::new());

        let hits: Vec<_> = store
            .search("rust", 2)
            .into_iter()
            .map(|record| record.content)
            .collect();
        assert_eq!(hits, vec!["rusty nails", "more RUST"]);
    }

    #[test]
    fn empty_query_matches_all_records() {
        let temp = TempDir::new().expect("tmp");
        let store = store(&temp, None);
        store.append("one", BTreeMap::new());
        store.append("two", BTreeMap::new());
        assert_eq!(store.search("", 10).len(), 2);
    }

    #[test]
    fn reload_round_trips_content_and_metadata() {
        let temp = TempDir::new().expect("tmp");
        let mut metadata = BTreeMap::new();
        metadata.insert("user_id".to_string(), "7".to_string());
        metadata.insert("type".to_string(), "conversation".to_string());
        let written = store(&temp, Some(10)).append("remember the blue door", metadata.clone());

        let reopened = store(&temp, Some(10));
        let hits = reopened.search("blue", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].content, written.content);
        assert_eq!(hits[0].metadata, metadata);
        assert_eq!(hits[0].timestamp, written.timestamp);
    }

    #[test]
    fn reload_truncates_to_capacity() {
        let temp = TempDir::new().expect("tmp");
        let big = store(&temp, None);
        for idx in 0..6 {
            big.append(format!("entry {idx}"), BTreeMap::new());
        }
        let small = store(&temp, Some(2));
        assert_eq!(small.count(), 2);
        assert_eq!(small.recent(1)[0].content, "entry 5");
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let temp = TempDir::new().expect("tmp");
        let path = temp.path().join("store.json");
        fs::write(&path, "{ not json").expect("write");
        let store = MemoryStore::open(&path, Some(5));
        assert_eq!(store.count(), 0);
        store.append("fresh", BTreeMap::new());
        assert_eq!(MemoryStore::open(&path, Some(5)).count(), 1);
    }

    #[test]
    fn write_failure_keeps_in_memory_state() {
        let temp = TempDir::new().expect("tmp");
        let blocker = temp.path().join("not_a_dir");
        fs::write(&blocker, "file").expect("write");
        let store = MemoryStore::open(blocker.join("store.json"), None);
        let record = store.append("still here", BTreeMap::new());
        assert_eq!(store.count(), 1);
        assert_eq!(store.search("still", 1)[0], record);
    }

    #[test]
    fn clear_empties_store_and_file() {
        let temp = TempDir::new().expect("tmp");
        let store = store(&temp, None);
        store.append("gone soon", BTreeMap::new());
        store.clear().expect("clear");
        assert!(store.is_empty());
        assert_eq!(MemoryStore::open(store.path(), None).count(), 0);
    }
}
