//! Flat JSON persistence for the index, its chunks, and the cached summary.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::chunker::Chunk;
use crate::error::{IndexError, Result};

const INDEX_FILE: &str = "index.json";
const CHUNKS_FILE: &str = "chunks.json";
const SUMMARY_FILE: &str = "summary.json";

/// Cached project overview.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub summary: String,
}

/// Pretty-printed JSON files under one database directory.
///
/// Every save rewrites the whole file. Absent files read back as empty
/// defaults so a fresh database directory needs no initialization step.
#[derive(Debug, Clone)]
pub struct IndexStore {
    dir: PathBuf,
}

impl IndexStore {
    /// Open the store, creating the database directory if needed.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory cannot be created.
    pub fn open(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Map of canonical file path to content hash.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] if `index.json` exists but does not parse.
    pub fn load_hashes(&self) -> Result<BTreeMap<String, String>> {
        self.load_or_default(INDEX_FILE)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_hashes(&self, hashes: &BTreeMap<String, String>) -> Result<()> {
        self.save(INDEX_FILE, hashes)
    }

    /// All chunks, in indexing order.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] if `chunks.json` exists but does not parse.
    pub fn load_chunks(&self) -> Result<Vec<Chunk>> {
        self.load_or_default(CHUNKS_FILE)
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_chunks(&self, chunks: &[Chunk]) -> Result<()> {
        self.save(CHUNKS_FILE, &chunks)
    }

    /// The cached summary, or `None` if no summary was generated yet.
    ///
    /// # Errors
    ///
    /// Returns [`IndexError::Corrupt`] if `summary.json` exists but does not parse.
    pub fn load_summary(&self) -> Result<Option<Summary>> {
        let path = self.dir.join(SUMMARY_FILE);
        if !path.exists() {
            return Ok(None);
        }
        let raw = fs::read_to_string(&path)?;
        let summary = serde_json::from_str(&raw).map_err(|source| IndexError::Corrupt {
            file: SUMMARY_FILE.to_owned(),
            source,
        })?;
        Ok(Some(summary))
    }

    /// # Errors
    ///
    /// Returns an error if the file cannot be written.
    pub fn save_summary(&self, summary: &Summary) -> Result<()> {
        self.save(SUMMARY_FILE, summary)
    }

    fn load_or_default<T: DeserializeOwned + Default>(&self, file: &str) -> Result<T> {
        let path = self.dir.join(file);
        if !path.exists() {
            return Ok(T::default());
        }
        let raw = fs::read_to_string(&path)?;
        serde_json::from_str(&raw).map_err(|source| IndexError::Corrupt {
            file: file.to_owned(),
            source,
        })
    }

    fn save<T: Serialize>(&self, file: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string_pretty(value)?;
        fs::write(self.dir.join(file), raw)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(file: &str, start: usize) -> Chunk {
        Chunk {
            text: format!("body of {file}"),
            file: file.to_owned(),
            start_line: start,
            end_line: start + 9,
            embedding: Some(vec![0.1, 0.2]),
        }
    }

    #[test]
    fn fresh_store_reads_empty_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(&dir.path().join("db")).unwrap();
        assert!(store.load_hashes().unwrap().is_empty());
        assert!(store.load_chunks().unwrap().is_empty());
        assert!(store.load_summary().unwrap().is_none());
    }

    #[test]
    fn open_creates_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a/b/db");
        IndexStore::open(&nested).unwrap();
        assert!(nested.is_dir());
    }

    #[test]
    fn hashes_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        let mut hashes = BTreeMap::new();
        hashes.insert("/p/a.rs".to_owned(), "abc123".to_owned());
        store.save_hashes(&hashes).unwrap();
        assert_eq!(store.load_hashes().unwrap(), hashes);
    }

    #[test]
    fn chunks_round_trip_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        let chunks = vec![chunk("z.rs", 1), chunk("a.rs", 1), chunk("a.rs", 9)];
        store.save_chunks(&chunks).unwrap();
        assert_eq!(store.load_chunks().unwrap(), chunks);
    }

    #[test]
    fn summary_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        let summary = Summary {
            summary: "a web service".to_owned(),
        };
        store.save_summary(&summary).unwrap();
        assert_eq!(store.load_summary().unwrap(), Some(summary));
    }

    #[test]
    fn corrupt_file_is_reported_with_its_name() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("chunks.json"), "{not json").unwrap();
        let err = store.load_chunks().unwrap_err();
        assert!(matches!(err, IndexError::Corrupt { ref file, .. } if file == "chunks.json"));
    }

    #[test]
    fn wrong_schema_is_corrupt_not_default() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        std::fs::write(dir.path().join("index.json"), "[1, 2, 3]").unwrap();
        assert!(matches!(
            store.load_hashes(),
            Err(IndexError::Corrupt { .. })
        ));
    }

    #[test]
    fn save_overwrites_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let store = IndexStore::open(dir.path()).unwrap();
        store.save_chunks(&[chunk("a.rs", 1)]).unwrap();
        store.save_chunks(&[]).unwrap();
        assert!(store.load_chunks().unwrap().is_empty());
    }
}
