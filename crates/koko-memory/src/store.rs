//! Memory store implementations.

use crate::error::MemoryError;
use crate::model::MemoryEntry;
use async_trait::async_trait;
use log::{debug, info};
use parking_lot::Mutex;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Memory store abstraction used by the server.
#[async_trait]
pub trait MemoryStore: Send + Sync {
    /// List all entries in insertion order.
    async fn list(&self) -> Result<Vec<MemoryEntry>, MemoryError>;

    /// Append a new entry and return it.
    async fn append(&self, text: &str) -> Result<MemoryEntry, MemoryError>;

    /// Remove all entries, returning how many were dropped.
    async fn clear(&self) -> Result<usize, MemoryError>;
}

/// File-backed store keeping all entries in one JSON array file.
///
/// The format matches the legacy notebook: a plain array of
/// `{text, created_at}` objects, no schema versioning.
#[derive(Debug)]
pub struct FileMemoryStore {
    /// Path of the JSON array file.
    path: PathBuf,
    /// Serializes read-modify-write cycles within this process.
    write_lock: Mutex<()>,
}

impl FileMemoryStore {
    /// Create a store over the given file path, creating parent directories.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, MemoryError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        info!("initialized file memory store (path={})", path.display());
        Ok(Self {
            path,
            write_lock: Mutex::new(()),
        })
    }

    /// Path to the temporary file used for atomic rewrites.
    fn temp_path(&self) -> PathBuf {
        let mut path = self.path.as_os_str().to_owned();
        path.push(".tmp");
        PathBuf::from(path)
    }

    /// Load all entries; a missing file reads as empty.
    fn load_entries(&self) -> Result<Vec<MemoryEntry>, MemoryError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        let entries: Vec<MemoryEntry> = serde_json::from_str(&contents)?;
        Ok(entries)
    }

    /// Rewrite the entry file atomically via a temp file and rename.
    fn write_entries(&self, entries: &[MemoryEntry]) -> Result<(), MemoryError> {
        let temp_path = self.temp_path();
        {
            let mut file = OpenOptions::new()
                .create(true)
                .truncate(true)
                .write(true)
                .open(&temp_path)?;
            let contents = serde_json::to_string_pretty(entries)?;
            file.write_all(contents.as_bytes())?;
        }
        std::fs::rename(temp_path, &self.path)?;
        Ok(())
    }
}

#[async_trait]
impl MemoryStore for FileMemoryStore {
    async fn list(&self) -> Result<Vec<MemoryEntry>, MemoryError> {
        let entries = self.load_entries()?;
        debug!("listed memories (count={})", entries.len());
        Ok(entries)
    }

    async fn append(&self, text: &str) -> Result<MemoryEntry, MemoryError> {
        let _guard = self.write_lock.lock();
        let mut entries = self.load_entries()?;
        let entry = MemoryEntry::new(text);
        entries.push(entry.clone());
        self.write_entries(&entries)?;
        debug!(
            "stored memory (text_len={}, total={})",
            text.len(),
            entries.len()
        );
        Ok(entry)
    }

    async fn clear(&self) -> Result<usize, MemoryError> {
        let _guard = self.write_lock.lock();
        let entries = self.load_entries()?;
        let cleared = entries.len();
        self.write_entries(&[])?;
        info!("cleared memories (count={})", cleared);
        Ok(cleared)
    }
}
