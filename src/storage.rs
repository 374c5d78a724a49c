//! Keyed durable storage for checkpoints.
//!
//! The agent only needs `get`/`put` by key; where the bytes end up is decided
//! by whoever constructs it.

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::error::{DqnError, Result};

/// Default directory of the [`FileStore`].
pub const MODELS_DIR: &str = "models";

/// Extension of the files written by [`FileStore`].
pub const MODEL_EXTENSION: &str = "bin";

pub trait ModelStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()>;

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.get(key)?.is_some())
    }
}

/// One file per key, `<root>/<key>.bin`.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FileStore { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.{}", key, MODEL_EXTENSION))
    }
}

impl Default for FileStore {
    fn default() -> Self {
        FileStore::new(Path::new(".").join(MODELS_DIR))
    }
}

impl ModelStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        match fs::read(self.path_for(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        fs::create_dir_all(&self.root)?;
        let path = self.path_for(key);
        write_atomic(&path, bytes)?;
        log::debug!("Save {} bytes to {:?}", bytes.len(), path);
        Ok(())
    }

    fn contains(&self, key: &str) -> Result<bool> {
        Ok(self.path_for(key).is_file())
    }
}

/// Writes to a sibling temporary file, then renames it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let parent = path.parent().unwrap_or_else(|| Path::new("."));
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("model.bin");
    let tmp_path = parent.join(format!(".{}.tmp.{}", file_name, std::process::id()));
    let written = fs::write(&tmp_path, bytes).and_then(|_| fs::rename(&tmp_path, path));
    if written.is_err() {
        // the previous entry at `path` is left as it was
        let _ = fs::remove_file(&tmp_path);
    }
    written
}

/// In-memory store. Clones share the same entries, so a test can keep a
/// handle while the agent owns another.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    writes: Arc<Mutex<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of successful `put` calls across all clones.
    pub fn write_count(&self) -> usize {
        self.writes.lock().map(|count| *count).unwrap_or(0)
    }

    pub fn keys(&self) -> Vec<String> {
        let mut keys = self
            .entries
            .lock()
            .map(|entries| entries.keys().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        keys.sort();
        keys
    }
}

impl ModelStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        let entries = self
            .entries
            .lock()
            .map_err(|_| DqnError::Storage("memory store lock poisoned".to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn put(&mut self, key: &str, bytes: &[u8]) -> Result<()> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|_| DqnError::Storage("memory store lock poisoned".to_string()))?;
        entries.insert(key.to_string(), bytes.to_vec());
        if let Ok(mut writes) = self.writes.lock() {
            *writes += 1;
        }
        Ok(())
    }
}
