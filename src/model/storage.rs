//! Persistent storage behind a model.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

/// Where a model's document bytes live.
pub trait Storage: Send {
    fn read(&self) -> io::Result<Vec<u8>>;

    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Label used in diagnostics.
    fn describe(&self) -> String;
}

/// A file on disk. A missing file reads as empty.
#[derive(Debug, Clone)]
pub struct FileStorage {
    path: PathBuf,
}

impl FileStorage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Storage for FileStorage {
    fn read(&self) -> io::Result<Vec<u8>> {
        match fs::read(&self.path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        fs::write(&self.path, bytes)
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

/// Shared in-memory bytes. Clones see the same contents.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    bytes: Arc<Mutex<Vec<u8>>>,
}

impl MemoryStorage {
    pub fn new(text: &str) -> Self {
        Self {
            bytes: Arc::new(Mutex::new(text.as_bytes().to_vec())),
        }
    }

    pub fn contents(&self) -> Vec<u8> {
        self.bytes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contents_str(&self) -> String {
        String::from_utf8_lossy(&self.contents()).into_owned()
    }
}

impl Storage for MemoryStorage {
    fn read(&self) -> io::Result<Vec<u8>> {
        Ok(self.contents())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        let mut contents = self.bytes.lock().unwrap_or_else(PoisonError::into_inner);
        contents.clear();
        contents.extend_from_slice(bytes);
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("len", &self.contents().len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_storage_round_trip() {
        let dir = TempDir::new().unwrap();
        let mut storage = FileStorage::new(dir.path().join("bnd.bnd"));
        assert!(storage.read().unwrap().is_empty());

        storage.write(b"a: 1\n").unwrap();
        assert_eq!(storage.read().unwrap(), b"a: 1\n");
        assert!(storage.describe().ends_with("bnd.bnd"));
    }

    #[test]
    fn test_memory_storage_is_shared() {
        let storage = MemoryStorage::new("a: 1\n");
        let mut writer = storage.clone();
        writer.write(b"b: 2\n").unwrap();
        assert_eq!(storage.contents_str(), "b: 2\n");
    }
}
