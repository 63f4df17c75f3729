//! In-memory storage host
//!
//! `MemStorage` implements the full capability contract against process
//! memory: rename is atomic under a single lock, and flush requests are
//! accepted without doing anything. That is exactly the contract of the
//! mobile hosts the protocol was written for, which makes this the
//! reference host for protocol tests and a usable backend for ephemeral
//! stores.

use hashbrown::{HashMap, HashSet};
use parking_lot::Mutex;

use crate::error::{DenError, DenResult};
use crate::storage::{FlushTarget, Storage};

#[derive(Default, Clone)]
struct Inner {
    /// File contents by opaque name
    files: HashMap<String, Vec<u8>>,
    /// Names created through mkdirp
    dirs: HashSet<String>,
}

/// Storage host backed by process memory.
pub struct MemStorage {
    inner: Mutex<Inner>,
}

impl MemStorage {
    /// Create an empty host.
    pub fn new() -> Self {
        Self { inner: Mutex::new(Inner::default()) }
    }

    /// Number of files currently stored.
    pub fn file_count(&self) -> usize {
        let inner = self.inner.lock();
        inner.files.len()
    }
}

impl Default for MemStorage {
    fn default() -> Self { Self::new() }
}

/// Snapshot the current contents into an independent host. Crash tests
/// rely on this to replay recovery from intermediate states.
impl Clone for MemStorage {
    fn clone(&self) -> Self {
        let inner = self.inner.lock();
        Self { inner: Mutex::new(inner.clone()) }
    }
}

impl Storage for MemStorage {
    fn exists(&self, name: &str) -> bool {
        let inner = self.inner.lock();
        inner.files.contains_key(name) || inner.dirs.contains(name)
    }

    fn read_file(&self, name: &str) -> DenResult<Vec<u8>> {
        let inner = self.inner.lock();
        inner.files.get(name).cloned().ok_or_else(|| DenError::NotFound {
            name: name.to_string(),
        })
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> DenResult<()> {
        let mut inner = self.inner.lock();
        inner.files.insert(name.to_string(), contents.to_vec());
        Ok(())
    }

    fn append_file(&self, name: &str, contents: &[u8]) -> DenResult<()> {
        let mut inner = self.inner.lock();
        inner.files.entry(name.to_string()).or_default().extend_from_slice(contents);
        Ok(())
    }

    fn unlink(&self, name: &str) -> DenResult<()> {
        let mut inner = self.inner.lock();
        if inner.files.remove(name).is_some() {
            return Ok(());
        }
        if inner.dirs.remove(name) {
            // Directories go with everything under them, like the mobile
            // hosts' recursive delete.
            let prefix = format!("{}/", name);
            inner.files.retain(|k, _| !k.starts_with(&prefix));
            inner.dirs.retain(|k| !k.starts_with(&prefix));
            return Ok(());
        }
        Err(DenError::Io {
            name: Some(name.to_string()),
            kind: std::io::ErrorKind::NotFound,
            message: "Cannot unlink: no such entry".to_string(),
        })
    }

    fn rename(&self, old_name: &str, new_name: &str) -> DenResult<()> {
        // Single lock for the whole move: readers observe the old entity
        // or the new one, never an in-between state.
        let mut inner = self.inner.lock();
        match inner.files.remove(old_name) {
            Some(contents) => {
                inner.files.insert(new_name.to_string(), contents);
                Ok(())
            }
            None => Err(DenError::Io {
                name: Some(old_name.to_string()),
                kind: std::io::ErrorKind::NotFound,
                message: "Cannot rename: no such entry".to_string(),
            }),
        }
    }

    fn mkdirp(&self, dir: &str) -> DenResult<()> {
        let mut inner = self.inner.lock();
        // Record every ancestor so exists() answers for parents too.
        let mut prefix = String::new();
        for segment in dir.split('/').filter(|s| !s.is_empty()) {
            if !prefix.is_empty() {
                prefix.push('/');
            }
            prefix.push_str(segment);
            inner.dirs.insert(prefix.clone());
        }
        Ok(())
    }

    fn flush_to_storage(&self, _target: &FlushTarget) -> DenResult<()> {
        // Process memory has no OS buffer to control. Reporting success is
        // the sanctioned behavior for such hosts.
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_read_roundtrip() {
        let storage = MemStorage::new();
        storage.write_file("a.db", b"payload").unwrap();

        assert!(storage.exists("a.db"));
        assert_eq!(storage.read_file("a.db").unwrap(), b"payload");
    }

    #[test]
    fn test_read_absent_is_not_found() {
        let storage = MemStorage::new();
        let result = storage.read_file("missing.db");
        assert!(matches!(result, Err(DenError::NotFound { name }) if name == "missing.db"));
    }

    #[test]
    fn test_write_truncates() {
        let storage = MemStorage::new();
        storage.write_file("a.db", b"a much longer first version").unwrap();
        storage.write_file("a.db", b"short").unwrap();
        assert_eq!(storage.read_file("a.db").unwrap(), b"short");
    }

    #[test]
    fn test_append_creates_then_extends() {
        let storage = MemStorage::new();
        storage.append_file("log.db", b"one\n").unwrap();
        storage.append_file("log.db", b"two\n").unwrap();
        assert_eq!(storage.read_file("log.db").unwrap(), b"one\ntwo\n");
    }

    #[test]
    fn test_unlink() {
        let storage = MemStorage::new();
        storage.write_file("a.db", b"x").unwrap();
        storage.unlink("a.db").unwrap();
        assert!(!storage.exists("a.db"));
    }

    #[test]
    fn test_unlink_absent_fails() {
        let storage = MemStorage::new();
        let result = storage.unlink("ghost");
        assert!(matches!(result, Err(DenError::Io { kind, .. }) if kind == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_unlink_directory_is_recursive() {
        let storage = MemStorage::new();
        storage.mkdirp("store").unwrap();
        storage.write_file("store/a.db", b"x").unwrap();
        storage.write_file("elsewhere.db", b"y").unwrap();

        storage.unlink("store").unwrap();
        assert!(!storage.exists("store"));
        assert!(!storage.exists("store/a.db"));
        assert!(storage.exists("elsewhere.db"));
    }

    #[test]
    fn test_rename_moves_and_overwrites() {
        let storage = MemStorage::new();
        storage.write_file("a.db~", b"new").unwrap();
        storage.write_file("a.db", b"old").unwrap();

        storage.rename("a.db~", "a.db").unwrap();
        assert!(!storage.exists("a.db~"));
        assert_eq!(storage.read_file("a.db").unwrap(), b"new");
    }

    #[test]
    fn test_rename_absent_source_fails() {
        let storage = MemStorage::new();
        let result = storage.rename("nope", "somewhere");
        assert!(matches!(result, Err(DenError::Io { kind, .. }) if kind == std::io::ErrorKind::NotFound));
    }

    #[test]
    fn test_mkdirp_records_ancestors() {
        let storage = MemStorage::new();
        storage.mkdirp("a/b/c").unwrap();
        assert!(storage.exists("a"));
        assert!(storage.exists("a/b"));
        assert!(storage.exists("a/b/c"));

        // Idempotent
        storage.mkdirp("a/b/c").unwrap();
    }

    #[test]
    fn test_flush_always_succeeds() {
        let storage = MemStorage::new();
        storage.flush_to_storage(&FlushTarget::file("anything")).unwrap();
        storage.flush_to_storage(&FlushTarget::parent_dir("anything")).unwrap();
    }

    #[test]
    fn test_clone_snapshots_independently() {
        let storage = MemStorage::new();
        storage.write_file("a.db", b"before").unwrap();

        let snapshot = storage.clone();
        storage.write_file("a.db", b"after").unwrap();

        assert_eq!(snapshot.read_file("a.db").unwrap(), b"before");
        assert_eq!(storage.read_file("a.db").unwrap(), b"after");
    }
}
