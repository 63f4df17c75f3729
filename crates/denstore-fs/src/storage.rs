//! Local-filesystem storage host
//!
//! `FsStorage` resolves every opaque name under a private root directory,
//! the way the mobile hosts scope database files under the application's
//! private files dir. The host joins names to the root and nothing more;
//! what a name means is decided here, never in the protocol.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use denstore_core::{DenError, DenResult, FlushTarget, Storage};

use crate::durability::{sync_file, sync_parent_dir};

/// How flush requests are honored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncPolicy {
    /// Apply the platform durable-sync primitive on every flush request.
    Durable,
    /// Accept flush requests without syncing. For hosts that write through
    /// on every operation, or accept the exposure; this is the observed
    /// behavior of the mobile environments this layer came from.
    WriteThrough,
}

/// Storage host backed by a local filesystem subtree.
pub struct FsStorage {
    /// Private root every name resolves under
    root: PathBuf,
    /// Flush behavior
    sync: SyncPolicy,
}

impl FsStorage {
    /// Open a storage root with durable flush barriers, creating the root
    /// directory if it is missing.
    pub fn open<P: AsRef<Path>>(root: P) -> DenResult<Self> {
        Self::with_sync_policy(root, SyncPolicy::Durable)
    }

    /// Open a storage root with an explicit flush behavior.
    pub fn with_sync_policy<P: AsRef<Path>>(root: P, sync: SyncPolicy) -> DenResult<Self> {
        let root = root.as_ref().to_path_buf();
        fs::create_dir_all(&root).map_err(|e| DenError::Io {
            name: Some(root.display().to_string()),
            kind: e.kind(),
            message: format!("Failed to create storage root: {}", e),
        })?;
        Ok(Self { root, sync })
    }

    /// The private root directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The configured flush behavior.
    pub fn sync_policy(&self) -> SyncPolicy {
        self.sync
    }

    /// Resolve an opaque name under the private root.
    fn resolve(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }
}

impl Storage for FsStorage {
    fn exists(&self, name: &str) -> bool {
        self.resolve(name).exists()
    }

    fn read_file(&self, name: &str) -> DenResult<Vec<u8>> {
        let path = self.resolve(name);
        fs::read(&path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                DenError::NotFound { name: name.to_string() }
            } else {
                DenError::Io {
                    name: Some(name.to_string()),
                    kind: e.kind(),
                    message: format!("Failed to read file: {}", e),
                }
            }
        })
    }

    fn write_file(&self, name: &str, contents: &[u8]) -> DenResult<()> {
        let path = self.resolve(name);
        fs::write(&path, contents).map_err(|e| DenError::Io {
            name: Some(name.to_string()),
            kind: e.kind(),
            message: format!("Failed to write file: {}", e),
        })
    }

    fn append_file(&self, name: &str, contents: &[u8]) -> DenResult<()> {
        let path = self.resolve(name);
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| DenError::Io {
                name: Some(name.to_string()),
                kind: e.kind(),
                message: format!("Failed to open file for append: {}", e),
            })?;

        file.write_all(contents).map_err(|e| DenError::Io {
            name: Some(name.to_string()),
            kind: e.kind(),
            message: format!("Failed to append to file: {}", e),
        })
    }

    fn unlink(&self, name: &str) -> DenResult<()> {
        let path = self.resolve(name);
        // Directories go with everything under them, matching the mobile
        // hosts' recursive delete.
        let result = if path.is_dir() {
            fs::remove_dir_all(&path)
        } else {
            fs::remove_file(&path)
        };
        result.map_err(|e| DenError::Io {
            name: Some(name.to_string()),
            kind: e.kind(),
            message: format!("Failed to unlink: {}", e),
        })
    }

    fn rename(&self, old_name: &str, new_name: &str) -> DenResult<()> {
        let old = self.resolve(old_name);
        let new = self.resolve(new_name);

        match fs::rename(&old, &new) {
            Ok(()) => Ok(()),
            Err(rename_err) if old.exists() => {
                // A direct rename can fail across volumes. Fall back to
                // copy-then-delete like the mobile hosts do. The fallback
                // is not atomic; the protocol never triggers it, since a
                // datafile and its temp always share a directory.
                fs::copy(&old, &new).map_err(|e| DenError::Io {
                    name: Some(new_name.to_string()),
                    kind: e.kind(),
                    message: format!(
                        "Rename failed ({}) and copy fallback failed: {}",
                        rename_err, e
                    ),
                })?;
                fs::remove_file(&old).map_err(|e| DenError::Io {
                    name: Some(old_name.to_string()),
                    kind: e.kind(),
                    message: format!("Failed to remove source after copy fallback: {}", e),
                })
            }
            Err(e) => Err(DenError::Io {
                name: Some(old_name.to_string()),
                kind: e.kind(),
                message: format!("Failed to rename: {}", e),
            }),
        }
    }

    fn mkdirp(&self, dir: &str) -> DenResult<()> {
        let path = self.resolve(dir);
        fs::create_dir_all(&path).map_err(|e| DenError::Io {
            name: Some(dir.to_string()),
            kind: e.kind(),
            message: format!("Failed to create directory: {}", e),
        })
    }

    fn flush_to_storage(&self, target: &FlushTarget) -> DenResult<()> {
        if self.sync == SyncPolicy::WriteThrough {
            return Ok(());
        }

        let path = self.resolve(&target.name);
        let result = if target.is_dir {
            sync_parent_dir(&path)
        } else {
            sync_file(&path)
        };
        result.map_err(|e| DenError::Io {
            name: Some(target.name.clone()),
            kind: e.kind(),
            message: format!("Flush to storage failed: {}", e),
        })
    }
}
