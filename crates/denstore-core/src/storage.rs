//! Storage capability contract
//!
//! The durability protocol performs no file I/O of its own. A host (the
//! mobile platform bridge, a local filesystem, process memory) supplies the
//! eight primitives below and the protocol sequences them. Hosts address
//! entities by opaque string names; only the host decides what a name means
//! on its side of the boundary.

use crate::error::DenResult;

/// A durability barrier request.
///
/// Carries the target name and a directory flag, nothing else. When
/// `is_dir` is set the host must make the directory containing `name`
/// durable; the protocol never addresses directories by name directly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlushTarget {
    /// Opaque name the barrier applies to
    pub name: String,
    /// Flush the directory containing `name` instead of `name` itself
    pub is_dir: bool,
}

impl FlushTarget {
    /// Barrier on the named file.
    pub fn file<N: Into<String>>(name: N) -> Self {
        Self { name: name.into(), is_dir: false }
    }

    /// Barrier on the directory containing `name`.
    pub fn parent_dir<N: Into<String>>(name: N) -> Self {
        Self { name: name.into(), is_dir: true }
    }
}

/// Host-provided storage capability.
///
/// Every operation completes exactly once, with `Ok` or with an error.
/// Hosts must not retry internally: the protocol treats the first failure
/// as fatal for the step sequence in progress and surfaces it unchanged.
pub trait Storage {
    /// Whether `name` currently exists. Absence is a normal `false`,
    /// never an error.
    fn exists(&self, name: &str) -> bool;

    /// Full contents of `name`. Fails with [`DenError::NotFound`] when the
    /// entity is absent.
    ///
    /// [`DenError::NotFound`]: crate::error::DenError::NotFound
    fn read_file(&self, name: &str) -> DenResult<Vec<u8>>;

    /// Create `name`, or truncate and overwrite it, with `contents`.
    fn write_file(&self, name: &str, contents: &[u8]) -> DenResult<()>;

    /// Append `contents` to `name`, creating it when absent.
    fn append_file(&self, name: &str, contents: &[u8]) -> DenResult<()>;

    /// Remove `name`. Whether removal of an absent name is an error is the
    /// host's business; the protocol only unlinks behind an existence
    /// check.
    fn unlink(&self, name: &str) -> DenResult<()>;

    /// Move `old_name` onto `new_name`, replacing any existing entity at
    /// the destination.
    ///
    /// Must be atomic with respect to concurrent readers: an observer sees
    /// the old entity or the new one at `new_name`, never a half-renamed
    /// state. This is the single commit primitive the durability protocol
    /// relies on.
    fn rename(&self, old_name: &str, new_name: &str) -> DenResult<()>;

    /// Create `dir` and any missing parents. Idempotent.
    fn mkdirp(&self, dir: &str) -> DenResult<()>;

    /// Force prior writes to `target` onto durable storage before
    /// returning. Hosts without OS-buffer control may report success
    /// without doing anything; the protocol treats that as an honored
    /// barrier.
    fn flush_to_storage(&self, target: &FlushTarget) -> DenResult<()>;
}
