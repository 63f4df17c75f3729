//! Crash-safe datafile rewrites and startup recovery
//!
//! A full-file rewrite must never be observable half-done: after a crash at
//! any point, the datafile holds either the complete old contents or the
//! complete new contents. The protocol gets this from a single primitive,
//! the host's atomic rename, and bounds durability with explicit flush
//! barriers around that commit point.
//!
//! Nothing here is retried and nothing is cleaned up on failure. An
//! orphaned temp file is left where it is; the next
//! [`Persistence::ensure_datafile_integrity`] call is the system's sole
//! recovery point.

use crate::error::DenResult;
use crate::storage::{FlushTarget, Storage};

/// Suffix marking an in-flight rewrite of a datafile.
///
/// `name~` is a fixed part of the on-disk contract: any tool inspecting a
/// store directory must treat `name~` as a potential orphaned rewrite of
/// `name`.
pub const TEMP_SUFFIX: &str = "~";

/// Name of the staging file for a rewrite of `filename`.
pub fn temp_datafile_name(filename: &str) -> String {
    format!("{}{}", filename, TEMP_SUFFIX)
}

/// Durability protocol over a host storage capability.
///
/// Owns no persistent state of its own; every operation is a strict
/// sequence of capability calls with specific ordering and flush points.
///
/// The protocol provides no mutual exclusion. At most one rewrite of a
/// given datafile may be in flight at a time: interleaved writers share a
/// temp name and would corrupt each other, so the database layer above
/// serializes rewrites per datafile.
pub struct Persistence<S: Storage> {
    storage: S,
}

impl<S: Storage> Persistence<S> {
    /// Wrap a storage host.
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// The underlying host.
    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Unwrap, returning the host.
    pub fn into_inner(self) -> S {
        self.storage
    }

    /// Fully rewrite `filename` with `data`, immune to crashes during the
    /// write operation.
    ///
    /// WRITE ORDERING: each step gates the next, and the first failure
    /// aborts the remainder and surfaces to the caller.
    ///
    /// 1. flush:  containing directory (barrier before mutating anything)
    /// 2. flush:  `filename` itself, if it already exists
    /// 3. write:  the full `data` to `filename~`
    /// 4. flush:  `filename~` (new contents durable under the temp name)
    /// 5. rename: `filename~` onto `filename`, the single commit point
    /// 6. flush:  containing directory (the commit itself durable)
    ///
    /// A crash before step 5 leaves the old datafile untouched. A crash
    /// after step 5 leaves the new contents fully in place. A crash during
    /// step 5 is excluded by the host's rename atomicity contract. On
    /// failure the datafile is still intact; retrying the whole sequence
    /// is the caller's decision.
    pub fn crash_safe_write_file(&self, filename: &str, data: &[u8]) -> DenResult<()> {
        let temp_filename = temp_datafile_name(filename);

        // Step 1: barrier on the directory before touching anything
        self.storage.flush_to_storage(&FlushTarget::parent_dir(filename))?;

        // Step 2: barrier on the pre-existing datafile state
        if self.storage.exists(filename) {
            self.storage.flush_to_storage(&FlushTarget::file(filename))?;
        }

        // Step 3: stage the complete new contents under the temp name,
        // replacing whatever a previous rewrite may have left there
        self.storage.write_file(&temp_filename, data)?;

        // Step 4: the new contents must be durable before they may win
        self.storage.flush_to_storage(&FlushTarget::file(&temp_filename))?;

        // Step 5: commit
        self.storage.rename(&temp_filename, filename)?;

        // Step 6: make the commit itself durable
        self.storage.flush_to_storage(&FlushTarget::parent_dir(filename))
    }

    /// Restore `filename` to a consistent state, whatever crash occurred
    /// during a prior rewrite. Called once per datafile before first use.
    ///
    /// Decision table over observable existence:
    ///
    /// | datafile | temp | action                                        |
    /// |----------|------|-----------------------------------------------|
    /// | yes      | any  | none, the committed file is trusted as-is     |
    /// | no       | no   | brand-new store: write an empty datafile      |
    /// | no       | yes  | rename temp onto datafile, consuming the temp |
    ///
    /// Existence of the committed datafile is sufficient evidence of a
    /// good commit; its contents are never inspected here.
    pub fn ensure_datafile_integrity(&self, filename: &str) -> DenResult<()> {
        // Prior write committed, or no write ever happened.
        if self.storage.exists(filename) {
            return Ok(());
        }

        let temp_filename = temp_datafile_name(filename);

        // Neither file exists: brand-new store.
        if !self.storage.exists(&temp_filename) {
            return self.storage.write_file(filename, b"");
        }

        // A rewrite crashed after the temp was written but before the
        // commit completed. The temp holds the last fully-written version.
        self.storage.rename(&temp_filename, filename)
    }

    /// Delete `file` if it exists; no-op otherwise.
    pub fn ensure_file_doesnt_exist(&self, file: &str) -> DenResult<()> {
        if !self.storage.exists(file) {
            return Ok(());
        }
        self.storage.unlink(file)
    }
}
