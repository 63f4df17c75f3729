//! Denstore Core: crash-safe datafile persistence
//!
//! The persistence layer of an embedded document store. A host supplies
//! primitive file operations through the [`Storage`] capability; this crate
//! sequences them into a durability protocol:
//!
//! - **Crash-safe write**: stage the complete new contents under `name~`,
//!   make them durable, then atomically rename onto `name`. The rename is
//!   the only commit point, so an interrupted rewrite never tears the
//!   datafile.
//! - **Integrity check**: at startup, reconcile the existence of `name`
//!   and `name~` to repair whatever state a crash left behind.
//!
//! # Division of labor
//!
//! This crate implements no file I/O. Hosts do: `denstore-fs` binds the
//! capability to a local filesystem with real durability barriers, and
//! [`MemStorage`] here binds it to process memory for tests and ephemeral
//! stores. The database layer above decides when to rewrite a datafile and
//! serializes rewrites per file; this layer guarantees each rewrite lands
//! whole or not at all.

pub mod error;
pub mod memory;
pub mod persistence;
pub mod storage;

// Re-export key types for convenience
pub use error::{DenError, DenResult};
pub use memory::MemStorage;
pub use persistence::{temp_datafile_name, Persistence, TEMP_SUFFIX};
pub use storage::{FlushTarget, Storage};
