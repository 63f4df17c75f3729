//! Denstore FS: local-filesystem host for the persistence protocol
//!
//! Binds the `denstore-core` storage capability to a local filesystem.
//! Names resolve under a private root directory, and flush barriers map to
//! the platform's strongest durable-sync primitive (or to accepted no-ops
//! under [`SyncPolicy::WriteThrough`], matching hosts without OS-buffer
//! control).
//!
//! ```no_run
//! use denstore_core::Persistence;
//! use denstore_fs::FsStorage;
//!
//! let storage = FsStorage::open("/var/lib/myapp/denstore")?;
//! let store = Persistence::new(storage);
//!
//! store.ensure_datafile_integrity("events.db")?;
//! store.crash_safe_write_file("events.db", b"serialized documents")?;
//! # Ok::<(), denstore_core::DenError>(())
//! ```

pub mod durability;
pub mod storage;

pub use storage::{FsStorage, SyncPolicy};
