//! Platform durable sync
//!
//! A flush barrier is only as strong as the primitive behind it, and every
//! platform draws the line somewhere else. This module maps the barrier
//! onto the strongest guarantee available:
//!
//! - Linux: fdatasync(), file data without metadata timestamps
//! - macOS/iOS: fcntl(F_FULLFSYNC), because plain fsync there only reaches
//!   the disk's volatile write cache
//! - Windows: FlushFileBuffers()
//! - everything else: the stdlib's sync_data()
//!
//! These calls can block for milliseconds under I/O pressure; callers must
//! not hold locks across them.

use std::fs::File;
use std::io;
use std::path::Path;

/// Block until the file's data has reached durable storage.
pub fn durable_sync(file: &File) -> io::Result<()> {
    #[cfg(target_os = "linux")]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        // SAFETY: fdatasync operates on the open descriptor borrowed from
        // a live File.
        let result = unsafe { libc::fdatasync(fd) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(any(target_os = "macos", target_os = "ios"))]
    {
        use std::os::unix::io::AsRawFd;
        let fd = file.as_raw_fd();
        // SAFETY: fcntl(F_FULLFSYNC) operates on the open descriptor
        // borrowed from a live File.
        let result = unsafe { libc::fcntl(fd, libc::F_FULLFSYNC) };
        if result == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(target_os = "windows")]
    {
        use std::os::windows::io::AsRawHandle;
        use winapi::um::fileapi::FlushFileBuffers;
        let handle = file.as_raw_handle();
        // SAFETY: FlushFileBuffers operates on the open handle borrowed
        // from a live File.
        let result = unsafe { FlushFileBuffers(handle as *mut _) };
        if result != 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }

    #[cfg(not(any(
        target_os = "linux",
        target_os = "macos",
        target_os = "ios",
        target_os = "windows"
    )))]
    {
        file.sync_data()
    }
}

/// Open `path` and apply the durable-sync primitive to it.
pub fn sync_file(path: &Path) -> io::Result<()> {
    let file = File::open(path)?;
    durable_sync(&file)
}

/// Durably sync the directory containing `path`, making renames and
/// creations within it durable.
///
/// On Windows directories cannot be opened as sync targets through the
/// stdlib, so the barrier degrades to success there; NTFS journals
/// directory updates on its own.
pub fn sync_parent_dir(path: &Path) -> io::Result<()> {
    let parent = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    #[cfg(windows)]
    {
        let _ = parent;
        Ok(())
    }

    #[cfg(not(windows))]
    {
        let dir = File::open(parent)?;
        durable_sync(&dir)
    }
}
