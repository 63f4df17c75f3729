//! Error types for denstore operations
//!
//! Every failure surfaced by a storage host or by the durability protocol
//! is a DenError. The protocol never retries and never remaps host
//! failures; the first error aborts the sequence in progress and travels
//! to the caller verbatim.

use std::error::Error;
use std::fmt;

/// Denstore error types with host context
#[derive(Debug, Clone)]
pub enum DenError {
    /// Read of an entity that does not exist
    NotFound {
        /// Name of the missing entity
        name: String,
    },

    /// Host storage operation failed
    Io {
        /// The name the failing operation was addressing, if known
        name: Option<String>,
        /// The underlying I/O error kind
        kind: std::io::ErrorKind,
        /// Human-readable description
        message: String,
    },
}

impl fmt::Display for DenError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DenError::NotFound { name } => {
                write!(f, "No such entry: {}", name)
            }

            DenError::Io { name, kind, message } => {
                if let Some(name) = name {
                    write!(f, "I/O error in {}: {} ({})", name, message, kind)
                } else {
                    write!(f, "I/O error: {} ({})", message, kind)
                }
            }
        }
    }
}

impl Error for DenError {}

/// Convert std::io::Error to DenError::Io
impl From<std::io::Error> for DenError {
    fn from(err: std::io::Error) -> Self {
        DenError::Io {
            name: None,
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

/// Result type alias for denstore operations
pub type DenResult<T> = Result<T, DenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_display() {
        let err = DenError::NotFound {
            name: "users.db".to_string(),
        };

        let display = format!("{}", err);
        assert!(display.contains("No such entry"));
        assert!(display.contains("users.db"));
    }

    #[test]
    fn test_io_display_carries_name() {
        let err = DenError::Io {
            name: Some("users.db~".to_string()),
            kind: std::io::ErrorKind::PermissionDenied,
            message: "write denied".to_string(),
        };

        let display = format!("{}", err);
        assert!(display.contains("users.db~"));
        assert!(display.contains("write denied"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let den_err: DenError = io_err.into();

        match den_err {
            DenError::Io { kind, .. } => assert_eq!(kind, std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io error"),
        }
    }
}
