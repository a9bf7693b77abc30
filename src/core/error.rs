//! Error types for scanning and loading topic documents

use std::io;
use std::path::{Path, PathBuf};

/// Errors raised by the topic index
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("path not found: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("permission denied: {}", path.display())]
    PermissionDenied { path: PathBuf },

    #[error("not a directory: {}", path.display())]
    NotADirectory { path: PathBuf },

    /// File content is not valid UTF-8
    #[error("file is not valid UTF-8 text: {}", path.display())]
    Decode { path: PathBuf },

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid search pattern: {0}")]
    Pattern(String),

    #[error("file watcher failed: {0}")]
    Watch(#[from] notify::Error),
}

impl IndexError {
    /// Classify an I/O error raised while touching `path`
    pub fn from_io(path: &Path, err: io::Error) -> Self {
        let path = path.to_path_buf();
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound { path },
            io::ErrorKind::PermissionDenied => Self::PermissionDenied { path },
            io::ErrorKind::InvalidData => Self::Decode { path },
            _ => Self::Io { path, source: err },
        }
    }

    /// Classify a directory walk error
    pub fn from_walk(fallback: &Path, err: walkdir::Error) -> Self {
        let path = err.path().unwrap_or(fallback).to_path_buf();
        match err.into_io_error() {
            Some(io_err) => Self::from_io(&path, io_err),
            // Symlink loops are the only walk errors without an io::Error
            None => Self::Io {
                path,
                source: io::Error::other("filesystem loop detected"),
            },
        }
    }

    /// Path the error refers to, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::NotFound { path }
            | Self::PermissionDenied { path }
            | Self::NotADirectory { path }
            | Self::Decode { path }
            | Self::Io { path, .. } => Some(path),
            Self::Pattern(_) | Self::Watch(_) => None,
        }
    }
}

pub type Result<T, E = IndexError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_io_classifies_kinds() {
        let path = Path::new("notes/a.md");

        let err = IndexError::from_io(path, io::Error::from(io::ErrorKind::NotFound));
        assert!(matches!(err, IndexError::NotFound { .. }));

        let err = IndexError::from_io(path, io::Error::from(io::ErrorKind::PermissionDenied));
        assert!(matches!(err, IndexError::PermissionDenied { .. }));

        let err = IndexError::from_io(path, io::Error::from(io::ErrorKind::InvalidData));
        assert!(matches!(err, IndexError::Decode { .. }));

        let err = IndexError::from_io(path, io::Error::from(io::ErrorKind::Interrupted));
        assert!(matches!(err, IndexError::Io { .. }));
        assert_eq!(err.path(), Some(path));
    }

    #[test]
    fn test_display_mentions_path() {
        let err = IndexError::NotFound {
            path: PathBuf::from("missing/root"),
        };
        assert!(err.to_string().contains("missing/root"));
    }
}
