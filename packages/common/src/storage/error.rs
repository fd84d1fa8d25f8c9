use std::fmt;

/// Errors returned by an object store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// The request never produced a response (connect, timeout, TLS).
    Transport(String),
    /// The storage service answered with a non-success status.
    Api { status: u16, message: String },
    /// An object with this name already exists in the bucket.
    AlreadyExists(String),
    /// The object name is unusable.
    InvalidName(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(msg) => write!(f, "storage transport error: {msg}"),
            Self::Api { status, message } => {
                write!(f, "storage service error ({status}): {message}")
            }
            Self::AlreadyExists(name) => write!(f, "object already exists: {name}"),
            Self::InvalidName(msg) => write!(f, "invalid object name: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {}
