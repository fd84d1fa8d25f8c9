use thiserror::Error;

use crate::cabin::CabinId;

/// Errors returned by the table service.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TableError {
    #[error("Table transport error: {0}")]
    Transport(String),

    #[error("Table service error ({status}): {message}")]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    #[error("Failed to decode table response: {0}")]
    Decode(String),

    #[error("No cabin row with id {0}")]
    NotFound(CabinId),
}
