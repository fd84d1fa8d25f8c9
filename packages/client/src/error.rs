use thiserror::Error;

/// Which step of a create/edit failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum WriteFailure {
    /// The insert or update of the row failed.
    #[error("Cabins could not be created/edited")]
    Table,
    /// The row was written but its image could not be uploaded.
    #[error("Cabin image could not be uploaded and the cabin was not created")]
    Upload,
}

/// Errors surfaced to callers of [`crate::CabinService`].
///
/// Messages are fixed and safe to show to an end user. The underlying
/// service error is logged where it happens.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CabinError {
    #[error("Cabins could not be loaded")]
    Read,

    #[error(transparent)]
    Write(#[from] WriteFailure),

    #[error("Cabin could not be deleted")]
    Delete,

    #[error("Cabin image must be a new upload or a URL under {expected_base}, got {uri}")]
    InvalidImage { uri: String, expected_base: String },
}

pub type Result<T> = std::result::Result<T, CabinError>;
