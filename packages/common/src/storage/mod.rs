mod error;
mod name;
mod traits;

#[cfg(feature = "memory")]
pub mod memory;

pub use error::StorageError;
pub use name::ObjectName;
pub use traits::ObjectStore;
