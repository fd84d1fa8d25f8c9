mod error;
mod traits;

#[cfg(feature = "memory")]
pub mod memory;

pub use error::TableError;
pub use traits::CabinTable;
