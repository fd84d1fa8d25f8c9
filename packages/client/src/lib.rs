pub mod error;
pub mod rest;
pub mod service;
pub mod write;

pub use error::{CabinError, WriteFailure};
pub use rest::RestBackend;
pub use service::CabinService;
