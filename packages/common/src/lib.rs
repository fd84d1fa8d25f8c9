pub mod cabin;
pub mod config;
pub mod storage;
pub mod table;

pub use cabin::{Cabin, CabinDraft, CabinFields, CabinId, CabinImage, CabinRow, ImageUpload};
pub use config::BackendConfig;
