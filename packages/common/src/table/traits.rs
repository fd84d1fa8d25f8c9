use async_trait::async_trait;

use super::error::TableError;
use crate::cabin::{Cabin, CabinId, CabinRow};

/// The remote table holding cabin rows.
#[async_trait]
pub trait CabinTable: Send + Sync {
    /// Unconstrained selection of every row.
    async fn select_all(&self) -> Result<Vec<Cabin>, TableError>;

    /// Insert one row and return it as stored, with its assigned id.
    async fn insert(&self, row: &CabinRow) -> Result<Cabin, TableError>;

    /// Replace every column of the row matching `id`.
    async fn update(&self, id: CabinId, row: &CabinRow) -> Result<Cabin, TableError>;

    /// Delete rows matching `id`, returning what the service echoes back.
    async fn delete(&self, id: CabinId) -> Result<Vec<Cabin>, TableError>;
}
