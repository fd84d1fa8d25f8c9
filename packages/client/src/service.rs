use std::sync::Arc;

use common::cabin::{Cabin, CabinDraft, CabinId};
use common::storage::ObjectStore;
use common::table::CabinTable;
use tracing::{error, info, instrument};

use crate::error::{CabinError, Result};
use crate::write::{WriteMode, WritePlan, WriteWorkflow};

/// Data access for cabins.
///
/// Holds the table and storage clients explicitly; swap either for an
/// in-memory implementation in tests.
#[derive(Clone)]
pub struct CabinService {
    table: Arc<dyn CabinTable>,
    storage: Arc<dyn ObjectStore>,
}

impl CabinService {
    pub fn new(table: Arc<dyn CabinTable>, storage: Arc<dyn ObjectStore>) -> Self {
        Self { table, storage }
    }

    /// Every cabin row, in whatever order the table yields them.
    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Cabin>> {
        self.table.select_all().await.map_err(|e| {
            error!(error = %e, "Failed to load cabins");
            CabinError::Read
        })
    }

    /// Create a cabin (`id` is `None`) or replace an existing one.
    ///
    /// See [`crate::write`] for the step order and what happens to the row
    /// when the image upload fails.
    #[instrument(skip(self, draft))]
    pub async fn write(&self, draft: CabinDraft, id: Option<CabinId>) -> Result<Cabin> {
        let plan = WritePlan::prepare(draft, WriteMode::from_id(id), &*self.storage)?;
        let report = WriteWorkflow::new(&*self.table, &*self.storage, plan)
            .run()
            .await;

        let row = report.result?;
        info!(cabin_id = row.id, stages = ?report.stages, "Cabin written");
        Ok(row)
    }

    /// Create a copy of `cabin` that shares its stored image.
    pub async fn duplicate(&self, cabin: &Cabin) -> Result<Cabin> {
        self.write(CabinDraft::duplicate_of(cabin), None).await
    }

    /// Delete the row with `id` and return what the table echoed.
    ///
    /// The stored image is left in place.
    #[instrument(skip(self))]
    pub async fn delete_by_id(&self, id: CabinId) -> Result<Vec<Cabin>> {
        self.table.delete(id).await.map_err(|e| {
            error!(cabin_id = id, error = %e, "Failed to delete cabin");
            CabinError::Delete
        })
    }
}
