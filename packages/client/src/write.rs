//! Create-or-edit workflow for a single cabin.
//!
//! A write touches two services in sequence: the table row is written
//! first, then the image is uploaded if the draft carries a new file. When
//! that upload fails on a freshly created row, the row is deleted again.
//! An edited row is never deleted, so a failed upload on edit leaves the row
//! pointing at an object that does not exist yet.

use common::cabin::{Cabin, CabinDraft, CabinId, CabinImage, CabinRow, ImageUpload};
use common::storage::{ObjectName, ObjectStore};
use common::table::CabinTable;
use tracing::{debug, error, info, warn};

use crate::error::{CabinError, WriteFailure};

/// Whether a write inserts a new row or replaces an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Create,
    Edit(CabinId),
}

impl WriteMode {
    pub fn from_id(id: Option<CabinId>) -> Self {
        match id {
            Some(id) => Self::Edit(id),
            None => Self::Create,
        }
    }
}

/// How the image column gets its value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImagePlan {
    /// The draft already references a stored object. No upload.
    Keep { name: ObjectName, uri: String },
    /// A new file is uploaded under `name` and exposed at `uri`.
    Upload {
        name: ObjectName,
        uri: String,
        upload: ImageUpload,
    },
}

impl ImagePlan {
    pub fn name(&self) -> &ObjectName {
        match self {
            Self::Keep { name, .. } | Self::Upload { name, .. } => name,
        }
    }
}

/// Everything a write needs, computed before any remote call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WritePlan {
    pub mode: WriteMode,
    pub row: CabinRow,
    pub image: ImagePlan,
}

impl WritePlan {
    pub fn prepare(
        draft: CabinDraft,
        mode: WriteMode,
        storage: &dyn ObjectStore,
    ) -> Result<Self, CabinError> {
        let invalid = |uri: &str| CabinError::InvalidImage {
            uri: uri.to_string(),
            expected_base: storage.public_base().to_string(),
        };

        let image = match draft.image {
            CabinImage::Stored(original) => {
                if !storage.is_public_url(&original) {
                    return Err(invalid(&original));
                }
                let name = ObjectName::from_public_url(&original).map_err(|_| invalid(&original))?;
                // A new row always gets the canonical URI; an edited row keeps
                // the exact string it already had.
                let uri = match mode {
                    WriteMode::Create => storage.public_url(&name),
                    WriteMode::Edit(_) => original,
                };
                ImagePlan::Keep { name, uri }
            }
            CabinImage::Upload(upload) => {
                let name = ObjectName::generate(&upload.file_name);
                let uri = storage.public_url(&name);
                ImagePlan::Upload { name, uri, upload }
            }
        };

        let uri = match &image {
            ImagePlan::Keep { uri, .. } | ImagePlan::Upload { uri, .. } => uri.clone(),
        };

        Ok(Self {
            mode,
            row: CabinRow {
                fields: draft.fields,
                image: uri,
            },
            image,
        })
    }
}

/// States of a single write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WriteState {
    Writing,
    Uploading { row: Cabin },
    Compensating { row: Cabin },
    Done(Cabin),
    Failed(WriteFailure),
}

/// State names without payload, for tracing and assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteStage {
    Writing,
    Uploading,
    Compensating,
    Done,
    Failed,
}

impl WriteState {
    pub fn stage(&self) -> WriteStage {
        match self {
            Self::Writing => WriteStage::Writing,
            Self::Uploading { .. } => WriteStage::Uploading,
            Self::Compensating { .. } => WriteStage::Compensating,
            Self::Done(_) => WriteStage::Done,
            Self::Failed(_) => WriteStage::Failed,
        }
    }
}

/// Outcome of a write plus every stage it passed through.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WriteReport {
    pub stages: Vec<WriteStage>,
    pub result: Result<Cabin, WriteFailure>,
}

pub struct WriteWorkflow<'a> {
    table: &'a dyn CabinTable,
    storage: &'a dyn ObjectStore,
    plan: WritePlan,
}

impl<'a> WriteWorkflow<'a> {
    pub fn new(table: &'a dyn CabinTable, storage: &'a dyn ObjectStore, plan: WritePlan) -> Self {
        Self {
            table,
            storage,
            plan,
        }
    }

    /// Drive the workflow from `Writing` to a terminal state.
    pub async fn run(&self) -> WriteReport {
        let mut state = WriteState::Writing;
        let mut stages = vec![state.stage()];

        loop {
            state = match state {
                WriteState::Done(row) => {
                    return WriteReport {
                        stages,
                        result: Ok(row),
                    };
                }
                WriteState::Failed(failure) => {
                    return WriteReport {
                        stages,
                        result: Err(failure),
                    };
                }
                active => self.step(active).await,
            };
            stages.push(state.stage());
        }
    }

    /// Perform the remote call owned by `state` and return the next state.
    pub async fn step(&self, state: WriteState) -> WriteState {
        match state {
            WriteState::Writing => self.write_row().await,
            WriteState::Uploading { row } => self.upload_image(row).await,
            WriteState::Compensating { row } => self.compensate(row).await,
            terminal => terminal,
        }
    }

    async fn write_row(&self) -> WriteState {
        let result = match self.plan.mode {
            WriteMode::Create => self.table.insert(&self.plan.row).await,
            WriteMode::Edit(id) => self.table.update(id, &self.plan.row).await,
        };

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                error!(mode = ?self.plan.mode, error = %e, "Cabin row write failed");
                return WriteState::Failed(WriteFailure::Table);
            }
        };

        debug!(cabin_id = row.id, mode = ?self.plan.mode, "Cabin row written");

        match self.plan.image {
            ImagePlan::Keep { .. } => WriteState::Done(row),
            ImagePlan::Upload { .. } => WriteState::Uploading { row },
        }
    }

    async fn upload_image(&self, row: Cabin) -> WriteState {
        let ImagePlan::Upload { name, upload, .. } = &self.plan.image else {
            return WriteState::Done(row);
        };

        match self.storage.upload(name, upload).await {
            Ok(()) => {
                info!(cabin_id = row.id, object = %name, "Cabin image uploaded");
                WriteState::Done(row)
            }
            Err(e) => {
                error!(cabin_id = row.id, object = %name, error = %e, "Cabin image upload failed");
                match self.plan.mode {
                    WriteMode::Create => WriteState::Compensating { row },
                    WriteMode::Edit(id) => {
                        warn!(
                            cabin_id = id,
                            image = %row.image,
                            "Edited cabin kept; its image URI points at a missing object"
                        );
                        WriteState::Failed(WriteFailure::Upload)
                    }
                }
            }
        }
    }

    async fn compensate(&self, row: Cabin) -> WriteState {
        match self.table.delete(row.id).await {
            Ok(_) => info!(cabin_id = row.id, "Removed cabin created without its image"),
            Err(e) => error!(
                cabin_id = row.id,
                error = %e,
                "Compensating delete failed; cabin row remains without image"
            ),
        }
        WriteState::Failed(WriteFailure::Upload)
    }
}
