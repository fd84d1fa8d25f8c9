use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use chrono::Utc;

use super::error::TableError;
use super::traits::CabinTable;
use crate::cabin::{Cabin, CabinId, CabinRow};

/// Operation kinds accepted by [`MemoryCabinTable::fail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TableOp {
    Select,
    Insert,
    Update,
    Delete,
}

/// A call observed by [`MemoryCabinTable`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableCall {
    SelectAll,
    Insert(CabinRow),
    Update(CabinId, CabinRow),
    Delete(CabinId),
}

impl TableCall {
    pub fn op(&self) -> TableOp {
        match self {
            Self::SelectAll => TableOp::Select,
            Self::Insert(_) => TableOp::Insert,
            Self::Update(..) => TableOp::Update,
            Self::Delete(_) => TableOp::Delete,
        }
    }
}

struct Inner {
    rows: BTreeMap<CabinId, Cabin>,
    next_id: CabinId,
    calls: Vec<TableCall>,
    failures: HashMap<TableOp, TableError>,
}

/// In-process cabin table with call recording and failure injection.
pub struct MemoryCabinTable {
    inner: Mutex<Inner>,
}

impl Default for MemoryCabinTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryCabinTable {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                rows: BTreeMap::new(),
                next_id: 1,
                calls: Vec::new(),
                failures: HashMap::new(),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Seed a row directly, bypassing the call log. Returns the stored row.
    pub fn seed(&self, row: CabinRow) -> Cabin {
        let mut inner = self.lock();
        let id = inner.next_id;
        inner.next_id += 1;
        let cabin = Cabin {
            id,
            created_at: Some(Utc::now()),
            fields: row.fields,
            image: row.image,
        };
        inner.rows.insert(id, cabin.clone());
        cabin
    }

    /// Make every following call of `op` fail with `err` until cleared.
    pub fn fail(&self, op: TableOp, err: TableError) {
        self.lock().failures.insert(op, err);
    }

    pub fn clear_failures(&self) {
        self.lock().failures.clear();
    }

    pub fn calls(&self) -> Vec<TableCall> {
        self.lock().calls.clone()
    }

    /// Number of recorded calls of kind `op`.
    pub fn count(&self, op: TableOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    pub fn get(&self, id: CabinId) -> Option<Cabin> {
        self.lock().rows.get(&id).cloned()
    }

    pub fn rows(&self) -> Vec<Cabin> {
        self.lock().rows.values().cloned().collect()
    }

    fn record(inner: &mut Inner, call: TableCall) -> Result<(), TableError> {
        let op = call.op();
        inner.calls.push(call);
        match inner.failures.get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl CabinTable for MemoryCabinTable {
    async fn select_all(&self) -> Result<Vec<Cabin>, TableError> {
        let mut inner = self.lock();
        Self::record(&mut inner, TableCall::SelectAll)?;
        Ok(inner.rows.values().cloned().collect())
    }

    async fn insert(&self, row: &CabinRow) -> Result<Cabin, TableError> {
        let mut inner = self.lock();
        Self::record(&mut inner, TableCall::Insert(row.clone()))?;

        let id = inner.next_id;
        inner.next_id += 1;
        let cabin = Cabin {
            id,
            created_at: Some(Utc::now()),
            fields: row.fields.clone(),
            image: row.image.clone(),
        };
        inner.rows.insert(id, cabin.clone());
        Ok(cabin)
    }

    async fn update(&self, id: CabinId, row: &CabinRow) -> Result<Cabin, TableError> {
        let mut inner = self.lock();
        Self::record(&mut inner, TableCall::Update(id, row.clone()))?;

        let existing = inner.rows.get_mut(&id).ok_or(TableError::NotFound(id))?;
        existing.fields = row.fields.clone();
        existing.image = row.image.clone();
        Ok(existing.clone())
    }

    async fn delete(&self, id: CabinId) -> Result<Vec<Cabin>, TableError> {
        let mut inner = self.lock();
        Self::record(&mut inner, TableCall::Delete(id))?;
        Ok(inner.rows.remove(&id).into_iter().collect())
    }
}
