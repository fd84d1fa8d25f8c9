use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;

use super::error::StorageError;
use super::name::ObjectName;
use super::traits::ObjectStore;
use crate::cabin::ImageUpload;

#[derive(Default)]
struct Inner {
    objects: HashMap<String, Vec<u8>>,
    attempts: Vec<ObjectName>,
    fail_with: Option<StorageError>,
}

/// In-process object store.
///
/// Records every upload attempt and can be told to fail, so it doubles as a
/// fake storage service in tests.
pub struct MemoryObjectStore {
    public_base: String,
    inner: Mutex<Inner>,
}

impl MemoryObjectStore {
    pub fn new(public_base: impl Into<String>) -> Self {
        let mut public_base = public_base.into();
        if !public_base.ends_with('/') {
            public_base.push('/');
        }
        Self {
            public_base,
            inner: Mutex::new(Inner::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Make every following upload fail with `err` until cleared.
    pub fn fail_uploads(&self, err: StorageError) {
        self.lock().fail_with = Some(err);
    }

    pub fn clear_failure(&self) {
        self.lock().fail_with = None;
    }

    /// Names passed to `upload`, including failed attempts, in call order.
    pub fn upload_attempts(&self) -> Vec<ObjectName> {
        self.lock().attempts.clone()
    }

    pub fn get(&self, name: &ObjectName) -> Option<Vec<u8>> {
        self.lock().objects.get(name.as_str()).cloned()
    }

    pub fn len(&self) -> usize {
        self.lock().objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    fn public_base(&self) -> &str {
        &self.public_base
    }

    async fn upload(&self, name: &ObjectName, upload: &ImageUpload) -> Result<(), StorageError> {
        let mut inner = self.lock();
        inner.attempts.push(name.clone());

        if let Some(err) = inner.fail_with.clone() {
            return Err(err);
        }
        if inner.objects.contains_key(name.as_str()) {
            return Err(StorageError::AlreadyExists(name.to_string()));
        }

        inner
            .objects
            .insert(name.to_string(), upload.bytes.clone());
        Ok(())
    }
}
