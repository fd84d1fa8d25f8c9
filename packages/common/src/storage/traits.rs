use async_trait::async_trait;

use super::error::StorageError;
use super::name::ObjectName;
use crate::cabin::ImageUpload;

/// Bucket-scoped object storage holding cabin images.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Public base path every object URI in this bucket starts with.
    ///
    /// Always ends with `/`.
    fn public_base(&self) -> &str;

    /// Public URI of the named object.
    fn public_url(&self, name: &ObjectName) -> String {
        format!("{}{}", self.public_base(), name)
    }

    /// Whether `uri` points into this bucket.
    fn is_public_url(&self, uri: &str) -> bool {
        uri.starts_with(self.public_base())
    }

    /// Upload a file under `name`.
    async fn upload(&self, name: &ObjectName, upload: &ImageUpload) -> Result<(), StorageError>;
}
