use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::StorageError;

/// A flat object name inside the image bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ObjectName(String);

impl ObjectName {
    /// Generate a fresh name for an uploaded file.
    ///
    /// The name is `<uuid-v4>-<display name>` with path separators removed,
    /// so two uploads of the same file never share an object.
    pub fn generate(display_name: &str) -> Self {
        let cleaned: String = display_name
            .chars()
            .filter(|c| !matches!(c, '/' | '\\'))
            .collect();
        let id = Uuid::new_v4();
        if cleaned.trim().is_empty() {
            Self(id.to_string())
        } else {
            Self(format!("{id}-{}", cleaned.trim()))
        }
    }

    /// Parse an existing flat name.
    pub fn parse(name: &str) -> Result<Self, StorageError> {
        if name.is_empty() {
            return Err(StorageError::InvalidName("name cannot be empty".into()));
        }
        if name.contains('/') || name.contains('\\') {
            return Err(StorageError::InvalidName(format!(
                "path separators are not allowed: {name}"
            )));
        }
        if name == "." || name == ".." {
            return Err(StorageError::InvalidName(format!("reserved name: {name}")));
        }
        Ok(Self(name.to_string()))
    }

    /// Name of the object a public URI points at: its final path segment.
    pub fn from_public_url(uri: &str) -> Result<Self, StorageError> {
        let last = uri.rsplit('/').next().unwrap_or_default();
        Self::parse(last)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ObjectName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for ObjectName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for ObjectName {
    type Error = StorageError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<ObjectName> for String {
    fn from(name: ObjectName) -> Self {
        name.0
    }
}
