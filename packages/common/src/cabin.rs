use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Identifier assigned to a cabin row by the table service.
pub type CabinId = i64;

/// The editable columns of a cabin, shared by stored rows and write payloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CabinFields {
    pub name: String,
    pub max_capacity: u32,
    pub regular_price: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub discount: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,
}

/// Nullable columns come back as `null`; treat that like a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Option::unwrap_or_default)
}

/// Reasons a set of cabin fields is rejected before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    EmptyName,
    ZeroCapacity,
    DiscountExceedsPrice { discount: u32, regular_price: u32 },
}

impl FieldError {
    pub fn message(&self) -> String {
        match self {
            Self::EmptyName => "Cabin name cannot be empty".into(),
            Self::ZeroCapacity => "Capacity should be at least 1".into(),
            Self::DiscountExceedsPrice {
                discount,
                regular_price,
            } => format!(
                "Discount ({discount}) should be less than the regular price ({regular_price})"
            ),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

impl std::error::Error for FieldError {}

impl CabinFields {
    pub fn validate(&self) -> Result<(), FieldError> {
        if self.name.trim().is_empty() {
            return Err(FieldError::EmptyName);
        }
        if self.max_capacity == 0 {
            return Err(FieldError::ZeroCapacity);
        }
        if self.discount > self.regular_price {
            return Err(FieldError::DiscountExceedsPrice {
                discount: self.discount,
                regular_price: self.regular_price,
            });
        }
        Ok(())
    }
}

/// A cabin row as returned by the table service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cabin {
    pub id: CabinId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub fields: CabinFields,
    /// Public URI of the cabin image in object storage.
    pub image: String,
}

/// Payload sent on insert and update. Updates replace every column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CabinRow {
    #[serde(flatten)]
    pub fields: CabinFields,
    pub image: String,
}

/// A freshly picked image file that still has to be uploaded.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageUpload {
    /// Display name of the picked file, e.g. `cabin-001.jpg`.
    pub file_name: String,
    pub bytes: Vec<u8>,
    /// Explicit content type. Guessed from `file_name` when absent.
    pub content_type: Option<String>,
}

impl ImageUpload {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            content_type: None,
        }
    }

    pub fn with_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.content_type = Some(content_type.into());
        self
    }
}

impl fmt::Debug for ImageUpload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageUpload")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .field("content_type", &self.content_type)
            .finish()
    }
}

/// Where the image of a cabin being written comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CabinImage {
    /// URI of an image that already lives in object storage.
    Stored(String),
    /// A new file to upload.
    Upload(ImageUpload),
}

/// Candidate cabin handed to the writer by the admin surface.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CabinDraft {
    pub fields: CabinFields,
    pub image: CabinImage,
}

impl CabinDraft {
    /// Draft for a new cabin that reuses the image of an existing one.
    pub fn duplicate_of(cabin: &Cabin) -> Self {
        Self {
            fields: CabinFields {
                name: format!("Copy of {}", cabin.fields.name),
                ..cabin.fields.clone()
            },
            image: CabinImage::Stored(cabin.image.clone()),
        }
    }
}
