use async_trait::async_trait;
use common::cabin::ImageUpload;
use common::storage::{ObjectName, ObjectStore, StorageError};
use reqwest::header::CONTENT_TYPE;
use reqwest::{Client, Response, StatusCode, Url};
use serde_json::Value;
use tracing::debug;

use super::join_segments;

/// One bucket of the storage API under `<base>/storage/v1`.
#[derive(Clone)]
pub struct StorageApi {
    http: Client,
    base: Url,
    bucket: String,
    public_base: String,
}

impl StorageApi {
    pub fn new(http: Client, base: Url, bucket: &str) -> Self {
        let public = join_segments(&base, &["storage", "v1", "object", "public", bucket]);
        let public_base = format!("{}/", public.as_str().trim_end_matches('/'));
        Self {
            http,
            base,
            bucket: bucket.to_string(),
            public_base,
        }
    }

    fn object_url(&self, name: &ObjectName) -> Url {
        join_segments(
            &self.base,
            &["storage", "v1", "object", &self.bucket, name.as_str()],
        )
    }
}

fn content_type(name: &ObjectName, upload: &ImageUpload) -> String {
    match &upload.content_type {
        Some(ct) => ct.clone(),
        None => mime_guess::from_path(name.as_str())
            .first_or_octet_stream()
            .to_string(),
    }
}

async fn api_error(response: Response, name: &ObjectName) -> StorageError {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();
    let body: Option<Value> = serde_json::from_str(&text).ok();

    // The storage API reports duplicates either as a 409 or as a 400 whose
    // body carries `"statusCode": "409"`.
    let body_status = body
        .as_ref()
        .and_then(|b| b.get("statusCode"))
        .map(|s| s.as_str().map(str::to_owned).unwrap_or_else(|| s.to_string()));
    if status == StatusCode::CONFLICT || body_status.as_deref() == Some("409") {
        return StorageError::AlreadyExists(name.to_string());
    }

    let message = body
        .as_ref()
        .and_then(|b| b.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or(text);

    StorageError::Api {
        status: status.as_u16(),
        message,
    }
}

#[async_trait]
impl ObjectStore for StorageApi {
    fn public_base(&self) -> &str {
        &self.public_base
    }

    async fn upload(&self, name: &ObjectName, upload: &ImageUpload) -> Result<(), StorageError> {
        let response = self
            .http
            .post(self.object_url(name))
            .header(CONTENT_TYPE, content_type(name, upload))
            .header("cache-control", "max-age=3600")
            .header("x-upsert", "false")
            .body(upload.bytes.clone())
            .send()
            .await
            .map_err(|e| StorageError::Transport(e.to_string()))?;

        if !response.status().is_success() {
            return Err(api_error(response, name).await);
        }

        debug!(object = %name, bytes = upload.bytes.len(), "Object uploaded");
        Ok(())
    }
}
