//! HTTP clients for the hosted backend's table and storage REST APIs.

mod storage;
mod table;

use std::sync::Arc;
use std::time::Duration;

use common::config::BackendConfig;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue, InvalidHeaderValue};
use reqwest::{Client, Url};
use thiserror::Error;

pub use storage::StorageApi;
pub use table::PostgrestTable;

use crate::service::CabinService;

#[derive(Debug, Error)]
pub enum RestError {
    #[error("Invalid backend URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("API key is not a valid header value: {0}")]
    InvalidKey(#[from] InvalidHeaderValue),

    #[error("Failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Table and storage clients sharing one connection pool.
#[derive(Clone)]
pub struct RestBackend {
    pub table: PostgrestTable,
    pub storage: StorageApi,
}

impl RestBackend {
    pub fn connect(config: &BackendConfig) -> Result<Self, RestError> {
        let base = parse_base(config.base_url())?;

        let mut headers = HeaderMap::new();
        let mut key = HeaderValue::from_str(&config.key)?;
        key.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.key))?;
        bearer.set_sensitive(true);
        headers.insert("apikey", key);
        headers.insert(AUTHORIZATION, bearer);

        let http = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            table: PostgrestTable::new(http.clone(), base.clone(), &config.table),
            storage: StorageApi::new(http, base, &config.bucket),
        })
    }

    pub fn into_service(self) -> CabinService {
        CabinService::new(Arc::new(self.table), Arc::new(self.storage))
    }
}

fn parse_base(url: &str) -> Result<Url, RestError> {
    let invalid = |reason: String| RestError::InvalidUrl {
        url: url.to_string(),
        reason,
    };
    let parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if parsed.cannot_be_a_base() {
        return Err(invalid("URL cannot be used as a base".into()));
    }
    Ok(parsed)
}

/// `base` with `segments` appended as percent-encoded path segments.
fn join_segments(base: &Url, segments: &[&str]) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}
