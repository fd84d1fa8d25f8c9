use serde::Deserialize;

/// Connection settings for the hosted backend (table + object storage).
#[derive(Debug, Deserialize, Clone)]
pub struct BackendConfig {
    /// Project base URL, e.g. "https://abcd.supabase.co".
    pub url: String,
    /// API key sent as both `apikey` and bearer token.
    pub key: String,
    /// Table holding cabin rows. Default: "cabins".
    #[serde(default = "default_table")]
    pub table: String,
    /// Bucket holding cabin images. Default: "avatars".
    #[serde(default = "default_bucket")]
    pub bucket: String,
    /// Per-request timeout in seconds. Default: 30.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_table() -> String {
    "cabins".into()
}
fn default_bucket() -> String {
    "avatars".into()
}
fn default_timeout_secs() -> u64 {
    30
}

impl BackendConfig {
    pub fn new(url: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            key: key.into(),
            table: default_table(),
            bucket: default_bucket(),
            timeout_secs: default_timeout_secs(),
        }
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        self.url.trim_end_matches('/')
    }

    /// Public path every stored image URI starts with.
    pub fn public_object_base(&self) -> String {
        format!(
            "{}/storage/v1/object/public/{}/",
            self.base_url(),
            self.bucket
        )
    }
}
