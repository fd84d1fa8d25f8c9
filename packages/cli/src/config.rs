use std::path::Path;

use common::config::BackendConfig;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub backend: BackendConfig,
}

impl AppConfig {
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let builder = Config::builder()
            .set_default("backend.table", "cabins")?
            .set_default("backend.bucket", "avatars")?
            .set_default("backend.timeout_secs", 30)?;

        let builder = match path {
            Some(path) => builder.add_source(File::from(path)),
            // Load from config/config.toml when present
            None => builder.add_source(File::with_name("config/config").required(false)),
        };

        builder
            // Override from environment (e.g., CABINS__BACKEND__KEY)
            .add_source(Environment::with_prefix("CABINS").separator("__"))
            .build()?
            .try_deserialize()
    }
}
