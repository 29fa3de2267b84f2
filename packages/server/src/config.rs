use std::path::PathBuf;
use std::time::Duration;

use common::UploadPolicy;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone)]
pub struct CorsConfig {
    pub allow_origins: Vec<String>,
    pub max_age: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors: CorsConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct StorageConfig {
    /// Directory served publicly; uploads land in `{public_root}/uploads`.
    pub public_root: PathBuf,
    pub max_upload_bytes: u64,
    pub allowed_extensions: Vec<String>,
    /// Files younger than this are never swept, so in-flight writes survive.
    pub orphan_grace_secs: u64,
}

impl StorageConfig {
    pub fn upload_policy(&self) -> UploadPolicy {
        UploadPolicy {
            allowed_extensions: self
                .allowed_extensions
                .iter()
                .map(|ext| ext.to_ascii_lowercase())
                .collect(),
            max_bytes: self.max_upload_bytes,
        }
    }

    pub fn orphan_grace(&self) -> Duration {
        Duration::from_secs(self.orphan_grace_secs)
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DashboardConfig {
    pub ttl_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ListingConfig {
    pub default_page_size: u64,
    pub max_page_size: u64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub dashboard: DashboardConfig,
    pub listing: ListingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        let policy = UploadPolicy::default();
        let s = Config::builder()
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 3000)?
            .set_default("server.cors.allow_origins", Vec::<String>::new())?
            .set_default("server.cors.max_age", 3600)?
            .set_default("database.url", "sqlite://tickets.db?mode=rwc")?
            .set_default("storage.public_root", "./wwwroot")?
            .set_default("storage.max_upload_bytes", policy.max_bytes)?
            .set_default("storage.allowed_extensions", policy.allowed_extensions)?
            .set_default("storage.orphan_grace_secs", 3600)?
            .set_default("dashboard.ttl_secs", 60)?
            .set_default("listing.default_page_size", 10)?
            .set_default("listing.max_page_size", 100)?
            // Load from config/config.toml
            .add_source(File::with_name("config/config").required(false))
            // Override from environment (e.g., TICKETS__DATABASE__URL)
            .add_source(
                Environment::with_prefix("TICKETS")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("server.cors.allow_origins")
                    .with_list_parse_key("storage.allowed_extensions")
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }
}
