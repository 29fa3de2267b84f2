use std::sync::Arc;

use common::{FileStore, UploadPolicy};
use sea_orm::DatabaseConnection;

use crate::config::AppConfig;
use crate::dashboard::DashboardCache;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: Arc<AppConfig>,
    pub files: Arc<dyn FileStore>,
    pub dashboard: Arc<DashboardCache>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig, files: Arc<dyn FileStore>) -> Self {
        let dashboard = Arc::new(DashboardCache::new(std::time::Duration::from_secs(
            config.dashboard.ttl_secs,
        )));
        Self {
            db,
            config: Arc::new(config),
            files,
            dashboard,
        }
    }

    pub fn upload_policy(&self) -> UploadPolicy {
        self.config.storage.upload_policy()
    }
}
