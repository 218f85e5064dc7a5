//! Content records and their images.
//!
//! Creating content writes database rows and storage files together; see
//! [`unit_of_work::UploadUnitOfWork`] for how the two are kept consistent.

mod create;
mod read;
mod unit_of_work;

use crate::config::AppConfig;
use crate::services::storage::StorageService;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use unit_of_work::UploadUnitOfWork;

pub struct ContentService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
    config: AppConfig,
}

impl ContentService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        Self {
            db,
            storage,
            config,
        }
    }
}
