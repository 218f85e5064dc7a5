use crate::api::error::AppError;
use crate::entities::{content_images, contents, prelude::*};
use crate::services::storage::{StorageService, delete_files};
use bytes::Bytes;
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, DatabaseConnection, DatabaseTransaction, DbErr, EntityTrait, Set,
};

/// One content upload in progress: the open transaction, the content row it
/// inserted and every storage key written so far.
///
/// Files are written outside the transaction, so on failure the keys are
/// deleted explicitly after the rollback. Either the content row, all of its
/// image rows and all of its files survive, or none of them do.
pub struct UploadUnitOfWork {
    txn: DatabaseTransaction,
    content_id: Option<i32>,
    stored_keys: Vec<String>,
}

impl UploadUnitOfWork {
    pub fn new(txn: DatabaseTransaction) -> Self {
        Self {
            txn,
            content_id: None,
            stored_keys: Vec::new(),
        }
    }

    pub fn stored_keys(&self) -> &[String] {
        &self.stored_keys
    }

    pub async fn insert_content(
        &mut self,
        content: contents::ActiveModel,
    ) -> Result<contents::Model, DbErr> {
        let model = content.insert(&self.txn).await?;
        self.content_id = Some(model.id);
        Ok(model)
    }

    /// Writes one image to storage, then records its key against the content.
    pub async fn attach_image(
        &mut self,
        storage: &dyn StorageService,
        content_id: i32,
        key: String,
        data: Bytes,
        content_type: &str,
    ) -> anyhow::Result<content_images::Model> {
        // Tracked before the write: a put that fails halfway may still leave
        // an object behind, and deleting a key that was never written is a no-op
        self.stored_keys.push(key.clone());
        storage.put_file(&key, data, content_type).await?;

        let now = Utc::now();
        let image = content_images::ActiveModel {
            content_id: Set(content_id),
            image_path: Set(key),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&self.txn)
        .await?;
        Ok(image)
    }

    pub async fn commit(
        self,
        db: &DatabaseConnection,
        storage: &dyn StorageService,
    ) -> Result<(), AppError> {
        let Self {
            txn,
            content_id,
            stored_keys,
        } = self;

        match txn.commit().await {
            Ok(()) => Ok(()),
            Err(e) => {
                // The uncommitted row is discarded with the transaction. Its id
                // is never deleted here since another upload may reuse it.
                tracing::error!(
                    "❌ Content upload commit failed for content {:?}: {}",
                    content_id,
                    e
                );
                compensate(db, storage, None, &stored_keys).await;
                Err(AppError::Internal(e.to_string()))
            }
        }
    }

    /// Rolls back the transaction, removes written files and reports `cause`.
    pub async fn abort(
        self,
        db: &DatabaseConnection,
        storage: &dyn StorageService,
        cause: anyhow::Error,
    ) -> AppError {
        let Self {
            txn,
            content_id,
            stored_keys,
        } = self;

        tracing::warn!(
            "↩️ Content upload failed after {} stored file(s), rolling back: {:#}",
            stored_keys.len(),
            cause
        );
        // After a clean rollback the id may already belong to another upload
        let leftover = match txn.rollback().await {
            Ok(()) => None,
            Err(e) => {
                tracing::error!("❌ Rollback failed: {}", e);
                content_id
            }
        };
        compensate(db, storage, leftover, &stored_keys).await;

        AppError::Internal(format!("{:#}", cause))
    }
}

async fn compensate(
    db: &DatabaseConnection,
    storage: &dyn StorageService,
    leftover_content: Option<i32>,
    stored_keys: &[String],
) {
    let failed = delete_files(storage, stored_keys).await;
    if !failed.is_empty() {
        tracing::error!("❌ {} uploaded file(s) could not be removed: {:?}", failed.len(), failed);
    }

    if let Some(id) = leftover_content {
        match Contents::delete_by_id(id).exec(db).await {
            Ok(res) if res.rows_affected > 0 => {
                tracing::warn!("🧹 Removed content {} left behind by a failed upload", id);
            }
            Ok(_) => {}
            Err(e) => tracing::error!("❌ Failed to remove content {}: {}", id, e),
        }
    }
}
