use super::ContentService;
use crate::api::error::AppError;
use crate::entities::{content_images, contents, prelude::*};
use crate::models::{ContentImageView, ContentView};
use crate::services::lookup;
use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};

impl ContentService {
    pub async fn list(&self) -> Result<Vec<ContentView>, AppError> {
        let rows = Contents::find()
            .order_by_asc(contents::Column::Id)
            .all(&self.db)
            .await?;
        Ok(self.hydrate(&self.db, rows).await?)
    }

    pub async fn get(&self, id: i32) -> Result<ContentView, AppError> {
        let row = Contents::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(not_found)?;
        let mut views = self.hydrate(&self.db, vec![row]).await?;
        views.pop().ok_or_else(not_found)
    }

    /// Image rows of one content record, oldest first.
    pub async fn images(&self, id: i32) -> Result<Vec<ContentImageView>, AppError> {
        if Contents::find_by_id(id).one(&self.db).await?.is_none() {
            return Err(not_found());
        }

        let rows = ContentImages::find()
            .filter(content_images::Column::ContentId.eq(id))
            .order_by_asc(content_images::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows
            .into_iter()
            .map(|row| {
                let url = self.storage.public_url(&row.image_path);
                ContentImageView::new(row, url)
            })
            .collect())
    }

    /// Attaches parent names and image URLs to content rows. Parents and
    /// images are each loaded with a single query for the whole batch.
    pub(super) async fn hydrate<C: ConnectionTrait>(
        &self,
        conn: &C,
        rows: Vec<contents::Model>,
    ) -> Result<Vec<ContentView>, DbErr> {
        let categories = lookup::categories_by_id(conn, rows.iter().map(|r| r.category_id)).await?;
        let sub_categories =
            lookup::sub_categories_by_id(conn, rows.iter().map(|r| r.sub_category_id)).await?;
        let mut images = lookup::image_keys_by_content(conn, rows.iter().map(|r| r.id)).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let urls = images
                    .remove(&row.id)
                    .unwrap_or_default()
                    .iter()
                    .map(|key| self.storage.public_url(key))
                    .collect();
                let category = categories.get(&row.category_id);
                let sub_category = sub_categories.get(&row.sub_category_id);
                ContentView::new(row, category, sub_category, urls)
            })
            .collect())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Content not found".to_string())
}
