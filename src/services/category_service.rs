use crate::api::error::AppError;
use crate::entities::{categories, contents, prelude::*, sub_categories};
use crate::models::{CategoryView, CreateCategoryRequest, UpdateCategoryRequest};
use crate::services::lookup;
use crate::services::storage::{StorageService, delete_files};
use crate::utils::validation::{FieldErrors, reject_blank, taken_message, value_taken};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, DatabaseConnection, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use validator::Validate;

pub struct CategoryService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
}

impl CategoryService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>) -> Self {
        Self { db, storage }
    }

    pub async fn list(&self) -> Result<Vec<CategoryView>, AppError> {
        let rows = Categories::find()
            .order_by_asc(categories::Column::Id)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(CategoryView::from).collect())
    }

    pub async fn get(&self, id: i32) -> Result<CategoryView, AppError> {
        Categories::find_by_id(id)
            .one(&self.db)
            .await?
            .map(CategoryView::from)
            .ok_or_else(not_found)
    }

    pub async fn create(&self, input: CreateCategoryRequest) -> Result<CategoryView, AppError> {
        let input = input.normalized();
        let mut errors = FieldErrors::new();
        errors.absorb(input.validate());

        // Uniqueness is checked inside the transaction that performs the insert
        let txn = self.db.begin().await?;
        check_names(
            &txn,
            input.category_kh.as_deref(),
            input.category_en.as_deref(),
            None,
            &mut errors,
        )
        .await?;

        let (Some(category_kh), Some(category_en), true) =
            (input.category_kh, input.category_en, errors.is_empty())
        else {
            txn.rollback().await?;
            return Err(AppError::Validation(errors));
        };

        let now = Utc::now();
        let category = categories::ActiveModel {
            category_kh: Set(category_kh),
            category_en: Set(category_en),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!("🗂️ Category {} created ({})", category.id, category.category_en);
        Ok(category.into())
    }

    pub async fn update(
        &self,
        id: i32,
        input: UpdateCategoryRequest,
    ) -> Result<CategoryView, AppError> {
        let input = input.normalized();
        let txn = self.db.begin().await?;

        let Some(existing) = Categories::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Err(not_found());
        };

        let mut errors = FieldErrors::new();
        reject_blank("category_kh", input.category_kh.as_deref(), &mut errors);
        reject_blank("category_en", input.category_en.as_deref(), &mut errors);
        errors.absorb(input.validate());
        check_names(
            &txn,
            input.category_kh.as_deref(),
            input.category_en.as_deref(),
            Some(id),
            &mut errors,
        )
        .await?;
        if !errors.is_empty() {
            txn.rollback().await?;
            return Err(AppError::Validation(errors));
        }

        let mut category: categories::ActiveModel = existing.into();
        if let Some(category_kh) = input.category_kh {
            category.category_kh = Set(category_kh);
        }
        if let Some(category_en) = input.category_en {
            category.category_en = Set(category_en);
        }
        category.updated_at = Set(Utc::now());

        let updated = category.update(&txn).await?;
        txn.commit().await?;
        Ok(updated.into())
    }

    /// Deletes the category together with its subcategories, their content and
    /// the content's image rows. Image files are removed once the rows are gone.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        if Categories::find_by_id(id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(not_found());
        }

        let orphaned = cascaded_image_keys(&txn, id).await?;
        Categories::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let failed = delete_files(self.storage.as_ref(), &orphaned).await;
        tracing::info!(
            "🗑️ Category {} deleted, {} image file(s) removed",
            id,
            orphaned.len() - failed.len()
        );
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("Category not found".to_string())
}

async fn check_names<C: ConnectionTrait>(
    conn: &C,
    category_kh: Option<&str>,
    category_en: Option<&str>,
    ignore: Option<i32>,
    errors: &mut FieldErrors,
) -> Result<(), DbErr> {
    let ignore = ignore.map(|id| (categories::Column::Id, id));

    if let Some(value) = category_kh {
        if value_taken::<Categories, _>(conn, categories::Column::CategoryKh, value, ignore).await? {
            errors.add("category_kh", taken_message("category_kh"));
        }
    }
    if let Some(value) = category_en {
        if value_taken::<Categories, _>(conn, categories::Column::CategoryEn, value, ignore).await? {
            errors.add("category_en", taken_message("category_en"));
        }
    }
    Ok(())
}

/// Image keys of every content row the category delete will cascade into,
/// either directly or through one of its subcategories.
async fn cascaded_image_keys<C: ConnectionTrait>(conn: &C, category_id: i32) -> Result<Vec<String>, DbErr> {
    let sub_category_ids: Vec<i32> = SubCategories::find()
        .select_only()
        .column(sub_categories::Column::Id)
        .filter(sub_categories::Column::CategoryId.eq(category_id))
        .into_tuple()
        .all(conn)
        .await?;

    let content_ids: Vec<i32> = Contents::find()
        .select_only()
        .column(contents::Column::Id)
        .filter(
            Condition::any()
                .add(contents::Column::CategoryId.eq(category_id))
                .add(contents::Column::SubCategoryId.is_in(sub_category_ids)),
        )
        .into_tuple()
        .all(conn)
        .await?;

    let keys = lookup::image_keys_by_content(conn, content_ids).await?;
    Ok(keys.into_values().flatten().collect())
}
