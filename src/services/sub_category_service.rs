use crate::api::error::AppError;
use crate::entities::{categories, contents, prelude::*, sub_categories};
use crate::models::{CreateSubCategoryRequest, SubCategoryView, UpdateSubCategoryRequest};
use crate::services::lookup;
use crate::services::storage::{StorageService, delete_files};
use crate::utils::validation::{
    FieldErrors, invalid_reference_message, reject_blank, taken_message, value_taken,
};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use std::sync::Arc;
use validator::Validate;

pub struct SubCategoryService {
    db: DatabaseConnection,
    storage: Arc<dyn StorageService>,
}

impl SubCategoryService {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>) -> Self {
        Self { db, storage }
    }

    /// All subcategories with their parent names, resolved in one extra query.
    pub async fn list(&self) -> Result<Vec<SubCategoryView>, AppError> {
        let rows = SubCategories::find()
            .order_by_asc(sub_categories::Column::Id)
            .all(&self.db)
            .await?;
        let parents = lookup::categories_by_id(&self.db, rows.iter().map(|r| r.category_id)).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let parent = parents.get(&row.category_id);
                SubCategoryView::new(row, parent)
            })
            .collect())
    }

    pub async fn get(&self, id: i32) -> Result<SubCategoryView, AppError> {
        let row = SubCategories::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or_else(not_found)?;
        let parent = Categories::find_by_id(row.category_id).one(&self.db).await?;
        Ok(SubCategoryView::new(row, parent.as_ref()))
    }

    pub async fn create(&self, input: CreateSubCategoryRequest) -> Result<SubCategoryView, AppError> {
        let input = input.normalized();
        let mut errors = FieldErrors::new();
        errors.absorb(input.validate());

        let txn = self.db.begin().await?;
        let parent = match input.category_id.as_deref() {
            Some(category_id) => find_parent(&txn, category_id, &mut errors).await?,
            None => None,
        };
        check_names(
            &txn,
            input.sub_category_kh.as_deref(),
            input.sub_category_en.as_deref(),
            None,
            &mut errors,
        )
        .await?;

        let (Some(parent), Some(sub_category_kh), Some(sub_category_en), true) = (
            parent,
            input.sub_category_kh,
            input.sub_category_en,
            errors.is_empty(),
        ) else {
            txn.rollback().await?;
            return Err(AppError::Validation(errors));
        };

        let now = Utc::now();
        let sub_category = sub_categories::ActiveModel {
            category_id: Set(parent.id),
            sub_category_kh: Set(sub_category_kh),
            sub_category_en: Set(sub_category_en),
            created_at: Set(now),
            updated_at: Set(now),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        txn.commit().await?;

        tracing::info!(
            "🗂️ SubCategory {} created under category {}",
            sub_category.id,
            parent.id
        );
        Ok(SubCategoryView::new(sub_category, Some(&parent)))
    }

    pub async fn update(
        &self,
        id: i32,
        input: UpdateSubCategoryRequest,
    ) -> Result<SubCategoryView, AppError> {
        let input = input.normalized();
        let txn = self.db.begin().await?;

        let Some(existing) = SubCategories::find_by_id(id).one(&txn).await? else {
            txn.rollback().await?;
            return Err(not_found());
        };

        let mut errors = FieldErrors::new();
        reject_blank("sub_category_kh", input.sub_category_kh.as_deref(), &mut errors);
        reject_blank("sub_category_en", input.sub_category_en.as_deref(), &mut errors);
        errors.absorb(input.validate());
        let new_parent = match input.category_id.as_deref() {
            Some(category_id) => find_parent(&txn, category_id, &mut errors).await?,
            None => None,
        };
        check_names(
            &txn,
            input.sub_category_kh.as_deref(),
            input.sub_category_en.as_deref(),
            Some(id),
            &mut errors,
        )
        .await?;
        if !errors.is_empty() {
            txn.rollback().await?;
            return Err(AppError::Validation(errors));
        }

        let mut sub_category: sub_categories::ActiveModel = existing.into();
        if let Some(parent) = &new_parent {
            sub_category.category_id = Set(parent.id);
        }
        if let Some(sub_category_kh) = input.sub_category_kh {
            sub_category.sub_category_kh = Set(sub_category_kh);
        }
        if let Some(sub_category_en) = input.sub_category_en {
            sub_category.sub_category_en = Set(sub_category_en);
        }
        sub_category.updated_at = Set(Utc::now());

        let updated = sub_category.update(&txn).await?;
        let parent = match new_parent {
            Some(parent) => Some(parent),
            None => Categories::find_by_id(updated.category_id).one(&txn).await?,
        };
        txn.commit().await?;

        Ok(SubCategoryView::new(updated, parent.as_ref()))
    }

    /// Deletes the subcategory with its content and image rows, then the image files.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        let txn = self.db.begin().await?;

        if SubCategories::find_by_id(id).one(&txn).await?.is_none() {
            txn.rollback().await?;
            return Err(not_found());
        }

        let content_ids: Vec<i32> = Contents::find()
            .select_only()
            .column(contents::Column::Id)
            .filter(contents::Column::SubCategoryId.eq(id))
            .into_tuple()
            .all(&txn)
            .await?;
        let orphaned: Vec<String> = lookup::image_keys_by_content(&txn, content_ids)
            .await?
            .into_values()
            .flatten()
            .collect();

        SubCategories::delete_by_id(id).exec(&txn).await?;
        txn.commit().await?;

        let failed = delete_files(self.storage.as_ref(), &orphaned).await;
        tracing::info!(
            "🗑️ SubCategory {} deleted, {} image file(s) removed",
            id,
            orphaned.len() - failed.len()
        );
        Ok(())
    }
}

fn not_found() -> AppError {
    AppError::NotFound("SubCategory not found".to_string())
}

/// Resolves a submitted category id, which may arrive as text or a number.
async fn find_parent<C: ConnectionTrait>(
    conn: &C,
    category_id: &str,
    errors: &mut FieldErrors,
) -> Result<Option<categories::Model>, DbErr> {
    let parent = match category_id.parse::<i32>() {
        Ok(id) => Categories::find_by_id(id).one(conn).await?,
        Err(_) => None,
    };
    if parent.is_none() {
        errors.add("category_id", invalid_reference_message("category_id"));
    }
    Ok(parent)
}

async fn check_names<C: ConnectionTrait>(
    conn: &C,
    sub_category_kh: Option<&str>,
    sub_category_en: Option<&str>,
    ignore: Option<i32>,
    errors: &mut FieldErrors,
) -> Result<(), DbErr> {
    let ignore = ignore.map(|id| (sub_categories::Column::Id, id));

    if let Some(value) = sub_category_kh {
        if value_taken::<SubCategories, _>(conn, sub_categories::Column::SubCategoryKh, value, ignore)
            .await?
        {
            errors.add("sub_category_kh", taken_message("sub_category_kh"));
        }
    }
    if let Some(value) = sub_category_en {
        if value_taken::<SubCategories, _>(conn, sub_categories::Column::SubCategoryEn, value, ignore)
            .await?
        {
            errors.add("sub_category_en", taken_message("sub_category_en"));
        }
    }
    Ok(())
}
