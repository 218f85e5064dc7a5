use super::{ContentService, UploadUnitOfWork};
use crate::api::error::AppError;
use crate::entities::{categories, contents, prelude::*, sub_categories};
use crate::models::{ContentView, CreateContentRequest, ImageUpload};
use crate::utils::validation::{
    FieldErrors, ImageCheck, detect_image_format, existing_reference, sanitize_filename, taken_message, validate_images,
    value_taken,
};
use chrono::Utc;
use sea_orm::{ConnectionTrait, DbErr, Set, TransactionTrait};
use uuid::Uuid;
use validator::Validate;

/// Content fields that passed every check, ready to insert
struct NewContent {
    category_id: i32,
    sub_category_id: i32,
    title_kh: String,
    title_en: String,
    description_kh: String,
    description_en: String,
}

impl ContentService {
    /// Creates a content record with its images.
    ///
    /// `images` is `None` when the request carried no image field at all.
    /// All validation errors are reported together before anything is
    /// written. After that the content row, its image rows and the image
    /// files are committed together or not at all.
    pub async fn create(
        &self,
        input: CreateContentRequest,
        images: Option<Vec<ImageUpload>>,
    ) -> Result<ContentView, AppError> {
        let input = input.normalized();
        let mut errors = FieldErrors::new();
        errors.absorb(input.validate());
        validate_images(images.as_deref(), self.config.max_image_size, &mut errors);

        let txn = self.db.begin().await?;
        let content = match validated(&txn, input, &mut errors).await? {
            Some(content) if errors.is_empty() => content,
            _ => {
                txn.rollback().await?;
                return Err(AppError::Validation(errors));
            }
        };

        let images = images.unwrap_or_default();
        tracing::info!(
            "📤 Creating content '{}' with {} image(s)",
            content.title_en,
            images.len()
        );

        let mut uow = UploadUnitOfWork::new(txn);
        let created = match self.write(&mut uow, content, images).await {
            Ok(created) => created,
            Err(cause) => {
                return Err(uow.abort(&self.db, self.storage.as_ref(), cause).await);
            }
        };
        let stored = uow.stored_keys().len();
        uow.commit(&self.db, self.storage.as_ref()).await?;

        tracing::info!("✅ Content {} created with {} image(s)", created.id, stored);
        let mut views = self.hydrate(&self.db, vec![created]).await?;
        views
            .pop()
            .ok_or_else(|| AppError::Internal("Created content could not be read back".to_string()))
    }

    async fn write(
        &self,
        uow: &mut UploadUnitOfWork,
        content: NewContent,
        images: Vec<ImageUpload>,
    ) -> anyhow::Result<contents::Model> {
        let now = Utc::now();
        let created = uow
            .insert_content(contents::ActiveModel {
                category_id: Set(content.category_id),
                sub_category_id: Set(content.sub_category_id),
                title_kh: Set(content.title_kh),
                title_en: Set(content.title_en),
                description_kh: Set(content.description_kh),
                description_en: Set(content.description_en),
                created_at: Set(now),
                updated_at: Set(now),
                ..Default::default()
            })
            .await?;

        for image in images {
            let key = self.image_key(&image.file_name);
            let content_type = stored_content_type(&image);
            uow.attach_image(self.storage.as_ref(), created.id, key, image.data, &content_type)
                .await?;
        }

        Ok(created)
    }

    /// `{upload_dir}/{millis}_{8 hex chars}_{sanitized name}`, unique per call
    fn image_key(&self, file_name: &str) -> String {
        let token = Uuid::new_v4().simple().to_string();
        format!(
            "{}/{}_{}_{}",
            self.config.upload_dir,
            Utc::now().timestamp_millis(),
            &token[..8],
            sanitize_filename(file_name)
        )
    }
}

/// Runs the checks that need the database and returns the content to insert.
/// Returns `None` when a required field is missing or a reference is invalid.
async fn validated<C: ConnectionTrait>(
    conn: &C,
    input: CreateContentRequest,
    errors: &mut FieldErrors,
) -> Result<Option<NewContent>, DbErr> {
    let category_id = existing_reference::<Categories, _>(
        conn,
        categories::Column::Id,
        input.category_id.as_deref(),
        "category_id",
        errors,
    )
    .await?;
    let sub_category_id = existing_reference::<SubCategories, _>(
        conn,
        sub_categories::Column::Id,
        input.sub_category_id.as_deref(),
        "sub_category_id",
        errors,
    )
    .await?;

    if let Some(title_kh) = input.title_kh.as_deref() {
        if value_taken::<Contents, _>(conn, contents::Column::TitleKh, title_kh, None).await? {
            errors.add("title_kh", taken_message("title_kh"));
        }
    }
    if let Some(title_en) = input.title_en.as_deref() {
        if value_taken::<Contents, _>(conn, contents::Column::TitleEn, title_en, None).await? {
            errors.add("title_en", taken_message("title_en"));
        }
    }

    let (
        Some(category_id),
        Some(sub_category_id),
        Some(title_kh),
        Some(title_en),
        Some(description_kh),
        Some(description_en),
    ) = (
        category_id,
        sub_category_id,
        input.title_kh,
        input.title_en,
        input.description_kh,
        input.description_en,
    )
    else {
        return Ok(None);
    };

    Ok(Some(NewContent {
        category_id,
        sub_category_id,
        title_kh,
        title_en,
        description_kh,
        description_en,
    }))
}

fn stored_content_type(image: &ImageUpload) -> String {
    match detect_image_format(&image.data) {
        ImageCheck::Allowed(format) => format.mime().to_string(),
        _ => image
            .content_type
            .clone()
            .unwrap_or_else(|| mime::APPLICATION_OCTET_STREAM.to_string()),
    }
}
