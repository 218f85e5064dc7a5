use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{categories, content_images, contents, sub_categories};
use crate::utils::validation::{KHMER_TEXT, LATIN_TEXT, clean};

/// Text fields of a content upload. Ids arrive as form text and are parsed
/// while checking that the referenced rows exist.
#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateContentRequest {
    #[validate(required(message = "The category id field is required."))]
    pub category_id: Option<String>,
    #[validate(required(message = "The sub category id field is required."))]
    pub sub_category_id: Option<String>,
    #[validate(
        required(message = "The title kh field is required."),
        length(max = 255, message = "The title kh field must not be greater than 255 characters."),
        regex(path = *KHMER_TEXT, message = "The title kh field format is invalid.")
    )]
    pub title_kh: Option<String>,
    #[validate(
        required(message = "The title en field is required."),
        length(max = 255, message = "The title en field must not be greater than 255 characters."),
        regex(path = *LATIN_TEXT, message = "The title en field format is invalid.")
    )]
    pub title_en: Option<String>,
    #[validate(
        required(message = "The description kh field is required."),
        length(max = 255, message = "The description kh field must not be greater than 255 characters."),
        regex(path = *KHMER_TEXT, message = "The description kh field format is invalid.")
    )]
    pub description_kh: Option<String>,
    #[validate(
        required(message = "The description en field is required."),
        length(max = 255, message = "The description en field must not be greater than 255 characters."),
        regex(path = *LATIN_TEXT, message = "The description en field format is invalid.")
    )]
    pub description_en: Option<String>,
}

impl CreateContentRequest {
    pub fn normalized(self) -> Self {
        Self {
            category_id: clean(self.category_id),
            sub_category_id: clean(self.sub_category_id),
            title_kh: clean(self.title_kh),
            title_en: clean(self.title_en),
            description_kh: clean(self.description_kh),
            description_en: clean(self.description_en),
        }
    }

    /// Sets a text field by its form name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: String) -> bool {
        let slot = match name {
            "category_id" => &mut self.category_id,
            "sub_category_id" => &mut self.sub_category_id,
            "title_kh" => &mut self.title_kh,
            "title_en" => &mut self.title_en,
            "description_kh" => &mut self.description_kh,
            "description_en" => &mut self.description_en,
            _ => return false,
        };
        *slot = Some(value);
        true
    }
}

/// An uploaded file held in memory until validation has passed
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentView {
    pub id: i32,
    pub category_id: i32,
    pub category_kh: Option<String>,
    pub category_en: Option<String>,
    pub sub_category_id: i32,
    pub sub_category_kh: Option<String>,
    pub sub_category_en: Option<String>,
    pub title_kh: String,
    pub title_en: String,
    pub description_kh: String,
    pub description_en: String,
    /// Public URLs of the content's images, in insertion order
    pub image_path: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentView {
    pub fn new(
        model: contents::Model,
        category: Option<&categories::Model>,
        sub_category: Option<&sub_categories::Model>,
        image_urls: Vec<String>,
    ) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            category_kh: category.map(|c| c.category_kh.clone()),
            category_en: category.map(|c| c.category_en.clone()),
            sub_category_id: model.sub_category_id,
            sub_category_kh: sub_category.map(|s| s.sub_category_kh.clone()),
            sub_category_en: sub_category.map(|s| s.sub_category_en.clone()),
            title_kh: model.title_kh,
            title_en: model.title_en,
            description_kh: model.description_kh,
            description_en: model.description_en,
            image_path: image_urls,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ContentImageView {
    pub id: i32,
    pub content_id: i32,
    pub image_path: String,
    pub url: String,
    pub created_at: DateTime<Utc>,
}

impl ContentImageView {
    pub fn new(model: content_images::Model, url: String) -> Self {
        Self {
            id: model.id,
            content_id: model.content_id,
            image_path: model.image_path,
            url,
            created_at: model.created_at,
        }
    }
}
