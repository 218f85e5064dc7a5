use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::{categories, sub_categories};
use crate::utils::validation::{KHMER_TEXT, LATIN_TEXT, clean, lenient_text, trimmed};

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateSubCategoryRequest {
    #[validate(required(message = "The category id field is required."))]
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_id: Option<String>,
    #[validate(
        required(message = "The sub category kh field is required."),
        length(max = 255, message = "The sub category kh field must not be greater than 255 characters."),
        regex(path = *KHMER_TEXT, message = "The sub category kh field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub_category_kh: Option<String>,
    #[validate(
        required(message = "The sub category en field is required."),
        length(max = 255, message = "The sub category en field must not be greater than 255 characters."),
        regex(path = *LATIN_TEXT, message = "The sub category en field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub_category_en: Option<String>,
}

impl CreateSubCategoryRequest {
    pub fn normalized(self) -> Self {
        Self {
            category_id: clean(self.category_id),
            sub_category_kh: clean(self.sub_category_kh),
            sub_category_en: clean(self.sub_category_en),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateSubCategoryRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_id: Option<String>,
    #[validate(
        length(max = 50, message = "The sub category kh field must not be greater than 50 characters."),
        regex(path = *KHMER_TEXT, message = "The sub category kh field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub_category_kh: Option<String>,
    #[validate(
        length(max = 50, message = "The sub category en field must not be greater than 50 characters."),
        regex(path = *LATIN_TEXT, message = "The sub category en field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub sub_category_en: Option<String>,
}

impl UpdateSubCategoryRequest {
    pub fn normalized(self) -> Self {
        Self {
            category_id: trimmed(self.category_id),
            sub_category_kh: trimmed(self.sub_category_kh),
            sub_category_en: trimmed(self.sub_category_en),
        }
    }
}

/// A subcategory with its parent's display names. The parent fields are
/// null when the category row cannot be found.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SubCategoryView {
    pub id: i32,
    pub category_id: i32,
    pub category_kh: Option<String>,
    pub category_en: Option<String>,
    pub sub_category_kh: String,
    pub sub_category_en: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl SubCategoryView {
    pub fn new(model: sub_categories::Model, category: Option<&categories::Model>) -> Self {
        Self {
            id: model.id,
            category_id: model.category_id,
            category_kh: category.map(|c| c.category_kh.clone()),
            category_en: category.map(|c| c.category_en.clone()),
            sub_category_kh: model.sub_category_kh,
            sub_category_en: model.sub_category_en,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
