use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::entities::categories;
use crate::utils::validation::{KHMER_TEXT, LATIN_TEXT, clean, lenient_text, trimmed};

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct CreateCategoryRequest {
    #[validate(
        required(message = "The category kh field is required."),
        length(max = 255, message = "The category kh field must not be greater than 255 characters."),
        regex(path = *KHMER_TEXT, message = "The category kh field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_kh: Option<String>,
    #[validate(
        required(message = "The category en field is required."),
        length(max = 255, message = "The category en field must not be greater than 255 characters."),
        regex(path = *LATIN_TEXT, message = "The category en field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_en: Option<String>,
}

impl CreateCategoryRequest {
    pub fn normalized(self) -> Self {
        Self {
            category_kh: clean(self.category_kh),
            category_en: clean(self.category_en),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, ToSchema, Validate)]
pub struct UpdateCategoryRequest {
    #[validate(
        length(max = 50, message = "The category kh field must not be greater than 50 characters."),
        regex(path = *KHMER_TEXT, message = "The category kh field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_kh: Option<String>,
    #[validate(
        length(max = 50, message = "The category en field must not be greater than 50 characters."),
        regex(path = *LATIN_TEXT, message = "The category en field format is invalid.")
    )]
    #[serde(default, deserialize_with = "lenient_text")]
    pub category_en: Option<String>,
}

impl UpdateCategoryRequest {
    pub fn normalized(self) -> Self {
        Self {
            category_kh: trimmed(self.category_kh),
            category_en: trimmed(self.category_en),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct CategoryView {
    pub id: i32,
    pub category_kh: String,
    pub category_en: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<categories::Model> for CategoryView {
    fn from(model: categories::Model) -> Self {
        Self {
            id: model.id,
            category_kh: model.category_kh,
            category_en: model.category_en,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
