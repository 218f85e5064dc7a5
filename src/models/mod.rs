pub mod category;
pub mod content;
pub mod sub_category;

pub use category::{CategoryView, CreateCategoryRequest, UpdateCategoryRequest};
pub use content::{ContentImageView, ContentView, CreateContentRequest, ImageUpload};
pub use sub_category::{CreateSubCategoryRequest, SubCategoryView, UpdateSubCategoryRequest};
