pub use super::categories::Entity as Categories;
pub use super::content_images::Entity as ContentImages;
pub use super::contents::Entity as Contents;
pub use super::sub_categories::Entity as SubCategories;
