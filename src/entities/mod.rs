pub mod prelude;

pub mod categories;
pub mod content_images;
pub mod contents;
pub mod sub_categories;
