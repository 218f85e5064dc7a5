pub mod category_service;
pub mod content_service;
pub mod lookup;
pub mod storage;
pub mod sub_category_service;
