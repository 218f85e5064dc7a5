pub mod categories;
pub mod contents;
pub mod health;
pub mod sub_categories;

use crate::api::error::AppError;

/// Path ids that are not integers cannot match any row.
pub(crate) fn parse_id(raw: &str, not_found: &str) -> Result<i32, AppError> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::NotFound(not_found.to_string()))
}
