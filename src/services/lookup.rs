use sea_orm::{ColumnTrait, ConnectionTrait, DbErr, EntityTrait, QueryFilter, QueryOrder};
use std::collections::{BTreeSet, HashMap};

use crate::entities::{categories, content_images, prelude::*, sub_categories};

/// Loads every category referenced by `ids` in one query.
pub async fn categories_by_id<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, categories::Model>, DbErr> {
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = Categories::find()
        .filter(categories::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

pub async fn sub_categories_by_id<C: ConnectionTrait>(
    conn: &C,
    ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, sub_categories::Model>, DbErr> {
    let ids: BTreeSet<i32> = ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = SubCategories::find()
        .filter(sub_categories::Column::Id.is_in(ids))
        .all(conn)
        .await?;
    Ok(rows.into_iter().map(|row| (row.id, row)).collect())
}

/// Stored image keys grouped by content id, each list in insertion order.
pub async fn image_keys_by_content<C: ConnectionTrait>(
    conn: &C,
    content_ids: impl IntoIterator<Item = i32>,
) -> Result<HashMap<i32, Vec<String>>, DbErr> {
    let ids: BTreeSet<i32> = content_ids.into_iter().collect();
    if ids.is_empty() {
        return Ok(HashMap::new());
    }

    let rows = ContentImages::find()
        .filter(content_images::Column::ContentId.is_in(ids))
        .order_by_asc(content_images::Column::Id)
        .all(conn)
        .await?;

    let mut grouped: HashMap<i32, Vec<String>> = HashMap::new();
    for row in rows {
        grouped.entry(row.content_id).or_default().push(row.image_path);
    }
    Ok(grouped)
}
