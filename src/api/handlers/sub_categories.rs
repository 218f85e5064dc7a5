use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::parse_id;
use crate::api::response::ApiResponse;
use crate::models::{CreateSubCategoryRequest, SubCategoryView, UpdateSubCategoryRequest};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

const NOT_FOUND: &str = "SubCategory not found";

#[utoipa::path(
    get,
    path = "/api/subcategories",
    responses(
        (status = 200, description = "SubCategory list", body = [SubCategoryView])
    ),
    tag = "subcategories"
)]
pub async fn list_sub_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<SubCategoryView>>, AppError> {
    let sub_categories = state.sub_categories.list().await?;
    Ok(ApiResponse::ok("SubCategory list", sub_categories))
}

#[utoipa::path(
    post,
    path = "/api/subcategories",
    request_body = CreateSubCategoryRequest,
    responses(
        (status = 201, description = "SubCategory created successfully", body = SubCategoryView),
        (status = 422, description = "Validation errors")
    ),
    tag = "subcategories"
)]
pub async fn create_sub_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateSubCategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<SubCategoryView>, AppError> {
    let Json(input) = payload?;
    let sub_category = state.sub_categories.create(input).await?;
    Ok(ApiResponse::created("SubCategory created successfully", sub_category))
}

#[utoipa::path(
    get,
    path = "/api/subcategories/{id}",
    params(("id" = i32, Path, description = "SubCategory id")),
    responses(
        (status = 200, description = "SubCategory details", body = SubCategoryView),
        (status = 404, description = "SubCategory not found")
    ),
    tag = "subcategories"
)]
pub async fn get_sub_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<SubCategoryView>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let sub_category = state.sub_categories.get(id).await?;
    Ok(ApiResponse::ok("SubCategory details", sub_category))
}

#[utoipa::path(
    put,
    path = "/api/subcategories/{id}",
    params(("id" = i32, Path, description = "SubCategory id")),
    request_body = UpdateSubCategoryRequest,
    responses(
        (status = 200, description = "SubCategory updated successfully", body = SubCategoryView),
        (status = 404, description = "SubCategory not found"),
        (status = 422, description = "Validation errors")
    ),
    tag = "subcategories"
)]
pub async fn update_sub_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateSubCategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<SubCategoryView>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(input) = payload?;
    let sub_category = state.sub_categories.update(id, input).await?;
    Ok(ApiResponse::ok("SubCategory updated successfully", sub_category))
}

#[utoipa::path(
    delete,
    path = "/api/subcategories/{id}",
    params(("id" = i32, Path, description = "SubCategory id")),
    responses(
        (status = 200, description = "SubCategory deleted successfully"),
        (status = 404, description = "SubCategory not found")
    ),
    tag = "subcategories"
)]
pub async fn delete_sub_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.sub_categories.delete(id).await?;
    Ok(ApiResponse::message("SubCategory deleted successfully"))
}
