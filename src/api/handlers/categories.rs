use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::parse_id;
use crate::api::response::ApiResponse;
use crate::models::{CategoryView, CreateCategoryRequest, UpdateCategoryRequest};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};

const NOT_FOUND: &str = "Category not found";

#[utoipa::path(
    get,
    path = "/api/categories",
    responses(
        (status = 200, description = "Category list", body = [CategoryView])
    ),
    tag = "categories"
)]
pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<CategoryView>>, AppError> {
    let categories = state.categories.list().await?;
    Ok(ApiResponse::ok("Category list", categories))
}

#[utoipa::path(
    post,
    path = "/api/categories",
    request_body = CreateCategoryRequest,
    responses(
        (status = 201, description = "Category created successfully", body = CategoryView),
        (status = 422, description = "Validation errors")
    ),
    tag = "categories"
)]
pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    let Json(input) = payload?;
    let category = state.categories.create(input).await?;
    Ok(ApiResponse::created("Category created successfully", category))
}

#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category details", body = CategoryView),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn get_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let category = state.categories.get(id).await?;
    Ok(ApiResponse::ok("Category details", category))
}

#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    request_body = UpdateCategoryRequest,
    responses(
        (status = 200, description = "Category updated successfully", body = CategoryView),
        (status = 404, description = "Category not found"),
        (status = 422, description = "Validation errors")
    ),
    tag = "categories"
)]
pub async fn update_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
    payload: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> Result<ApiResponse<CategoryView>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let Json(input) = payload?;
    let category = state.categories.update(id, input).await?;
    Ok(ApiResponse::ok("Category updated successfully", category))
}

#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    params(("id" = i32, Path, description = "Category id")),
    responses(
        (status = 200, description = "Category deleted successfully"),
        (status = 404, description = "Category not found")
    ),
    tag = "categories"
)]
pub async fn delete_category(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<()>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    state.categories.delete(id).await?;
    Ok(ApiResponse::message("Category deleted successfully"))
}
