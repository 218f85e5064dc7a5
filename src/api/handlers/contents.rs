use crate::AppState;
use crate::api::error::AppError;
use crate::api::handlers::parse_id;
use crate::api::response::ApiResponse;
use crate::models::{ContentImageView, ContentView, CreateContentRequest, ImageUpload};
use axum::{
    extract::{
        Multipart, Path, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
};

const NOT_FOUND: &str = "Content not found";

#[utoipa::path(
    get,
    path = "/api/content",
    responses(
        (status = 200, description = "List Content", body = [ContentView])
    ),
    tag = "content"
)]
pub async fn list_contents(
    State(state): State<AppState>,
) -> Result<ApiResponse<Vec<ContentView>>, AppError> {
    let contents = state.contents.list().await?;
    Ok(ApiResponse::ok("List Content", contents))
}

#[utoipa::path(
    post,
    path = "/api/content",
    request_body(
        content = CreateContentRequest,
        content_type = "multipart/form-data",
        description = "Text fields plus two or more `image` (or `image[]`) file parts"
    ),
    responses(
        (status = 201, description = "Content created successfully", body = [ContentView]),
        (status = 413, description = "Request body exceeds the maximum allowed limit"),
        (status = 422, description = "Validation errors, including a body that is not multipart"),
        (status = 500, description = "Something went wrong")
    ),
    tag = "content"
)]
pub async fn create_content(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<ApiResponse<Vec<ContentView>>, AppError> {
    let mut multipart = multipart?;
    let mut input = CreateContentRequest::default();
    let mut images: Option<Vec<ImageUpload>> = None;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();

        if is_image_field(&name) {
            let file_name = field.file_name().unwrap_or_default().to_string();
            let content_type = field.content_type().map(|s| s.to_string());
            let data = field.bytes().await.map_err(multipart_error)?;

            // An empty file input submits a part with no name and no bytes
            if file_name.is_empty() && data.is_empty() {
                continue;
            }
            images.get_or_insert_with(Vec::new).push(ImageUpload {
                file_name,
                content_type,
                data,
            });
        } else {
            let value = field.text().await.map_err(multipart_error)?;
            if !input.set_field(&name, value) {
                tracing::debug!("Ignoring unknown form field '{}'", name);
            }
        }
    }

    let content = state.contents.create(input, images).await?;
    Ok(ApiResponse::created("Content created successfully", vec![content]))
}

#[utoipa::path(
    get,
    path = "/api/content/{id}",
    params(("id" = i32, Path, description = "Content id")),
    responses(
        (status = 200, description = "Content details", body = ContentView),
        (status = 404, description = "Content not found")
    ),
    tag = "content"
)]
pub async fn get_content(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<ContentView>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let content = state.contents.get(id).await?;
    Ok(ApiResponse::ok("Content details", content))
}

#[utoipa::path(
    get,
    path = "/api/content/{id}/images",
    params(("id" = i32, Path, description = "Content id")),
    responses(
        (status = 200, description = "Content images", body = [ContentImageView]),
        (status = 404, description = "Content not found")
    ),
    tag = "content"
)]
pub async fn list_content_images(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<ApiResponse<Vec<ContentImageView>>, AppError> {
    let id = parse_id(&id, NOT_FOUND)?;
    let images = state.contents.images(id).await?;
    Ok(ApiResponse::ok("Content images", images))
}

/// `image`, `image[]` and indexed `image[0]` parts all carry uploads.
fn is_image_field(name: &str) -> bool {
    name == "image" || (name.starts_with("image[") && name.ends_with(']'))
}

fn multipart_error(e: MultipartError) -> AppError {
    let err_msg = e.body_text();
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE || err_msg.contains("length limit exceeded") {
        AppError::PayloadTooLarge("Request body exceeds the maximum allowed limit".to_string())
    } else {
        AppError::BadRequest(err_msg)
    }
}
