pub mod api;
pub mod config;
pub mod entities;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::handlers;
use crate::api::middleware::{metrics::metrics_middleware, request_id::request_id_middleware};
use crate::config::AppConfig;
use crate::services::category_service::CategoryService;
use crate::services::content_service::ContentService;
use crate::services::storage::StorageService;
use crate::services::sub_category_service::SubCategoryService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    routing::get,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::services::ServeDir;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::health::health_check,
        handlers::categories::list_categories,
        handlers::categories::create_category,
        handlers::categories::get_category,
        handlers::categories::update_category,
        handlers::categories::delete_category,
        handlers::sub_categories::list_sub_categories,
        handlers::sub_categories::create_sub_category,
        handlers::sub_categories::get_sub_category,
        handlers::sub_categories::update_sub_category,
        handlers::sub_categories::delete_sub_category,
        handlers::contents::list_contents,
        handlers::contents::create_content,
        handlers::contents::get_content,
        handlers::contents::list_content_images,
    ),
    components(
        schemas(
            handlers::health::HealthResponse,
            models::CategoryView,
            models::CreateCategoryRequest,
            models::UpdateCategoryRequest,
            models::SubCategoryView,
            models::CreateSubCategoryRequest,
            models::UpdateSubCategoryRequest,
            models::ContentView,
            models::ContentImageView,
            models::CreateContentRequest,
            utils::validation::FieldErrors,
        )
    ),
    tags(
        (name = "categories", description = "Top-level content categories"),
        (name = "subcategories", description = "Categories nested under a category"),
        (name = "content", description = "Content records with uploaded images"),
        (name = "system", description = "Health and diagnostics")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub storage: Arc<dyn StorageService>,
    pub config: AppConfig,
    pub categories: Arc<CategoryService>,
    pub sub_categories: Arc<SubCategoryService>,
    pub contents: Arc<ContentService>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, storage: Arc<dyn StorageService>, config: AppConfig) -> Self {
        let categories = Arc::new(CategoryService::new(db.clone(), storage.clone()));
        let sub_categories = Arc::new(SubCategoryService::new(db.clone(), storage.clone()));
        let contents = Arc::new(ContentService::new(
            db.clone(),
            storage.clone(),
            config.clone(),
        ));

        Self {
            db,
            storage,
            config,
            categories,
            sub_categories,
            contents,
        }
    }
}

pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/:id",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .patch(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route(
            "/subcategories",
            get(handlers::sub_categories::list_sub_categories)
                .post(handlers::sub_categories::create_sub_category),
        )
        .route(
            "/subcategories/:id",
            get(handlers::sub_categories::get_sub_category)
                .put(handlers::sub_categories::update_sub_category)
                .patch(handlers::sub_categories::update_sub_category)
                .delete(handlers::sub_categories::delete_sub_category),
        )
        .route(
            "/content",
            get(handlers::contents::list_contents).post(handlers::contents::create_content),
        )
        .route("/content/:id", get(handlers::contents::get_content))
        .route(
            "/content/:id/images",
            get(handlers::contents::list_content_images),
        );

    let mut app = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/health", get(handlers::health::health_check))
        .nest("/api", api_routes);

    // Uploaded images are served straight from the public root
    if !state.config.is_s3() {
        app = app.fallback_service(ServeDir::new(&state.config.public_root));
    }

    app.layer(from_fn(metrics_middleware))
        .layer(from_fn(request_id_middleware))
        .layer(cors_layer(&state.config))
        .layer(DefaultBodyLimit::max(state.config.max_body_size))
        .with_state(state)
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods(Any)
        .allow_headers(Any)
}
