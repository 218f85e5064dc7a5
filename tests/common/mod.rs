#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode},
};
use http_body_util::BodyExt;
use rust_content_backend::config::AppConfig;
use rust_content_backend::infrastructure::database;
use rust_content_backend::services::storage::{LocalStorageService, StorageService};
use rust_content_backend::{AppState, create_app};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::TempDir;
use tower::ServiceExt;

pub const PNG: &[u8] = &[
    0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0x00, 0x00, 0x00, 0x0D, 0x49, 0x48, 0x44, 0x52,
];
pub const GIF: &[u8] = b"GIF89a\x01\x00\x01\x00\x80\x00\x00";

const BOUNDARY: &str = "----content-backend-test-boundary";

pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub public_root: PathBuf,
    pub config: AppConfig,
    _dir: TempDir,
}

impl TestApp {
    /// Fresh in-memory database and an empty public root on local disk.
    pub async fn new() -> Self {
        Self::build(|root, config| {
            Arc::new(LocalStorageService::new(root, config.public_base_url.clone()))
        })
        .await
    }

    /// Same as [`TestApp::new`] with a caller-built storage backend.
    pub async fn with_storage<F>(make_storage: F) -> Self
    where
        F: FnOnce(&Path, &AppConfig) -> Arc<dyn StorageService>,
    {
        Self::build(make_storage).await
    }

    async fn build<F>(make_storage: F) -> Self
    where
        F: FnOnce(&Path, &AppConfig) -> Arc<dyn StorageService>,
    {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig {
            public_root: dir.path().to_path_buf(),
            ..AppConfig::development()
        };

        let db = database::setup_database(&config).await.unwrap();
        let storage = make_storage(dir.path(), &config);
        let state = AppState::new(db.clone(), storage, config.clone());

        Self {
            app: create_app(state),
            db,
            public_root: dir.path().to_path_buf(),
            config,
            _dir: dir,
        }
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.send(
            Request::builder()
                .method("DELETE")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    pub async fn post_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("POST", uri, body)).await
    }

    pub async fn put_json(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.send(json_request("PUT", uri, body)).await
    }

    pub async fn create_category(&self, kh: &str, en: &str) -> i32 {
        let (status, body) = self
            .post_json(
                "/api/categories",
                serde_json::json!({ "category_kh": kh, "category_en": en }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap() as i32
    }

    pub async fn create_sub_category(&self, category_id: i32, kh: &str, en: &str) -> i32 {
        let (status, body) = self
            .post_json(
                "/api/subcategories",
                serde_json::json!({
                    "category_id": category_id,
                    "sub_category_kh": kh,
                    "sub_category_en": en
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["data"]["id"].as_i64().unwrap() as i32
    }

    /// Uploads content with two PNG images and returns the response body.
    pub async fn create_content(
        &self,
        category_id: i32,
        sub_category_id: i32,
        title_kh: &str,
        title_en: &str,
    ) -> Value {
        let category_id = category_id.to_string();
        let sub_category_id = sub_category_id.to_string();
        let request = multipart_request(
            "/api/content",
            &[
                ("category_id", category_id.as_str()),
                ("sub_category_id", sub_category_id.as_str()),
                ("title_kh", title_kh),
                ("title_en", title_en),
                ("description_kh", "ការពិពណ៌នា"),
                ("description_en", "A short description"),
            ],
            &[("image[]", "first.png", PNG), ("image[]", "second.png", PNG)],
        );
        let (status, body) = self.send(request).await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body
    }

    /// Number of files currently under the upload directory.
    pub fn stored_file_count(&self) -> usize {
        std::fs::read_dir(self.public_root.join(&self.config.upload_dir))
            .map(|entries| entries.count())
            .unwrap_or(0)
    }

    /// Maps a public URL returned by the API back to its file on disk.
    pub fn file_for_url(&self, url: &str) -> PathBuf {
        let key = url
            .strip_prefix(&format!("{}/", self.config.public_base_url))
            .unwrap();
        self.public_root.join(key)
    }
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("Content-Type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// Builds a `multipart/form-data` request from text fields and
/// `(field name, file name, bytes)` file parts.
pub fn multipart_request(
    uri: &str,
    fields: &[(&str, &str)],
    files: &[(&str, &str, &[u8])],
) -> Request<Body> {
    let mut body = Vec::new();

    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }

    for (name, file_name, data) in files {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, name, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(data);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "Content-Type",
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}
