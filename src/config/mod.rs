use std::env;
use std::path::PathBuf;

/// Runtime configuration for the content backend
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// SeaORM connection string (default: local SQLite file)
    pub database_url: String,

    /// Connection pool size (default: 10)
    pub db_max_connections: u32,

    /// Storage backend: "local" or "s3" (default: "local")
    pub storage_backend: String,

    /// Public web root for the local backend (default: "public")
    pub public_root: PathBuf,

    /// Directory, relative to the storage root, that receives content images
    pub upload_dir: String,

    /// Base URL that stored paths are appended to when building public links
    pub public_base_url: String,

    /// Maximum size of a single uploaded image in bytes (default: 2 MB)
    pub max_image_size: usize,

    /// Maximum request body size in bytes (default: 32 MB)
    pub max_body_size: usize,

    /// Allowed CORS Origins (comma separated)
    pub allowed_origins: Vec<String>,

    /// S3-compatible endpoint, only read when `storage_backend` is "s3"
    pub s3_endpoint: Option<String>,
    pub s3_access_key: Option<String>,
    pub s3_secret_key: Option<String>,
    pub s3_bucket: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite://content.db?mode=rwc".to_string(),
            db_max_connections: 10,
            storage_backend: "local".to_string(),
            public_root: PathBuf::from("public"),
            upload_dir: "uploads/content".to_string(),
            public_base_url: "http://localhost:3000".to_string(),
            max_image_size: 2 * 1024 * 1024, // 2 MB
            max_body_size: 32 * 1024 * 1024, // 32 MB
            allowed_origins: vec![
                "http://localhost:3000".to_string(),
                "http://localhost:5173".to_string(), // Vite default
                "http://127.0.0.1:3000".to_string(),
            ],
            s3_endpoint: None,
            s3_access_key: None,
            s3_secret_key: None,
            s3_bucket: None,
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Self {
        let default = Self::default();

        Self {
            database_url: env::var("DATABASE_URL").unwrap_or(default.database_url),

            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.db_max_connections),

            storage_backend: env::var("STORAGE_BACKEND")
                .map(|v| v.to_lowercase())
                .unwrap_or(default.storage_backend),

            public_root: env::var("PUBLIC_ROOT")
                .map(PathBuf::from)
                .unwrap_or(default.public_root),

            upload_dir: env::var("UPLOAD_DIR")
                .map(|v| v.trim_matches('/').to_string())
                .unwrap_or(default.upload_dir),

            public_base_url: env::var("APP_URL").unwrap_or(default.public_base_url),

            max_image_size: env::var("MAX_IMAGE_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_image_size),

            max_body_size: env::var("MAX_BODY_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(default.max_body_size),

            allowed_origins: env::var("ALLOWED_ORIGINS")
                .ok()
                .map(|v| v.split(',').map(|s| s.trim().to_string()).collect())
                .unwrap_or(default.allowed_origins),

            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            s3_access_key: env::var("S3_ACCESS_KEY").ok(),
            s3_secret_key: env::var("S3_SECRET_KEY").ok(),
            s3_bucket: env::var("S3_BUCKET").ok(),
        }
    }

    /// Create config for development and tests (in-memory database, local storage)
    pub fn development() -> Self {
        Self {
            database_url: "sqlite::memory:".to_string(),
            db_max_connections: 1,
            ..Self::default()
        }
    }

    pub fn is_s3(&self) -> bool {
        self.storage_backend == "s3"
    }
}
