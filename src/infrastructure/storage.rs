use crate::config::AppConfig;
use crate::services::storage::{LocalStorageService, S3StorageService, StorageService};
use anyhow::Context;
use aws_sdk_s3::config::Region;
use std::sync::Arc;
use tracing::info;

pub async fn setup_storage(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageService>> {
    if config.is_s3() {
        return setup_s3(config).await;
    }

    tokio::fs::create_dir_all(config.public_root.join(&config.upload_dir))
        .await
        .with_context(|| {
            format!(
                "Failed to create upload directory under {}",
                config.public_root.display()
            )
        })?;

    info!(
        "💾 Local Storage: {} (public at {})",
        config.public_root.display(),
        config.public_base_url
    );

    Ok(Arc::new(LocalStorageService::new(
        config.public_root.clone(),
        config.public_base_url.clone(),
    )))
}

async fn setup_s3(config: &AppConfig) -> anyhow::Result<Arc<dyn StorageService>> {
    let endpoint_url = config.s3_endpoint.clone().context("S3_ENDPOINT must be set")?;
    let access_key = config.s3_access_key.clone().context("S3_ACCESS_KEY must be set")?;
    let secret_key = config.s3_secret_key.clone().context("S3_SECRET_KEY must be set")?;
    let bucket = config.s3_bucket.clone().context("S3_BUCKET must be set")?;

    info!("☁️  S3 Storage: {} (Bucket: {})", endpoint_url, bucket);

    let aws_config = aws_config::from_env()
        .endpoint_url(&endpoint_url)
        .region(Region::new("us-east-1"))
        .credentials_provider(aws_sdk_s3::config::Credentials::new(
            access_key, secret_key, None, None, "static",
        ))
        .load()
        .await;

    let s3_config = aws_sdk_s3::config::Builder::from(&aws_config)
        .force_path_style(true)
        .build();

    let s3_client = aws_sdk_s3::Client::from_conf(s3_config);

    // Ensure bucket exists
    match s3_client.head_bucket().bucket(&bucket).send().await {
        Ok(_) => info!("✅ Bucket '{}' is ready", bucket),
        Err(_) => {
            info!("🪣 Bucket '{}' not found, creating...", bucket);
            if let Err(e) = s3_client.create_bucket().bucket(&bucket).send().await {
                tracing::error!("❌ Failed to create bucket '{}': {}", bucket, e);
            } else {
                info!("✅ Bucket '{}' created successfully", bucket);
            }
        }
    }

    Ok(Arc::new(S3StorageService::new(
        s3_client,
        bucket,
        config.public_base_url.clone(),
    )))
}
