use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::path::{Component, Path, PathBuf};
use tokio::io::{AsyncWrite, AsyncWriteExt};

/// Characters escaped inside a single URL path segment
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}')
    .add(b'/');

/// Durable file storage addressed by relative keys such as
/// `uploads/content/1720700000000_ab12cd34_cover.png`.
///
/// Writes are not transactional; callers that pair a write with database
/// rows must delete the file themselves when the rows are rolled back.
#[async_trait]
pub trait StorageService: Send + Sync {
    async fn put_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()>;
    /// Deleting a key that does not exist is not an error.
    async fn delete_file(&self, key: &str) -> Result<()>;
    async fn file_exists(&self, key: &str) -> Result<bool>;
    fn public_url(&self, key: &str) -> String;
}

/// Appends `key` to `base_url`, percent-encoding each path segment.
pub fn join_public_url(base_url: &str, key: &str) -> String {
    let path: Vec<String> = key
        .split('/')
        .filter(|s| !s.is_empty())
        .map(|s| utf8_percent_encode(s, PATH_SEGMENT).to_string())
        .collect();
    format!("{}/{}", base_url.trim_end_matches('/'), path.join("/"))
}

/// Deletes every key, continuing past failures. Returns the keys that
/// could not be removed.
pub async fn delete_files(storage: &dyn StorageService, keys: &[String]) -> Vec<String> {
    let mut failed = Vec::new();
    for key in keys {
        if let Err(e) = storage.delete_file(key).await {
            tracing::warn!("⚠️ Failed to delete stored file {}: {:#}", key, e);
            failed.push(key.clone());
        }
    }
    failed
}

/// Files on the local disk under a public web root
pub struct LocalStorageService {
    root: PathBuf,
    base_url: String,
}

impl LocalStorageService {
    pub fn new(root: impl Into<PathBuf>, base_url: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            base_url: base_url.into(),
        }
    }

    fn resolve(&self, key: &str) -> Result<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)));
        if key.is_empty() || escapes {
            anyhow::bail!("Invalid storage key: {}", key);
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl StorageService for LocalStorageService {
    async fn put_file(&self, key: &str, data: Bytes, _content_type: &str) -> Result<()> {
        let path = self.resolve(key)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }

        // create_new: an existing file is never overwritten
        let file = tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
            .with_context(|| format!("Failed to create {}", path.display()))?;
        fill_new_file(file, &path, &data).await
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        let path = self.resolve(key)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context(format!("Failed to delete {}", path.display()))),
        }
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let path = self.resolve(key)?;
        Ok(tokio::fs::try_exists(&path).await?)
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.base_url, key)
    }
}

/// Objects in an S3-compatible bucket served from a public base URL
pub struct S3StorageService {
    client: Client,
    bucket: String,
    base_url: String,
}

impl S3StorageService {
    pub fn new(client: Client, bucket: String, base_url: String) -> Self {
        Self {
            client,
            bucket,
            base_url,
        }
    }
}

#[async_trait]
impl StorageService for S3StorageService {
    async fn put_file(&self, key: &str, data: Bytes, content_type: &str) -> Result<()> {
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await?;
        Ok(())
    }

    async fn delete_file(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await?;
        Ok(())
    }

    async fn file_exists(&self, key: &str) -> Result<bool> {
        let res = self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await;

        match res {
            Ok(_) => Ok(true),
            Err(e) => {
                let service_error = e.into_service_error();
                if service_error.is_not_found() {
                    Ok(false)
                } else {
                    Err(anyhow::anyhow!(service_error))
                }
            }
        }
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.base_url, key)
    }
}

/// Writes `data` into a file this call just created. A failed write removes
/// the file again so no truncated upload stays behind.
async fn fill_new_file<W>(mut file: W, path: &Path, data: &[u8]) -> Result<()>
where
    W: AsyncWrite + Unpin,
{
    let written = async {
        file.write_all(data).await?;
        file.flush().await
    }
    .await;

    if let Err(e) = written {
        drop(file);
        if let Err(cleanup) = tokio::fs::remove_file(path).await {
            tracing::warn!("⚠️ Failed to remove partial file {}: {}", path.display(), cleanup);
        }
        return Err(anyhow::Error::new(e).context(format!("Failed to write {}", path.display())));
    }
    Ok(())
}
