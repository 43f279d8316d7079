//! Local filesystem backend.
//!
//! Posts live in one JSON array at `{data_dir}/posts/index.json`; images are
//! written under `{data_dir}/uploads/` and served back at `/uploads/`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use futures::future::BoxFuture;
use tokio::sync::Mutex;
use tracing::info;

use craftstory_core::keys;
use craftstory_core::models::post::PublishedPost;

use crate::error::StorageError;
use crate::store::{ImageStore, PostStore};

/// URL prefix under which uploaded images are served.
pub const UPLOADS_ROUTE: &str = "/uploads";

pub struct LocalStore {
    data_dir: PathBuf,
    /// Serializes read-modify-write of the posts file within this process.
    posts_lock: Mutex<()>,
}

impl LocalStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            posts_lock: Mutex::new(()),
        }
    }

    /// Directory holding uploaded images.
    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    fn posts_path(&self) -> PathBuf {
        self.data_dir.join(keys::POSTS_INDEX)
    }

    async fn read_posts(&self) -> Result<Vec<PublishedPost>, StorageError> {
        let path = self.posts_path();
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(StorageError::io(&path, e)),
        }
    }

    async fn write_posts(&self, posts: &[PublishedPost]) -> Result<(), StorageError> {
        let path = self.posts_path();
        let body = serde_json::to_vec_pretty(posts)?;
        write_atomic(&path, &body).await
    }
}

impl PostStore for LocalStore {
    fn append<'a>(&'a self, post: &'a PublishedPost) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let _guard = self.posts_lock.lock().await;

            let mut posts = self.read_posts().await?;
            posts.insert(0, post.clone());
            self.write_posts(&posts).await?;

            info!(post_id = %post.id, total = posts.len(), "post appended to local store");
            Ok(())
        })
    }

    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<PublishedPost>, StorageError>> {
        Box::pin(async move {
            let mut posts = self.read_posts().await?;
            posts.truncate(limit);
            Ok(posts)
        })
    }
}

impl ImageStore for LocalStore {
    fn put_image<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        _content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let path = self.uploads_dir().join(key);
            write_atomic(&path, &bytes).await?;
            info!(key, size = bytes.len(), "image stored locally");
            Ok(format!("{UPLOADS_ROUTE}/{key}"))
        })
    }

    fn delete_image<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let path = self.uploads_dir().join(key);
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {
                    info!(key, "local image removed");
                    Ok(())
                }
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(StorageError::io(&path, e)),
            }
        })
    }
}

/// Write via a sibling temp file and rename so readers never see a partial file.
async fn write_atomic(path: &Path, body: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|e| StorageError::io(parent, e))?;
    }

    let tmp = path.with_extension("tmp");
    tokio::fs::write(&tmp, body)
        .await
        .map_err(|e| StorageError::io(&tmp, e))?;
    tokio::fs::rename(&tmp, path)
        .await
        .map_err(|e| StorageError::io(path, e))?;

    Ok(())
}
