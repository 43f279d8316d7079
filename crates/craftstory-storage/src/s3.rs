//! S3 backend.
//!
//! The post collection is a single JSON array at [`keys::POSTS_INDEX`],
//! updated with ETag optimistic locking. A lost race is reported as
//! `StorageError::PreconditionFailed`; it is not retried.

use aws_sdk_s3::Client;
use futures::future::BoxFuture;
use tracing::info;

use craftstory_core::keys;
use craftstory_core::models::post::PublishedPost;

use crate::error::StorageError;
use crate::objects::{self, PutCondition};
use crate::state;
use crate::store::{ImageStore, PostStore};

pub struct S3Store {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3Store {
    /// `public_base_url` is prefixed to image keys to form their URLs.
    pub fn new(client: Client, bucket: impl Into<String>, public_base_url: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            public_base_url: public_base_url.into(),
        }
    }

    async fn load_posts(&self) -> Result<Option<(Vec<PublishedPost>, String)>, StorageError> {
        match state::load_state(&self.client, &self.bucket, keys::POSTS_INDEX).await {
            Ok(loaded) => Ok(Some(loaded)),
            Err(StorageError::NotFound { .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }
}

impl PostStore for S3Store {
    fn append<'a>(&'a self, post: &'a PublishedPost) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            let (posts, etag) = match self.load_posts().await? {
                Some((mut posts, etag)) => {
                    posts.insert(0, post.clone());
                    (posts, Some(etag))
                }
                None => (vec![post.clone()], None),
            };

            let condition = match etag.as_deref() {
                Some(etag) => PutCondition::IfMatch(etag),
                None => PutCondition::IfAbsent,
            };

            state::save_state(
                &self.client,
                &self.bucket,
                keys::POSTS_INDEX,
                &posts,
                condition,
            )
            .await?;

            info!(post_id = %post.id, total = posts.len(), "post appended to s3 index");
            Ok(())
        })
    }

    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<PublishedPost>, StorageError>> {
        Box::pin(async move {
            let mut posts = self
                .load_posts()
                .await?
                .map(|(posts, _)| posts)
                .unwrap_or_default();
            posts.truncate(limit);
            Ok(posts)
        })
    }
}

impl ImageStore for S3Store {
    fn put_image<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>> {
        Box::pin(async move {
            let size = bytes.len();
            objects::put_object(
                &self.client,
                &self.bucket,
                key,
                bytes,
                Some(content_type),
                PutCondition::None,
            )
            .await?;

            info!(bucket = %self.bucket, key, size, "image uploaded to s3");
            Ok(image_url(&self.public_base_url, key))
        })
    }

    fn delete_image<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async move {
            objects::delete_object(&self.client, &self.bucket, key).await?;
            info!(bucket = %self.bucket, key, "image removed from s3");
            Ok(())
        })
    }
}

/// Join a public base URL and an object key.
pub fn image_url(public_base_url: &str, key: &str) -> String {
    format!("{}/{key}", public_base_url.trim_end_matches('/'))
}
