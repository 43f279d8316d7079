//! Backend-neutral persistence traits.
//!
//! Posts form a single ordered collection, newest first. Nothing on this
//! path ever edits or removes a post once written; images are only removed
//! when their post could not be saved.

use futures::future::BoxFuture;

use craftstory_core::models::post::PublishedPost;

use crate::error::StorageError;

pub trait PostStore: Send + Sync {
    /// Add `post` at the head of the collection.
    fn append<'a>(&'a self, post: &'a PublishedPost) -> BoxFuture<'a, Result<(), StorageError>>;

    /// Up to `limit` posts, newest first.
    fn list(&self, limit: usize) -> BoxFuture<'_, Result<Vec<PublishedPost>, StorageError>>;
}

pub trait ImageStore: Send + Sync {
    /// Store image bytes under `key` and return the URL clients should use.
    fn put_image<'a>(
        &'a self,
        key: &'a str,
        bytes: Vec<u8>,
        content_type: &'a str,
    ) -> BoxFuture<'a, Result<String, StorageError>>;

    /// Remove an image written by [`put_image`](Self::put_image). Missing keys are not an error.
    fn delete_image<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<(), StorageError>>;
}
