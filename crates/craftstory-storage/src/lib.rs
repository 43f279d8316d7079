//! craftstory-storage
//!
//! Persistence for published posts and their images: a local JSON file
//! backend and a thin wrapper around the AWS S3 SDK.

pub mod client;
pub mod error;
pub mod local;
pub mod objects;
pub mod s3;
pub mod state;
pub mod store;
