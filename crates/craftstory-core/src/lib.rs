//! craftstory-core
//!
//! Pure domain types and storage key conventions.
//! No vendor SDK dependency; this is the shared vocabulary of the craftstory system.

pub mod error;
pub mod keys;
pub mod models;
