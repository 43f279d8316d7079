//! craftstory-auth
//!
//! Verification of identity tokens issued by the hosted identity provider.

pub mod error;
pub mod jwks;
pub mod jwt;
pub mod verifier;
