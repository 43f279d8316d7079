use jsonwebtoken::jwk::JwkSet;
use tracing::debug;

use crate::error::AuthError;

/// Published signing keys for the hosted identity provider's ID tokens.
pub const DEFAULT_JWKS_URL: &str =
    "https://www.googleapis.com/service_accounts/v1/jwk/securetoken@system.gserviceaccount.com";

/// Fetch a JSON Web Key Set. Blocking; call from a blocking context.
pub fn fetch_jwks(url: &str) -> Result<JwkSet, AuthError> {
    let mut response = ureq::get(url)
        .call()
        .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

    let jwks: JwkSet = response
        .body_mut()
        .read_json()
        .map_err(|e| AuthError::KeyFetch(e.to_string()))?;

    debug!(url, keys = jwks.keys.len(), "fetched signing keys");
    Ok(jwks)
}
