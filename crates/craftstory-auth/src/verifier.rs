use futures::future::BoxFuture;
use tracing::warn;

use crate::error::AuthError;
use crate::jwks::fetch_jwks;
use crate::jwt::validate_token;

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub sub: String,
    pub email: Option<String>,
}

/// Turns a bearer credential into an [`Identity`].
pub trait IdentityVerifier: Send + Sync {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>>;
}

/// Verifies ID tokens against the provider's published key set.
///
/// The key set is fetched for every verification; nothing is cached.
pub struct JwksVerifier {
    jwks_url: String,
    project_id: String,
}

impl JwksVerifier {
    pub fn new(jwks_url: impl Into<String>, project_id: impl Into<String>) -> Self {
        Self {
            jwks_url: jwks_url.into(),
            project_id: project_id.into(),
        }
    }
}

impl IdentityVerifier for JwksVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>> {
        Box::pin(async move {
            if token.trim().is_empty() {
                return Err(AuthError::MissingToken);
            }

            let url = self.jwks_url.clone();
            let jwks = tokio::task::spawn_blocking(move || fetch_jwks(&url))
                .await
                .map_err(|e| AuthError::KeyFetch(e.to_string()))??;

            let claims = validate_token(token, &jwks, &self.project_id).inspect_err(|e| {
                warn!(error = %e, "token verification failed");
            })?;

            Ok(Identity {
                sub: claims.sub,
                email: claims.email,
            })
        })
    }
}
