use axum::extract::{Request, State};
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::state::AppState;

/// Bearer-token middleware.
///
/// When an `Authorization` header is present and authentication is enabled,
/// the token is verified and the caller is inserted into request extensions
/// as [`AuthUser`]. A present but invalid header is rejected with 401. Routes
/// decide for themselves whether a missing identity is acceptable.
pub async fn resolve_identity(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(verifier) = state.verifier.as_ref() else {
        return Ok(next.run(req).await);
    };

    if let Some(header) = req.headers().get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(|v| v.strip_prefix("Bearer "))
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Unauthorized("Unauthorized".to_string()))?;

        let identity = verifier.verify(token).await?;

        req.extensions_mut().insert(AuthUser { sub: identity.sub });
    }

    Ok(next.run(req).await)
}

/// Authenticated user extracted from a verified identity token.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub sub: String,
}
