use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::{Extension, Json};
use serde::Serialize;

use craftstory_core::models::request::GenerationRequest;
use craftstory_llm::story::generate_story;

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct GenerateResponse {
    pub ok: bool,
    pub story: String,
    pub tags: Vec<String>,
}

/// Generate a story and tags for a described craft item.
pub async fn generate(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    payload: Result<Json<GenerationRequest>, JsonRejection>,
) -> Result<Json<GenerateResponse>, ApiError> {
    if state.auth_required() && user.is_none() {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    }

    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    if request.is_blank() {
        return Err(ApiError::BadRequest("No description provided".to_string()));
    }

    if let Some(Extension(user)) = &user {
        tracing::info!(user_sub = %user.sub, "generating story");
    }

    let record = generate_story(state.generator.as_ref(), &request).await?;

    Ok(Json(GenerateResponse {
        ok: true,
        story: record.story,
        tags: record.tags,
    }))
}
