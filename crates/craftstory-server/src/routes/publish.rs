use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::{Extension, Json};
use serde::Serialize;

use craftstory_core::keys;
use craftstory_core::models::image::{sanitize_filename, ImageKind};
use craftstory_core::models::post::{PostDraft, PublishedPost};

use crate::error::ApiError;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Largest accepted publish request body, image included.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub ok: bool,
    pub post: PublishedPost,
}

struct UploadedImage {
    filename: String,
    kind: ImageKind,
    bytes: Vec<u8>,
}

/// Publish a craft story from a multipart form, with an optional image.
///
/// The publisher is identified by the bearer header or, failing that, an
/// `idToken` form field.
pub async fn publish(
    State(state): State<AppState>,
    user: Option<Extension<AuthUser>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<PublishResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let mut draft = PostDraft::default();
    let mut id_token: Option<String> = None;
    let mut image: Option<UploadedImage> = None;

    while let Some(field) = multipart.next_field().await.map_err(bad_multipart)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "image" => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let bytes = field.bytes().await.map_err(bad_multipart)?;
                // Browsers send an empty part when no file was chosen.
                if filename.is_empty() && bytes.is_empty() {
                    continue;
                }
                let kind = ImageKind::from_filename(&filename)?;
                image = Some(UploadedImage {
                    filename,
                    kind,
                    bytes: bytes.to_vec(),
                });
            }
            "idToken" => {
                id_token = Some(field.text().await.map_err(bad_multipart)?);
            }
            _ => {
                let value = field.text().await.map_err(bad_multipart)?;
                draft.set_field(&name, value);
            }
        }
    }

    let owner = match (user, state.verifier.as_ref()) {
        (Some(Extension(user)), _) => Some(user.sub),
        (None, Some(verifier)) => match id_token.as_deref().map(str::trim) {
            Some(token) if !token.is_empty() => Some(verifier.verify(token).await?.sub),
            _ => None,
        },
        (None, None) => None,
    };

    if state.auth_required() && owner.is_none() {
        return Err(ApiError::Unauthorized("Unauthorized".to_string()));
    }

    draft.validate()?;

    let stored = match image {
        Some(image) => {
            let key = keys::post_image(
                owner.as_deref(),
                jiff::Timestamp::now().as_millisecond(),
                &sanitize_filename(&image.filename),
            );
            let url = state
                .images
                .put_image(&key, image.bytes, image.kind.content_type())
                .await?;
            Some((key, url))
        }
        None => None,
    };

    let (image_key, image_url) = stored.unzip();
    let post = draft.into_post(owner, image_url)?;

    if let Err(e) = state.posts.append(&post).await {
        if let Some(key) = image_key.as_deref() {
            // An image without a post is unreachable.
            if let Err(cleanup) = state.images.delete_image(key).await {
                tracing::warn!(key, error = %cleanup, "failed to remove orphaned image");
            }
        }
        return Err(e.into());
    }

    tracing::info!(
        post_id = %post.id,
        ngo_id = post.ngo_id.as_deref().unwrap_or_default(),
        has_image = post.image_url.is_some(),
        "post published"
    );

    Ok(Json(PublishResponse { ok: true, post }))
}

fn bad_multipart(e: MultipartError) -> ApiError {
    ApiError::BadRequest(format!("invalid form data: {}", e.body_text()))
}
