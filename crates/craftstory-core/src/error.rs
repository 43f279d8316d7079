use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    #[error("unsupported image type: {0} (allowed: png, jpg, jpeg, webp)")]
    UnsupportedImageType(String),
}
