use jsonwebtoken::jwk::JwkSet;
use jsonwebtoken::{decode, decode_header, Algorithm, DecodingKey, Validation};
use serde::Deserialize;

use crate::error::AuthError;

/// Claims extracted from a verified ID token.
#[derive(Debug, Clone, Deserialize)]
pub struct IdTokenClaims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: u64,
    pub iat: u64,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

/// Issuer of ID tokens for a project.
pub fn issuer_for(project_id: &str) -> String {
    format!("https://securetoken.google.com/{project_id}")
}

/// Validate an RS256 ID token against a published key set.
///
/// The key is chosen by the token header's `kid`.
pub fn validate_token(
    token: &str,
    jwks: &JwkSet,
    project_id: &str,
) -> Result<IdTokenClaims, AuthError> {
    let header = decode_header(token)?;
    let kid = header
        .kid
        .ok_or_else(|| AuthError::InvalidToken("missing kid header".to_string()))?;
    let jwk = jwks
        .find(&kid)
        .ok_or_else(|| AuthError::UnknownKey(kid.clone()))?;
    let key = DecodingKey::from_jwk(jwk)?;

    validate_with_key(token, &key, Algorithm::RS256, project_id)
}

/// Validate a token's signature and claims with a known key.
///
/// Enforces `iss`, `aud`, `exp`, and a non-empty `sub`.
pub fn validate_with_key(
    token: &str,
    key: &DecodingKey,
    algorithm: Algorithm,
    project_id: &str,
) -> Result<IdTokenClaims, AuthError> {
    let issuer = issuer_for(project_id);

    let mut validation = Validation::new(algorithm);
    validation.set_issuer(&[&issuer]);
    validation.set_audience(&[project_id]);
    validation.validate_exp = true;

    let token_data = decode::<IdTokenClaims>(token, key, &validation)?;

    if token_data.claims.sub.trim().is_empty() {
        return Err(AuthError::InvalidToken("empty subject".to_string()));
    }

    Ok(token_data.claims)
}
