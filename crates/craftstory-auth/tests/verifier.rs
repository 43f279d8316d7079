use craftstory_auth::error::AuthError;
use craftstory_auth::jwks::DEFAULT_JWKS_URL;
use craftstory_auth::verifier::{IdentityVerifier, JwksVerifier};

#[tokio::test]
async fn blank_token_is_missing_without_fetching_keys() {
    let verifier = JwksVerifier::new("http://127.0.0.1:9/unreachable", "artisan-test");
    assert!(matches!(
        verifier.verify("   ").await,
        Err(AuthError::MissingToken)
    ));
}

#[tokio::test]
async fn unreachable_key_set_is_a_fetch_error() {
    let verifier = JwksVerifier::new("http://127.0.0.1:9/unreachable", "artisan-test");
    assert!(matches!(
        verifier.verify("header.payload.signature").await,
        Err(AuthError::KeyFetch(_))
    ));
}

/// Needs network access to the provider's key endpoint.
#[tokio::test]
#[ignore]
async fn live_key_set_rejects_a_forged_token() {
    let verifier = JwksVerifier::new(DEFAULT_JWKS_URL, "artisan-test");
    assert!(verifier.verify("header.payload.signature").await.is_err());
}
