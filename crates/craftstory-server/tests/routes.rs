use std::path::Path;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use futures::future::BoxFuture;
use serde_json::{json, Value};
use tower::ServiceExt;

use craftstory_auth::error::AuthError;
use craftstory_auth::verifier::{Identity, IdentityVerifier};
use craftstory_core::models::post::{PostDraft, PublishedPost};
use craftstory_llm::error::LlmError;
use craftstory_llm::generator::TextGenerator;
use craftstory_server::router;
use craftstory_server::state::AppState;
use craftstory_storage::error::StorageError;
use craftstory_storage::local::LocalStore;
use craftstory_storage::store::PostStore;

const GOOD_TOKEN: &str = "good-token";
const BOUNDARY: &str = "craftstory-test-boundary";

// ── Fakes ────────────────────────────────────────────────────────────────────

enum Reply {
    Text(&'static str),
    MissingKey,
}

struct FakeGenerator(Reply);

impl TextGenerator for FakeGenerator {
    fn model_id(&self) -> &str {
        "fake"
    }

    fn generate<'a>(&'a self, _prompt: &'a str) -> BoxFuture<'a, Result<String, LlmError>> {
        let result = match &self.0 {
            Reply::Text(text) => Ok(text.to_string()),
            Reply::MissingKey => Err(LlmError::MissingApiKey { provider: "gemini" }),
        };
        Box::pin(async move { result })
    }
}

struct FakeVerifier;

impl IdentityVerifier for FakeVerifier {
    fn verify<'a>(&'a self, token: &'a str) -> BoxFuture<'a, Result<Identity, AuthError>> {
        let result = if token == GOOD_TOKEN {
            Ok(Identity {
                sub: "uid-1".to_string(),
                email: None,
            })
        } else {
            Err(AuthError::InvalidToken("bad signature".to_string()))
        };
        Box::pin(async move { result })
    }
}

/// A post store whose writes always lose the race.
struct ContendedPosts;

impl PostStore for ContendedPosts {
    fn append<'a>(&'a self, _post: &'a PublishedPost) -> BoxFuture<'a, Result<(), StorageError>> {
        Box::pin(async {
            Err(StorageError::PreconditionFailed {
                key: "posts/index.json".to_string(),
            })
        })
    }

    fn list(&self, _limit: usize) -> BoxFuture<'_, Result<Vec<PublishedPost>, StorageError>> {
        Box::pin(async { Ok(Vec::new()) })
    }
}

const STORY_REPLY: &str =
    "```json\n{\"story\":\"...\", \"tags\":[\"a\",\"b\",\"c\",\"d\",\"e\",\"f\"]}\n```";

fn app(dir: &Path, reply: Reply, auth: bool) -> Router {
    let store = Arc::new(LocalStore::new(dir));
    let verifier: Option<Arc<dyn IdentityVerifier>> = if auth {
        Some(Arc::new(FakeVerifier))
    } else {
        None
    };

    router(AppState {
        generator: Arc::new(FakeGenerator(reply)),
        verifier,
        posts: store.clone(),
        images: store.clone(),
        uploads_dir: Some(store.uploads_dir()),
    })
}

async fn send(app: Router, req: Request<Body>) -> (StatusCode, Vec<u8>) {
    let response = app.oneshot(req).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_json(app: Router, req: Request<Body>) -> (StatusCode, Value) {
    let (status, body) = send(app, req).await;
    (status, serde_json::from_slice(&body).unwrap())
}

fn generate_request(body: Value, token: Option<&str>) -> Request<Body> {
    let mut builder = Request::post("/generate").header(header::CONTENT_TYPE, "application/json");
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn publish_request(
    fields: &[(&str, &str)],
    file: Option<(&str, &[u8])>,
    token: Option<&str>,
) -> Request<Body> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some((filename, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"image\"; filename=\"{filename}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());

    let mut builder = Request::post("/publish").header(
        header::CONTENT_TYPE,
        format!("multipart/form-data; boundary={BOUNDARY}"),
    );
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    builder.body(Body::from(body)).unwrap()
}

const POST_FIELDS: &[(&str, &str)] = &[
    ("name", "Asha"),
    ("age", "40"),
    ("place", "Jaipur"),
    ("productName", "Clay Pot"),
    ("craftType", "pottery"),
    ("story", "A potter's story."),
    ("tags", "clay, pot, , handmade"),
];

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// ── Health ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_public() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), true), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true }));
}

// ── Generate ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn generate_returns_story_and_first_five_tags() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(
        json!({ "productName": "Clay Pot", "name": "Asha", "age": "40", "place": "Jaipur" }),
        None,
    );

    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), false), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "ok": true, "story": "...", "tags": ["a", "b", "c", "d", "e"] })
    );
}

#[tokio::test]
async fn generate_accepts_prompt_alongside_description() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "prompt": "a vase", "description": "a vase" }), None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), false), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn generate_rejects_blank_input() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "name": "  " }), None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), false), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "No description provided");
}

#[tokio::test]
async fn generate_rejects_malformed_json() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), false), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn generate_requires_a_token_when_auth_is_on() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "productName": "Clay Pot" }), None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body, json!({ "ok": false, "error": "Unauthorized" }));
}

#[tokio::test]
async fn generate_rejects_an_invalid_token() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "productName": "Clay Pot" }), Some("forged"));
    let (status, _) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn generate_rejects_a_non_bearer_header() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::post("/generate")
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, "Basic dXNlcjpwYXNz")
        .body(Body::from(json!({ "productName": "Clay Pot" }).to_string()))
        .unwrap();
    let (status, _) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn generate_accepts_a_valid_token() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "productName": "Clay Pot" }), Some(GOOD_TOKEN));
    let (status, body) = send_json(app(dir.path(), Reply::Text(STORY_REPLY), true), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn missing_api_key_is_a_server_misconfiguration() {
    let dir = tempfile::tempdir().unwrap();
    let req = generate_request(json!({ "productName": "Clay Pot" }), None);
    let (status, body) = send_json(app(dir.path(), Reply::MissingKey, false), req).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);
    assert_eq!(body["error"], "gemini API key is not configured");
}

#[tokio::test]
async fn unusable_model_output_is_a_bad_gateway() {
    for reply in ["no story generated", "", "{\"tags\": [\"a\"]}"] {
        let dir = tempfile::tempdir().unwrap();
        let req = generate_request(json!({ "productName": "Clay Pot" }), None);
        let (status, body) = send_json(app(dir.path(), Reply::Text(reply), false), req).await;
        assert_eq!(status, StatusCode::BAD_GATEWAY, "reply: {reply:?}");
        assert_eq!(body["ok"], false);
    }
}

// ── Publish ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn publish_stores_post_and_image() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Reply::Text(STORY_REPLY), false);

    let req = publish_request(POST_FIELDS, Some(("my pot.PNG", b"\x89PNG-bytes")), None);
    let (status, body) = send_json(app.clone(), req).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let post = &body["post"];
    assert_eq!(post["productName"], "Clay Pot");
    assert_eq!(post["tags"], json!(["clay", "pot", "handmade"]));
    assert!(post.get("ngoId").is_none());

    let image_url = post["imageUrl"].as_str().unwrap().to_string();
    assert!(image_url.starts_with("/uploads/posts/anonymous/"));
    assert!(image_url.ends_with("-my_pot.PNG"));

    let (status, bytes) = send(app.clone(), get(&image_url)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"\x89PNG-bytes");

    let (status, listed) = send_json(app, get("/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["posts"][0], *post);
}

#[tokio::test]
async fn publish_without_image_has_no_url() {
    let dir = tempfile::tempdir().unwrap();
    let req = publish_request(POST_FIELDS, Some(("", b"")), None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), false), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["imageUrl"], Value::Null);
}

#[tokio::test]
async fn publish_requires_product_name() {
    let dir = tempfile::tempdir().unwrap();
    let fields = [("name", "Asha"), ("story", "A story.")];
    let req = publish_request(&fields, None, None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), false), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "missing required field: productName");
}

#[tokio::test]
async fn publish_rejects_disallowed_image_types() {
    let dir = tempfile::tempdir().unwrap();
    let req = publish_request(POST_FIELDS, Some(("pot.gif", b"GIF89a")), None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), false), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
    assert!(!dir.path().join("uploads").exists());
    assert!(!dir.path().join("posts/index.json").exists());
}

#[tokio::test]
async fn publish_rejects_non_multipart_bodies() {
    let dir = tempfile::tempdir().unwrap();
    let req = Request::post("/publish")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), false), req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn publish_attaches_subject_from_bearer_token() {
    let dir = tempfile::tempdir().unwrap();
    let req = publish_request(POST_FIELDS, Some(("pot.webp", b"RIFF")), Some(GOOD_TOKEN));
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), true), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["ngoId"], "uid-1");
    assert!(
        body["post"]["imageUrl"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/posts/uid-1/")
    );
}

#[tokio::test]
async fn publish_accepts_id_token_form_field() {
    let dir = tempfile::tempdir().unwrap();
    let mut fields = POST_FIELDS.to_vec();
    fields.push(("idToken", GOOD_TOKEN));
    let req = publish_request(&fields, None, None);
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), true), req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["post"]["ngoId"], "uid-1");
}

#[tokio::test]
async fn publish_requires_identity_when_auth_is_on() {
    let dir = tempfile::tempdir().unwrap();
    let req = publish_request(POST_FIELDS, None, None);
    let (status, _) = send_json(app(dir.path(), Reply::Text(""), true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let mut fields = POST_FIELDS.to_vec();
    fields.push(("idToken", "forged"));
    let req = publish_request(&fields, None, None);
    let (status, _) = send_json(app(dir.path(), Reply::Text(""), true), req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn failed_publish_removes_the_stored_image() {
    let dir = tempfile::tempdir().unwrap();
    let images = Arc::new(LocalStore::new(dir.path()));
    let app = router(AppState {
        generator: Arc::new(FakeGenerator(Reply::Text(""))),
        verifier: None,
        posts: Arc::new(ContendedPosts),
        images: images.clone(),
        uploads_dir: Some(images.uploads_dir()),
    });

    let req = publish_request(POST_FIELDS, Some(("pot.png", b"\x89PNG")), None);
    let (status, body) = send_json(app, req).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["ok"], false);

    let anonymous = images.uploads_dir().join("posts/anonymous");
    let leftovers = std::fs::read_dir(&anonymous)
        .map(|entries| entries.count())
        .unwrap_or(0);
    assert_eq!(leftovers, 0);
}

// ── Posts ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn posts_are_listed_newest_first_with_limit() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Reply::Text(""), false);

    for product in ["first", "second", "third"] {
        let fields = [("name", "Asha"), ("productName", product), ("story", "s")];
        let (status, _) = send(app.clone(), publish_request(&fields, None, None)).await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = send_json(app.clone(), get("/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], true);
    let products: Vec<&str> = body["posts"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["productName"].as_str().unwrap())
        .collect();
    assert_eq!(products, vec!["third", "second", "first"]);

    let (_, body) = send_json(app, get("/posts?limit=1")).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn posts_start_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = send_json(app(dir.path(), Reply::Text(""), true), get("/posts")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "ok": true, "posts": [] }));
}

#[tokio::test]
async fn posts_reject_a_bad_limit() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) =
        send_json(app(dir.path(), Reply::Text(""), false), get("/posts?limit=lots")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], false);
}

#[tokio::test]
async fn posts_limit_is_capped() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalStore::new(dir.path());
    for i in 0..105 {
        let mut draft = PostDraft::default();
        draft.set_field("name", "Asha".to_string());
        draft.set_field("productName", format!("item {i}"));
        draft.set_field("story", "s".to_string());
        store.append(&draft.into_post(None, None).unwrap()).await.unwrap();
    }

    let app = app(dir.path(), Reply::Text(""), false);

    let (status, body) = send_json(app.clone(), get("/posts?limit=1000")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["posts"].as_array().unwrap().len(), 100);
    assert_eq!(body["posts"][0]["productName"], "item 104");

    let (_, body) = send_json(app, get("/posts")).await;
    assert_eq!(body["posts"].as_array().unwrap().len(), 20);
}

// ── Public routes ignore identity ────────────────────────────────────────────

#[tokio::test]
async fn public_routes_ignore_bad_bearer_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let app = app(dir.path(), Reply::Text(""), true);

    for uri in ["/health", "/posts"] {
        let req = Request::get(uri)
            .header(header::AUTHORIZATION, "Bearer expired-token")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send_json(app.clone(), req).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        assert_eq!(body["ok"], true);
    }
}

#[tokio::test]
async fn uploads_are_served_despite_bad_bearer_tokens() {
    let dir = tempfile::tempdir().unwrap();
    let open = app(dir.path(), Reply::Text(""), false);
    let req = publish_request(POST_FIELDS, Some(("pot.jpg", b"jpeg-bytes")), None);
    let (_, body) = send_json(open, req).await;
    let image_url = body["post"]["imageUrl"].as_str().unwrap().to_string();

    let guarded = app(dir.path(), Reply::Text(""), true);
    let req = Request::get(&image_url)
        .header(header::AUTHORIZATION, "Bearer expired-token")
        .body(Body::empty())
        .unwrap();
    let (status, bytes) = send(guarded, req).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(bytes, b"jpeg-bytes");
}
