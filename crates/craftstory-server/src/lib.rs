//! craftstory-server library root.
//!
//! Exposes the router and its state so integration tests can drive the HTTP
//! surface without binding a socket.

pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod state;
pub mod telemetry;

use axum::extract::DefaultBodyLimit;
use axum::middleware as axum_mw;
use axum::routing::{get, post};
use axum::Router;
use craftstory_storage::local::UPLOADS_ROUTE;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;

use state::AppState;

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Routes that may carry an identity token
    let identified = Router::new()
        .route("/generate", post(routes::generate::generate))
        .route(
            "/publish",
            post(routes::publish::publish)
                .layer(DefaultBodyLimit::max(routes::publish::MAX_UPLOAD_BYTES)),
        )
        .route_layer(axum_mw::from_fn_with_state(
            state.clone(),
            middleware::auth::resolve_identity,
        ));

    let mut app = Router::new()
        // Public (no auth)
        .route("/health", get(routes::health::health_check))
        .route("/posts", get(routes::posts::list_posts))
        .merge(identified);

    if let Some(dir) = &state.uploads_dir {
        app = app.nest_service(UPLOADS_ROUTE, ServeDir::new(dir));
    }

    app.layer(axum_mw::from_fn(middleware::audit::audit_log))
        .layer(cors)
        .with_state(state)
}
