use std::net::SocketAddr;

use craftstory_server::config::AppConfig;
use craftstory_server::state::AppState;
use craftstory_server::{router, telemetry};

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // A missing .env file is fine; the environment may be set directly.
    let _ = dotenvy::dotenv();

    let config = AppConfig::from_env()?;
    telemetry::init(config.log_format);

    tracing::info!(
        generator = config.generator.name(),
        storage = config.storage.name(),
        auth = config.auth.name(),
        "starting craftstory"
    );

    let state = AppState::from_config(&config).await;
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "listening");

    axum::serve(listener, app).await?;

    Ok(())
}
