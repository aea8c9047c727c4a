use dqw_tracker::{import::TableFetcher, router, AppState, Config, Dashboard, Storage};
use std::net::SocketAddr;
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let config = Config::from_env()?;
    let storage = Storage::connect(&config.backend)?;
    let data = Dashboard::load(&storage).await;
    info!(
        backend = storage.label(),
        tasks = data.checklist.tasks().len(),
        kokoro = data.kokoro.rows().len(),
        history = data.history.entries().len(),
        "loaded tables"
    );

    let state = AppState::new(&config, storage, TableFetcher::new()?, data);
    let app = router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    info!("listening on http://{addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
