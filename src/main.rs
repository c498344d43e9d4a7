use anyhow::{Context, Result};
use sale_alert::{
    app_state::AppState,
    config::Config,
    fetcher::HttpFetcher,
    logging, repositories,
    revalidate::RevalidationScheduler,
    router::build_router,
    shutdown::spawn_signal_listener,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(config.log_format());

    let link_repo = repositories::connect(&config).await?;
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher_config())?);

    let shutdown_token = CancellationToken::new();
    spawn_signal_listener(shutdown_token.clone());

    let scheduler_handle = if config.revalidate_enabled() {
        let scheduler = RevalidationScheduler::new(
            link_repo.clone(),
            fetcher.clone(),
            config.scheduler_config(),
            shutdown_token.clone(),
        );
        Some(tokio::spawn(scheduler.run()))
    } else {
        info!("Revalidation disabled");
        None
    };

    let app = build_router(AppState::new(link_repo, fetcher), config.allowed_origins());

    let listener = tokio::net::TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("Failed to bind to {}", config.bind_addr()))?;
    info!("Listening on http://{}", listener.local_addr()?);

    let server_token = shutdown_token.clone();
    axum::serve(listener, app)
        .with_graceful_shutdown(async move { server_token.cancelled().await })
        .await
        .context("HTTP server error")?;

    if let Some(handle) = scheduler_handle {
        handle.await?;
    }
    info!("Shut down cleanly");

    Ok(())
}
