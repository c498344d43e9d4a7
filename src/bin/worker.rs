use anyhow::{Result, bail};
use sale_alert::{
    config::{Config, StoreBackend},
    fetcher::HttpFetcher,
    logging, repositories,
    revalidate::RevalidationScheduler,
    shutdown::spawn_signal_listener,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

/// Runs the revalidation scheduler without the HTTP API.
#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;
    logging::init(config.log_format());

    // A standalone worker over a private in-memory store would never see a link.
    if config.store_backend() == StoreBackend::Memory {
        bail!("the worker needs a shared store; set STORE_BACKEND=postgres");
    }

    let link_repo = repositories::connect(&config).await?;
    let fetcher = Arc::new(HttpFetcher::new(&config.fetcher_config())?);

    let shutdown_token = CancellationToken::new();
    spawn_signal_listener(shutdown_token.clone());

    RevalidationScheduler::new(link_repo, fetcher, config.scheduler_config(), shutdown_token)
        .run()
        .await;

    Ok(())
}
