pub mod link;
pub mod memory;

pub use link::LinkRepository;
pub use memory::MemoryLinkRepository;

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::config::{Config, StoreBackend};
use crate::entities::{Link, Site};

/// Keyed record store for links and sites.
///
/// Every write is atomic for the single record it touches; nothing here
/// spans records.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepositoryTrait: Send + Sync {
    /// Insert `url` as an active link of `domain`, or refresh an existing
    /// record's `last_seen` and reactivate it. The domain of an existing
    /// record is left as it was.
    async fn upsert_link(&self, url: &str, domain: &str, seen_at: DateTime<Utc>) -> Result<()>;

    async fn find_by_url(&self, url: &str) -> Result<Option<Link>>;

    /// Active links of `domain`, most recently updated first.
    async fn links_for_domain(&self, domain: &str, limit: i64) -> Result<Vec<Link>>;

    /// Up to `limit` active links, least recently seen first. Ties are broken
    /// by creation time and then url, so the order is fully deterministic.
    async fn active_batch(&self, limit: i64) -> Result<Vec<Link>>;

    async fn mark_alive(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<()>;

    async fn mark_dead(&self, id: Uuid) -> Result<()>;

    async fn touch_site(&self, domain: &str, crawled_at: DateTime<Utc>) -> Result<()>;

    async fn get_site(&self, domain: &str) -> Result<Option<Site>>;

    /// Cheap round trip used by the health check.
    async fn ping(&self) -> Result<()>;
}

/// Build the store selected by `config`, running migrations for Postgres.
pub async fn connect(config: &Config) -> Result<Arc<dyn LinkRepositoryTrait>> {
    match config.store_backend() {
        StoreBackend::Postgres => {
            let pool = PgPoolOptions::new()
                .max_connections(10)
                .connect(config.database_url())
                .await?;

            // runs all pending migrations; no-op if up-to-date
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("connected to postgres store");

            Ok(Arc::new(LinkRepository::new(pool)))
        }
        StoreBackend::Memory => {
            warn!("using in-memory store; links are lost when the process exits");
            Ok(Arc::new(MemoryLinkRepository::new()))
        }
    }
}
