use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres};
use uuid::Uuid;

use crate::entities::{Link, Site};
use crate::repositories::LinkRepositoryTrait;

const LINK_COLUMNS: &str =
    "id, url, domain, title, last_seen, status, created_at, updated_at";

#[derive(Clone)]
pub struct LinkRepository {
    pool: Pool<Postgres>,
}

impl LinkRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkRepositoryTrait for LinkRepository {
    async fn upsert_link(&self, url: &str, domain: &str, seen_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO links (url, domain, last_seen, status)
            VALUES ($1, $2, $3, 'active'::link_status)
            ON CONFLICT (url) DO UPDATE
              SET last_seen  = EXCLUDED.last_seen,
                  status     = 'active'::link_status,
                  updated_at = now()
            "#,
        )
        .bind(url)
        .bind(domain)
        .bind(seen_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Link>> {
        let link = sqlx::query_as::<_, Link>(&format!(
            "SELECT {LINK_COLUMNS} FROM links WHERE url = $1"
        ))
        .bind(url)
        .fetch_optional(&self.pool)
        .await?;

        Ok(link)
    }

    async fn links_for_domain(&self, domain: &str, limit: i64) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE domain = $1 AND status = 'active'::link_status
            ORDER BY updated_at DESC, url
            LIMIT $2
            "#
        ))
        .bind(domain)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn active_batch(&self, limit: i64) -> Result<Vec<Link>> {
        let links = sqlx::query_as::<_, Link>(&format!(
            r#"
            SELECT {LINK_COLUMNS}
            FROM links
            WHERE status = 'active'::link_status
            ORDER BY last_seen ASC NULLS FIRST, created_at ASC, url
            LIMIT $1
            "#
        ))
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(links)
    }

    async fn mark_alive(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE links
            SET last_seen = $2,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(seen_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn mark_dead(&self, id: Uuid) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE links
            SET status = 'dead'::link_status,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn touch_site(&self, domain: &str, crawled_at: DateTime<Utc>) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO sites (domain, last_crawled)
            VALUES ($1, $2)
            ON CONFLICT (domain) DO UPDATE
              SET last_crawled = EXCLUDED.last_crawled
            "#,
        )
        .bind(domain)
        .bind(crawled_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_site(&self, domain: &str) -> Result<Option<Site>> {
        let site = sqlx::query_as::<_, Site>(
            "SELECT domain, last_crawled, meta FROM sites WHERE domain = $1",
        )
        .bind(domain)
        .fetch_optional(&self.pool)
        .await?;

        Ok(site)
    }

    async fn ping(&self) -> Result<()> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
