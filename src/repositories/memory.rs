use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use std::cmp::Ordering;
use uuid::Uuid;

use crate::entities::{Link, LinkStatus, Site};
use crate::repositories::LinkRepositoryTrait;

/// Process-local store keyed by url and domain. Used for development runs
/// and tests; it honours the same ordering contract as the Postgres store.
#[derive(Default)]
pub struct MemoryLinkRepository {
    links: DashMap<String, Link>,
    sites: DashMap<String, Site>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn site_count(&self) -> usize {
        self.sites.len()
    }

    /// Seed a record directly, bypassing the crawl path.
    pub fn insert(&self, link: Link) {
        self.links.insert(link.url.clone(), link);
    }

    fn active_links(&self) -> Vec<Link> {
        self.links
            .iter()
            .filter(|entry| entry.status == LinkStatus::Active)
            .map(|entry| entry.value().clone())
            .collect()
    }

    fn update_by_id(&self, id: Uuid, apply: impl FnOnce(&mut Link)) {
        if let Some(mut entry) = self.links.iter_mut().find(|entry| entry.id == id) {
            apply(entry.value_mut());
        }
    }
}

/// `last_seen` ascending with never-seen links first.
fn by_staleness(a: &Link, b: &Link) -> Ordering {
    match (a.last_seen, b.last_seen) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.cmp(&y),
    }
    .then_with(|| a.created_at.cmp(&b.created_at))
    .then_with(|| a.url.cmp(&b.url))
}

#[async_trait]
impl LinkRepositoryTrait for MemoryLinkRepository {
    async fn upsert_link(&self, url: &str, domain: &str, seen_at: DateTime<Utc>) -> Result<()> {
        let now = Utc::now();
        self.links
            .entry(url.to_string())
            .and_modify(|link| {
                link.last_seen = Some(seen_at);
                link.status = LinkStatus::Active;
                link.updated_at = now;
            })
            .or_insert_with(|| Link {
                id: Uuid::new_v4(),
                url: url.to_string(),
                domain: domain.to_string(),
                title: None,
                last_seen: Some(seen_at),
                status: LinkStatus::Active,
                created_at: now,
                updated_at: now,
            });

        Ok(())
    }

    async fn find_by_url(&self, url: &str) -> Result<Option<Link>> {
        Ok(self.links.get(url).map(|entry| entry.value().clone()))
    }

    async fn links_for_domain(&self, domain: &str, limit: i64) -> Result<Vec<Link>> {
        let mut links: Vec<Link> = self
            .active_links()
            .into_iter()
            .filter(|link| link.domain == domain)
            .collect();
        links.sort_by(|a, b| b.updated_at.cmp(&a.updated_at).then_with(|| a.url.cmp(&b.url)));
        links.truncate(limit.max(0) as usize);

        Ok(links)
    }

    async fn active_batch(&self, limit: i64) -> Result<Vec<Link>> {
        let mut links = self.active_links();
        links.sort_by(by_staleness);
        links.truncate(limit.max(0) as usize);

        Ok(links)
    }

    async fn mark_alive(&self, id: Uuid, seen_at: DateTime<Utc>) -> Result<()> {
        self.update_by_id(id, |link| {
            link.last_seen = Some(seen_at);
            link.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn mark_dead(&self, id: Uuid) -> Result<()> {
        self.update_by_id(id, |link| {
            link.status = LinkStatus::Dead;
            link.updated_at = Utc::now();
        });
        Ok(())
    }

    async fn touch_site(&self, domain: &str, crawled_at: DateTime<Utc>) -> Result<()> {
        self.sites
            .entry(domain.to_string())
            .and_modify(|site| site.last_crawled = Some(crawled_at))
            .or_insert_with(|| Site {
                domain: domain.to_string(),
                last_crawled: Some(crawled_at),
                meta: None,
            });
        Ok(())
    }

    async fn get_site(&self, domain: &str) -> Result<Option<Site>> {
        Ok(self.sites.get(domain).map(|entry| entry.value().clone()))
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
