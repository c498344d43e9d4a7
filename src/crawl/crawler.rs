use chrono::Utc;
use std::sync::Arc;
use tracing::{Span, info, instrument, warn};

use crate::crawl::errors::CrawlError;
use crate::discovery::{extract_internal_links, filter_links_by_keywords, normalize_domain};
use crate::fetcher::PageFetcher;
use crate::repositories::LinkRepositoryTrait;

/// Result of one crawl: the site's bare hostname and the links that matched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlOutcome {
    pub domain: String,
    pub links: Vec<String>,
}

/// Fetches one seed page, keeps its promotional same-domain links and
/// records them.
pub struct Crawler {
    link_repo: Arc<dyn LinkRepositoryTrait>,
    fetcher: Arc<dyn PageFetcher>,
}

impl Crawler {
    pub fn new(link_repo: Arc<dyn LinkRepositoryTrait>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self { link_repo, fetcher }
    }

    /// Link writes are best effort: a failed upsert is logged and skipped so
    /// the caller still gets the extraction result. The site record write is
    /// not, and fails the crawl.
    #[instrument(skip(self, tags), fields(domain))]
    pub async fn crawl(
        &self,
        target_url: Option<&str>,
        tags: Option<&[String]>,
    ) -> Result<CrawlOutcome, CrawlError> {
        let target_url = target_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| CrawlError::InvalidInput("url required".to_string()))?;

        let domain = normalize_domain(target_url)
            .ok_or_else(|| CrawlError::InvalidInput("invalid url".to_string()))?;
        Span::current().record("domain", domain.as_str());

        let page = self.fetcher.fetch_page(target_url).await?;

        let candidates = extract_internal_links(&page.body_utf8, target_url);
        let links = filter_links_by_keywords(&candidates, tags);

        let now = Utc::now();
        let mut stored = 0usize;
        for url in &links {
            match self.link_repo.upsert_link(url, &domain, now).await {
                Ok(()) => stored += 1,
                Err(e) => warn!(url = %url, error = %e, "failed to store link"),
            }
        }

        self.link_repo
            .touch_site(&domain, now)
            .await
            .map_err(CrawlError::Store)?;

        info!(
            candidates = candidates.len(),
            matched = links.len(),
            stored,
            "crawl complete"
        );

        Ok(CrawlOutcome { domain, links })
    }
}
