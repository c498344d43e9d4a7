use crate::crawl::Crawler;
use crate::fetcher::PageFetcher;
use crate::repositories::LinkRepositoryTrait;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub link_repo: Arc<dyn LinkRepositoryTrait>,
    pub crawler: Arc<Crawler>,
}

impl AppState {
    pub fn new(link_repo: Arc<dyn LinkRepositoryTrait>, fetcher: Arc<dyn PageFetcher>) -> Self {
        Self {
            crawler: Arc::new(Crawler::new(link_repo.clone(), fetcher)),
            link_repo,
        }
    }
}
