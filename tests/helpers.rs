#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, Response},
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use uuid::Uuid;

use sale_alert::{
    app_state::AppState,
    config::AllowedOrigins,
    entities::{Link, LinkStatus},
    fetcher::{FetcherConfig, HttpFetcher},
    repositories::{LinkRepositoryTrait, MemoryLinkRepository},
    router::build_router,
};

pub fn http_fetcher() -> Arc<HttpFetcher> {
    Arc::new(HttpFetcher::new(&FetcherConfig::default()).unwrap())
}

/// Full router over `repo` with a real HTTP fetcher.
pub fn test_app(repo: Arc<dyn LinkRepositoryTrait>) -> Router {
    build_router(AppState::new(repo, http_fetcher()), &AllowedOrigins::Any)
}

pub fn memory_repo() -> Arc<MemoryLinkRepository> {
    Arc::new(MemoryLinkRepository::new())
}

pub fn scrape_request(body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/scrape")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn json_body<T: DeserializeOwned>(response: Response<Body>) -> T {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn active_link(url: &str, domain: &str, last_seen: DateTime<Utc>) -> Link {
    Link {
        id: Uuid::new_v4(),
        url: url.to_string(),
        domain: domain.to_string(),
        title: None,
        last_seen: Some(last_seen),
        status: LinkStatus::Active,
        created_at: last_seen,
        updated_at: last_seen,
    }
}
