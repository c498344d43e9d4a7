mod helpers;

use axum::http::StatusCode;
use chrono::{Duration as ChronoDuration, Utc};
use serde_json::{Value, json};
use tokio_util::sync::CancellationToken;
use tower::ServiceExt;
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use sale_alert::{
    entities::LinkStatus,
    repositories::LinkRepositoryTrait,
    revalidate::{RevalidationScheduler, RunSummary, SchedulerConfig},
};

const SHOP_PAGE: &str = r#"<html><body>
    <a href="/deals/shoes">Shoes</a>
    <a href="https://other.com/sale">X</a>
    <a href="/about#team">About</a>
</body></html>"#;

async fn serve_html(server: &MockServer, at: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("Content-Type", "text/html; charset=utf-8"),
        )
        .mount(server)
        .await;
}

async fn serve_status(server: &MockServer, at: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(at))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_scrape_keeps_promotional_same_domain_links() {
    let server = MockServer::start().await;
    serve_html(&server, "/", SHOP_PAGE).await;

    let repo = helpers::memory_repo();
    let app = helpers::test_app(repo.clone());

    let response = app
        .oneshot(helpers::scrape_request(
            json!({ "url": format!("{}/", server.uri()) }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = helpers::json_body(response).await;
    let expected = format!("{}/deals/shoes", server.uri());
    assert_eq!(body["success"], true);
    assert_eq!(body["domain"], "127.0.0.1");
    assert_eq!(body["links"], json!([expected]));

    let stored = repo.find_by_url(&expected).await.unwrap().unwrap();
    assert_eq!(stored.domain, "127.0.0.1");
    assert_eq!(stored.status, LinkStatus::Active);
    assert!(stored.last_seen.is_some());
    assert_eq!(repo.link_count(), 1);

    let site = repo.get_site("127.0.0.1").await.unwrap().unwrap();
    assert!(site.last_crawled.is_some());
}

#[tokio::test]
async fn test_scrape_with_tags_overrides_defaults() {
    let server = MockServer::start().await;
    serve_html(&server, "/", SHOP_PAGE).await;

    let repo = helpers::memory_repo();
    let response = helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(json!({
            "url": format!("{}/", server.uri()),
            "tags": ["About"]
        })))
        .await
        .unwrap();

    let body: Value = helpers::json_body(response).await;
    assert_eq!(body["links"], json!([format!("{}/about", server.uri())]));
}

#[tokio::test]
async fn test_invalid_url_is_client_error_and_writes_nothing() {
    let repo = helpers::memory_repo();

    let response = helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(json!({ "url": "not a url" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let body: Value = helpers::json_body(response).await;
    assert_eq!(body, json!({ "success": false, "error": "invalid url" }));
    assert_eq!(repo.link_count(), 0);
    assert_eq!(repo.site_count(), 0);
}

#[tokio::test]
async fn test_unreachable_page_is_server_error() {
    let server = MockServer::start().await;
    serve_status(&server, "/", 503).await;

    let repo = helpers::memory_repo();
    let response = helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(
            json!({ "url": format!("{}/", server.uri()) }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = helpers::json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(repo.site_count(), 0);
}

#[tokio::test]
async fn test_repeated_crawl_does_not_duplicate_links() {
    let server = MockServer::start().await;
    serve_html(&server, "/", SHOP_PAGE).await;

    let repo = helpers::memory_repo();
    let url = format!("{}/", server.uri());
    let link_url = format!("{}/deals/shoes", server.uri());

    helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(json!({ "url": url })))
        .await
        .unwrap();
    let first = repo.find_by_url(&link_url).await.unwrap().unwrap();

    helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(json!({ "url": url })))
        .await
        .unwrap();
    let second = repo.find_by_url(&link_url).await.unwrap().unwrap();

    assert_eq!(repo.link_count(), 1);
    assert_eq!(first.id, second.id);
    assert!(second.last_seen >= first.last_seen);
}

#[tokio::test]
async fn test_links_for_unknown_domain_is_empty_success() {
    let response = helpers::test_app(helpers::memory_repo())
        .oneshot(helpers::get("/links?domain=nothing-here.example"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = helpers::json_body(response).await;
    assert_eq!(body, json!({ "success": true, "links": [] }));
}

#[tokio::test]
async fn test_crawled_links_are_queryable() {
    let server = MockServer::start().await;
    serve_html(&server, "/", SHOP_PAGE).await;

    let repo = helpers::memory_repo();
    helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(
            json!({ "url": format!("{}/", server.uri()) }),
        ))
        .await
        .unwrap();

    let response = helpers::test_app(repo)
        .oneshot(helpers::get("/links?domain=127.0.0.1"))
        .await
        .unwrap();
    let body: Value = helpers::json_body(response).await;

    let links = body["links"].as_array().unwrap();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0]["status"], "active");
    assert!(links[0]["lastSeen"].is_string());
    assert!(links[0]["createdAt"].is_string());
}

#[tokio::test]
async fn test_revalidation_marks_missing_pages_dead() {
    let server = MockServer::start().await;
    serve_status(&server, "/gone", 404).await;
    serve_status(&server, "/sale", 200).await;

    let earlier = Utc::now() - ChronoDuration::days(2);
    let repo = helpers::memory_repo();
    let gone_url = format!("{}/gone", server.uri());
    let sale_url = format!("{}/sale", server.uri());
    repo.insert(helpers::active_link(&gone_url, "127.0.0.1", earlier));
    repo.insert(helpers::active_link(&sale_url, "127.0.0.1", earlier));

    let scheduler = RevalidationScheduler::new(
        repo.clone(),
        helpers::http_fetcher(),
        SchedulerConfig::default(),
        CancellationToken::new(),
    );
    let before_run = Utc::now();
    let summary = scheduler.run_once().await.unwrap();

    assert_eq!(
        summary,
        RunSummary {
            checked: 2,
            alive: 1,
            dead: 1,
            update_failures: 0
        }
    );

    let gone = repo.find_by_url(&gone_url).await.unwrap().unwrap();
    assert_eq!(gone.status, LinkStatus::Dead);
    assert_eq!(gone.last_seen, Some(earlier));

    let sale = repo.find_by_url(&sale_url).await.unwrap().unwrap();
    assert_eq!(sale.status, LinkStatus::Active);
    assert!(sale.last_seen.unwrap() >= before_run);

    // Dead links are left out of later runs.
    let summary = scheduler.run_once().await.unwrap();
    assert_eq!(summary.checked, 1);
}

#[tokio::test]
async fn test_recrawl_revives_dead_link() {
    let server = MockServer::start().await;
    serve_html(&server, "/", SHOP_PAGE).await;

    let repo = helpers::memory_repo();
    let link_url = format!("{}/deals/shoes", server.uri());
    let mut dead = helpers::active_link(&link_url, "127.0.0.1", Utc::now());
    dead.status = LinkStatus::Dead;
    repo.insert(dead);

    helpers::test_app(repo.clone())
        .oneshot(helpers::scrape_request(
            json!({ "url": format!("{}/", server.uri()) }),
        ))
        .await
        .unwrap();

    let revived = repo.find_by_url(&link_url).await.unwrap().unwrap();
    assert_eq!(revived.status, LinkStatus::Active);
}
