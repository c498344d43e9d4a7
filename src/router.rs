use axum::{
    Json, Router,
    http::{HeaderValue, Method, header},
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::warn;
use utoipa::OpenApi;

use crate::{
    app_state::AppState,
    config::AllowedOrigins,
    crawl::{self, dtos::ErrorResponse},
    entities::{Link, LinkStatus},
    health, links,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "sale-alert",
        description = "Discovers promotional links on a site and keeps track of which still resolve."
    ),
    paths(
        crawl::handlers::scrape,
        links::handlers::list_links,
        health::health_check,
    ),
    components(schemas(
        crawl::dtos::ScrapeRequest,
        crawl::dtos::ScrapeResponse,
        ErrorResponse,
        links::dtos::LinksResponse,
        Link,
        LinkStatus,
        health::HealthResponse,
    )),
    tags(
        (name = "crawl", description = "Trigger a crawl of one page"),
        (name = "links", description = "Query stored links"),
        (name = "health", description = "Liveness of the service and its store")
    )
)]
pub struct ApiDoc;

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

fn cors_layer(origins: &AllowedOrigins) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    match origins {
        AllowedOrigins::Any => cors.allow_origin(Any),
        AllowedOrigins::List(list) => {
            let values: Vec<HeaderValue> = list
                .iter()
                .filter_map(|origin| match HeaderValue::from_str(origin) {
                    Ok(value) => Some(value),
                    Err(_) => {
                        warn!(origin = %origin, "ignoring unusable CORS origin");
                        None
                    }
                })
                .collect();
            cors.allow_origin(AllowOrigin::list(values))
        }
    }
}

/// Every HTTP route of the service, with request ids, tracing and CORS.
pub fn build_router(state: AppState, origins: &AllowedOrigins) -> Router {
    Router::new()
        .route("/scrape", post(crawl::handlers::scrape))
        .route("/links", get(links::handlers::list_links))
        .route("/healthz", get(health::health_check))
        .route("/api-docs/openapi.json", get(openapi_json))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                .layer(TraceLayer::new_for_http())
                .layer(PropagateRequestIdLayer::x_request_id())
                .layer(cors_layer(origins)),
        )
}
