use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    response::{IntoResponse, Response},
};
use tracing::{error, warn};

use crate::{
    app_state::AppState,
    crawl::{
        dtos::{ErrorResponse, ScrapeRequest, ScrapeResponse},
        errors::CrawlError,
    },
};

#[utoipa::path(
    post,
    path = "/scrape",
    tag = "crawl",
    request_body = ScrapeRequest,
    responses(
        (status = 200, description = "Page crawled; matching links returned", body = ScrapeResponse),
        (status = 400, description = "Missing or invalid url", body = ErrorResponse),
        (status = 500, description = "Fetch or store failure", body = ErrorResponse)
    )
)]
pub async fn scrape(
    State(state): State<AppState>,
    payload: Result<Json<ScrapeRequest>, JsonRejection>,
) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => {
            return CrawlError::InvalidInput(rejection.body_text()).into_response();
        }
    };

    match state
        .crawler
        .crawl(payload.url.as_deref(), payload.tags.as_deref())
        .await
    {
        Ok(outcome) => Json(ScrapeResponse {
            success: true,
            domain: outcome.domain,
            links: outcome.links,
        })
        .into_response(),
        Err(e @ CrawlError::InvalidInput(_)) => {
            warn!(error = %e, "rejected scrape request");
            e.into_response()
        }
        Err(e) => {
            error!(
                error = %e,
                timeout = e.is_timeout(),
                url = ?payload.url,
                "scrape failed"
            );
            e.into_response()
        }
    }
}
