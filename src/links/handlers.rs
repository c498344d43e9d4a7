use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::{
    app_state::AppState,
    crawl::dtos::ErrorResponse,
    links::dtos::{LinksQuery, LinksResponse, MAX_LINKS_PER_QUERY},
};

#[utoipa::path(
    get,
    path = "/links",
    tag = "links",
    params(LinksQuery),
    responses(
        (status = 200, description = "Active links for the domain, most recently updated first", body = LinksResponse),
        (status = 400, description = "Missing domain", body = ErrorResponse),
        (status = 500, description = "Store failure", body = ErrorResponse)
    )
)]
pub async fn list_links(State(state): State<AppState>, Query(query): Query<LinksQuery>) -> Response {
    let Some(domain) = query
        .domain
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
    else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("domain required")),
        )
            .into_response();
    };

    match state
        .link_repo
        .links_for_domain(domain, MAX_LINKS_PER_QUERY)
        .await
    {
        Ok(links) => Json(LinksResponse {
            success: true,
            links,
        })
        .into_response(),
        Err(e) => {
            error!(error = %e, domain, "failed to load links");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse::new("Database error")),
            )
                .into_response()
        }
    }
}
