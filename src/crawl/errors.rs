use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::crawl::dtos::ErrorResponse;
use crate::fetcher::FetchError;

#[derive(Debug, Error)]
pub enum CrawlError {
    /// Missing or unparseable url. Never retried.
    #[error("{0}")]
    InvalidInput(String),

    /// The seed page could not be fetched; nothing was stored.
    #[error("fetch failed: {0}")]
    Fetch(#[from] FetchError),

    /// The site record could not be written.
    #[error("store error: {0}")]
    Store(anyhow::Error),
}

impl CrawlError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CrawlError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            CrawlError::Fetch(_) | CrawlError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// The seed page did not answer in time.
    pub fn is_timeout(&self) -> bool {
        matches!(self, CrawlError::Fetch(e) if e.is_timeout())
    }
}

impl IntoResponse for CrawlError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}
