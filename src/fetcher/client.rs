use async_trait::async_trait;
use reqwest::{Client, ClientBuilder, StatusCode, header};
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

use crate::fetcher::{errors::FetchError, pipeline::process_response, types::PageResponse};

const MAX_BODY_SIZE: u64 = 5 * 1024 * 1024; // 5MB
const PAGE_MAX_REDIRECTS: usize = 10;
pub const USER_AGENT: &str = "Mozilla/5.0 (compatible; SaleAlertBot/1.0)";

/// Timeouts and identity for the two request profiles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetcherConfig {
    pub page_timeout: Duration,
    pub probe_timeout: Duration,
    pub probe_max_redirects: usize,
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            page_timeout: Duration::from_secs(20),
            probe_timeout: Duration::from_secs(15),
            probe_max_redirects: 3,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

/// Any `text/*` body is parsed for anchors, as is XHTML.
fn is_textual(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or_default()
        .trim()
        .to_ascii_lowercase();
    mime.starts_with("text/") || mime == "application/xhtml+xml"
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Download a page with a textual body. Any non-2xx status is an error.
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError>;

    /// Request `url` and report the final status code without reading the
    /// body. Only transport failures are errors here.
    async fn probe(&self, url: &str) -> Result<StatusCode, FetchError>;
}

/// reqwest-backed fetcher holding one client per profile.
#[derive(Clone)]
pub struct HttpFetcher {
    page_client: Client,
    probe_client: Client,
}

impl HttpFetcher {
    pub fn new(config: &FetcherConfig) -> Result<Self, reqwest::Error> {
        let mut headers = header::HeaderMap::new();
        headers.insert(
            header::ACCEPT,
            header::HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );

        let page_client = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(10).min(config.page_timeout))
            .timeout(config.page_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(PAGE_MAX_REDIRECTS))
            .default_headers(headers)
            .build()?;

        let probe_client = ClientBuilder::new()
            .timeout(config.probe_timeout)
            .user_agent(config.user_agent.as_str())
            .redirect(reqwest::redirect::Policy::limited(
                config.probe_max_redirects,
            ))
            .build()?;

        Ok(Self {
            page_client,
            probe_client,
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    #[instrument(skip_all, fields(url = %url))]
    async fn fetch_page(&self, url: &str) -> Result<PageResponse, FetchError> {
        let parsed_url = Url::parse(url)?;

        let response = self
            .page_client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        // Check content length before downloading
        if let Some(content_length) = response.content_length() {
            if content_length > MAX_BODY_SIZE {
                return Err(FetchError::BodyTooLarge(content_length));
            }
        }

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Http { status });
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|ct| ct.to_str().ok())
            .unwrap_or("text/html")
            .to_string();

        if !is_textual(&content_type) {
            return Err(FetchError::UnsupportedContentType(content_type));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Io(e.to_string()))?;

        // Content-Length can be missing or wrong
        if body.len() as u64 > MAX_BODY_SIZE {
            return Err(FetchError::BodyTooLarge(body.len() as u64));
        }

        let page = process_response(final_url, status, &content_type, body);
        debug!(
            status = %page.status,
            charset = page.charset,
            bytes = page.body_raw.len(),
            "fetched page"
        );
        Ok(page)
    }

    #[instrument(skip_all, fields(url = %url))]
    async fn probe(&self, url: &str) -> Result<StatusCode, FetchError> {
        let parsed_url = Url::parse(url)?;

        let response = self
            .probe_client
            .get(parsed_url)
            .send()
            .await
            .map_err(FetchError::from_reqwest_error)?;

        Ok(response.status())
    }
}
