//! Link discovery: hostname normalization, same-domain anchor extraction and
//! keyword filtering. Everything here is pure and synchronous; the crawl
//! orchestrator composes it with fetching and persistence.

pub mod domain;
pub mod extract;
pub mod keywords;

pub use domain::{normalize_domain, strip_www};
pub use extract::extract_internal_links;
pub use keywords::{DEFAULT_KEYWORDS, filter_links_by_keywords};
