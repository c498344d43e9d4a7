pub mod client;
pub mod errors;
pub mod pipeline;
pub mod types;

#[cfg(test)]
pub use client::MockPageFetcher;
pub use client::{FetcherConfig, HttpFetcher, PageFetcher, USER_AGENT};
pub use errors::FetchError;
pub use types::PageResponse;
