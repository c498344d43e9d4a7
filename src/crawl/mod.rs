pub mod crawler;
pub mod dtos;
pub mod errors;
pub mod handlers;

pub use crawler::{CrawlOutcome, Crawler};
pub use errors::CrawlError;
