pub mod app_state;
pub mod config;
pub mod crawl;
pub mod discovery;
pub mod entities;
pub mod fetcher;
pub mod health;
pub mod links;
pub mod logging;
pub mod repositories;
pub mod revalidate;
pub mod router;
pub mod shutdown;
