use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// --- PostgreSQL Enums ---
#[derive(
    sqlx::Type, Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema,
)]
#[sqlx(type_name = "link_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    #[default]
    Active,
    Dead,
}

/// --- Tables ---

/// A discovered URL and the bare hostname of the site it was found on.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Link {
    pub id: Uuid,
    pub url: String,    // unique
    pub domain: String, // set on insert, never re-derived
    pub title: Option<String>,
    pub last_seen: Option<DateTime<Utc>>,
    pub status: LinkStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Site {
    pub domain: String,
    pub last_crawled: Option<DateTime<Utc>>,
    pub meta: Option<serde_json::Value>, // opaque, never interpreted
}
