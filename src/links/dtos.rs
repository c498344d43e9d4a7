use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::entities::Link;

/// Upper bound on links returned by one query.
pub const MAX_LINKS_PER_QUERY: i64 = 1000;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct LinksQuery {
    /// Bare hostname, e.g. `daraz.pk`.
    pub domain: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LinksResponse {
    pub success: bool,
    pub links: Vec<Link>,
}
