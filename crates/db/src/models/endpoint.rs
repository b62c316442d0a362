//! Endpoint entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `endpoints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Endpoint {
    pub id: DbId,
    pub user_id: DbId,
    pub name: String,
    /// IP literal or hostname. Syntax is validated at creation.
    pub address: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for `POST /api/v1/endpoints`.
#[derive(Debug, Deserialize)]
pub struct CreateEndpoint {
    pub name: String,
    pub address: String,
    pub description: Option<String>,
}

/// DTO for `PUT /api/v1/endpoints/{id}`. Only non-`None` fields are
/// applied.
#[derive(Debug, Deserialize)]
pub struct UpdateEndpoint {
    pub name: Option<String>,
    pub address: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<bool>,
}

/// Query parameters for `GET /api/v1/endpoints`.
#[derive(Debug, Deserialize)]
pub struct EndpointListQuery {
    /// Maximum number of results. Defaults to 50, capped at 100.
    pub limit: Option<i64>,
    /// Number of results to skip. Defaults to 0.
    pub offset: Option<i64>,
}
