//! User entity model.
//!
//! Identity issuance lives outside this service; users exist here as
//! the ownership anchor for endpoints and scans.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use vigil_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for inserting a user (provisioning and test fixtures).
#[derive(Debug, Deserialize)]
pub struct CreateUser {
    pub email: String,
    pub display_name: Option<String>,
    /// Defaults to `"user"` when omitted.
    pub role: Option<String>,
}
