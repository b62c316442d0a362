//! Repository for the `endpoints` table.

use sqlx::PgPool;
use vigil_core::types::DbId;

use crate::models::endpoint::{CreateEndpoint, Endpoint, EndpointListQuery, UpdateEndpoint};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str =
    "id, user_id, name, address, description, is_active, created_at, updated_at";

/// Maximum page size for endpoint listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for endpoint listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations for endpoints.
pub struct EndpointRepo;

impl EndpointRepo {
    /// Insert a new endpoint owned by `user_id`, returning the created row.
    pub async fn create(
        pool: &PgPool,
        user_id: DbId,
        input: &CreateEndpoint,
    ) -> Result<Endpoint, sqlx::Error> {
        let query = format!(
            "INSERT INTO endpoints (user_id, name, address, description)
             VALUES ($1, $2, $3, $4)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Endpoint>(&query)
            .bind(user_id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .fetch_one(pool)
            .await
    }

    /// Find an endpoint by its internal ID.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Endpoint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM endpoints WHERE id = $1");
        sqlx::query_as::<_, Endpoint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch the subset of `ids` owned by `user_id`.
    ///
    /// Used by scan creation to verify every requested target exists and
    /// belongs to the caller, and by the orchestrator to resolve target
    /// addresses.
    pub async fn find_owned_by_ids(
        pool: &PgPool,
        user_id: DbId,
        ids: &[DbId],
    ) -> Result<Vec<Endpoint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM endpoints
             WHERE user_id = $1 AND id = ANY($2)
             ORDER BY id ASC"
        );
        sqlx::query_as::<_, Endpoint>(&query)
            .bind(user_id)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List endpoints owned by `user_id`, newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: DbId,
        params: &EndpointListQuery,
    ) -> Result<Vec<Endpoint>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        let query = format!(
            "SELECT {COLUMNS} FROM endpoints
             WHERE user_id = $1
             ORDER BY created_at DESC
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Endpoint>(&query)
            .bind(user_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Count endpoints owned by `user_id`.
    pub async fn count_by_owner(pool: &PgPool, user_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM endpoints WHERE user_id = $1")
            .bind(user_id)
            .fetch_one(pool)
            .await?;
        Ok(row.0)
    }

    /// Update an endpoint. Only non-`None` fields in `input` are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateEndpoint,
    ) -> Result<Option<Endpoint>, sqlx::Error> {
        let query = format!(
            "UPDATE endpoints SET
                name = COALESCE($2, name),
                address = COALESCE($3, address),
                description = COALESCE($4, description),
                is_active = COALESCE($5, is_active),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Endpoint>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.address)
            .bind(&input.description)
            .bind(input.is_active)
            .fetch_optional(pool)
            .await
    }

    /// Delete an endpoint by ID. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM endpoints WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
