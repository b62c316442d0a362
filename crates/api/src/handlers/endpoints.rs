//! Handlers for the `/endpoints` resource.
//!
//! All endpoints require authentication via [`AuthUser`]. Admin users
//! can access any endpoint; regular users see only their own.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use vigil_core::error::CoreError;
use vigil_core::net::is_scannable_address;
use vigil_core::roles::ROLE_ADMIN;
use vigil_core::types::DbId;
use vigil_core::validate::validate_name;
use vigil_db::models::endpoint::{
    CreateEndpoint, Endpoint, EndpointListQuery, UpdateEndpoint,
};
use vigil_db::repositories::EndpointRepo;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch an endpoint by ID and verify the caller owns it (or is admin).
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    endpoint_id: DbId,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Endpoint> {
    let endpoint = EndpointRepo::find_by_id(pool, endpoint_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Endpoint",
            id: endpoint_id,
        }))?;

    if endpoint.user_id != auth.user_id && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another user's endpoint"
        ))));
    }

    Ok(endpoint)
}

/// Reject addresses that could never be handed to the scanner.
fn validate_address(address: &str) -> AppResult<()> {
    if !is_scannable_address(address) {
        return Err(AppError::Core(CoreError::Validation(format!(
            "\"{address}\" is not a valid IP address or hostname"
        ))));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/endpoints
///
/// List the caller's endpoints, newest first.
pub async fn list_endpoints(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<EndpointListQuery>,
) -> AppResult<impl IntoResponse> {
    let endpoints = EndpointRepo::list_by_owner(&state.pool, auth.user_id, &params).await?;
    let total = EndpointRepo::count_by_owner(&state.pool, auth.user_id).await?;

    Ok(Json(ListResponse {
        data: endpoints,
        total,
    }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/endpoints
///
/// Register an endpoint. The address must be a valid IP literal or
/// hostname. Returns 201 with the created endpoint.
pub async fn create_endpoint(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateEndpoint>,
) -> AppResult<impl IntoResponse> {
    validate_name("Endpoint", &input.name).map_err(AppError::Core)?;
    validate_address(&input.address)?;

    let endpoint = EndpointRepo::create(&state.pool, auth.user_id, &input).await?;

    tracing::info!(
        endpoint_id = endpoint.id,
        user_id = auth.user_id,
        address = %endpoint.address,
        "Endpoint created",
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: endpoint })))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/endpoints/{id}
pub async fn get_endpoint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(endpoint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let endpoint = find_and_authorize(&state.pool, endpoint_id, &auth, "view").await?;
    Ok(Json(DataResponse { data: endpoint }))
}

// ---------------------------------------------------------------------------
// Update
// ---------------------------------------------------------------------------

/// PUT /api/v1/endpoints/{id}
///
/// Partial update; only provided fields are applied.
pub async fn update_endpoint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(endpoint_id): Path<DbId>,
    Json(input): Json<UpdateEndpoint>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, endpoint_id, &auth, "update").await?;

    if let Some(name) = &input.name {
        validate_name("Endpoint", name).map_err(AppError::Core)?;
    }
    if let Some(address) = &input.address {
        validate_address(address)?;
    }

    let updated = EndpointRepo::update(&state.pool, endpoint_id, &input)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Endpoint",
            id: endpoint_id,
        }))?;

    Ok(Json(DataResponse { data: updated }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/endpoints/{id}
///
/// Returns 204 on success.
pub async fn delete_endpoint(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(endpoint_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    find_and_authorize(&state.pool, endpoint_id, &auth, "delete").await?;

    EndpointRepo::delete(&state.pool, endpoint_id).await?;

    tracing::info!(endpoint_id, user_id = auth.user_id, "Endpoint deleted");

    Ok(StatusCode::NO_CONTENT)
}
