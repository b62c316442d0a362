//! Handlers for the `/scans` resource.
//!
//! Scan creation validates everything up front, persists the scan with
//! its fixed target set, and hands the id to the orchestrator; the
//! caller gets the `pending` scan back immediately and polls (or
//! subscribes) for status changes. Lifecycle guards (stop, delete,
//! compare) are enforced against the current database state.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use vigil_core::diff::{compare, ComparableResult, ScanDiff};
use vigil_core::error::CoreError;
use vigil_core::params::ScanParams;
use vigil_core::results::ScanSummary;
use vigil_core::roles::ROLE_ADMIN;
use vigil_core::scan::ScanType;
use vigil_core::types::{DbId, Timestamp};
use vigil_core::validate::{validate_name, validate_target_set};
use vigil_db::models::scan::{CreateScan, Scan, ScanListQuery, ScanResult, ScanTarget};
use vigil_db::models::status::ScanStatus;
use vigil_db::repositories::{EndpointRepo, ScanRepo, ScanResultRepo, ScanTargetRepo};
use vigil_events::ScanEvent;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::{DataResponse, ListResponse};
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// A scan row enriched with its human-readable status name.
#[derive(Debug, Serialize)]
pub struct ScanView {
    #[serde(flatten)]
    pub scan: Scan,
    pub status: &'static str,
}

impl From<Scan> for ScanView {
    fn from(scan: Scan) -> Self {
        let status = ScanStatus::from_id(scan.status_id)
            .map(ScanStatus::as_str)
            .unwrap_or("unknown");
        Self { scan, status }
    }
}

/// Scan plus its fixed target set (create / get responses).
#[derive(Debug, Serialize)]
pub struct ScanWithTargets {
    #[serde(flatten)]
    pub scan: ScanView,
    pub targets: Vec<ScanTarget>,
}

/// Scan plus targets and any results so far (get response).
#[derive(Debug, Serialize)]
pub struct ScanWithResults {
    #[serde(flatten)]
    pub scan: ScanView,
    pub targets: Vec<ScanTarget>,
    pub results: Vec<ScanResult>,
}

/// Identifying header for one side of a comparison.
#[derive(Debug, Serialize)]
pub struct ScanRef {
    pub id: DbId,
    pub name: String,
    #[serde(rename = "type")]
    pub scan_type: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
}

impl From<&Scan> for ScanRef {
    fn from(scan: &Scan) -> Self {
        Self {
            id: scan.id,
            name: scan.name.clone(),
            scan_type: scan.scan_type.clone(),
            started_at: scan.started_at,
            completed_at: scan.completed_at,
        }
    }
}

/// Full comparison response.
#[derive(Debug, Serialize)]
pub struct ScanComparison {
    pub scan_a: ScanRef,
    pub scan_b: ScanRef,
    pub diff: ScanDiff,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Fetch a scan by ID and verify the caller owns it (or is admin).
async fn find_and_authorize(
    pool: &sqlx::PgPool,
    scan_id: DbId,
    auth: &AuthUser,
    action: &str,
) -> AppResult<Scan> {
    let scan = ScanRepo::find_by_id(pool, scan_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Scan",
            id: scan_id,
        }))?;

    if scan.user_id != auth.user_id && auth.role != ROLE_ADMIN {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Cannot {action} another user's scan"
        ))));
    }

    Ok(scan)
}

/// Current status name for a scan row, for error messages.
fn status_name(scan: &Scan) -> &'static str {
    ScanStatus::from_id(scan.status_id)
        .map(ScanStatus::as_str)
        .unwrap_or("unknown")
}

/// Extract the comparable slice of each persisted result row.
fn to_comparable(results: &[ScanResult]) -> Vec<ComparableResult> {
    results
        .iter()
        .map(|r| {
            let summary: ScanSummary = r
                .raw_results
                .get("summary")
                .cloned()
                .and_then(|s| serde_json::from_value(s).ok())
                .unwrap_or_default();
            ComparableResult {
                endpoint_id: r.endpoint_id,
                open_ports: summary.open_ports,
                os_detection: r.os_detection.clone(),
                services: summary.services,
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// List
// ---------------------------------------------------------------------------

/// GET /api/v1/scans
///
/// List the caller's scans, newest first. Supports `status`, `type`,
/// `limit`, and `offset` query parameters.
pub async fn list_scans(
    auth: AuthUser,
    State(state): State<AppState>,
    Query(params): Query<ScanListQuery>,
) -> AppResult<impl IntoResponse> {
    // An unknown status name can never match anything; reject it so the
    // caller learns about the typo instead of getting an empty page.
    let status_id = match &params.status {
        Some(name) => Some(
            ScanStatus::from_name(name)
                .ok_or_else(|| {
                    AppError::Core(CoreError::Validation(format!(
                        "Unknown scan status \"{name}\""
                    )))
                })?
                .id(),
        ),
        None => None,
    };

    let scans = ScanRepo::list_by_owner(&state.pool, auth.user_id, status_id, &params).await?;
    let total = ScanRepo::count_by_owner(&state.pool, auth.user_id, status_id, &params).await?;

    Ok(Json(ListResponse {
        data: scans.into_iter().map(ScanView::from).collect(),
        total,
    }))
}

// ---------------------------------------------------------------------------
// Create
// ---------------------------------------------------------------------------

/// POST /api/v1/scans
///
/// Validate the request, create the scan with its fixed target set, and
/// start execution in the background. Returns 201 with the `pending`
/// scan and its targets; results arrive as execution progresses.
pub async fn create_scan(
    auth: AuthUser,
    State(state): State<AppState>,
    Json(input): Json<CreateScan>,
) -> AppResult<impl IntoResponse> {
    validate_name("Scan", &input.name).map_err(AppError::Core)?;
    let scan_type = ScanType::parse(&input.scan_type).map_err(AppError::Core)?;
    validate_target_set(&input.target_endpoints).map_err(AppError::Core)?;

    // Every requested target must exist and belong to the caller.
    let endpoints =
        EndpointRepo::find_owned_by_ids(&state.pool, auth.user_id, &input.target_endpoints)
            .await?;
    if endpoints.len() != input.target_endpoints.len() {
        let found: std::collections::HashSet<DbId> =
            endpoints.iter().map(|e| e.id).collect();
        let missing = input
            .target_endpoints
            .iter()
            .find(|id| !found.contains(*id))
            .copied()
            .unwrap_or_default();
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Endpoint",
            id: missing,
        }));
    }

    let raw_params = input.parameters.unwrap_or(serde_json::Value::Null);
    let params = ScanParams::normalize(scan_type, &raw_params);

    let (scan, targets) = ScanRepo::create_with_targets(
        &state.pool,
        auth.user_id,
        &input.name,
        scan_type.as_str(),
        &params.to_json(),
        &input.target_endpoints,
    )
    .await?;

    tracing::info!(
        scan_id = scan.id,
        scan_type = %scan_type,
        targets = targets.len(),
        user_id = auth.user_id,
        "Scan created",
    );

    state.orchestrator.spawn_run(scan.id);

    Ok((
        StatusCode::CREATED,
        Json(DataResponse {
            data: ScanWithTargets {
                scan: scan.into(),
                targets,
            },
        }),
    ))
}

// ---------------------------------------------------------------------------
// Get
// ---------------------------------------------------------------------------

/// GET /api/v1/scans/{id}
///
/// Current status, timestamps, targets, and any results so far.
pub async fn get_scan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scan = find_and_authorize(&state.pool, scan_id, &auth, "view").await?;
    let targets = ScanTargetRepo::list_by_scan(&state.pool, scan_id).await?;
    let results = ScanResultRepo::list_by_scan(&state.pool, scan_id).await?;

    Ok(Json(DataResponse {
        data: ScanWithResults {
            scan: scan.into(),
            targets,
            results,
        },
    }))
}

// ---------------------------------------------------------------------------
// Delete
// ---------------------------------------------------------------------------

/// DELETE /api/v1/scans/{id}
///
/// Removes the scan with its targets and results. Rejected with 409
/// while the scan is running. Returns 204 on success.
pub async fn delete_scan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scan = find_and_authorize(&state.pool, scan_id, &auth, "delete").await?;

    if scan.status_id == ScanStatus::Running.id() {
        return Err(AppError::Core(CoreError::Lifecycle(
            "Cannot delete a running scan".into(),
        )));
    }

    // The guard repeats inside the DELETE, so a scan that started
    // running between the read above and here is still protected.
    if !ScanRepo::delete_not_running(&state.pool, scan_id).await? {
        return Err(AppError::Core(CoreError::Lifecycle(
            "Cannot delete a running scan".into(),
        )));
    }

    tracing::info!(scan_id, user_id = auth.user_id, "Scan deleted");

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Stop
// ---------------------------------------------------------------------------

/// POST /api/v1/scans/{id}/stop
///
/// Stop a running scan. Targets already dispatched finish and keep
/// their results; pending targets are skipped. Rejected with 409 in any
/// other state.
pub async fn stop_scan(
    auth: AuthUser,
    State(state): State<AppState>,
    Path(scan_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let scan = find_and_authorize(&state.pool, scan_id, &auth, "stop").await?;

    let Some(stopped) = ScanRepo::stop_running(&state.pool, scan_id).await? else {
        return Err(AppError::Core(CoreError::Lifecycle(format!(
            "Cannot stop a scan with status: {}",
            status_name(&scan)
        ))));
    };

    state
        .event_bus
        .publish(ScanEvent::new("scan.stopped", scan_id));

    tracing::info!(scan_id, user_id = auth.user_id, "Scan stopped");

    Ok(Json(DataResponse {
        data: ScanView::from(stopped),
    }))
}

// ---------------------------------------------------------------------------
// Compare
// ---------------------------------------------------------------------------

/// GET /api/v1/scans/compare/{id_a}/{id_b}
///
/// Structural diff of two completed scans' results. Both scans must
/// belong to the caller and be in `completed` state; comparison never
/// mutates either scan.
pub async fn compare_scans(
    auth: AuthUser,
    State(state): State<AppState>,
    Path((scan_id_a, scan_id_b)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let scan_a = find_and_authorize(&state.pool, scan_id_a, &auth, "compare").await?;
    let scan_b = find_and_authorize(&state.pool, scan_id_b, &auth, "compare").await?;

    for scan in [&scan_a, &scan_b] {
        if scan.status_id != ScanStatus::Completed.id() {
            return Err(AppError::Core(CoreError::Lifecycle(format!(
                "Scan {} is not completed (status: {})",
                scan.id,
                status_name(scan)
            ))));
        }
    }

    let results_a = ScanResultRepo::list_by_scan(&state.pool, scan_id_a).await?;
    let results_b = ScanResultRepo::list_by_scan(&state.pool, scan_id_b).await?;

    let diff = compare(&to_comparable(&results_a), &to_comparable(&results_b));

    Ok(Json(DataResponse {
        data: ScanComparison {
            scan_a: ScanRef::from(&scan_a),
            scan_b: ScanRef::from(&scan_b),
            diff,
        },
    }))
}
