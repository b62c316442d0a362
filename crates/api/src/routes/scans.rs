//! Route definitions for the `/scans` resource.
//!
//! All endpoints require authentication.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::scans;
use crate::state::AppState;

/// Routes mounted at `/scans`.
///
/// ```text
/// GET    /                         -> list_scans
/// POST   /                         -> create_scan
/// GET    /compare/{id_a}/{id_b}    -> compare_scans
/// GET    /{id}                     -> get_scan
/// DELETE /{id}                     -> delete_scan
/// POST   /{id}/stop                -> stop_scan
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(scans::list_scans).post(scans::create_scan))
        .route("/compare/{id_a}/{id_b}", get(scans::compare_scans))
        .route("/{id}", get(scans::get_scan).delete(scans::delete_scan))
        .route("/{id}/stop", post(scans::stop_scan))
}
