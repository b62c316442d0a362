pub mod endpoints;
pub mod health;
pub mod scans;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /endpoints                       list, create
/// /endpoints/{id}                  get, update, delete
///
/// /scans                           list, create
/// /scans/{id}                      get, delete
/// /scans/{id}/stop                 stop a running scan
/// /scans/compare/{id_a}/{id_b}     diff two completed scans
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/endpoints", endpoints::router())
        .nest("/scans", scans::router())
}
