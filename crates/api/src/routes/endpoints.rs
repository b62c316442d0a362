//! Route definitions for the `/endpoints` resource.
//!
//! All endpoints require authentication.

use axum::routing::get;
use axum::Router;

use crate::handlers::endpoints;
use crate::state::AppState;

/// Routes mounted at `/endpoints`.
///
/// ```text
/// GET    /         -> list_endpoints
/// POST   /         -> create_endpoint
/// GET    /{id}     -> get_endpoint
/// PUT    /{id}     -> update_endpoint
/// DELETE /{id}     -> delete_endpoint
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(endpoints::list_endpoints).post(endpoints::create_endpoint),
        )
        .route(
            "/{id}",
            get(endpoints::get_endpoint)
                .put(endpoints::update_endpoint)
                .delete(endpoints::delete_endpoint),
        )
}
