use std::sync::Arc;

use crate::config::ServerConfig;
use crate::orchestrator::ScanOrchestrator;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub pool: vigil_db::DbPool,
    /// Server configuration (accessed by middleware and handlers).
    pub config: Arc<ServerConfig>,
    /// Centralized event bus for scan lifecycle events.
    pub event_bus: Arc<vigil_events::EventBus>,
    /// Background scan execution service.
    pub orchestrator: Arc<ScanOrchestrator>,
}
