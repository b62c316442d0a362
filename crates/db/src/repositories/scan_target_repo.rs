//! Repository for the `scan_targets` table.
//!
//! Targets are inserted inside `ScanRepo::create_with_targets`; this
//! repository only reads them back.

use sqlx::PgPool;
use vigil_core::types::DbId;

use crate::models::scan::ScanTarget;

/// Provides read access to scan targets.
pub struct ScanTargetRepo;

impl ScanTargetRepo {
    /// List all targets for a scan, in insertion order.
    pub async fn list_by_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Vec<ScanTarget>, sqlx::Error> {
        sqlx::query_as::<_, ScanTarget>(
            "SELECT id, scan_id, endpoint_id FROM scan_targets
             WHERE scan_id = $1
             ORDER BY id ASC",
        )
        .bind(scan_id)
        .fetch_all(pool)
        .await
    }
}
