//! Repository for the `scan_results` table.

use sqlx::PgPool;
use vigil_core::types::DbId;

use crate::models::scan::{CreateScanResult, ScanResult};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, scan_id, endpoint_id, raw_results, open_ports, \
    vulnerabilities, os_detection, created_at";

/// Provides CRUD operations for scan results.
pub struct ScanResultRepo;

impl ScanResultRepo {
    /// Insert one result row. Results are immutable once written.
    pub async fn create(
        pool: &PgPool,
        input: &CreateScanResult,
    ) -> Result<ScanResult, sqlx::Error> {
        let query = format!(
            "INSERT INTO scan_results
                (scan_id, endpoint_id, raw_results, open_ports, vulnerabilities, os_detection)
             VALUES ($1, $2, $3, $4, $5, $6)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, ScanResult>(&query)
            .bind(input.scan_id)
            .bind(input.endpoint_id)
            .bind(&input.raw_results)
            .bind(input.open_ports)
            .bind(input.vulnerabilities)
            .bind(&input.os_detection)
            .fetch_one(pool)
            .await
    }

    /// List all results for a scan, in creation order.
    pub async fn list_by_scan(
        pool: &PgPool,
        scan_id: DbId,
    ) -> Result<Vec<ScanResult>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM scan_results
             WHERE scan_id = $1
             ORDER BY created_at ASC, id ASC"
        );
        sqlx::query_as::<_, ScanResult>(&query)
            .bind(scan_id)
            .fetch_all(pool)
            .await
    }

    /// Count results for a scan.
    pub async fn count_by_scan(pool: &PgPool, scan_id: DbId) -> Result<i64, sqlx::Error> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM scan_results WHERE scan_id = $1")
                .bind(scan_id)
                .fetch_one(pool)
                .await?;
        Ok(row.0)
    }
}
