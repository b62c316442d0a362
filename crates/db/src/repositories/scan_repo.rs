//! Repository for the `scans` table.
//!
//! Every lifecycle transition is a guarded update: the `WHERE` clause
//! names the expected prior status, so a transition only happens from
//! the state it is legal in and concurrent writers cannot race each
//! other into a torn state. Callers inspect the returned row /
//! `rows_affected` to learn whether the transition applied.

use sqlx::PgPool;
use vigil_core::types::DbId;

use crate::models::scan::{Scan, ScanListQuery, ScanTarget};
use crate::models::status::{ScanStatus, StatusId};

/// Column list for `scans` queries.
const COLUMNS: &str = "id, user_id, name, scan_type, parameters, status_id, \
    scheduled_at, started_at, completed_at, created_at";

/// Maximum page size for scan listing.
const MAX_LIMIT: i64 = 100;

/// Default page size for scan listing.
const DEFAULT_LIMIT: i64 = 50;

/// Provides CRUD operations and lifecycle transitions for scans.
pub struct ScanRepo;

impl ScanRepo {
    /// Create a pending scan together with its fixed target set, in one
    /// transaction, so a scan is never visible without its targets.
    pub async fn create_with_targets(
        pool: &PgPool,
        user_id: DbId,
        name: &str,
        scan_type: &str,
        parameters: &serde_json::Value,
        endpoint_ids: &[DbId],
    ) -> Result<(Scan, Vec<ScanTarget>), sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO scans (user_id, name, scan_type, parameters, status_id)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let scan = sqlx::query_as::<_, Scan>(&query)
            .bind(user_id)
            .bind(name)
            .bind(scan_type)
            .bind(parameters)
            .bind(ScanStatus::Pending.id())
            .fetch_one(&mut *tx)
            .await?;

        let mut targets = Vec::with_capacity(endpoint_ids.len());
        for endpoint_id in endpoint_ids {
            let target = sqlx::query_as::<_, ScanTarget>(
                "INSERT INTO scan_targets (scan_id, endpoint_id)
                 VALUES ($1, $2)
                 RETURNING id, scan_id, endpoint_id",
            )
            .bind(scan.id)
            .bind(endpoint_id)
            .fetch_one(&mut *tx)
            .await?;
            targets.push(target);
        }

        tx.commit().await?;
        Ok((scan, targets))
    }

    /// Find a scan by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM scans WHERE id = $1");
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Read only the current status of a scan.
    ///
    /// Used by in-flight workers to honour a stop request before
    /// dispatching the next target.
    pub async fn status_id(pool: &PgPool, id: DbId) -> Result<Option<StatusId>, sqlx::Error> {
        let row: Option<(StatusId,)> =
            sqlx::query_as("SELECT status_id FROM scans WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await?;
        Ok(row.map(|r| r.0))
    }

    /// Transition `pending -> running`, setting `started_at`.
    ///
    /// Returns the updated row, or `None` if the scan was not in
    /// `pending` (already started, stopped, or deleted).
    pub async fn mark_running(pool: &PgPool, id: DbId) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "UPDATE scans
             SET status_id = $2, started_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .bind(ScanStatus::Running.id())
            .bind(ScanStatus::Pending.id())
            .fetch_optional(pool)
            .await
    }

    /// Transition `running -> {completed, failed}`, setting `completed_at`.
    ///
    /// Returns `false` when the scan was no longer `running` (e.g. it
    /// was stopped meanwhile); terminal states are never overwritten.
    pub async fn finish(
        pool: &PgPool,
        id: DbId,
        terminal: ScanStatus,
    ) -> Result<bool, sqlx::Error> {
        debug_assert!(terminal.is_terminal());
        let result = sqlx::query(
            "UPDATE scans
             SET status_id = $2, completed_at = NOW()
             WHERE id = $1 AND status_id = $3",
        )
        .bind(id)
        .bind(terminal.id())
        .bind(ScanStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Transition `running -> stopped`, setting `completed_at`.
    ///
    /// Returns the updated row, or `None` if the scan was not running;
    /// stop is only legal from `running`.
    pub async fn stop_running(pool: &PgPool, id: DbId) -> Result<Option<Scan>, sqlx::Error> {
        let query = format!(
            "UPDATE scans
             SET status_id = $2, completed_at = NOW()
             WHERE id = $1 AND status_id = $3
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Scan>(&query)
            .bind(id)
            .bind(ScanStatus::Stopped.id())
            .bind(ScanStatus::Running.id())
            .fetch_optional(pool)
            .await
    }

    /// Fail every scan still marked `running`, setting `completed_at`.
    ///
    /// Called once at startup: a scan that was mid-flight when the
    /// previous process died has lost its orchestration task and would
    /// otherwise dangle in `running` forever.
    pub async fn fail_interrupted(pool: &PgPool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE scans
             SET status_id = $1, completed_at = NOW()
             WHERE status_id = $2",
        )
        .bind(ScanStatus::Failed.id())
        .bind(ScanStatus::Running.id())
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Delete a scan unless it is running. Targets and results are
    /// removed by cascade. Returns `true` if a row was deleted.
    pub async fn delete_not_running(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM scans WHERE id = $1 AND status_id <> $2")
            .bind(id)
            .bind(ScanStatus::Running.id())
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// List scans owned by `user_id` with optional status/type filters,
    /// newest first.
    pub async fn list_by_owner(
        pool: &PgPool,
        user_id: DbId,
        status_id: Option<StatusId>,
        params: &ScanListQuery,
    ) -> Result<Vec<Scan>, sqlx::Error> {
        let limit = params.limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        let offset = params.offset.unwrap_or(0).max(0);

        // Build the WHERE clause and track the next bind parameter index.
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.scan_type.is_some() {
            conditions.push(format!("scan_type = ${bind_idx}"));
            bind_idx += 1;
        }

        let query = format!(
            "SELECT {COLUMNS} FROM scans
             WHERE {}
             ORDER BY created_at DESC
             LIMIT ${bind_idx} OFFSET ${}",
            conditions.join(" AND "),
            bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Scan>(&query).bind(user_id);
        if let Some(sid) = status_id {
            q = q.bind(sid);
        }
        if let Some(scan_type) = &params.scan_type {
            q = q.bind(scan_type);
        }
        q.bind(limit).bind(offset).fetch_all(pool).await
    }

    /// Count scans owned by `user_id` under the same filters as
    /// [`list_by_owner`](Self::list_by_owner).
    pub async fn count_by_owner(
        pool: &PgPool,
        user_id: DbId,
        status_id: Option<StatusId>,
        params: &ScanListQuery,
    ) -> Result<i64, sqlx::Error> {
        let mut conditions = vec!["user_id = $1".to_string()];
        let mut bind_idx: u32 = 2;

        if status_id.is_some() {
            conditions.push(format!("status_id = ${bind_idx}"));
            bind_idx += 1;
        }
        if params.scan_type.is_some() {
            conditions.push(format!("scan_type = ${bind_idx}"));
        }

        let query = format!(
            "SELECT COUNT(*) FROM scans WHERE {}",
            conditions.join(" AND ")
        );

        let mut q = sqlx::query_as::<_, (i64,)>(&query).bind(user_id);
        if let Some(sid) = status_id {
            q = q.bind(sid);
        }
        if let Some(scan_type) = &params.scan_type {
            q = q.bind(scan_type);
        }
        let row = q.fetch_one(pool).await?;
        Ok(row.0)
    }
}
