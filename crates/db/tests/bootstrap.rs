//! Schema bootstrap tests: connect, migrate, verify seed data.

use sqlx::PgPool;
use vigil_db::models::status::ScanStatus;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_full_bootstrap(pool: PgPool) {
    vigil_db::health_check(&pool).await.unwrap();

    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM scan_statuses")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(count.0, 5, "scan_statuses should have exactly 5 seed rows");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_status_seed_matches_enum(pool: PgPool) {
    for status in [
        ScanStatus::Pending,
        ScanStatus::Running,
        ScanStatus::Completed,
        ScanStatus::Failed,
        ScanStatus::Stopped,
    ] {
        let row: (String,) = sqlx::query_as("SELECT name FROM scan_statuses WHERE id = $1")
            .bind(status.id())
            .fetch_one(&pool)
            .await
            .unwrap_or_else(|e| panic!("status id {} missing: {e}", status.id()));
        assert_eq!(row.0, status.as_str());
    }
}
