//! Central scan orchestration service.
//!
//! Owns a scan's lifecycle from the moment the create handler returns:
//! status transitions, target resolution, fan-out of per-target probes,
//! result persistence, and terminal-state bookkeeping. Held in
//! [`AppState`](crate::state::AppState) as an `Arc<ScanOrchestrator>`.
//!
//! Every status transition goes through the guarded updates in
//! `ScanRepo`, so a concurrent stop request and the orchestrator can
//! never write conflicting states.

use std::sync::Arc;
use std::time::Duration;

use sqlx::PgPool;
use tokio::sync::{mpsc, Semaphore};

use vigil_core::command::build_args;
use vigil_core::net::is_scannable_address;
use vigil_core::params::ScanParams;
use vigil_core::results::normalize_report;
use vigil_core::scan::ScanType;
use vigil_core::scanning::ScanRunner;
use vigil_core::types::DbId;
use vigil_db::models::scan::CreateScanResult;
use vigil_db::models::status::ScanStatus;
use vigil_db::repositories::{EndpointRepo, ScanRepo, ScanResultRepo, ScanTargetRepo};
use vigil_events::{EventBus, ScanEvent};

/// Outcome of one target's execution, reported back to the
/// orchestrating task over the aggregation channel.
#[derive(Debug)]
enum TargetOutcome {
    /// Executor and normalizer succeeded; one result row was written.
    Completed { endpoint_id: DbId },
    /// Execution failed; the cause was recorded, no result row exists.
    Failed { endpoint_id: DbId, cause: String },
    /// The scan was no longer running when this target came up for
    /// dispatch (cooperative stop).
    Skipped { endpoint_id: DbId },
}

/// Orchestrates background scan execution.
///
/// Drives the full lifecycle:
/// 1. Transition the scan `pending -> running`.
/// 2. Resolve the target set to scannable addresses.
/// 3. Fan per-target probes out across a bounded worker pool.
/// 4. Persist one result row per successful target.
/// 5. Transition to a terminal state once every target was attempted.
pub struct ScanOrchestrator {
    pool: PgPool,
    runner: Arc<dyn ScanRunner>,
    event_bus: Arc<EventBus>,
    /// Maximum concurrent target probes per scan.
    concurrency: usize,
}

impl ScanOrchestrator {
    pub fn new(
        pool: PgPool,
        runner: Arc<dyn ScanRunner>,
        event_bus: Arc<EventBus>,
        concurrency: usize,
    ) -> Self {
        Self {
            pool,
            runner,
            event_bus,
            concurrency: concurrency.max(1),
        }
    }

    /// Launch a scan run as a detached background task and return
    /// immediately.
    ///
    /// The run is supervised: if it returns an error or panics, the
    /// scan is driven to `failed` with `completed_at` set, so no scan
    /// is ever left dangling in `running`.
    pub fn spawn_run(self: &Arc<Self>, scan_id: DbId) {
        let orchestrator = Arc::clone(self);
        tokio::spawn(async move {
            let run = tokio::spawn({
                let orchestrator = Arc::clone(&orchestrator);
                async move { orchestrator.run(scan_id).await }
            });

            match run.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    tracing::error!(scan_id, error = %e, "Scan run failed");
                    orchestrator.mark_failed(scan_id).await;
                }
                Err(join_err) => {
                    tracing::error!(scan_id, error = %join_err, "Scan run panicked");
                    orchestrator.mark_failed(scan_id).await;
                }
            }
        });
    }

    /// Drive one scan from `pending` to a terminal state.
    async fn run(&self, scan_id: DbId) -> Result<(), sqlx::Error> {
        // 1. Claim the scan. A miss means it is no longer pending
        //    (stopped before start, deleted, or double-dispatched).
        let Some(scan) = ScanRepo::mark_running(&self.pool, scan_id).await? else {
            tracing::warn!(scan_id, "Scan is not pending; skipping run");
            return Ok(());
        };

        self.event_bus.publish(ScanEvent::new("scan.started", scan_id));

        // 2. Resolve the target set to scannable addresses.
        let targets = ScanTargetRepo::list_by_scan(&self.pool, scan_id).await?;
        let endpoint_ids: Vec<DbId> = targets.iter().map(|t| t.endpoint_id).collect();
        let endpoints =
            EndpointRepo::find_owned_by_ids(&self.pool, scan.user_id, &endpoint_ids).await?;

        let resolved: Vec<(DbId, String)> = endpoints
            .into_iter()
            .filter(|e| {
                let ok = is_scannable_address(&e.address);
                if !ok {
                    tracing::warn!(
                        scan_id,
                        endpoint_id = e.id,
                        address = %e.address,
                        "Skipping endpoint with unscannable address",
                    );
                }
                ok
            })
            .map(|e| (e.id, e.address))
            .collect();

        if resolved.is_empty() {
            tracing::warn!(scan_id, "No resolvable targets; failing scan");
            self.mark_failed(scan_id).await;
            return Ok(());
        }

        // 3. Build the argument list once; it is identical per target.
        let scan_type = match ScanType::parse(&scan.scan_type) {
            Ok(t) => t,
            Err(e) => {
                // The type was validated at creation; a mismatch here
                // means the row was tampered with out-of-band.
                tracing::error!(scan_id, error = %e, "Stored scan type is invalid");
                self.mark_failed(scan_id).await;
                return Ok(());
            }
        };
        let params = ScanParams::from_stored(scan_type, &scan.parameters);
        let timeout = Duration::from_secs(params.timeout_secs() as u64);
        let args = Arc::new(build_args(&params));

        tracing::info!(
            scan_id,
            scan_type = %scan_type,
            targets = resolved.len(),
            concurrency = self.concurrency,
            "Dispatching scan",
        );

        // 4. Fan out. Each worker reports back over the channel; the
        //    semaphore bounds how many probes run at once.
        let (tx, mut rx) = mpsc::channel::<TargetOutcome>(resolved.len());
        let semaphore = Arc::new(Semaphore::new(self.concurrency));

        for (endpoint_id, address) in resolved {
            let tx = tx.clone();
            let semaphore = Arc::clone(&semaphore);
            let pool = self.pool.clone();
            let runner = Arc::clone(&self.runner);
            let args = Arc::clone(&args);

            tokio::spawn(async move {
                let Ok(_permit) = semaphore.acquire_owned().await else {
                    return;
                };

                let outcome = scan_target(
                    &pool, runner.as_ref(), scan_id, endpoint_id, &address, &args,
                    scan_type, timeout,
                )
                .await;
                let _ = tx.send(outcome).await;
            });
        }
        drop(tx);

        // 5. Aggregate outcomes. One target's failure never aborts the
        //    scan or the other targets.
        let (mut completed, mut failed, mut skipped) = (0u32, 0u32, 0u32);
        while let Some(outcome) = rx.recv().await {
            match outcome {
                TargetOutcome::Completed { endpoint_id } => {
                    completed += 1;
                    self.event_bus.publish(
                        ScanEvent::new("scan.target_completed", scan_id)
                            .with_endpoint(endpoint_id),
                    );
                }
                TargetOutcome::Failed { endpoint_id, cause } => {
                    failed += 1;
                    tracing::warn!(scan_id, endpoint_id, %cause, "Target execution failed");
                    self.event_bus.publish(
                        ScanEvent::new("scan.target_failed", scan_id)
                            .with_endpoint(endpoint_id)
                            .with_payload(serde_json::json!({ "cause": cause })),
                    );
                }
                TargetOutcome::Skipped { endpoint_id } => {
                    skipped += 1;
                    tracing::debug!(scan_id, endpoint_id, "Target skipped after stop");
                }
            }
        }

        // 6. Close out. The CAS misses if a stop request won meanwhile;
        //    `stopped` is terminal and must not be overwritten.
        if ScanRepo::finish(&self.pool, scan_id, ScanStatus::Completed).await? {
            tracing::info!(scan_id, completed, failed, skipped, "Scan completed");
            self.event_bus.publish(
                ScanEvent::new("scan.completed", scan_id).with_payload(serde_json::json!({
                    "targets_completed": completed,
                    "targets_failed": failed,
                    "targets_skipped": skipped,
                })),
            );
        } else {
            tracing::info!(scan_id, "Scan left running state during execution (stopped)");
        }

        Ok(())
    }

    /// Drive a scan to `failed`, setting `completed_at`.
    async fn mark_failed(&self, scan_id: DbId) {
        match ScanRepo::finish(&self.pool, scan_id, ScanStatus::Failed).await {
            Ok(true) => {
                self.event_bus.publish(ScanEvent::new("scan.failed", scan_id));
            }
            Ok(false) => {
                tracing::debug!(scan_id, "Scan already terminal; not marking failed");
            }
            Err(e) => {
                tracing::error!(scan_id, error = %e, "Could not mark scan failed");
            }
        }
    }
}

/// Execute one target: check for a stop, probe, normalize, persist.
#[allow(clippy::too_many_arguments)]
async fn scan_target(
    pool: &PgPool,
    runner: &dyn ScanRunner,
    scan_id: DbId,
    endpoint_id: DbId,
    address: &str,
    args: &[String],
    scan_type: ScanType,
    timeout: Duration,
) -> TargetOutcome {
    // Cooperative stop: re-read the status before dispatching. Probes
    // already in flight are not interrupted, only future dispatch.
    match ScanRepo::status_id(pool, scan_id).await {
        Ok(Some(status)) if status == ScanStatus::Running.id() => {}
        Ok(_) => return TargetOutcome::Skipped { endpoint_id },
        Err(e) => {
            return TargetOutcome::Failed {
                endpoint_id,
                cause: format!("status check failed: {e}"),
            }
        }
    }

    let report = match runner.run(address, args, timeout).await {
        Ok(report) => report,
        Err(e) => {
            return TargetOutcome::Failed {
                endpoint_id,
                cause: e.to_string(),
            }
        }
    };

    let normalized = normalize_report(&report, scan_type);
    let result = CreateScanResult {
        scan_id,
        endpoint_id,
        open_ports: normalized.summary.open_ports.len() as i32,
        vulnerabilities: normalized.summary.vulnerabilities.len() as i32,
        os_detection: normalized.summary.detected_os.as_ref().map(|os| os.name.clone()),
        raw_results: serde_json::to_value(&normalized)
            .unwrap_or(serde_json::Value::Null),
    };

    match ScanResultRepo::create(pool, &result).await {
        Ok(_) => TargetOutcome::Completed { endpoint_id },
        Err(e) => TargetOutcome::Failed {
            endpoint_id,
            cause: format!("result persistence failed: {e}"),
        },
    }
}
