//! Scan runner seam and error taxonomy.
//!
//! The orchestration layer only ever sees [`ScanRunner`]; the production
//! implementation spawns nmap, while tests substitute a stub. Every
//! ordinary tool failure is a [`ScanError`] value: a failed target
//! produces no result row, it never aborts the scan or panics, and
//! nothing here retries.

use std::time::Duration;

use async_trait::async_trait;

use crate::report::HostReport;

/// Errors from executing the external scanner for one target.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// The scanner binary failed its startup probe. Raised once during
    /// process initialization, never per scan.
    #[error("Scanner unavailable: {0}")]
    Unavailable(String),

    /// Spawning or waiting on the scanner process failed.
    #[error("Scanner process error: {0}")]
    Io(#[from] std::io::Error),

    /// The scanner exceeded its wall-clock budget and was killed.
    #[error("Scan timed out after {elapsed_ms}ms")]
    Timeout { elapsed_ms: u64 },

    /// The scanner exited with a non-zero status.
    #[error("Scanner exited with code {exit_code}: {stderr}")]
    Failed { exit_code: i32, stderr: String },

    /// The scanner's output could not be parsed.
    #[error("Unparseable scanner output: {0}")]
    Parse(String),

    /// The scanner ran but reported nothing for the target.
    #[error("Scanner produced no result for target {0}")]
    NoHost(String),
}

/// Executes the external scan capability against one target address.
#[async_trait]
pub trait ScanRunner: Send + Sync {
    /// Run one scan invocation.
    ///
    /// `args` is the deterministic argument list from the command
    /// builder; `timeout` is the scan's normalized timeout parameter,
    /// applied as the process wall-clock budget.
    async fn run(
        &self,
        address: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<HostReport, ScanError>;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
