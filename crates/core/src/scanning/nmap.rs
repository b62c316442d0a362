//! nmap subprocess runner.
//!
//! Spawns the configured nmap binary with XML output on stdout for
//! exactly one target, captures stdout/stderr in spawned reader tasks,
//! and enforces the scan's wall-clock budget.

use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::Command;

use super::executor::{ScanError, ScanRunner};
use super::xml;
use crate::report::HostReport;

/// Maximum stdout or stderr size captured per stream (10 MiB).
///
/// Output exceeding this limit is truncated to prevent memory
/// exhaustion from extremely verbose script output.
const MAX_OUTPUT_BYTES: usize = 10 * 1024 * 1024;

/// Runs the real nmap binary.
#[derive(Debug, Clone)]
pub struct NmapRunner {
    binary: String,
}

impl NmapRunner {
    /// Probe the binary once at startup.
    ///
    /// Runs `<binary> --version` and fails with
    /// [`ScanError::Unavailable`] if it cannot be executed. Callers
    /// treat that as a fatal configuration error before serving
    /// traffic, so a missing scanner never shows up as a per-scan
    /// failure.
    pub async fn detect(binary: impl Into<String>) -> Result<Self, ScanError> {
        let binary = binary.into();
        let output = Command::new(&binary)
            .arg("--version")
            .output()
            .await
            .map_err(|e| ScanError::Unavailable(format!("{binary}: {e}")))?;

        if !output.status.success() {
            return Err(ScanError::Unavailable(format!(
                "{binary} --version exited with {}",
                output.status
            )));
        }

        Ok(Self { binary })
    }

    /// Path or name of the binary this runner invokes.
    pub fn binary(&self) -> &str {
        &self.binary
    }
}

#[async_trait]
impl ScanRunner for NmapRunner {
    async fn run(
        &self,
        address: &str,
        args: &[String],
        timeout: Duration,
    ) -> Result<HostReport, ScanError> {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("-oX")
            .arg("-")
            .args(args)
            .arg(address)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Kills the child when dropped (e.g. on timeout).
            .kill_on_drop(true);

        let start = Instant::now();
        let mut child = cmd.spawn()?;

        // Read the streams in spawned tasks so we can still call
        // `child.wait()` (which borrows `&mut child`).
        let stdout_handle = child.stdout.take();
        let stderr_handle = child.stderr.take();
        let stdout_task = tokio::spawn(async move { read_stream(stdout_handle).await });
        let stderr_task = tokio::spawn(async move { read_stream(stderr_handle).await });

        match tokio::time::timeout(timeout, child.wait()).await {
            Ok(Ok(status)) => {
                let stdout_bytes = stdout_task.await.unwrap_or_default();
                let stderr_bytes = stderr_task.await.unwrap_or_default();
                let stdout = String::from_utf8_lossy(&stdout_bytes);
                let stderr = String::from_utf8_lossy(&stderr_bytes);

                if !status.success() {
                    return Err(ScanError::Failed {
                        exit_code: status.code().unwrap_or(-1),
                        stderr: stderr.trim().to_string(),
                    });
                }

                // One invocation per target, so the report has at most
                // one host entry.
                xml::parse_report(&stdout)?
                    .into_iter()
                    .next()
                    .ok_or_else(|| ScanError::NoHost(address.to_string()))
            }
            Ok(Err(e)) => Err(ScanError::Io(e)),
            Err(_elapsed) => {
                // `child` is dropped here, which kills the process
                // because of `kill_on_drop(true)`.
                Err(ScanError::Timeout {
                    elapsed_ms: start.elapsed().as_millis() as u64,
                })
            }
        }
    }
}

/// Read an entire output stream into a byte buffer, capped at
/// [`MAX_OUTPUT_BYTES`].
async fn read_stream<R: AsyncRead + Unpin>(handle: Option<R>) -> Vec<u8> {
    let mut buf = Vec::new();
    if let Some(mut h) = handle {
        let _ = (&mut h)
            .take(MAX_OUTPUT_BYTES as u64)
            .read_to_end(&mut buf)
            .await;
    }
    buf
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn detect_missing_binary_is_unavailable() {
        let result = NmapRunner::detect("/nonexistent/definitely-not-nmap").await;
        assert!(matches!(result, Err(ScanError::Unavailable(_))));
    }
}
