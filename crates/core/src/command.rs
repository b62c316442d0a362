//! nmap argument construction.
//!
//! Maps a normalized parameter set to the exact, ordered argv passed to
//! the scanner. The mapping is deterministic: identical parameters
//! always produce an identical argument list, which is what makes scan
//! runs reproducible and comparable after the fact.

use crate::params::ScanParams;

/// Service/version detection probe intensity (0-9). Fixed for all scan
/// types; version strings feed both the service summary and
/// vulnerability matching.
const VERSION_INTENSITY: &str = "5";

/// Build the nmap argument list for one scan.
///
/// Every scan shares the same baseline: no reverse DNS (`-n`), no host
/// discovery probe (`-Pn`), TCP SYN scan (`-sS`), and a per-probe
/// timeout derived from the normalized `timeout` parameter. Type
/// specific arguments follow in a fixed order. The target address is
/// NOT part of the list; the executor appends it per target.
pub fn build_args(params: &ScanParams) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-n".into(),
        "-Pn".into(),
        "-sS".into(),
        "--max-rtt-timeout".into(),
        format!("{}s", params.timeout_secs()),
    ];

    match params {
        ScanParams::PortScan { ports, speed, .. } => {
            args.push("-p".into());
            args.push(ports.clone());
            args.push("-sV".into());
            args.push("--version-intensity".into());
            args.push(VERSION_INTENSITY.into());
            args.push(speed.timing_template().into());
        }
        ScanParams::OsDetection { ports, .. } => {
            args.push("-O".into());
            args.push("--osscan-guess".into());
            args.push("-sV".into());
            args.push("--version-intensity".into());
            args.push(VERSION_INTENSITY.into());
            args.push("-p".into());
            args.push(ports.clone());
        }
        ScanParams::VulnerabilityScan { intensity, .. } => {
            args.push("--script=vuln".into());
            args.push(intensity.timing_template().into());
            args.push("-sV".into());
            args.push("--version-intensity".into());
            args.push(VERSION_INTENSITY.into());
        }
    }

    args
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
