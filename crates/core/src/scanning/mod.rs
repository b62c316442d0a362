//! Scanner execution subsystem.
//!
//! [`executor`] defines the runner seam and error taxonomy, [`nmap`]
//! spawns the real binary, and [`xml`] parses its XML output into
//! [`crate::report::HostReport`]s.

pub mod executor;
pub mod nmap;
pub mod xml;

pub use executor::{ScanError, ScanRunner};
pub use nmap::NmapRunner;
