pub mod endpoints;
pub mod scans;
