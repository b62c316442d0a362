//! Scan lifecycle event bus.

pub mod bus;

pub use bus::{EventBus, ScanEvent};
