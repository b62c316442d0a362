//! Authentication support.
//!
//! Token issuance and identity management live outside this service;
//! only validation (and a helper to mint tokens for tests and ops
//! tooling) is implemented here.

pub mod jwt;
