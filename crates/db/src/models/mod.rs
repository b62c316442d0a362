//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - `Deserialize` DTOs for creates and updates where the API needs them

pub mod endpoint;
pub mod scan;
pub mod status;
pub mod user;
