//! Role name constants.
//!
//! Roles are issued by the external identity system; these constants
//! exist so authorization checks never compare against string literals.

/// Administrators may read and manage any user's resources.
pub const ROLE_ADMIN: &str = "admin";

/// Default role for regular users.
pub const ROLE_USER: &str = "user";
