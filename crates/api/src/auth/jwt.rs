//! JWT configuration, claims, and validation.

use chrono::Utc;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use vigil_core::types::DbId;

/// JWT configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// HMAC signing secret.
    pub secret: String,
    /// Token lifetime in seconds (default: 1 hour).
    pub expiry_secs: i64,
}

impl JwtConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var           | Default                 |
    /// |-------------------|-------------------------|
    /// | `JWT_SECRET`      | `dev-secret-change-me`  |
    /// | `JWT_EXPIRY_SECS` | `3600`                  |
    pub fn from_env() -> Self {
        let secret =
            std::env::var("JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());

        let expiry_secs: i64 = std::env::var("JWT_EXPIRY_SECS")
            .unwrap_or_else(|_| "3600".into())
            .parse()
            .expect("JWT_EXPIRY_SECS must be a valid i64");

        Self {
            secret,
            expiry_secs,
        }
    }
}

/// Claims carried by an access token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// The user's internal database id.
    pub sub: DbId,
    /// The user's role name (e.g. `"user"`, `"admin"`).
    pub role: String,
    /// Expiry as a Unix timestamp.
    pub exp: usize,
}

/// Mint a token for the given user. Used by integration tests and ops
/// tooling; the production login flow is an external collaborator.
pub fn create_token(
    user_id: DbId,
    role: &str,
    config: &JwtConfig,
) -> Result<String, jsonwebtoken::errors::Error> {
    let exp = (Utc::now() + chrono::Duration::seconds(config.expiry_secs)).timestamp() as usize;
    let claims = Claims {
        sub: user_id,
        role: role.to_string(),
        exp,
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(config.secret.as_bytes()),
    )
}

/// Validate a token's signature and expiry, returning its claims.
pub fn validate_token(
    token: &str,
    config: &JwtConfig,
) -> Result<Claims, jsonwebtoken::errors::Error> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(config.secret.as_bytes()),
        &Validation::new(Algorithm::HS256),
    )
    .map(|data| data.claims)
}
