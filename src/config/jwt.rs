use crate::core::{AppError, Result};
use serde::Deserialize;
use std::env;

/// Minimum HS256 key length in bytes
pub const MIN_SECRET_KEY_LEN: usize = 32;

/// Bearer token validation settings
#[derive(Clone, Deserialize)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub secret_key: String,
}

impl std::fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtConfig")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

impl JwtConfig {
    pub fn from_env() -> Result<Self> {
        Ok(JwtConfig {
            issuer: env::var("JWT_ISSUER")
                .map_err(|_| AppError::Configuration("JWT_ISSUER not set".to_string()))?,
            audience: env::var("JWT_AUDIENCE")
                .map_err(|_| AppError::Configuration("JWT_AUDIENCE not set".to_string()))?,
            secret_key: env::var("JWT_SECRET_KEY")
                .map_err(|_| AppError::Configuration("JWT_SECRET_KEY not set".to_string()))?,
        })
    }

    pub fn validate(&self) -> Result<()> {
        if self.secret_key.len() < MIN_SECRET_KEY_LEN {
            return Err(AppError::Configuration(format!(
                "JWT_SECRET_KEY must be at least {} bytes",
                MIN_SECRET_KEY_LEN
            )));
        }
        if self.issuer.trim().is_empty() || self.audience.trim().is_empty() {
            return Err(AppError::Configuration(
                "JWT_ISSUER and JWT_AUDIENCE cannot be empty".to_string(),
            ));
        }
        Ok(())
    }
}
