//! JWT Token Handler
//! Mission: Generate and validate the signed tokens behind session cookies
//! and password-reset links
//!
//! Tokens are self-contained and never revoked server-side; a token stays
//! valid until its `exp` passes, even if the account changes. Holders are
//! re-checked against the user store on every request instead.

use crate::auth::models::Claims;
use anyhow::{Context, Result};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use tracing::debug;

/// JWT Handler for token operations
pub struct JwtHandler {
    secret: String,
}

impl JwtHandler {
    /// Create a new JWT handler with secret key
    pub fn new(secret: String) -> Self {
        Self { secret }
    }

    /// Issue a token for a user id with the given lifetime
    pub fn issue(&self, subject: i64, ttl: chrono::Duration) -> Result<String> {
        let expiration = Utc::now()
            .checked_add_signed(ttl)
            .context("Invalid timestamp")?
            .timestamp() as usize;

        let claims = Claims {
            sub: subject.to_string(),
            exp: expiration,
        };

        debug!(
            "Issuing JWT for user {}, expires in {}m",
            subject,
            ttl.num_minutes()
        );

        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .context("Failed to generate JWT")
    }

    /// Validate a token and extract the user id it was issued for
    pub fn verify(&self, token: &str) -> Result<i64> {
        // No leeway: tokens are rejected at the exact expiry timestamp
        let mut validation = Validation::default();
        validation.leeway = 0;

        let decoded = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.secret.as_bytes()),
            &validation,
        )
        .context("Invalid or expired token")?;

        let user_id = decoded
            .claims
            .sub
            .parse::<i64>()
            .context("Malformed token subject")?;

        debug!("Validated JWT for user {}", user_id);

        Ok(user_id)
    }
}
