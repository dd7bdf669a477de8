use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config::JwtConfig;
use crate::error::AppError;

/// The claims encoded within a token.
///
/// A snapshot of the identity at issue time: changing the user's email later does
/// not alter tokens already handed out.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct Claims {
    pub user_id: i64,
    pub email: String,
    /// Issuer.
    pub iss: String,
    /// Issued at (seconds since epoch).
    pub iat: i64,
    /// Not before (seconds since epoch).
    pub nbf: i64,
    /// Expiry (seconds since epoch).
    pub exp: i64,
}

impl Claims {
    /// Claims valid from now until `now + ttl`. A negative `ttl` yields claims
    /// that are already expired.
    pub fn new(user_id: i64, email: &str, issuer: &str, ttl: Duration) -> Self {
        let now = Utc::now().timestamp();
        Self {
            user_id,
            email: email.to_string(),
            iss: issuer.to_string(),
            iat: now,
            nbf: now,
            exp: now + ttl.num_seconds(),
        }
    }
}

/// Signs and verifies HMAC bearer tokens with one shared secret.
///
/// Holds only immutable key material and settings, so one instance is shared
/// across all workers without synchronization.
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    issuer: String,
    ttl: Duration,
}

impl TokenCodec {
    pub fn new(config: &JwtConfig) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Any HMAC variant is accepted; everything else (none, RSA, EC) is not.
        validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.validate_nbf = true;
        validation.set_required_spec_claims(&["exp", "nbf", "iss"]);

        Self {
            encoding_key: EncodingKey::from_secret(config.secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(config.secret.as_bytes()),
            validation,
            issuer: config.issuer.clone(),
            ttl: Duration::seconds(config.expiry_secs),
        }
    }

    /// Issues a token for the identity with the configured time-to-live.
    pub fn issue(&self, user_id: i64, email: &str) -> Result<String, AppError> {
        self.issue_with_ttl(user_id, email, self.ttl)
    }

    pub fn issue_with_ttl(&self, user_id: i64, email: &str, ttl: Duration) -> Result<String, AppError> {
        self.sign(&Claims::new(user_id, email, &self.issuer, ttl))
    }

    /// Signs an arbitrary claims set with HS256.
    pub fn sign(&self, claims: &Claims) -> Result<String, AppError> {
        encode(&Header::new(Algorithm::HS256), claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to generate token: {}", e)))
    }

    /// Verifies structure, algorithm family, signature and the `nbf`/`exp`
    /// window, in that order.
    ///
    /// Every failure is reported as the same `AppError::Unauthenticated`; the
    /// specific cause is only logged at debug level.
    pub fn verify(&self, token: &str) -> Result<Claims, AppError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                log::debug!("token rejected: {:?}", e.kind());
                AppError::Unauthenticated
            })
    }
}
