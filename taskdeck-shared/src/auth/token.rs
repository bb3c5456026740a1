/// Signed identity tokens
///
/// Tokens are JWTs signed with HS256 (HMAC-SHA256) over a process-wide
/// secret. The payload carries the user's id and username plus standard
/// expiry claims; nothing is persisted server-side, so any request can
/// prove identity without session state.
///
/// Verification is pure (no I/O) and all-or-nothing: a bad signature, a
/// past expiry, or a malformed token all fail, and no partial claims are
/// ever exposed.
///
/// # Example
///
/// ```
/// use chrono::Duration;
/// use taskdeck_shared::auth::token::TokenService;
///
/// # fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let tokens = TokenService::new("secret-key-at-least-32-bytes-long!!", Duration::hours(1));
/// let token = tokens.sign(1, "alice")?;
///
/// let claims = tokens.verify(&token)?;
/// assert_eq!(claims.id, 1);
/// assert_eq!(claims.username, "alice");
/// # Ok(())
/// # }
/// ```

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::models::UserId;

/// Issuer claim stamped on every token
const ISSUER: &str = "taskdeck";

/// Error type for token operations
#[derive(Debug, thiserror::Error)]
pub enum TokenError {
    /// Failed to sign a token
    #[error("failed to sign token: {0}")]
    Sign(String),

    /// Token has expired
    #[error("token has expired")]
    Expired,

    /// Signature mismatch, wrong issuer, or malformed token
    #[error("invalid token: {0}")]
    Invalid(String),
}

/// Token payload
///
/// `id` and `username` are the identity the rest of the system trusts;
/// the remaining fields are standard JWT claims.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User ID
    pub id: UserId,

    /// Username, copied onto inbound payloads by the gate
    pub username: String,

    /// Issuer, always "taskdeck"
    pub iss: String,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration time (Unix timestamp)
    pub exp: i64,
}

/// Signs and verifies identity tokens with a shared secret
#[derive(Clone)]
pub struct TokenService {
    secret: String,
    ttl: Duration,
}

impl TokenService {
    /// Creates a token service with the given secret and token lifetime
    ///
    /// The secret should be at least 32 bytes and come from process
    /// configuration, never from source.
    pub fn new(secret: impl Into<String>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    /// Token lifetime used for every signed token
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Signs a `{id, username}` payload with expiry
    pub fn sign(&self, id: UserId, username: &str) -> Result<String, TokenError> {
        let now = Utc::now();
        let claims = Claims {
            id,
            username: username.to_string(),
            iss: ISSUER.to_string(),
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };

        let header = Header::new(Algorithm::HS256);
        let key = EncodingKey::from_secret(self.secret.as_bytes());

        encode(&header, &claims, &key).map_err(|e| TokenError::Sign(e.to_string()))
    }

    /// Verifies a token and extracts its claims
    ///
    /// Checks the signature, expiry, and issuer. Pure computation, never
    /// suspends.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let key = DecodingKey::from_secret(self.secret.as_bytes());

        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[ISSUER]);
        validation.validate_exp = true;

        let token_data = decode::<Claims>(token, &key, &validation).map_err(|e| match e.kind() {
            jsonwebtoken::errors::ErrorKind::ExpiredSignature => TokenError::Expired,
            _ => TokenError::Invalid(e.to_string()),
        })?;

        Ok(token_data.claims)
    }
}
