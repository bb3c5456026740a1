/// Per-request token verification and identity resolution
///
/// The gate runs once per inbound mutating request. It pulls the token
/// off the request payload, verifies it, and overwrites the payload's
/// username with the token's embedded one: callers are never trusted to
/// self-report identity.
///
/// Every failure mode (missing token, expired, malformed, wrong secret)
/// collapses into a single `Forbidden` error so a caller cannot probe
/// which check failed.

use crate::auth::token::TokenService;
use crate::error::DomainError;
use crate::models::UserId;

/// The one user-visible message for every authentication failure
pub const NOT_AUTHORIZED: &str = "You are not authorized to access this route";

/// Request payloads that carry a signed identity token
///
/// Implemented by the API request DTOs; the gate uses it to read the
/// token and to stamp the verified username back onto the payload.
pub trait TokenBearer {
    /// The raw token, if the payload carries one
    fn token(&self) -> Option<&str>;

    /// Overwrites the payload's username with the verified identity
    fn set_username(&mut self, username: String);
}

/// Verified identity, exposed for ownership checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: UserId,
    pub username: String,
}

/// Extracts and verifies the token carried by a request payload
pub struct AuthorizationGate {
    tokens: TokenService,
}

impl AuthorizationGate {
    pub fn new(tokens: TokenService) -> Self {
        Self { tokens }
    }

    /// Verifies the payload's token and resolves the embedded identity
    ///
    /// On success the payload's username field is overwritten with the
    /// token's username. On any failure the request fails with a single
    /// `Forbidden` kind; the underlying reason is logged, not surfaced.
    pub fn authorize<P: TokenBearer>(&self, payload: &mut P) -> Result<Identity, DomainError> {
        let token = payload.token().ok_or_else(Self::forbidden)?;

        let claims = self.tokens.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "token verification failed");
            Self::forbidden()
        })?;

        payload.set_username(claims.username.clone());

        Ok(Identity {
            id: claims.id,
            username: claims.username,
        })
    }

    fn forbidden() -> DomainError {
        DomainError::Forbidden(NOT_AUTHORIZED.to_string())
    }
}
