/// Domain error type shared by the coordinators
///
/// The calling layer maps these onto HTTP statuses: `NotFound` → 404,
/// `Forbidden` → 403, `Conflict` → 409. Store failures always propagate
/// as fatal to the calling operation; cache failures never reach this
/// type at all, they are swallowed and logged at the call site.

use thiserror::Error;

use crate::auth::password::PasswordError;
use crate::store::StoreError;

/// Errors surfaced by `UserDirectory`, `TaskBoard`, and the gate
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested entity does not exist
    #[error("{0}")]
    NotFound(String),

    /// A unique key (username) is already taken
    #[error("{0}")]
    Conflict(String),

    /// Authentication failed; every underlying reason collapses here
    #[error("{0}")]
    Forbidden(String),

    /// Password hashing or verification failed
    #[error(transparent)]
    Password(#[from] PasswordError),

    /// Durable store failure, fatal to the calling operation
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for DomainError {
    fn from(err: StoreError) -> Self {
        match err {
            // unique-violation races surface as a conflict, same as the
            // caller-side duplicate check they slipped past
            StoreError::Duplicate(_) => DomainError::Conflict(err.to_string()),
            other => DomainError::Store(other),
        }
    }
}
