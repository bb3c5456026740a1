/// User model and output-safe view
///
/// # Schema
///
/// ```sql
/// CREATE TABLE users (
///     id BIGSERIAL PRIMARY KEY,
///     username VARCHAR(20) NOT NULL UNIQUE,
///     password_hash VARCHAR(255) NOT NULL,
///     created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
/// );
/// ```
///
/// `User` is the internal representation and is what `UserDirectory`
/// caches: the password hash stays on it so signin can verify a cached
/// record without a store read. Anything that crosses the serialization
/// boundary goes through [`UserView`], which structurally cannot carry
/// the hash.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Store-assigned user identifier
pub type UserId = i64;

/// User account
///
/// Passwords are stored as Argon2id hashes, never in plaintext.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct User {
    /// Unique user ID (BIGSERIAL)
    pub id: UserId,

    /// Unique username, 3-20 characters
    pub username: String,

    /// Argon2id password hash
    ///
    /// Never serialize this to a client. Construct a [`UserView`] instead.
    pub password_hash: String,

    /// When the account was created
    pub created_at: DateTime<Utc>,
}

/// Input for creating a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    /// Username (uniqueness enforced by the store)
    pub username: String,

    /// Argon2id password hash (NOT the plaintext password)
    pub password_hash: String,
}

/// Client-facing user representation
///
/// There is no password field to leak: sanitization is a type change,
/// not a field deletion on a shared object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserView {
    pub id: UserId,
    pub username: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    /// Output-safe projection of this account
    pub fn view(&self) -> UserView {
        UserView {
            id: self.id,
            username: self.username.clone(),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user() -> User {
        User {
            id: 1,
            username: "alice".to_string(),
            password_hash: "$argon2id$stub".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_view_strips_password_hash() {
        let user = sample_user();
        let view = user.view();

        assert_eq!(view.id, user.id);
        assert_eq!(view.username, user.username);

        let json = serde_json::to_string(&view).unwrap();
        assert!(!json.contains("password"));
        assert!(!json.contains("argon2"));
    }

    #[test]
    fn test_internal_representation_round_trips() {
        let user = sample_user();
        let json = serde_json::to_string(&user).unwrap();
        let back: User = serde_json::from_str(&json).unwrap();

        assert_eq!(back.id, user.id);
        assert_eq!(back.password_hash, user.password_hash);
    }
}
