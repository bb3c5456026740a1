/// Password hashing behind an opaque capability
///
/// The rest of the system only sees the [`PasswordHasher`] trait: a
/// one-way hash plus a verify. The production implementation is
/// Argon2id with the parameters below; tests substitute a cheap fake.
///
/// # Security
///
/// - **Algorithm**: Argon2id
/// - **Memory**: 64 MB (65536 KB)
/// - **Iterations**: 3 passes
/// - **Parallelism**: 4 lanes
/// - **Output**: 32-byte hash, PHC string format

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordVerifier, SaltString},
    Argon2, ParamsBuilder, Version,
};

/// Error type for password hashing operations
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    /// Failed to hash a password
    #[error("failed to hash password: {0}")]
    Hash(String),

    /// Stored hash could not be parsed
    #[error("invalid password hash: {0}")]
    InvalidHash(String),

    /// Verification failed for a reason other than a wrong password
    #[error("failed to verify password: {0}")]
    Verify(String),
}

/// One-way hash and verify capability
///
/// `verify` returns `Ok(false)` for a wrong password; `Err` is reserved
/// for operational failures (malformed stored hash).
pub trait PasswordHasher: Send + Sync {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError>;
    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError>;
}

/// Argon2id implementation of [`PasswordHasher`]
#[derive(Debug, Clone, Copy, Default)]
pub struct Argon2Hasher;

impl Argon2Hasher {
    fn argon2() -> Result<Argon2<'static>, PasswordError> {
        let params = ParamsBuilder::new()
            .m_cost(65536) // 64 MB
            .t_cost(3)
            .p_cost(4)
            .output_len(32)
            .build()
            .map_err(|e| PasswordError::Hash(format!("invalid parameters: {}", e)))?;

        Ok(Argon2::new(argon2::Algorithm::Argon2id, Version::V0x13, params))
    }
}

impl PasswordHasher for Argon2Hasher {
    fn hash(&self, plaintext: &str) -> Result<String, PasswordError> {
        use argon2::PasswordHasher as _;

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Self::argon2()?;

        let password_hash = argon2
            .hash_password(plaintext.as_bytes(), &salt)
            .map_err(|e| PasswordError::Hash(e.to_string()))?;

        Ok(password_hash.to_string())
    }

    fn verify(&self, plaintext: &str, hash: &str) -> Result<bool, PasswordError> {
        let parsed_hash =
            PasswordHash::new(hash).map_err(|e| PasswordError::InvalidHash(e.to_string()))?;

        // parameters are embedded in the PHC string
        match Argon2::default().verify_password(plaintext.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(PasswordError::Verify(e.to_string())),
        }
    }
}
