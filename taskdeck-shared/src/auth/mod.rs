/// Authentication and authorization utilities
///
/// - `token`: signed stateless identity tokens (HS256)
/// - `password`: Argon2id hashing behind the `PasswordHasher` capability
/// - `gate`: per-request token verification and identity resolution

pub mod gate;
pub mod password;
pub mod token;

pub use gate::{AuthorizationGate, Identity, TokenBearer};
pub use password::{Argon2Hasher, PasswordError, PasswordHasher};
pub use token::{Claims, TokenError, TokenService};
