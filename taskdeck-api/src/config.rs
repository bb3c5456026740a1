/// Configuration management for the API server
///
/// Loads configuration from environment variables into a type-safe
/// struct.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (required)
/// - `DATABASE_MAX_CONNECTIONS`: pool size (default: 10)
/// - `REDIS_URL`: Redis connection string (required)
/// - `API_HOST`: host to bind to (default: 0.0.0.0)
/// - `API_PORT`: port to bind to (default: 8080)
/// - `JWT_SECRET`: secret for token signing (required, >= 32 bytes)
/// - `TOKEN_TTL_SECS`: token lifetime (default: 3600)
/// - `CACHE_TTL_SECS`: cache entry lifetime (default: 3600)

use std::env;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseSettings,
    pub redis: RedisSettings,
    pub auth: AuthConfig,
    pub cache: CacheSettings,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseSettings {
    pub url: String,
    pub max_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone)]
pub struct RedisSettings {
    pub url: String,
}

/// Token signing configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Secret for HS256 signing; generate with `openssl rand -hex 32`
    pub jwt_secret: String,

    /// Token lifetime in seconds
    pub token_ttl_secs: u64,
}

/// Cache tuning
#[derive(Debug, Clone)]
pub struct CacheSettings {
    /// Bounded TTL on every entry; staleness left behind by a crash
    /// self-heals within this window
    pub ttl_secs: u64,
}

impl Config {
    /// Loads configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let api_host = env::var("API_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let api_port = env::var("API_PORT")
            .unwrap_or_else(|_| "8080".to_string())
            .parse::<u16>()?;

        let database_url = env::var("DATABASE_URL")
            .map_err(|_| anyhow::anyhow!("DATABASE_URL environment variable is required"))?;
        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse::<u32>()?;

        let redis_url = env::var("REDIS_URL")
            .map_err(|_| anyhow::anyhow!("REDIS_URL environment variable is required"))?;

        let jwt_secret = env::var("JWT_SECRET")
            .map_err(|_| anyhow::anyhow!("JWT_SECRET environment variable is required"))?;
        if jwt_secret.len() < 32 {
            anyhow::bail!("JWT_SECRET must be at least 32 characters long");
        }

        let token_ttl_secs = env::var("TOKEN_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()?;

        let cache_ttl_secs = env::var("CACHE_TTL_SECS")
            .unwrap_or_else(|_| "3600".to_string())
            .parse::<u64>()?;

        Ok(Self {
            api: ApiConfig {
                host: api_host,
                port: api_port,
            },
            database: DatabaseSettings {
                url: database_url,
                max_connections,
            },
            redis: RedisSettings { url: redis_url },
            auth: AuthConfig {
                jwt_secret,
                token_ttl_secs,
            },
            cache: CacheSettings {
                ttl_secs: cache_ttl_secs,
            },
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_address() {
        let config = Config {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
            },
            database: DatabaseSettings {
                url: "postgresql://localhost/test".to_string(),
                max_connections: 10,
            },
            redis: RedisSettings {
                url: "redis://localhost:6379".to_string(),
            },
            auth: AuthConfig {
                jwt_secret: "test-secret-key-at-least-32-bytes-long".to_string(),
                token_ttl_secs: 3600,
            },
            cache: CacheSettings { ttl_secs: 3600 },
        };

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
    }
}
