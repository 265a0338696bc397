//! Configuration management
//!
//! Loads configuration from:
//! 1. Default values
//! 2. Configuration file (config/local.toml)
//! 3. Environment variables (override)

use serde::Deserialize;
use std::{net::IpAddr, path::PathBuf};

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub auth: AuthConfig,
    pub media: MediaConfig,
    pub logging: LoggingConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0")
    pub host: String,
    /// Port number (e.g., 8080)
    pub port: u16,
    /// Public domain (e.g., "clips.example.com")
    pub domain: String,
    /// Protocol ("http" or "https")
    pub protocol: String,
}

impl ServerConfig {
    /// Get the base URL for the instance
    pub fn base_url(&self) -> String {
        format!("{}://{}", self.protocol, self.domain)
    }
}

/// Database configuration (SQLite only)
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file
    pub path: PathBuf,
}

/// Object storage configuration (S3-compatible)
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// S3-compatible endpoint URL
    /// e.g., "https://<account>.r2.cloudflarestorage.com"
    pub endpoint: String,
    /// Bucket name for media
    pub bucket: String,
    /// Public URL prefix for media (CDN / custom domain)
    /// e.g., "https://media.example.com"
    pub public_url: String,
    pub access_key_id: String,
    pub secret_access_key: String,
    /// Per-call timeout for storage requests, in seconds
    #[serde(default = "default_storage_timeout")]
    pub request_timeout_seconds: u64,
}

fn default_storage_timeout() -> u64 {
    30
}

/// Authentication and token-lifecycle configuration
///
/// Everything the session manager needs is passed in here explicitly:
/// secrets, TTLs, and cookie flags.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// HMAC secret for access tokens (32+ bytes)
    pub access_token_secret: String,
    /// HMAC secret for refresh tokens (32+ bytes)
    pub refresh_token_secret: String,
    /// Access token TTL in seconds (default: 900 = 15 min)
    pub access_token_ttl: i64,
    /// Refresh token TTL in seconds (default: 864000 = 10 days)
    pub refresh_token_ttl: i64,
    /// SameSite mode for auth cookies: "strict", "lax", or "none"
    #[serde(default = "default_cookie_same_site")]
    pub cookie_same_site: String,
}

fn default_cookie_same_site() -> String {
    "lax".to_string()
}

/// Media defaults
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    /// Avatar URL used when a user registers without uploading one
    pub default_avatar_url: String,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
    /// Log format: "pretty" or "json"
    pub format: String,
}

impl AppConfig {
    /// Load configuration from file and environment
    ///
    /// # Loading Order
    /// 1. Default values
    /// 2. config/default.toml (if exists)
    /// 3. config/local.toml (if exists)
    /// 4. Environment variables (CLIPTIDE_*)
    ///
    /// # Errors
    /// Returns error if configuration is invalid
    pub fn load() -> Result<Self, crate::error::AppError> {
        use config::{Config, Environment, File};

        let config = Config::builder()
            // Start with default values
            .set_default("server.host", "127.0.0.1")?
            .set_default("server.port", 8080)?
            .set_default("server.protocol", "http")?
            .set_default("storage.request_timeout_seconds", 30)?
            .set_default("auth.access_token_ttl", 900)?
            .set_default("auth.refresh_token_ttl", 864_000)?
            .set_default("auth.cookie_same_site", "lax")?
            .set_default("logging.level", "info")?
            .set_default("logging.format", "pretty")?
            // Load from config/default.toml if it exists
            .add_source(File::with_name("config/default").required(false))
            // Load from config/local.toml if it exists (overrides default)
            .add_source(File::with_name("config/local").required(false))
            // Load from environment variables (CLIPTIDE_*)
            .add_source(
                Environment::with_prefix("CLIPTIDE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;

        let app_config: Self = config
            .try_deserialize()
            .map_err(|e| crate::error::AppError::Config(e.to_string()))?;
        app_config.validate()?;
        Ok(app_config)
    }

    pub fn should_use_secure_cookies(&self) -> bool {
        self.server.protocol.eq_ignore_ascii_case("https")
            || !is_local_server_domain(&self.server.domain)
    }

    fn validate(&self) -> Result<(), crate::error::AppError> {
        const MIN_TOKEN_SECRET_BYTES: usize = 32;

        for (name, secret) in [
            ("auth.access_token_secret", &self.auth.access_token_secret),
            ("auth.refresh_token_secret", &self.auth.refresh_token_secret),
        ] {
            if secret.as_bytes().len() < MIN_TOKEN_SECRET_BYTES {
                return Err(crate::error::AppError::Config(format!(
                    "{} must be at least {} bytes",
                    name, MIN_TOKEN_SECRET_BYTES
                )));
            }
        }

        if self.auth.access_token_ttl <= 0 || self.auth.refresh_token_ttl <= 0 {
            return Err(crate::error::AppError::Config(
                "auth token TTLs must be greater than 0".to_string(),
            ));
        }

        if self.auth.refresh_token_ttl <= self.auth.access_token_ttl {
            return Err(crate::error::AppError::Config(
                "auth.refresh_token_ttl must exceed auth.access_token_ttl".to_string(),
            ));
        }

        if !matches!(
            self.auth.cookie_same_site.to_ascii_lowercase().as_str(),
            "strict" | "lax" | "none"
        ) {
            return Err(crate::error::AppError::Config(
                "auth.cookie_same_site must be one of: strict, lax, none".to_string(),
            ));
        }

        if !self.should_use_secure_cookies() {
            let host = normalized_server_host(&self.server.domain);
            tracing::warn!(
                host = %host,
                protocol = %self.server.protocol,
                "Using insecure auth cookies for local development"
            );
        } else if !self.server.protocol.eq_ignore_ascii_case("https") {
            return Err(crate::error::AppError::Config(
                "server.protocol must be https for non-local server domains".to_string(),
            ));
        }

        Ok(())
    }
}

fn normalized_server_host(domain: &str) -> String {
    let host = domain
        .trim()
        .trim_start_matches('[')
        .split(|c| c == ']' || c == ':')
        .next()
        .unwrap_or("")
        .to_string();
    host.trim_end_matches('.').to_ascii_lowercase()
}

fn is_local_server_domain(domain: &str) -> bool {
    let host = normalized_server_host(domain);
    if host == "localhost" || host.ends_with(".localhost") {
        return true;
    }

    if let Ok(ip) = host.parse::<IpAddr>() {
        return ip.is_loopback() || ip.is_unspecified();
    }

    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> AppConfig {
        AppConfig {
            server: ServerConfig {
                host: "127.0.0.1".to_string(),
                port: 8080,
                domain: "localhost".to_string(),
                protocol: "http".to_string(),
            },
            database: DatabaseConfig {
                path: PathBuf::from("/tmp/cliptide-test.db"),
            },
            storage: StorageConfig {
                endpoint: "https://account.r2.cloudflarestorage.com".to_string(),
                bucket: "media".to_string(),
                public_url: "https://media.example.com".to_string(),
                access_key_id: "access-key".to_string(),
                secret_access_key: "secret-key".to_string(),
                request_timeout_seconds: 30,
            },
            auth: AuthConfig {
                access_token_secret: "a".repeat(32),
                refresh_token_secret: "r".repeat(32),
                access_token_ttl: 900,
                refresh_token_ttl: 864_000,
                cookie_same_site: "lax".to_string(),
            },
            media: MediaConfig {
                default_avatar_url: "https://media.example.com/defaults/avatar.webp".to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                format: "pretty".to_string(),
            },
        }
    }

    #[test]
    fn validate_accepts_http_on_localhost() {
        let config = valid_config();
        assert!(config.validate().is_ok());
        assert!(!config.should_use_secure_cookies());
    }

    #[test]
    fn validate_rejects_short_token_secret() {
        let mut config = valid_config();
        config.auth.access_token_secret = "short-secret".to_string();

        let error = config
            .validate()
            .expect_err("token secret shorter than 32 bytes must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("auth.access_token_secret")
        ));
    }

    #[test]
    fn validate_rejects_refresh_ttl_not_exceeding_access_ttl() {
        let mut config = valid_config();
        config.auth.refresh_token_ttl = config.auth.access_token_ttl;

        let error = config.validate().expect_err("equal TTLs must fail");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("refresh_token_ttl")
        ));
    }

    #[test]
    fn validate_rejects_http_for_non_local_domain() {
        let mut config = valid_config();
        config.server.domain = "clips.example.com".to_string();
        config.server.protocol = "http".to_string();

        let error = config
            .validate()
            .expect_err("public domains must require https");
        assert!(matches!(
            error,
            crate::error::AppError::Config(message)
                if message.contains("server.protocol must be https")
        ));
    }

    #[test]
    fn validate_rejects_unknown_same_site_mode() {
        let mut config = valid_config();
        config.auth.cookie_same_site = "sideways".to_string();

        assert!(config.validate().is_err());
    }
}
