//! Token lifecycle
//!
//! Access tokens are short-lived HS256 JWTs carrying identity claims.
//! Refresh tokens are longer-lived JWTs whose sha256 digest is stored
//! on the user row; only the most recently issued refresh token has a
//! matching digest, so rotation invalidates its predecessor.

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::config::AuthConfig;
use crate::error::AppError;

const TOKEN_TYPE_ACCESS: &str = "access";
const TOKEN_TYPE_REFRESH: &str = "refresh";

/// Claims carried by both token kinds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Username, for logging and display
    pub username: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Unique token identifier; makes every minted token distinct
    pub jti: String,
    /// "access" or "refresh"
    pub token_type: String,
}

/// An access/refresh pair minted together
#[derive(Debug, Clone)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

fn mint(
    user_id: &str,
    username: &str,
    token_type: &str,
    ttl_seconds: i64,
    secret: &str,
) -> Result<String, AppError> {
    let now = Utc::now();
    let claims = Claims {
        sub: user_id.to_string(),
        username: username.to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
        jti: ulid::Ulid::new().to_string(),
        token_type: token_type.to_string(),
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| AppError::Internal(anyhow::anyhow!("token encoding failed: {}", e)))
}

fn verify(token: &str, expected_type: &str, secret: &str) -> Result<Claims, AppError> {
    let data = decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|_| AppError::Unauthorized)?;

    if data.claims.token_type != expected_type {
        return Err(AppError::Unauthorized);
    }

    Ok(data.claims)
}

/// Mint a fresh access/refresh pair for a user.
pub fn mint_token_pair(
    user_id: &str,
    username: &str,
    auth: &AuthConfig,
) -> Result<TokenPair, AppError> {
    let access_token = mint(
        user_id,
        username,
        TOKEN_TYPE_ACCESS,
        auth.access_token_ttl,
        &auth.access_token_secret,
    )?;
    let refresh_token = mint(
        user_id,
        username,
        TOKEN_TYPE_REFRESH,
        auth.refresh_token_ttl,
        &auth.refresh_token_secret,
    )?;

    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Verify an access token, yielding its claims.
///
/// Fails with Unauthorized on expiry, bad signature, or a refresh
/// token presented where an access token is required.
pub fn verify_access_token(token: &str, auth: &AuthConfig) -> Result<Claims, AppError> {
    verify(token, TOKEN_TYPE_ACCESS, &auth.access_token_secret)
}

/// Verify a refresh token's signature and expiry.
///
/// This only proves the token was minted by us and is not expired;
/// whether it is the *current* refresh token is decided by comparing
/// digests against the stored value.
pub fn verify_refresh_token(token: &str, auth: &AuthConfig) -> Result<Claims, AppError> {
    verify(token, TOKEN_TYPE_REFRESH, &auth.refresh_token_secret)
}

/// Digest of a refresh token as stored server-side.
///
/// Storing a digest rather than the token means a database leak does
/// not hand out usable credentials.
pub fn refresh_token_digest(token: &str) -> String {
    let digest = Sha256::digest(token.as_bytes());
    format!("sha256:{}", URL_SAFE_NO_PAD.encode(digest))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_auth_config() -> AuthConfig {
        AuthConfig {
            access_token_secret: "access-secret-that-is-32-bytes!!".to_string(),
            refresh_token_secret: "refresh-secret-that-is-32-bytes!".to_string(),
            access_token_ttl: 900,
            refresh_token_ttl: 864_000,
            cookie_same_site: "lax".to_string(),
        }
    }

    #[test]
    fn mint_and_verify_roundtrip() {
        let auth = test_auth_config();
        let pair = mint_token_pair("user-1", "alice", &auth).unwrap();

        let access = verify_access_token(&pair.access_token, &auth).unwrap();
        assert_eq!(access.sub, "user-1");
        assert_eq!(access.username, "alice");
        assert_eq!(access.token_type, "access");

        let refresh = verify_refresh_token(&pair.refresh_token, &auth).unwrap();
        assert_eq!(refresh.sub, "user-1");
        assert_eq!(refresh.token_type, "refresh");
    }

    #[test]
    fn token_types_are_not_interchangeable() {
        let auth = test_auth_config();
        let pair = mint_token_pair("user-1", "alice", &auth).unwrap();

        assert!(verify_access_token(&pair.refresh_token, &auth).is_err());
        assert!(verify_refresh_token(&pair.access_token, &auth).is_err());
    }

    #[test]
    fn tampered_token_is_rejected() {
        let auth = test_auth_config();
        let pair = mint_token_pair("user-1", "alice", &auth).unwrap();

        let mut tampered = pair.access_token.clone();
        tampered.push('x');
        assert!(verify_access_token(&tampered, &auth).is_err());

        let mut other = test_auth_config();
        other.access_token_secret = "a-completely-different-32-byte-s".to_string();
        assert!(verify_access_token(&pair.access_token, &other).is_err());
    }

    #[test]
    fn expired_token_is_rejected() {
        let mut auth = test_auth_config();
        // jsonwebtoken's default validation has 60s leeway
        auth.access_token_ttl = -120;
        let pair = mint_token_pair("user-1", "alice", &auth).unwrap();
        assert!(verify_access_token(&pair.access_token, &auth).is_err());
    }

    #[test]
    fn minted_pairs_are_unique_and_digests_differ() {
        let auth = test_auth_config();
        let first = mint_token_pair("user-1", "alice", &auth).unwrap();
        let second = mint_token_pair("user-1", "alice", &auth).unwrap();

        // jti makes every refresh token distinct, even within a second
        assert_ne!(first.refresh_token, second.refresh_token);
        assert_ne!(
            refresh_token_digest(&first.refresh_token),
            refresh_token_digest(&second.refresh_token)
        );
    }
}
