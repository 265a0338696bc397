//! Authentication module
//!
//! Password hashing, JWT access/refresh token lifecycle, and the
//! request extractors that gate protected routes.

mod middleware;
mod password;
mod tokens;

pub use middleware::{
    require_auth, CurrentUser, Identity, MaybeUser, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use password::{hash_password, verify_password};
pub use tokens::{
    mint_token_pair, refresh_token_digest, verify_access_token, verify_refresh_token, Claims,
    TokenPair,
};
