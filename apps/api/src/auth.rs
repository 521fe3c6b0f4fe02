//! # Authentication
//!
//! Access tokens, password hashing and the access gate.
//!
//! ## Request Authentication
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Access Gate                                        │
//! │                                                                         │
//! │  Authorization: Bearer <jwt>     ──┐                                   │
//! │  Cookie: access_token=<jwt>      ──┼──► token (header wins)            │
//! │  Cookie: access_token="Bearer …" ──┘        │                          │
//! │                                             ▼                          │
//! │                                   HS256 verify + exp check             │
//! │                                             │  sub = email             │
//! │                                             ▼                          │
//! │                                   users.find_by_email(sub)             │
//! │                                             │  role from the row,      │
//! │                                             ▼  not from the token      │
//! │                                   CurrentCaller(Caller)                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::ops::Deref;

use axum::extract::FromRequestParts;
use axum::http::header::{AUTHORIZATION, COOKIE};
use axum::http::request::Parts;
use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use stockroom_core::{Caller, Role, User};
use tracing::{debug, warn};
use uuid::Uuid;

use crate::error::ApiError;
use crate::AppState;

/// Name of the session cookie set on login.
pub const ACCESS_TOKEN_COOKIE: &str = "access_token";

// =============================================================================
// Tokens
// =============================================================================

/// JWT claims structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user email)
    pub sub: String,

    /// Role at issue time. Informational; the gate re-reads the user.
    pub role: Role,

    /// Issued at (Unix timestamp)
    pub iat: i64,

    /// Expiration (Unix timestamp)
    pub exp: i64,

    /// JWT ID (unique identifier for this token)
    pub jti: String,
}

/// JWT token manager.
pub struct JwtManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    access_lifetime_secs: i64,
}

impl JwtManager {
    /// Create a new JWT manager.
    pub fn new(secret: &str, access_lifetime_secs: i64) -> Self {
        JwtManager {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            access_lifetime_secs,
        }
    }

    pub fn access_lifetime_secs(&self) -> i64 {
        self.access_lifetime_secs
    }

    /// Generate an access token for `user`.
    pub fn generate_access_token(&self, user: &User) -> Result<String, ApiError> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_lifetime_secs);

        let claims = Claims {
            sub: user.email.clone(),
            role: user.role,
            iat: now.timestamp(),
            exp: exp.timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        self.sign(&claims)
    }

    fn sign(&self, claims: &Claims) -> Result<String, ApiError> {
        encode(&Header::default(), claims, &self.encoding)
            .map_err(|e| ApiError::internal(format!("Failed to generate token: {}", e)))
    }

    /// Validate and decode a token.
    pub fn validate_token(&self, token: &str) -> Result<Claims, ApiError> {
        let token_data: TokenData<Claims> = decode(token, &self.decoding, &Validation::default())
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => ApiError::invalid_token("Token expired"),
                _ => ApiError::invalid_token("Invalid token"),
            })?;

        Ok(token_data.claims)
    }
}

/// Extract bearer token from authorization header.
pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// Reads the access token out of a `Cookie` header. The value may be the raw
/// token or `Bearer <token>`, optionally quoted.
pub fn token_from_cookie(cookie_header: &str) -> Option<&str> {
    let value = cookie_header
        .split(';')
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == ACCESS_TOKEN_COOKIE)
        .map(|(_, value)| value.trim().trim_matches('"'))?;

    let token = value
        .strip_prefix("Bearer ")
        .or_else(|| value.strip_prefix("Bearer%20"))
        .unwrap_or(value)
        .trim();

    (!token.is_empty()).then_some(token)
}

fn token_from_headers(headers: &HeaderMap) -> Result<Option<&str>, ApiError> {
    if let Some(header) = headers.get(AUTHORIZATION) {
        let token = header
            .to_str()
            .ok()
            .and_then(extract_bearer_token)
            .ok_or_else(|| ApiError::invalid_token("Invalid authorization header"))?;
        return Ok(Some(token));
    }

    Ok(headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|h| h.to_str().ok())
        .find_map(token_from_cookie))
}

// =============================================================================
// Cookies
// =============================================================================

/// `Set-Cookie` value carrying a fresh access token.
pub fn session_cookie(token: &str, max_age_secs: i64, secure: bool) -> String {
    let mut cookie = format!(
        "{ACCESS_TOKEN_COOKIE}={token}; HttpOnly; SameSite=Lax; Path=/; Max-Age={max_age_secs}"
    );
    if secure {
        cookie.push_str("; Secure");
    }
    cookie
}

/// `Set-Cookie` value that removes the session cookie.
pub fn expired_cookie(secure: bool) -> String {
    session_cookie("", 0, secure)
}

// =============================================================================
// Passwords
// =============================================================================

/// Hashes a password with Argon2id into a PHC string.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    use argon2::password_hash::rand_core::OsRng;
    use argon2::password_hash::SaltString;
    use argon2::{Argon2, PasswordHasher};

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::internal(format!("Failed to hash password: {}", e)))?;

    Ok(hash.to_string())
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

// =============================================================================
// Access Gate
// =============================================================================

/// Resolves the caller behind a request, if any credentials were sent.
///
/// No credentials → `Ok(None)`. Bad credentials → `Err`.
pub async fn resolve_caller(
    state: &AppState,
    headers: &HeaderMap,
) -> Result<Option<Caller>, ApiError> {
    let Some(token) = token_from_headers(headers)? else {
        return Ok(None);
    };

    let claims = state.jwt.validate_token(token).map_err(|e| {
        warn!(reason = %e.message, "Rejected access token");
        e
    })?;

    let user = state
        .db
        .users()
        .find_by_email(&claims.sub)
        .await?
        .ok_or_else(|| {
            warn!(sub = %claims.sub, "Token subject no longer exists");
            ApiError::unauthenticated("User not found")
        })?;

    debug!(user_id = %user.id, role = %user.role, "Caller resolved");
    Ok(Some(Caller::from(&user)))
}

/// An authenticated caller. Handlers that take this reject anonymous
/// requests with `401`.
#[derive(Debug, Clone)]
pub struct CurrentCaller(pub Caller);

impl Deref for CurrentCaller {
    type Target = Caller;

    fn deref(&self) -> &Caller {
        &self.0
    }
}

impl FromRequestParts<AppState> for CurrentCaller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        // Check if already extracted
        if let Some(caller) = parts.extensions.get::<CurrentCaller>() {
            return Ok(caller.clone());
        }

        let caller = resolve_caller(state, &parts.headers)
            .await?
            .map(CurrentCaller)
            .ok_or_else(|| {
                warn!(uri = %parts.uri, "Missing credentials");
                ApiError::unauthenticated("Not authenticated")
            })?;

        parts.extensions.insert(caller.clone());
        Ok(caller)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use stockroom_core::RecordId;

    fn user(role: Role) -> User {
        User {
            id: RecordId::new(),
            email: "sam@example.com".to_string(),
            name: "Sam".to_string(),
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_jwt_roundtrip() {
        let manager = JwtManager::new("test-secret", 1800);

        let token = manager.generate_access_token(&user(Role::Admin)).unwrap();
        let claims = manager.validate_token(&token).unwrap();

        assert_eq!(claims.sub, "sam@example.com");
        assert_eq!(claims.role, Role::Admin);
        assert_eq!(claims.exp - claims.iat, 1800);
        assert!(!claims.jti.is_empty());
    }

    #[test]
    fn test_token_ids_are_unique() {
        let manager = JwtManager::new("test-secret", 1800);
        let a = manager.generate_access_token(&user(Role::Employee)).unwrap();
        let b = manager.generate_access_token(&user(Role::Employee)).unwrap();

        let a = manager.validate_token(&a).unwrap();
        let b = manager.validate_token(&b).unwrap();
        assert_ne!(a.jti, b.jti);
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let issuer = JwtManager::new("secret-a", 1800);
        let verifier = JwtManager::new("secret-b", 1800);

        let token = issuer.generate_access_token(&user(Role::Employee)).unwrap();
        let err = verifier.validate_token(&token).unwrap_err();
        assert_eq!(err.message, "Invalid token");
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let manager = JwtManager::new("test-secret", 1800);
        let now = Utc::now().timestamp();
        let token = manager
            .sign(&Claims {
                sub: "sam@example.com".to_string(),
                role: Role::Employee,
                iat: now - 7200,
                exp: now - 3600,
                jti: "x".to_string(),
            })
            .unwrap();

        let err = manager.validate_token(&token).unwrap_err();
        assert_eq!(err.message, "Token expired");
    }

    #[test]
    fn test_extract_bearer_token() {
        assert_eq!(extract_bearer_token("Bearer abc.def"), Some("abc.def"));
        assert_eq!(extract_bearer_token("Basic abc"), None);
        assert_eq!(extract_bearer_token("Bearer "), None);
    }

    #[test]
    fn test_token_from_cookie_shapes() {
        assert_eq!(token_from_cookie("access_token=abc"), Some("abc"));
        assert_eq!(token_from_cookie("theme=dark; access_token=abc"), Some("abc"));
        assert_eq!(token_from_cookie("access_token=\"Bearer abc\""), Some("abc"));
        assert_eq!(token_from_cookie("access_token=Bearer%20abc"), Some("abc"));
        assert_eq!(token_from_cookie("other=abc"), None);
        assert_eq!(token_from_cookie("access_token="), None);
    }

    #[test]
    fn test_header_wins_over_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_static("Bearer from-header"));
        headers.insert(COOKIE, HeaderValue::from_static("access_token=from-cookie"));
        assert_eq!(token_from_headers(&headers).unwrap(), Some("from-header"));

        headers.remove(AUTHORIZATION);
        assert_eq!(token_from_headers(&headers).unwrap(), Some("from-cookie"));

        headers.insert(AUTHORIZATION, HeaderValue::from_static("Token nope"));
        assert!(token_from_headers(&headers).is_err());
    }

    #[test]
    fn test_cookie_flags() {
        let cookie = session_cookie("abc", 1800, false);
        assert!(cookie.starts_with("access_token=abc;"));
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("SameSite=Lax"));
        assert!(cookie.contains("Max-Age=1800"));
        assert!(!cookie.contains("Secure"));

        assert!(expired_cookie(true).contains("Max-Age=0"));
        assert!(expired_cookie(true).ends_with("; Secure"));
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("Admin123!").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("Admin123!", &hash));
        assert!(!verify_password("admin123!", &hash));
        assert!(!verify_password("Admin123!", "not-a-phc-string"));
    }
}
