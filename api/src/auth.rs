use crate::{errors::ApiError, models::Role, states::AppState};
use axum::{
    extract::FromRequestParts,
    http::{HeaderMap, header, request::Parts},
};
use axum_extra::extract::cookie::CookieJar;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

/// Tokens are valid for this many days after issue.
pub const TOKEN_VALIDITY_DAYS: i64 = 7;

/// Cookie that may carry the token instead of the `Authorization` header.
pub const TOKEN_COOKIE: &str = "token";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // Subject (user ID)
    pub username: String,
    pub role: Role,
    pub iat: usize,
    pub exp: usize,
}

/// Issues and verifies HS256 session tokens with a process-wide secret.
#[derive(Clone)]
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
}

impl TokenService {
    pub fn new(secret: &str) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
        }
    }

    pub fn issue(&self, user_id: &str, username: &str, role: Role) -> Result<String, ApiError> {
        self.issue_at(user_id, username, role, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        username: &str,
        role: Role,
        issued_at: DateTime<Utc>,
    ) -> Result<String, ApiError> {
        let expiration = issued_at
            .checked_add_signed(Duration::days(TOKEN_VALIDITY_DAYS))
            .ok_or_else(|| ApiError::InternalError("Failed to calculate expiration".into()))?;

        let claims = Claims {
            sub: user_id.to_string(),
            username: username.to_string(),
            role,
            iat: issued_at.timestamp().max(0) as usize,
            exp: expiration.timestamp().max(0) as usize,
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| ApiError::InternalError(format!("Token Creation failed: {}", e)))
    }

    /// Bad signatures, malformed tokens and expired tokens all yield the
    /// same error.
    pub fn verify(&self, token: &str) -> Result<Claims, ApiError> {
        decode::<Claims>(token, &self.decoding, &self.validation)
            .map(|data| data.claims)
            .map_err(|_| ApiError::TokenInvalid)
    }
}

/// The caller a verified token resolved to.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Identity {
    pub user_id: String,
    pub username: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }
}

impl From<Claims> for Identity {
    fn from(claims: Claims) -> Self {
        Self {
            user_id: claims.sub,
            username: claims.username,
            role: claims.role,
        }
    }
}

/// What a protected operation asks of the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Authenticated,
    User,
    Admin,
}

/// Take the token from `Authorization: Bearer <token>`, else from the
/// token cookie.
pub fn extract_token(headers: &HeaderMap) -> Option<String> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty());

    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    CookieJar::from_headers(headers)
        .get(TOKEN_COOKIE)
        .map(|c| c.value().to_string())
        .filter(|t| !t.is_empty())
}

/// Run the guard for `access` against the request headers.
pub fn authorize(
    headers: &HeaderMap,
    tokens: &TokenService,
    access: Access,
) -> Result<Identity, ApiError> {
    let token = extract_token(headers).ok_or(ApiError::TokenMissing)?;
    let identity = Identity::from(tokens.verify(&token)?);

    match access {
        Access::Authenticated | Access::User => Ok(identity),
        Access::Admin if identity.is_admin() => Ok(identity),
        Access::Admin => Err(ApiError::admin_required()),
    }
}

/// Any caller with a valid token.
#[derive(Debug, Clone)]
pub struct Authenticated(pub Identity);

/// A signed-in user of any role; reads as intent on handlers that act on
/// behalf of a user.
#[derive(Debug, Clone)]
pub struct RequireUser(pub Identity);

/// A caller whose token carries the admin role.
#[derive(Debug, Clone)]
pub struct RequireAdmin(pub Identity);

/// The caller's identity if a valid token was sent, without rejecting.
#[derive(Debug, Clone)]
pub struct MaybeAuthenticated(pub Option<Identity>);

impl FromRequestParts<AppState> for Authenticated {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.tokens, Access::Authenticated).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.tokens, Access::User).map(Self)
    }
}

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(&parts.headers, &state.tokens, Access::Admin).map(Self)
    }
}

impl FromRequestParts<AppState> for MaybeAuthenticated {
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        Ok(Self(
            authorize(&parts.headers, &state.tokens, Access::Authenticated).ok(),
        ))
    }
}

pub async fn hash_password(password: String, cost: u32) -> Result<String, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await?
        .map_err(|e| ApiError::InternalError(format!("Password hashing failed: {}", e)))
}

pub async fn verify_password(password: String, hash: String) -> Result<bool, ApiError> {
    tokio::task::spawn_blocking(move || bcrypt::verify(password, &hash))
        .await?
        .map_err(|e| ApiError::InternalError(format!("Password verification failed: {}", e)))
}
