use crate::{
    AppState,
    auth::{Authenticated, MaybeAuthenticated, TOKEN_COOKIE, hash_password, verify_password},
    dto::{
        AuthCheckResponse, AuthResponse, LoginRequest, MessageResponse, RegisterRequest,
        UserResponse,
    },
    errors::ApiError,
    extract::Json,
    models::{Role, User},
};
use axum::{extract::State, http::StatusCode};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use chrono::Utc;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

fn token_cookie(state: &AppState, token: String) -> Cookie<'static> {
    Cookie::build((TOKEN_COOKIE, token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(!state.config.is_development())
        .build()
}

/// POST /auth/register
/// Body: { "username": "...", "email": "...", "password": "..." }
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, CookieJar, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    // the site administrator account is only created at startup
    if payload
        .username
        .eq_ignore_ascii_case(&state.config.admin_username)
    {
        return Err(ApiError::Forbidden("This username is reserved".into()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        username: payload.username,
        email: payload.email,
        password_hash: hash_password(payload.password, state.config.bcrypt_cost).await?,
        role: Role::User,
        created_at: Utc::now(),
    };

    // the store rejects a taken username atomically
    let user = state.users.insert(user).await?;
    let token = state.tokens.issue(&user.id, &user.username, user.role)?;

    info!("New user registered: {}", user.username);

    Ok((
        StatusCode::CREATED,
        jar.add(token_cookie(&state, token.clone())),
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /auth/login
/// Body: { "username": "...", "password": "..." }
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<AuthResponse>), ApiError> {
    payload.validate()?;

    let user = state
        .users
        .find_by_username(&payload.username)
        .await?
        .ok_or(ApiError::InvalidCredentials)?;

    // Verify password
    if !verify_password(payload.password, user.password_hash.clone()).await? {
        return Err(ApiError::InvalidCredentials);
    }

    let token = state.tokens.issue(&user.id, &user.username, user.role)?;

    info!("User logged in: {}", user.username);

    Ok((
        jar.add(token_cookie(&state, token.clone())),
        Json(AuthResponse {
            token,
            user: user.into(),
        }),
    ))
}

/// POST /auth/logout
/// Tokens are stateless; this only clears the cookie.
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<MessageResponse>) {
    (
        jar.remove(Cookie::build(TOKEN_COOKIE).path("/")),
        Json(MessageResponse::new("Logged out")),
    )
}

/// GET /auth/me
/// Headers: Authorization: Bearer <token>
pub async fn get_current_user(
    State(state): State<AppState>,
    Authenticated(identity): Authenticated,
) -> Result<Json<UserResponse>, ApiError> {
    let user = state
        .users
        .find_by_id(&identity.user_id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    Ok(Json(user.into()))
}

/// GET /auth/check
/// Never rejects; reports whether the caller holds a valid token.
pub async fn check_auth(
    MaybeAuthenticated(identity): MaybeAuthenticated,
) -> Json<AuthCheckResponse> {
    Json(AuthCheckResponse {
        is_authenticated: identity.is_some(),
        user: identity,
    })
}
