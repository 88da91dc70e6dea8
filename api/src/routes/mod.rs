pub mod admin;
pub mod health;
pub mod post;
pub mod site;
pub mod theme;
pub mod user;

use crate::{AppState, errors::ApiError};
use axum::{
    Json, Router,
    error_handling::HandleErrorLayer,
    extract::{Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
};
use serde_json::json;
use tower::{BoxError, ServiceBuilder};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::warn;

/// Build the full application: public site routes, the JSON API under
/// `/api`, and the shared middleware stack.
pub fn router(state: AppState) -> Router {
    // Configure CORS
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Credential endpoints share one rate limiter
    let credentials = Router::new()
        .route("/auth/login", post(user::login))
        .route("/auth/register", post(user::register))
        .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit));

    let api = Router::new()
        .merge(credentials)
        .route("/auth/logout", post(user::logout))
        .route("/auth/me", get(user::get_current_user))
        .route("/auth/check", get(user::check_auth))
        // Posts
        .route("/posts", get(post::get_posts).post(post::create_post))
        .route(
            "/posts/{slug}",
            get(post::get_post)
                .put(post::update_post)
                .delete(post::delete_post),
        )
        // Site
        .route("/tags", get(site::get_tags))
        .route("/tags/{tag}", get(site::get_tag))
        .route("/archive", get(site::get_archive))
        .route("/about", get(site::get_about))
        .route("/stats", get(site::get_stats))
        // Themes
        .route("/themes", get(theme::list_themes))
        .route("/themes/active", get(theme::active_theme))
        .route("/themes/activate", post(theme::activate_theme))
        // Admin
        .route("/admin/users", get(admin::list_users))
        .route("/admin/users/{id}", delete(admin::delete_user))
        .route("/admin/users/{id}/role", put(admin::update_user_role))
        .route(
            "/admin/categories",
            get(admin::list_categories).post(admin::create_category),
        )
        .route(
            "/admin/categories/{name}",
            put(admin::rename_category).delete(admin::delete_category),
        )
        .route("/admin/tags", get(admin::list_tags))
        .route(
            "/admin/settings",
            get(admin::get_settings).put(admin::update_settings),
        )
        .route("/admin/stats", get(admin::get_admin_stats));

    let request_timeout = state.config.request_timeout;
    let max_concurrent = state.config.max_concurrent_requests;

    Router::new()
        .route("/health", get(health::health_check))
        .route("/feed.xml", get(site::feed))
        .nest("/api", api)
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_middleware_error))
                .timeout(request_timeout)
                .concurrency_limit(max_concurrent),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Reject the request once the credential endpoints exhaust their quota.
async fn rate_limit(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if state.auth_limiter.check().is_err() {
        warn!("Rate limit hit on {}", request.uri().path());
        return Err(ApiError::TooManyRequests);
    }
    Ok(next.run(request).await)
}

async fn handle_middleware_error(err: BoxError) -> Response {
    if err.is::<tower::timeout::error::Elapsed>() {
        (
            StatusCode::REQUEST_TIMEOUT,
            Json(json!({ "error": "Request timed out" })),
        )
            .into_response()
    } else {
        ApiError::InternalError(format!("Unhandled middleware error: {err}")).into_response()
    }
}
