use crate::{
    AppState, auth::RequireAdmin, dto::ActivateThemeRequest, errors::ApiError, extract::Json,
    models::ThemeRecord,
};
use axum::extract::State;
use tracing::info;
use validator::Validate;

/// GET /themes
pub async fn list_themes(
    State(state): State<AppState>,
) -> Result<Json<Vec<ThemeRecord>>, ApiError> {
    Ok(Json(state.themes.list().await?))
}

/// GET /themes/active
pub async fn active_theme(State(state): State<AppState>) -> Result<Json<ThemeRecord>, ApiError> {
    state
        .themes
        .active()
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("Active theme".into()))
}

/// POST /themes/activate
/// Body: { "theme": "dark" }
/// Unknown names are registered on the fly.
pub async fn activate_theme(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<ActivateThemeRequest>,
) -> Result<Json<ThemeRecord>, ApiError> {
    payload.validate()?;

    let theme = state.themes.activate(&payload.theme).await?;
    info!("Theme {} activated by {}", theme.name, admin.username);

    Ok(Json(theme))
}
