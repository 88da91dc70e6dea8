use crate::{
    AppState,
    auth::RequireAdmin,
    content::TagIndex,
    dto::{
        AdminStatsResponse, AdminTagResponse, CategoryRequest, CategoryResponse, MessageResponse,
        TagArticle, UpdateRoleRequest, UserResponse,
    },
    errors::ApiError,
    extract::Json,
    models::SiteSettings,
    routes::site::site_stats,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use std::collections::BTreeMap;
use tracing::info;
use validator::Validate;

// ============================================================================
// USERS
// ============================================================================

/// GET /admin/users
pub async fn list_users(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<UserResponse>>, ApiError> {
    let users = state.users.list().await?;
    Ok(Json(users.into_iter().map(UserResponse::from).collect()))
}

/// PUT /admin/users/{id}/role
/// Body: { "role": "admin" | "user" }
pub async fn update_user_role(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
    Json(payload): Json<UpdateRoleRequest>,
) -> Result<Json<UserResponse>, ApiError> {
    let target = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    if target.username == state.config.admin_username && target.role != payload.role {
        return Err(ApiError::Forbidden(
            "The site administrator's role cannot be changed".into(),
        ));
    }

    let user = state
        .users
        .update_role(&id, payload.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    info!("Role of {} set to {} by {}", user.username, user.role, admin.username);

    Ok(Json(user.into()))
}

/// DELETE /admin/users/{id}
/// Admins cannot delete themselves or the site administrator.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if id == admin.user_id {
        return Err(ApiError::Forbidden("You cannot delete your own account".into()));
    }

    let target = state
        .users
        .find_by_id(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".into()))?;

    if target.username == state.config.admin_username {
        return Err(ApiError::Forbidden(
            "The site administrator cannot be deleted".into(),
        ));
    }

    if !state.users.delete(&id).await? {
        return Err(ApiError::NotFound("User".into()));
    }

    info!("User {} deleted by {}", target.username, admin.username);

    Ok(Json(MessageResponse::new(format!(
        "User '{}' deleted",
        target.username
    ))))
}

// ============================================================================
// CATEGORIES
// ============================================================================

/// GET /admin/categories
/// Registered categories plus any category that only appears in posts.
pub async fn list_categories(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<CategoryResponse>>, ApiError> {
    let registered = state.categories.list().await?;
    let index = state.content.index().await?;

    let mut counts: BTreeMap<&str, usize> =
        registered.iter().map(|c| (c.name.as_str(), 0)).collect();
    for category in index.posts.iter().filter_map(|p| p.category.as_deref()) {
        *counts.entry(category).or_default() += 1;
    }

    Ok(Json(
        counts
            .into_iter()
            .map(|(name, count)| {
                CategoryResponse::new(name, count, registered.iter().find(|c| c.name == name))
            })
            .collect(),
    ))
}

/// POST /admin/categories
/// Body: { "name": "..." }
pub async fn create_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(payload): Json<CategoryRequest>,
) -> Result<(StatusCode, Json<CategoryResponse>), ApiError> {
    payload.validate()?;
    let name = payload.name.trim();

    let category = state.categories.create(name).await?;
    info!("Category created: {} by {}", category.name, admin.username);

    Ok((
        StatusCode::CREATED,
        Json(CategoryResponse::new(&category.name, 0, Some(&category))),
    ))
}

/// PUT /admin/categories/{name}
/// Body: { "name": "..." }
/// Posts filed under the old name move to the new one.
pub async fn rename_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
    Json(payload): Json<CategoryRequest>,
) -> Result<Json<CategoryResponse>, ApiError> {
    payload.validate()?;
    let new_name = payload.name.trim();

    // a category may exist only in post front-matter; the row rename is
    // rolled back if rewriting the posts fails
    let content = &state.content;
    let from = name.as_str();
    let (category, moved) = state
        .categories
        .rename_with(from, new_name, move || async move {
            content
                .rename_category(from, new_name)
                .await
                .map_err(ApiError::from)
        })
        .await?;
    if category.is_none() && moved == 0 {
        return Err(ApiError::NotFound(format!("Category '{name}'")));
    }

    info!(
        "Category {} renamed to {} by {} ({} posts moved)",
        name, new_name, admin.username, moved
    );

    Ok(Json(CategoryResponse::new(new_name, moved, category.as_ref())))
}

/// DELETE /admin/categories/{name}
/// Posts keep their category text; only the registration goes away.
pub async fn delete_category(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !state.categories.delete(&name).await? {
        return Err(ApiError::NotFound(format!("Category '{name}'")));
    }
    info!("Category {} deleted by {}", name, admin.username);

    Ok(Json(MessageResponse::new(format!("Category '{name}' deleted"))))
}

// ============================================================================
// TAGS, SETTINGS, STATS
// ============================================================================

/// GET /admin/tags
pub async fn list_tags(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<Vec<AdminTagResponse>>, ApiError> {
    let index = state.content.index().await?;
    let tags = TagIndex::build(&index.posts);

    Ok(Json(
        tags.iter()
            .map(|(name, posts)| AdminTagResponse {
                name: name.to_string(),
                slug: slug::slugify(name),
                article_count: posts.len(),
                articles: posts
                    .iter()
                    .map(|p| TagArticle {
                        slug: p.slug.clone(),
                        title: p.title.clone(),
                    })
                    .collect(),
            })
            .collect(),
    ))
}

/// GET /admin/settings
pub async fn get_settings(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<SiteSettings>, ApiError> {
    Ok(Json(state.settings.load().await?))
}

/// PUT /admin/settings
/// Missing keys fall back to their defaults.
pub async fn update_settings(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Json(settings): Json<SiteSettings>,
) -> Result<Json<SiteSettings>, ApiError> {
    if settings.site_title.trim().is_empty() {
        return Err(ApiError::ValidationError("site_title must not be empty".into()));
    }

    state.settings.save(&settings).await?;
    info!("Settings updated by {}", admin.username);

    Ok(Json(settings))
}

/// GET /admin/stats
pub async fn get_admin_stats(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
) -> Result<Json<AdminStatsResponse>, ApiError> {
    let index = state.content.index().await?;
    let stats = site_stats(&state, &index).await?;

    Ok(Json(AdminStatsResponse {
        posts: stats.post_count,
        categories: stats.category_count,
        tags: stats.tag_count,
        users: state.users.count().await?,
    }))
}
