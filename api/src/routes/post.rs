use crate::{
    AppState,
    auth::{Identity, RequireUser},
    dto::{
        MessageResponse, PaginatedResponse, PostDetail, PostRequest, PostSummary, PostsQuery,
    },
    errors::ApiError,
    extract::{Json, Query},
    models::Post,
    pagination::paginate,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
};
use tracing::info;
use validator::Validate;

/// GET /posts?page=1&q=rust
pub async fn get_posts(
    State(state): State<AppState>,
    Query(params): Query<PostsQuery>,
) -> Result<Json<PaginatedResponse<PostSummary>>, ApiError> {
    let index = state.content.index().await?;

    let query = params.q.as_deref().map(str::trim).filter(|q| !q.is_empty());
    let posts: Vec<&Post> = match query {
        Some(q) => index.posts.iter().filter(|p| p.matches(q)).collect(),
        None => index.posts.iter().collect(),
    };

    let page = paginate(&posts, params.page, state.config.posts_per_page);
    Ok(Json(PaginatedResponse::from_page(page, |post| {
        PostSummary::from(*post)
    })))
}

/// GET /posts/{slug}
pub async fn get_post(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PostDetail>, ApiError> {
    let post = state.content.find(&slug).await?;
    Ok(Json(PostDetail::from(&post)))
}

/// POST /posts
/// Headers: Authorization: Bearer <token>
/// Body: { "title": "...", "content": "...", "tags": [...], "category": "..." }
pub async fn create_post(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Json(payload): Json<PostRequest>,
) -> Result<(StatusCode, Json<PostDetail>), ApiError> {
    payload.validate()?;

    let post = state
        .content
        .create(
            payload.into(),
            identity.user_id.clone(),
            identity.username.clone(),
        )
        .await?;

    info!("Post created: {} by user {}", post.slug, identity.username);

    Ok((StatusCode::CREATED, Json(PostDetail::from(&post))))
}

/// PUT /posts/{slug}
/// Headers: Authorization: Bearer <token>
/// Only the author or an admin may edit; the body is checked after that.
pub async fn update_post(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(slug): Path<String>,
    Json(payload): Json<PostRequest>,
) -> Result<Json<PostDetail>, ApiError> {
    let existing = state.content.find(&slug).await?;
    check_ownership(&existing, &identity)?;

    payload.validate()?;

    let post = state.content.update(&slug, payload.into()).await?;

    info!("Post updated: {} by user {}", slug, identity.username);

    Ok(Json(PostDetail::from(&post)))
}

/// DELETE /posts/{slug}
/// Headers: Authorization: Bearer <token>
pub async fn delete_post(
    State(state): State<AppState>,
    RequireUser(identity): RequireUser,
    Path(slug): Path<String>,
) -> Result<Json<MessageResponse>, ApiError> {
    let existing = state.content.find(&slug).await?;
    check_ownership(&existing, &identity)?;

    state.content.delete(&slug).await?;

    info!("Post deleted: {} by user {}", slug, identity.username);

    Ok(Json(MessageResponse::new(format!("Post '{slug}' deleted"))))
}

fn check_ownership(post: &Post, identity: &Identity) -> Result<(), ApiError> {
    if identity.is_admin() || post.is_authored_by(&identity.user_id) {
        Ok(())
    } else {
        Err(ApiError::Forbidden(
            "Only the author or an admin can modify this post".into(),
        ))
    }
}
