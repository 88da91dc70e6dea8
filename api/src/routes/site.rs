use crate::{
    AppState,
    content::{PostIndex, TagIndex},
    dto::{
        AboutResponse, ArchiveResponse, ArchiveYear, PostSummary, SiteStats, TagPostsResponse,
        TagsResponse,
    },
    errors::ApiError,
};
use axum::{
    Json,
    extract::{Path, State},
    http::header,
    response::IntoResponse,
};
use chrono::{Datelike, Utc};
use rss::{CategoryBuilder, ChannelBuilder, GuidBuilder, ItemBuilder};
use std::collections::BTreeSet;

/// Number of posts carried by the feed.
pub const FEED_SIZE: usize = 10;
/// Minutes a feed reader may cache the feed.
pub const FEED_TTL_MINUTES: u32 = 60;
const FEED_LANGUAGE: &str = "zh-cn";

/// GET /tags
pub async fn get_tags(State(state): State<AppState>) -> Result<Json<TagsResponse>, ApiError> {
    let index = state.content.index().await?;
    let tags = TagIndex::build(&index.posts);

    Ok(Json(TagsResponse {
        tags: tags
            .counts()
            .iter()
            .map(|(tag, count)| (tag.to_string(), *count))
            .collect(),
        tag_posts: tags
            .iter()
            .map(|(tag, posts)| {
                (
                    tag.to_string(),
                    posts.iter().map(|p| PostSummary::from(*p)).collect(),
                )
            })
            .collect(),
    }))
}

/// GET /tags/{tag}
/// An unknown tag is an empty list, not a 404.
pub async fn get_tag(
    State(state): State<AppState>,
    Path(tag): Path<String>,
) -> Result<Json<TagPostsResponse>, ApiError> {
    let index = state.content.index().await?;
    let tags = TagIndex::build(&index.posts);

    Ok(Json(TagPostsResponse {
        count: tags.count(&tag),
        posts: tags.posts(&tag).iter().map(|p| PostSummary::from(*p)).collect(),
        tag,
    }))
}

/// GET /archive
pub async fn get_archive(State(state): State<AppState>) -> Result<Json<ArchiveResponse>, ApiError> {
    let index = state.content.index().await?;
    let stats = site_stats(&state, &index).await?;

    let mut years: Vec<ArchiveYear> = Vec::new();
    for post in &index.posts {
        let year = post.date.year();
        match years.last_mut() {
            Some(group) if group.year == year => group.posts.push(post.into()),
            _ => years.push(ArchiveYear {
                year,
                posts: vec![post.into()],
            }),
        }
    }

    Ok(Json(ArchiveResponse {
        articles: index.posts.iter().map(PostSummary::from).collect(),
        years,
        stats,
    }))
}

/// GET /about
pub async fn get_about(State(state): State<AppState>) -> Result<Json<AboutResponse>, ApiError> {
    let index = state.content.index().await?;
    let stats = site_stats(&state, &index).await?;
    let settings = state.settings.load().await?;

    Ok(Json(AboutResponse {
        site_title: settings.site_title,
        site_description: settings.site_description,
        site_author: settings.site_author,
        social_links: settings.social_links,
        stats,
    }))
}

/// GET /stats
pub async fn get_stats(State(state): State<AppState>) -> Result<Json<SiteStats>, ApiError> {
    let index = state.content.index().await?;
    Ok(Json(site_stats(&state, &index).await?))
}

/// GET /feed.xml
/// RSS 2.0 feed of the newest posts.
pub async fn feed(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let settings = state.settings.load().await?;
    if !settings.features.rss_enabled {
        return Err(ApiError::NotFound("Feed".into()));
    }

    let index = state.content.index().await?;
    let site_url = &state.config.site_url;

    let items: Vec<rss::Item> = index
        .posts
        .iter()
        .take(FEED_SIZE)
        .map(|post| {
            let link = format!("{site_url}/posts/{}", post.slug);
            ItemBuilder::default()
                .title(post.title.clone())
                .link(link.clone())
                .guid(GuidBuilder::default().permalink(true).value(link).build())
                .description(post.summary.clone())
                .pub_date(post.date.to_rfc2822())
                .author(post.author_name.clone())
                .categories(
                    post.tags
                        .iter()
                        .map(|tag| CategoryBuilder::default().name(tag.clone()).build())
                        .collect::<Vec<_>>(),
                )
                .build()
        })
        .collect();

    let channel = ChannelBuilder::default()
        .title(settings.site_title.clone())
        .link(site_url.clone())
        .description(settings.site_description.clone())
        .language(FEED_LANGUAGE.to_string())
        .managing_editor(settings.site_author.clone())
        .copyright(format!("Copyright {} {}", Utc::now().year(), settings.site_author))
        .ttl(FEED_TTL_MINUTES.to_string())
        .items(items)
        .build();

    Ok((
        [(header::CONTENT_TYPE, "application/rss+xml; charset=utf-8")],
        channel.to_string(),
    ))
}

pub(crate) async fn site_stats(state: &AppState, index: &PostIndex) -> Result<SiteStats, ApiError> {
    let mut categories: BTreeSet<String> = state
        .categories
        .list()
        .await?
        .into_iter()
        .map(|c| c.name)
        .collect();
    categories.extend(index.posts.iter().filter_map(|p| p.category.clone()));

    let days_running = (Utc::now().date_naive() - state.config.site_start_date)
        .num_days()
        .max(0);

    Ok(SiteStats {
        post_count: index.posts.len(),
        tag_count: TagIndex::build(&index.posts).len(),
        category_count: categories.len(),
        days_running,
    })
}
