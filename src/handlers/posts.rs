// Post handlers
// HTTP handlers for post operations

use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    handlers::parse_id,
    models::{CreatePostRequest, ListPostsQuery, PostIdResponse, UpdatePostRequest},
    state::AppState,
};

const NO_POSTS: &str = "No posts exist";
const NO_SUCH_POST: &str = "No post exists with the given ID";
const NO_SUCH_OWNED_POST: &str = "No post exists with the given ID, or it is not yours";

/// List posts, newest first
/// GET /post?limit=&offset=
pub async fn list_posts(
    State(state): State<AppState>,
    query: Result<Query<ListPostsQuery>, QueryRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Query(query) = query.map_err(|e| ApiError::validation(e.body_text()))?;
    let page = query.page().map_err(ApiError::Validation)?;
    info!("Fetching posts with limit {} offset {}", page.limit, page.offset);

    let posts = state.repository.list_posts(page).await?;

    // An empty page is reported as missing, not as an empty array
    if posts.is_empty() {
        return Err(ApiError::not_found(NO_POSTS));
    }

    info!("Retrieved {} posts", posts.len());
    Ok((StatusCode::OK, Json(posts)))
}

/// GET /post/:id
pub async fn get_post(
    State(state): State<AppState>,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let post_id = parse_id(&post_id, "post")?;
    info!("Fetching post with id: {}", post_id);

    let post = state
        .repository
        .find_post(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_POST))?;

    Ok((StatusCode::OK, Json(post)))
}

/// Create a post authored by the caller
/// POST /post
pub async fn create_post(
    State(state): State<AppState>,
    user: CurrentUser,
    payload: Result<Json<CreatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = user.require()?;

    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let new_post = request.validate().map_err(ApiError::Validation)?;

    info!("Creating new post for user_id: {}", author_id);
    let post_id = state.repository.insert_post(author_id, &new_post).await?;

    Ok((StatusCode::OK, Json(PostIdResponse { post_id })))
}

/// Partially update a post the caller authored
/// PATCH /post/:id
pub async fn update_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
    payload: Result<Json<UpdatePostRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = user.require()?;
    let post_id = parse_id(&post_id, "post")?;

    let Json(request) = payload.map_err(|e| ApiError::validation(e.body_text()))?;
    let changes = request.into_changes().map_err(ApiError::Validation)?;

    info!("Updating post {} for user_id: {}", post_id, author_id);
    let post = state
        .repository
        .update_post(post_id, author_id, &changes)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_OWNED_POST))?;

    info!("Successfully updated post with id: {}", post.id);
    Ok((StatusCode::OK, Json(post)))
}

/// Delete a post the caller authored
/// DELETE /post/:id
pub async fn delete_post(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(post_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let author_id = user.require()?;
    let post_id = parse_id(&post_id, "post")?;

    info!("Deleting post {} for user_id: {}", post_id, author_id);
    let post_id = state
        .repository
        .delete_post(post_id, author_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_OWNED_POST))?;

    info!("Successfully deleted post with id: {}", post_id);
    Ok((StatusCode::OK, Json(PostIdResponse { post_id })))
}
