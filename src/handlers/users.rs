// User handlers

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use tracing::info;

use crate::{
    auth::CurrentUser,
    error::ApiError,
    handlers::parse_id,
    models::UserIdResponse,
    state::AppState,
};

const NO_SUCH_USER: &str = "No user exists with the given ID";

/// GET /user/:id
pub async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = parse_id(&user_id, "user")?;
    info!("Fetching user with id: {}", user_id);

    let user = state
        .repository
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_USER))?;

    Ok((StatusCode::OK, Json(user)))
}

/// The authenticated caller's own record
/// GET /user/me
pub async fn current_user(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.require()?;

    let user = state
        .repository
        .find_user(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_USER))?;

    Ok((StatusCode::OK, Json(user)))
}

/// Invalidate every token issued to the caller so far
/// POST /user/logout
pub async fn logout(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = user.require()?;

    let user_id = state
        .repository
        .record_logout(user_id)
        .await?
        .ok_or_else(|| ApiError::not_found(NO_SUCH_USER))?;

    info!("User {} logged out", user_id);
    Ok((StatusCode::OK, Json(UserIdResponse { user_id })))
}
