// Handlers module
// HTTP handlers for the REST API

pub mod posts;
pub mod users;

use axum::{extract::State, http::StatusCode, response::IntoResponse};

use crate::{error::ApiError, state::AppState};

/// Returns "OK" once the database answers.
pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    state.repository.health_check().await?;
    Ok((StatusCode::OK, "OK"))
}

/// Path ids are numeric.
pub(crate) fn parse_id(raw: &str, resource: &str) -> Result<i64, ApiError> {
    raw.parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid {} ID format", resource)))
}
