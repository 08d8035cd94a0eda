use std::time::Duration;

use axum::{
    middleware::from_fn_with_state,
    routing::{get, post},
    Router,
};

use crate::{
    handlers::{
        health_check,
        posts::{create_post, delete_post, get_post, list_posts, update_post},
        users::{current_user, get_user, logout},
    },
    middleware::{create_middleware_stack, resolve_session},
    state::AppState,
};

/// Builds the router with every endpoint, the session middleware and the outer
/// tracing/CORS/timeout stack.
pub fn create_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/post", get(list_posts).post(create_post))
        .route(
            "/post/:id",
            get(get_post).patch(update_post).delete(delete_post),
        )
        .route("/user/me", get(current_user))
        .route("/user/logout", post(logout))
        .route("/user/:id", get(get_user))
        .layer(from_fn_with_state(state.clone(), resolve_session))
        .with_state(state)
        .layer(create_middleware_stack(request_timeout))
}
