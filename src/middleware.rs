use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap, Method},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    cors::{AllowHeaders, Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{debug, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{
    auth::AuthUser,
    config::Environment,
    state::AppState,
};

/// Creates the outer middleware stack: request tracing, CORS, request timeout.
pub fn create_middleware_stack(
    request_timeout: Duration,
) -> ServiceBuilder<
    tower::layer::util::Stack<
        TimeoutLayer,
        tower::layer::util::Stack<
            CorsLayer,
            tower::layer::util::Stack<
                TraceLayer<
                    tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>,
                    DefaultMakeSpan,
                    DefaultOnRequest,
                    DefaultOnResponse,
                >,
                tower::layer::util::Identity,
            >,
        >,
    >,
> {
    ServiceBuilder::new()
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(create_cors_layer())
        .layer(TimeoutLayer::new(request_timeout))
}

fn create_cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        // A wildcard would not cover `authorization`
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(false)
}

/// Resolves the caller's session and attaches [`AuthUser`] to the request.
///
/// Never rejects: a missing or unverifiable token, a logged-out session, or a
/// failed lookup all leave the request anonymous. At most one database query
/// is issued per request.
pub async fn resolve_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    if let Some(user_id) = session_user(&state, request.headers()).await {
        request.extensions_mut().insert(AuthUser { user_id });
    }

    next.run(request).await
}

async fn session_user(state: &AppState, headers: &HeaderMap) -> Option<i64> {
    let token = bearer_token(headers)?;

    let claims = match state.tokens.verify(token) {
        Ok(claims) => claims,
        Err(e) => {
            debug!("Ignoring unverifiable token: {}", e);
            return None;
        }
    };

    let user_id = claims.user_id.parse()?;
    let cutoff = claims.session_cutoff(state.session_skew_secs)?;

    match state.repository.find_session_user(user_id, cutoff).await {
        Ok(found) => {
            if found.is_none() {
                debug!("Session for user {} is no longer valid", user_id);
            }
            found
        }
        Err(e) => {
            warn!("Session lookup failed, continuing anonymously: {}", e);
            None
        }
    }
}

/// Reads the `authorization` header; a `Bearer ` prefix is optional.
fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let raw = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let token = raw.strip_prefix("Bearer ").unwrap_or(raw).trim();
    (!token.is_empty()).then_some(token)
}

/// Initializes the global subscriber. Production logs are JSON.
pub fn init_tracing(environment: &Environment) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(env_filter);

    if environment.is_production() {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(false)
                    .with_span_list(true)
                    .with_target(true)
                    .with_thread_ids(true),
            )
            .try_init()?;
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true))
            .try_init()?;
    }

    tracing::info!("Structured logging initialized");
    Ok(())
}
