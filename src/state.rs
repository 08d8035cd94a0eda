use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::repository::Repository;

/// Shared handles injected into every handler and the auth middleware.
#[derive(Clone)]
pub struct AppState {
    pub repository: Arc<dyn Repository>,
    pub tokens: Arc<dyn TokenVerifier>,
    pub session_skew_secs: i64,
}

impl AppState {
    pub fn new(
        repository: Arc<dyn Repository>,
        tokens: Arc<dyn TokenVerifier>,
        session_skew_secs: i64,
    ) -> Self {
        Self {
            repository,
            tokens,
            session_skew_secs,
        }
    }
}
