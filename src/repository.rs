use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ApiResult;
use crate::models::{NewPost, Page, Post, PostChanges, User};

/// Storage operations the routers depend on.
///
/// Mutations take the acting user's id and only touch rows that user authored;
/// `None` means no row matched, whether it is missing or owned by someone else.
#[async_trait]
pub trait Repository: Send + Sync {
    async fn health_check(&self) -> ApiResult<()>;

    /// Returns the user id when the user exists and logged out strictly before `issued_before`.
    async fn find_session_user(
        &self,
        user_id: i64,
        issued_before: DateTime<Utc>,
    ) -> ApiResult<Option<i64>>;

    async fn list_posts(&self, page: Page) -> ApiResult<Vec<Post>>;

    async fn find_post(&self, post_id: i64) -> ApiResult<Option<Post>>;

    async fn insert_post(&self, author_id: i64, post: &NewPost) -> ApiResult<i64>;

    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        changes: &PostChanges,
    ) -> ApiResult<Option<Post>>;

    async fn delete_post(&self, post_id: i64, author_id: i64) -> ApiResult<Option<i64>>;

    async fn find_user(&self, user_id: i64) -> ApiResult<Option<User>>;

    /// Stamps the user's logout time, invalidating every token issued before now.
    async fn record_logout(&self, user_id: i64) -> ApiResult<Option<i64>>;
}
