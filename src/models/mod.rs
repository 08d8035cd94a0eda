// Models module

pub mod post;
pub mod user;

use serde::{Deserialize, Serialize};

// Re-export commonly used types
pub use post::{CreatePostRequest, ListPostsQuery, NewPost, Page, Post, PostChanges, UpdatePostRequest};
pub use user::User;

/// `{"postId": ...}` response body for create and delete.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PostIdResponse {
    #[serde(rename = "postId")]
    pub post_id: i64,
}

/// `{"userId": ...}` response body for logout.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UserIdResponse {
    #[serde(rename = "userId")]
    pub user_id: i64,
}
