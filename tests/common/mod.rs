#![allow(dead_code)]

use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc, Mutex,
};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Utc};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use postboard_api::{
    auth::JwtVerifier,
    models::{NewPost, Page, Post, PostChanges, User},
    routes::create_router,
    ApiError, ApiResult, AppState, Repository,
};

pub const SECRET: &str = "integration-secret";
pub const SKEW_SECS: i64 = 2;

struct StoredUser {
    user: User,
    logout_time: DateTime<Utc>,
}

#[derive(Default)]
struct Tables {
    users: Vec<StoredUser>,
    posts: Vec<Post>,
    next_post_id: i64,
}

/// Mirrors the PostgreSQL statements closely enough to exercise the routers.
#[derive(Default)]
pub struct InMemoryRepository {
    tables: Mutex<Tables>,
    session_lookups: AtomicUsize,
    failing: bool,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every operation answers with a database error.
    pub fn failing() -> Self {
        Self {
            failing: true,
            ..Self::default()
        }
    }

    /// Adds a user whose last logout lies an hour in the past.
    pub fn add_user(&self, id: i64, email: &str) {
        let now = Utc::now();
        let mut tables = self.tables.lock().expect("lock");
        tables.users.push(StoredUser {
            user: User {
                id,
                email: email.to_string(),
                creation_time: now,
                modification_time: now,
            },
            logout_time: now - chrono::Duration::hours(1),
        });
    }

    pub fn set_logout_time(&self, id: i64, at: DateTime<Utc>) {
        let mut tables = self.tables.lock().expect("lock");
        if let Some(stored) = tables.users.iter_mut().find(|u| u.user.id == id) {
            stored.logout_time = at;
        }
    }

    pub fn logout_time(&self, id: i64) -> Option<DateTime<Utc>> {
        let tables = self.tables.lock().expect("lock");
        tables
            .users
            .iter()
            .find(|u| u.user.id == id)
            .map(|u| u.logout_time)
    }

    pub fn session_lookups(&self) -> usize {
        self.session_lookups.load(Ordering::SeqCst)
    }

    pub fn post_count(&self) -> usize {
        self.tables.lock().expect("lock").posts.len()
    }

    fn check(&self) -> ApiResult<()> {
        if self.failing {
            Err(ApiError::Database(
                "Database operation failed: connection reset".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn health_check(&self) -> ApiResult<()> {
        self.check()
    }

    async fn find_session_user(
        &self,
        user_id: i64,
        issued_before: DateTime<Utc>,
    ) -> ApiResult<Option<i64>> {
        self.session_lookups.fetch_add(1, Ordering::SeqCst);
        self.check()?;
        let tables = self.tables.lock().expect("lock");
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.id == user_id && u.logout_time < issued_before)
            .map(|u| u.user.id))
    }

    async fn list_posts(&self, page: Page) -> ApiResult<Vec<Post>> {
        self.check()?;
        let tables = self.tables.lock().expect("lock");
        Ok(tables
            .posts
            .iter()
            .rev()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn find_post(&self, post_id: i64) -> ApiResult<Option<Post>> {
        self.check()?;
        let tables = self.tables.lock().expect("lock");
        Ok(tables.posts.iter().find(|p| p.id == post_id).cloned())
    }

    async fn insert_post(&self, author_id: i64, post: &NewPost) -> ApiResult<i64> {
        self.check()?;
        let mut tables = self.tables.lock().expect("lock");
        if !tables.users.iter().any(|u| u.user.id == author_id) {
            return Err(ApiError::validation("Referenced user does not exist"));
        }
        tables.next_post_id += 1;
        let id = tables.next_post_id;
        let now = Utc::now();
        tables.posts.push(Post {
            id,
            title: post.title.clone(),
            contents: post.contents.clone(),
            user_id: author_id,
            creation_time: now,
            modification_time: now,
        });
        Ok(id)
    }

    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        changes: &PostChanges,
    ) -> ApiResult<Option<Post>> {
        self.check()?;
        let mut tables = self.tables.lock().expect("lock");
        let Some(post) = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post_id && p.user_id == author_id)
        else {
            return Ok(None);
        };
        if let Some(title) = changes.title() {
            post.title = title.to_string();
        }
        if let Some(contents) = changes.contents() {
            post.contents = contents.to_string();
        }
        post.modification_time = Utc::now();
        Ok(Some(post.clone()))
    }

    async fn delete_post(&self, post_id: i64, author_id: i64) -> ApiResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock().expect("lock");
        let before = tables.posts.len();
        tables
            .posts
            .retain(|p| !(p.id == post_id && p.user_id == author_id));
        Ok((tables.posts.len() < before).then_some(post_id))
    }

    async fn find_user(&self, user_id: i64) -> ApiResult<Option<User>> {
        self.check()?;
        let tables = self.tables.lock().expect("lock");
        Ok(tables
            .users
            .iter()
            .find(|u| u.user.id == user_id)
            .map(|u| u.user.clone()))
    }

    async fn record_logout(&self, user_id: i64) -> ApiResult<Option<i64>> {
        self.check()?;
        let mut tables = self.tables.lock().expect("lock");
        let now = Utc::now();
        Ok(tables
            .users
            .iter_mut()
            .find(|u| u.user.id == user_id)
            .map(|stored| {
                stored.logout_time = now;
                stored.user.modification_time = now;
                stored.user.id
            }))
    }
}

pub struct TestApp {
    pub router: Router,
    pub repository: Arc<InMemoryRepository>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_repository(InMemoryRepository::new())
    }

    /// Users 1 (alice) and 2 (bob) exist.
    pub fn seeded() -> Self {
        let app = Self::new();
        app.repository.add_user(1, "alice@example.com");
        app.repository.add_user(2, "bob@example.com");
        app
    }

    pub fn with_repository(repository: InMemoryRepository) -> Self {
        let repository = Arc::new(repository);
        let state = AppState::new(
            repository.clone(),
            Arc::new(JwtVerifier::new(SECRET)),
            SKEW_SECS,
        );
        Self {
            router: create_router(state, Duration::from_secs(5)),
            repository,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self
            .router
            .clone()
            .oneshot(builder.body(body).expect("request"))
            .await
            .expect("infallible router");

        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("read body");
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };
        (status, value)
    }

    pub async fn create_post(&self, token: &str, title: &str, contents: &str) -> i64 {
        let (status, body) = self
            .request(
                Method::POST,
                "/post",
                Some(token),
                Some(json!({"title": title, "contents": contents})),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create failed: {}", body);
        body["postId"].as_i64().expect("postId")
    }
}

/// A token for `user_id` issued now and valid for an hour.
pub fn token_for(user_id: i64) -> String {
    let now = Utc::now().timestamp();
    sign(json!({"userId": user_id.to_string(), "iat": now, "exp": now + 3600}), SECRET)
}

pub fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .expect("encode token")
}
