pub mod statements;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_postgres::{Config, Object, Pool, Runtime};
use native_tls::TlsConnector;
use postgres_native_tls::MakeTlsConnector;
use tracing::{error, info, warn};

use crate::config::DatabaseConfig;
use crate::error::{ApiError, ApiResult};
use crate::models::{NewPost, Page, Post, PostChanges, User};
use crate::repository::Repository;
use statements::PostUpdate;

/// PostgreSQL-backed repository holding the process-wide connection pool.
#[derive(Clone)]
pub struct Database {
    pool: Pool,
}

impl Database {
    /// Builds the pool and checks connectivity before returning.
    pub async fn new(config: DatabaseConfig) -> Result<Self, ApiError> {
        info!("Creating PostgreSQL connection pool for host: {}:{}", config.host, config.port);

        let pool = Self::create_pool(config)?;

        let db = Database { pool };
        db.test_connection().await?;

        Ok(db)
    }

    fn create_pool(config: DatabaseConfig) -> Result<Pool, ApiError> {
        let mut pg_config = Config::new();

        pg_config.host = Some(config.host);
        pg_config.port = Some(config.port);
        pg_config.dbname = Some(config.database);
        pg_config.user = Some(config.username);
        pg_config.password = Some(config.password);

        pg_config.ssl_mode = Some(match config.ssl_mode.as_str() {
            "disable" => deadpool_postgres::SslMode::Disable,
            "prefer" => deadpool_postgres::SslMode::Prefer,
            "require" => deadpool_postgres::SslMode::Require,
            other => {
                warn!("Unknown SSL mode '{}', defaulting to 'prefer'", other);
                deadpool_postgres::SslMode::Prefer
            }
        });

        pg_config.manager = Some(deadpool_postgres::ManagerConfig {
            recycling_method: deadpool_postgres::RecyclingMethod::Fast,
        });

        let mut pool_config = deadpool_postgres::PoolConfig::new(config.max_connections as usize);
        pool_config.timeouts.wait = Some(config.connection_timeout);
        pool_config.timeouts.create = Some(config.connection_timeout);
        pool_config.timeouts.recycle = Some(config.connection_timeout);
        pg_config.pool = Some(pool_config);

        let tls_connector = TlsConnector::builder().build().map_err(|e| {
            error!("Failed to create TLS connector: {}", e);
            ApiError::Database(format!("TLS connector creation failed: {}", e))
        })?;
        let tls = MakeTlsConnector::new(tls_connector);

        pg_config.create_pool(Some(Runtime::Tokio1), tls).map_err(|e| {
            error!("Failed to create connection pool: {}", e);
            ApiError::Database(format!("Connection pool creation failed: {}", e))
        })
    }

    async fn get_connection(&self) -> Result<Object, ApiError> {
        self.pool.get().await.map_err(ApiError::from)
    }

    pub async fn test_connection(&self) -> Result<(), ApiError> {
        let client = self.get_connection().await?;

        let row = client.query_one("SELECT NOW()", &[]).await.map_err(|e| {
            error!("Database connection test failed: {}", e);
            ApiError::Database(format!("Connection test failed: {}", e))
        })?;
        let now: DateTime<Utc> = row.try_get(0)?;

        info!("Connected to PostgreSQL server at {}", now);
        Ok(())
    }

    /// Creates the `user` and `post` tables when they are missing.
    pub async fn migrate(&self) -> Result<(), ApiError> {
        info!("Running database migrations");

        let client = self.get_connection().await?;

        for (name, sql) in statements::MIGRATIONS {
            client.execute(*sql, &[]).await.map_err(|e| {
                error!("Failed to create {}: {}", name, e);
                ApiError::Database(format!("Migration '{}' failed: {}", name, e))
            })?;
        }

        info!("Database migrations completed successfully");
        Ok(())
    }

    /// Stops handing out connections and drops idle ones.
    pub fn close(&self) {
        self.pool.close();
        info!("Database connection pool closed");
    }
}

#[async_trait]
impl Repository for Database {
    async fn health_check(&self) -> ApiResult<()> {
        let client = self.get_connection().await?;

        client.execute("SELECT 1", &[]).await.map_err(|e| {
            error!("Database health check failed: {}", e);
            ApiError::Database(format!("Health check failed: {}", e))
        })?;

        Ok(())
    }

    async fn find_session_user(
        &self,
        user_id: i64,
        issued_before: DateTime<Utc>,
    ) -> ApiResult<Option<i64>> {
        let client = self.get_connection().await?;

        let row = client
            .query_opt(statements::SELECT_SESSION_USER, &[&user_id, &issued_before])
            .await?;

        Ok(row.map(|row| row.try_get::<_, i64>("id")).transpose()?)
    }

    async fn list_posts(&self, page: Page) -> ApiResult<Vec<Post>> {
        let client = self.get_connection().await?;

        let rows = client
            .query(statements::SELECT_POSTS, &[&page.limit, &page.offset])
            .await?;

        let posts = rows
            .iter()
            .map(Post::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(posts)
    }

    async fn find_post(&self, post_id: i64) -> ApiResult<Option<Post>> {
        let client = self.get_connection().await?;

        let row = client.query_opt(statements::SELECT_POST, &[&post_id]).await?;

        Ok(row.as_ref().map(Post::try_from).transpose()?)
    }

    async fn insert_post(&self, author_id: i64, post: &NewPost) -> ApiResult<i64> {
        let client = self.get_connection().await?;

        let row = client
            .query_one(statements::INSERT_POST, &[&post.title, &post.contents, &author_id])
            .await?;
        let post_id: i64 = row.try_get("id")?;

        info!("Created post with id: {}", post_id);
        Ok(post_id)
    }

    async fn update_post(
        &self,
        post_id: i64,
        author_id: i64,
        changes: &PostChanges,
    ) -> ApiResult<Option<Post>> {
        let client = self.get_connection().await?;

        let update = PostUpdate::new(&post_id, &author_id, changes);
        let row = client.query_opt(update.sql, &update.params).await?;

        Ok(row.as_ref().map(Post::try_from).transpose()?)
    }

    async fn delete_post(&self, post_id: i64, author_id: i64) -> ApiResult<Option<i64>> {
        let client = self.get_connection().await?;

        let row = client
            .query_opt(statements::DELETE_POST, &[&post_id, &author_id])
            .await?;

        Ok(row.map(|row| row.try_get::<_, i64>("id")).transpose()?)
    }

    async fn find_user(&self, user_id: i64) -> ApiResult<Option<User>> {
        let client = self.get_connection().await?;

        let row = client.query_opt(statements::SELECT_USER, &[&user_id]).await?;

        Ok(row.as_ref().map(User::try_from).transpose()?)
    }

    async fn record_logout(&self, user_id: i64) -> ApiResult<Option<i64>> {
        let client = self.get_connection().await?;

        let row = client
            .query_opt(statements::UPDATE_USER_LOGOUT, &[&user_id])
            .await?;

        Ok(row.map(|row| row.try_get::<_, i64>("id")).transpose()?)
    }
}
