use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio_postgres::Row;

pub const DEFAULT_PAGE_LIMIT: i64 = 10;

/// A post as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub contents: String,
    pub user_id: i64,
    pub creation_time: DateTime<Utc>,
    pub modification_time: DateTime<Utc>,
}

impl TryFrom<&Row> for Post {
    type Error = tokio_postgres::Error;

    fn try_from(row: &Row) -> Result<Self, Self::Error> {
        Ok(Post {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            contents: row.try_get("contents")?,
            user_id: row.try_get("user_id")?,
            creation_time: row.try_get("creation_time")?,
            modification_time: row.try_get("modification_time")?,
        })
    }
}

/// Body of `POST /post`. Both fields are optional at the wire level so that a
/// missing field surfaces as a validation error rather than a decode failure.
#[derive(Debug, Default, Deserialize)]
pub struct CreatePostRequest {
    pub title: Option<String>,
    pub contents: Option<String>,
}

/// Validated input for inserting a post.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPost {
    pub title: String,
    pub contents: String,
}

/// Body of `PATCH /post/:id`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub contents: Option<String>,
}

/// The fields a partial update touches. There is no empty variant.
#[derive(Debug, Clone, PartialEq)]
pub enum PostChanges {
    Title(String),
    Contents(String),
    TitleAndContents { title: String, contents: String },
}

/// Raw `limit`/`offset` query parameters.
#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub limit: Option<String>,
    pub offset: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub limit: i64,
    pub offset: i64,
}

impl Default for Page {
    fn default() -> Self {
        Page {
            limit: DEFAULT_PAGE_LIMIT,
            offset: 0,
        }
    }
}

impl CreatePostRequest {
    /// Title and contents are both required and must not be empty.
    pub fn validate(self) -> Result<NewPost, String> {
        match (present(self.title), present(self.contents)) {
            (Some(title), Some(contents)) => Ok(NewPost { title, contents }),
            _ => Err("Please enter both a post title and contents".to_string()),
        }
    }
}

impl UpdatePostRequest {
    /// An empty field counts as absent; at least one field must remain.
    pub fn into_changes(self) -> Result<PostChanges, String> {
        match (present(self.title), present(self.contents)) {
            (Some(title), Some(contents)) => Ok(PostChanges::TitleAndContents { title, contents }),
            (Some(title), None) => Ok(PostChanges::Title(title)),
            (None, Some(contents)) => Ok(PostChanges::Contents(contents)),
            (None, None) => Err("Please enter a post title or contents".to_string()),
        }
    }
}

impl PostChanges {
    pub fn title(&self) -> Option<&str> {
        match self {
            PostChanges::Title(title) | PostChanges::TitleAndContents { title, .. } => {
                Some(title.as_str())
            }
            PostChanges::Contents(_) => None,
        }
    }

    pub fn contents(&self) -> Option<&str> {
        match self {
            PostChanges::Contents(contents) | PostChanges::TitleAndContents { contents, .. } => {
                Some(contents.as_str())
            }
            PostChanges::Title(_) => None,
        }
    }
}

impl ListPostsQuery {
    /// Empty or missing values fall back to the defaults.
    pub fn page(&self) -> Result<Page, String> {
        let defaults = Page::default();
        Ok(Page {
            limit: parse_bound("limit", self.limit.as_deref(), defaults.limit)?,
            offset: parse_bound("offset", self.offset.as_deref(), defaults.offset)?,
        })
    }
}

fn parse_bound(name: &str, value: Option<&str>, default: i64) -> Result<i64, String> {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        None => Ok(default),
        Some(raw) => match raw.parse::<i64>() {
            Ok(parsed) if parsed >= 0 => Ok(parsed),
            _ => Err(format!("{} must be a non-negative integer", name)),
        },
    }
}

fn present(field: Option<String>) -> Option<String> {
    field.filter(|value| !value.is_empty())
}
