//! SQL statement texts. Every statement is fixed; values only ever travel as
//! positional parameters.

use postgres_types::ToSql;

use crate::models::PostChanges;

pub const SELECT_SESSION_USER: &str =
    r#"SELECT id FROM "user" WHERE id = $1 AND logout_time < $2"#;

pub const SELECT_POSTS: &str = r#"
    SELECT id, title, contents, user_id, creation_time, modification_time
    FROM post
    ORDER BY creation_time DESC, id DESC
    LIMIT $1 OFFSET $2
"#;

pub const SELECT_POST: &str = r#"
    SELECT id, title, contents, user_id, creation_time, modification_time
    FROM post
    WHERE id = $1
"#;

pub const INSERT_POST: &str = r#"
    INSERT INTO post (title, contents, user_id)
    VALUES ($1, $2, $3)
    RETURNING id
"#;

pub const DELETE_POST: &str = r#"
    DELETE FROM post
    WHERE id = $1 AND user_id = $2
    RETURNING id
"#;

const UPDATE_POST_TITLE: &str = r#"
    UPDATE post
    SET modification_time = NOW(), title = $3
    WHERE id = $1 AND user_id = $2
    RETURNING id, title, contents, user_id, creation_time, modification_time
"#;

const UPDATE_POST_CONTENTS: &str = r#"
    UPDATE post
    SET modification_time = NOW(), contents = $3
    WHERE id = $1 AND user_id = $2
    RETURNING id, title, contents, user_id, creation_time, modification_time
"#;

const UPDATE_POST_TITLE_AND_CONTENTS: &str = r#"
    UPDATE post
    SET modification_time = NOW(), title = $3, contents = $4
    WHERE id = $1 AND user_id = $2
    RETURNING id, title, contents, user_id, creation_time, modification_time
"#;

pub const SELECT_USER: &str = r#"
    SELECT id, email, creation_time, modification_time
    FROM "user"
    WHERE id = $1
"#;

pub const UPDATE_USER_LOGOUT: &str = r#"
    UPDATE "user"
    SET logout_time = NOW(), modification_time = NOW()
    WHERE id = $1
    RETURNING id
"#;

pub const MIGRATIONS: &[(&str, &str)] = &[
    (
        "user table",
        r#"
        CREATE TABLE IF NOT EXISTS "user" (
            id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            email VARCHAR(255) UNIQUE NOT NULL,
            creation_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            modification_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            logout_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post table",
        r#"
        CREATE TABLE IF NOT EXISTS post (
            id BIGINT GENERATED ALWAYS AS IDENTITY PRIMARY KEY,
            title TEXT NOT NULL,
            contents TEXT NOT NULL,
            user_id BIGINT NOT NULL REFERENCES "user"(id) ON DELETE CASCADE,
            creation_time TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            modification_time TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post user_id index",
        "CREATE INDEX IF NOT EXISTS idx_post_user_id ON post(user_id)",
    ),
    (
        "post creation_time index",
        "CREATE INDEX IF NOT EXISTS idx_post_creation_time ON post(creation_time DESC)",
    ),
];

/// A partial post update: one of three templates plus its bound parameters.
/// `$1` is the post id and `$2` the author id in every template.
pub struct PostUpdate<'a> {
    pub sql: &'static str,
    pub params: Vec<&'a (dyn ToSql + Sync)>,
}

impl<'a> PostUpdate<'a> {
    pub fn new(post_id: &'a i64, author_id: &'a i64, changes: &'a PostChanges) -> Self {
        let mut params: Vec<&'a (dyn ToSql + Sync)> = vec![post_id, author_id];

        let sql = match changes {
            PostChanges::Title(title) => {
                params.push(title);
                UPDATE_POST_TITLE
            }
            PostChanges::Contents(contents) => {
                params.push(contents);
                UPDATE_POST_CONTENTS
            }
            PostChanges::TitleAndContents { title, contents } => {
                params.push(title);
                params.push(contents);
                UPDATE_POST_TITLE_AND_CONTENTS
            }
        };

        PostUpdate { sql, params }
    }
}
