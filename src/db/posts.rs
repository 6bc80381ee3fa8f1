//! Post storage for blog entries.

use sqlx::sqlite::SqlitePool;

#[derive(Clone)]
pub struct PostStore {
    pool: SqlitePool,
}

/// A post joined with its author's public fields.
#[derive(Debug, Clone)]
pub struct Post {
    pub uuid: String,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub author_uuid: String,
    pub author_username: String,
    pub author_email: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(sqlx::FromRow)]
struct PostRow {
    uuid: String,
    title: String,
    content: String,
    author_id: i64,
    author_uuid: String,
    author_username: String,
    author_email: String,
    created_at: String,
    updated_at: String,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Self {
            uuid: row.uuid,
            title: row.title,
            content: row.content,
            author_id: row.author_id,
            author_uuid: row.author_uuid,
            author_username: row.author_username,
            author_email: row.author_email,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl PostStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a new post owned by `user_id`. Returns the post UUID.
    pub async fn create(
        &self,
        user_id: i64,
        title: &str,
        content: &str,
    ) -> Result<String, sqlx::Error> {
        let uuid = uuid::Uuid::new_v4().to_string();

        sqlx::query("INSERT INTO posts (uuid, user_id, title, content) VALUES (?, ?, ?, ?)")
            .bind(&uuid)
            .bind(user_id)
            .bind(title)
            .bind(content)
            .execute(&self.pool)
            .await?;

        Ok(uuid)
    }

    /// Get a post by UUID, regardless of owner.
    pub async fn get_by_uuid(&self, uuid: &str) -> Result<Option<Post>, sqlx::Error> {
        let row: Option<PostRow> = sqlx::query_as(
            "SELECT p.uuid, p.title, p.content, u.id AS author_id, u.uuid AS author_uuid,
                    u.username AS author_username, u.email AS author_email, p.created_at, p.updated_at
             FROM posts p JOIN users u ON u.id = p.user_id
             WHERE p.uuid = ?",
        )
        .bind(uuid)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Post::from))
    }

    /// List all posts, newest first.
    pub async fn list_all(&self) -> Result<Vec<Post>, sqlx::Error> {
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT p.uuid, p.title, p.content, u.id AS author_id, u.uuid AS author_uuid,
                    u.username AS author_username, u.email AS author_email, p.created_at, p.updated_at
             FROM posts p JOIN users u ON u.id = p.user_id
             ORDER BY p.created_at DESC, p.id DESC",
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Post::from).collect())
    }

    /// Update a post's title and/or content. `None` keeps the current value.
    /// Returns true if the post was updated.
    pub async fn update(
        &self,
        uuid: &str,
        title: Option<&str>,
        content: Option<&str>,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE posts SET title = COALESCE(?, title), content = COALESCE(?, content), updated_at = datetime('now')
             WHERE uuid = ?",
        )
        .bind(title)
        .bind(content)
        .bind(uuid)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete a post by UUID. Returns true if the post was deleted.
    pub async fn delete(&self, uuid: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE uuid = ?")
            .bind(uuid)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
