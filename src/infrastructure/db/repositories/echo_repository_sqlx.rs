use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::echo_repository::{EchoRepository, FeedQuery};
use crate::domain::echoes::echo::{Comment, Echo, EchoAuthor};
use crate::infrastructure::db::PgPool;

pub struct SqlxEchoRepository {
    pub pool: PgPool,
}

impl SqlxEchoRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

// $1 is always the viewer (nullable).
const ECHO_SELECT: &str = r#"
    SELECT e.id, e.content, e.created_at, e.user_id, u.username, p.profile_picture,
           (SELECT COUNT(*) FROM echo_likes l WHERE l.echo_id = e.id)::BIGINT AS like_count,
           EXISTS (
               SELECT 1 FROM echo_likes l WHERE l.echo_id = e.id AND l.user_id = $1
           ) AS liked_by_viewer
    FROM echoes e
    JOIN users u ON u.id = e.user_id
    LEFT JOIN profiles p ON p.user_id = e.user_id"#;

fn author_from_row(r: &PgRow) -> EchoAuthor {
    EchoAuthor {
        user_id: r.get("user_id"),
        username: r.get("username"),
        profile_picture: r
            .try_get::<Option<String>, _>("profile_picture")
            .ok()
            .flatten(),
    }
}

fn echo_from_row(r: &PgRow) -> Echo {
    Echo {
        id: r.get("id"),
        author: author_from_row(r),
        content: r.get("content"),
        created_at: r.get("created_at"),
        like_count: r.get("like_count"),
        liked_by_viewer: r.get("liked_by_viewer"),
    }
}

#[async_trait]
impl EchoRepository for SqlxEchoRepository {
    async fn create_echo(&self, author_id: Uuid, content: &str) -> anyhow::Result<i64> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO echoes (user_id, content) VALUES ($1, $2) RETURNING id",
        )
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await?;
        Ok(id)
    }

    async fn create_comment(
        &self,
        author_id: Uuid,
        echo_id: i64,
        content: &str,
    ) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>(
            r#"INSERT INTO comments (user_id, echo_id, content)
               SELECT $1, e.id, $3 FROM echoes e WHERE e.id = $2
               RETURNING id"#,
        )
        .bind(author_id)
        .bind(echo_id)
        .bind(content)
        .fetch_optional(&self.pool)
        .await?;
        Ok(id)
    }

    async fn toggle_like(&self, echo_id: i64, user_id: Uuid) -> anyhow::Result<Option<bool>> {
        let mut tx = self.pool.begin().await?;
        let exists = sqlx::query_scalar::<_, i64>("SELECT id FROM echoes WHERE id = $1 FOR SHARE")
            .bind(echo_id)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Ok(None);
        }
        let removed = sqlx::query("DELETE FROM echo_likes WHERE echo_id = $1 AND user_id = $2")
            .bind(echo_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let liked = if removed > 0 {
            false
        } else {
            sqlx::query(
                r#"INSERT INTO echo_likes (echo_id, user_id) VALUES ($1, $2)
                   ON CONFLICT (echo_id, user_id) DO NOTHING"#,
            )
            .bind(echo_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;
            true
        };
        tx.commit().await?;
        Ok(Some(liked))
    }

    async fn find_echo(
        &self,
        echo_id: i64,
        viewer: Option<Uuid>,
    ) -> anyhow::Result<Option<Echo>> {
        let sql = format!("{ECHO_SELECT}\n    WHERE e.id = $2");
        let row = sqlx::query(&sql)
            .bind(viewer)
            .bind(echo_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(echo_from_row))
    }

    async fn list_recent(&self, query: FeedQuery) -> anyhow::Result<Vec<Echo>> {
        let sql = format!(
            r#"{ECHO_SELECT}
    WHERE $2::UUID IS NULL OR EXISTS (
        SELECT 1 FROM echo_likes lb WHERE lb.echo_id = e.id AND lb.user_id = $2
    )
    ORDER BY e.created_at DESC, e.id DESC
    LIMIT $3"#
        );
        let rows = sqlx::query(&sql)
            .bind(query.viewer)
            .bind(query.liked_by)
            .bind(query.limit)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows.iter().map(echo_from_row).collect())
    }

    async fn recent_comments(
        &self,
        echo_ids: &[i64],
        per_echo: i64,
    ) -> anyhow::Result<Vec<Comment>> {
        if echo_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query(
            r#"SELECT id, echo_id, user_id, username, profile_picture, content, created_at
               FROM (
                   SELECT c.id, c.echo_id, c.user_id, u.username, p.profile_picture,
                          c.content, c.created_at,
                          ROW_NUMBER() OVER (
                              PARTITION BY c.echo_id ORDER BY c.created_at DESC, c.id DESC
                          ) AS rn
                   FROM comments c
                   JOIN users u ON u.id = c.user_id
                   LEFT JOIN profiles p ON p.user_id = c.user_id
                   WHERE c.echo_id = ANY($1)
               ) ranked
               WHERE rn <= $2
               ORDER BY echo_id, created_at DESC, id DESC"#,
        )
        .bind(echo_ids)
        .bind(per_echo)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows
            .iter()
            .map(|r| Comment {
                id: r.get("id"),
                echo_id: r.get("echo_id"),
                author: author_from_row(r),
                content: r.get("content"),
                created_at: r.get("created_at"),
            })
            .collect())
    }
}
