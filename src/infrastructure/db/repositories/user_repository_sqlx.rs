use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;
use uuid::Uuid;

use crate::application::ports::user_repository::{
    CreateUserOutcome, UniqueField, UserRepository, UserRow,
};
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(r: &PgRow, with_hash: bool) -> UserRow {
    UserRow {
        id: r.get("id"),
        username: r.get("username"),
        email: r.get("email"),
        password_hash: if with_hash {
            r.try_get("password_hash").ok()
        } else {
            None
        },
        profile_picture: r
            .try_get::<Option<String>, _>("profile_picture")
            .ok()
            .flatten(),
    }
}

/// Which unique constraint a violation hit; see the `users` migration.
fn duplicate_field(constraint: Option<&str>) -> UniqueField {
    match constraint {
        Some("users_email_key") => UniqueField::Email,
        _ => UniqueField::Username,
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<CreateUserOutcome> {
        let res = sqlx::query(
            r#"WITH u AS (
                   INSERT INTO users (username, email, password_hash) VALUES ($1, $2, $3)
                   RETURNING id, username, email, password_hash
               ), p AS (
                   INSERT INTO profiles (user_id) SELECT id FROM u
               )
               SELECT u.id, u.username, u.email, u.password_hash,
                      NULL::TEXT AS profile_picture
               FROM u"#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .fetch_one(&self.pool)
        .await;
        match res {
            Ok(row) => Ok(CreateUserOutcome::Created(user_from_row(&row, true))),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Ok(CreateUserOutcome::Duplicate(duplicate_field(db.constraint())))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn username_exists(&self, username: &str) -> anyhow::Result<bool> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM users WHERE username = $1")
            .bind(username)
            .fetch_one(&self.pool)
            .await?;
        Ok(n > 0)
    }

    async fn email_exists(&self, email: &str) -> anyhow::Result<bool> {
        let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(1) FROM users WHERE email = $1")
            .bind(email)
            .fetch_one(&self.pool)
            .await?;
        Ok(n > 0)
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT u.id, u.username, u.email, u.password_hash, p.profile_picture
               FROM users u LEFT JOIN profiles p ON p.user_id = u.id
               WHERE u.username = $1"#,
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| user_from_row(&r, true)))
    }

    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"SELECT u.id, u.username, u.email, p.profile_picture
               FROM users u LEFT JOIN profiles p ON p.user_id = u.id
               WHERE u.id = $1"#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| user_from_row(&r, false)))
    }

    async fn set_profile_picture(
        &self,
        user_id: Uuid,
        relative_path: Option<&str>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO profiles (user_id, profile_picture) VALUES ($1, $2)
               ON CONFLICT (user_id) DO UPDATE SET profile_picture = EXCLUDED.profile_picture"#,
        )
        .bind(user_id)
        .bind(relative_path)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
