use async_trait::async_trait;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: Option<String>,
    /// Avatar path relative to the upload root.
    pub profile_picture: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UniqueField {
    Username,
    Email,
}

#[derive(Debug, Clone)]
pub enum CreateUserOutcome {
    Created(UserRow),
    Duplicate(UniqueField),
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts the user and its empty profile. A unique-index violation is
    /// reported as `Duplicate` rather than an error.
    async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> anyhow::Result<CreateUserOutcome>;
    async fn username_exists(&self, username: &str) -> anyhow::Result<bool>;
    async fn email_exists(&self, email: &str) -> anyhow::Result<bool>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>>;
    async fn find_by_id(&self, id: Uuid) -> anyhow::Result<Option<UserRow>>;
    /// `None` clears the avatar.
    async fn set_profile_picture(
        &self,
        user_id: Uuid,
        relative_path: Option<&str>,
    ) -> anyhow::Result<()>;
}
