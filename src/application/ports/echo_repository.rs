use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::echoes::echo::{Comment, Echo};

#[derive(Debug, Clone, Copy)]
pub struct FeedQuery {
    /// Used to compute `liked_by_viewer`.
    pub viewer: Option<Uuid>,
    /// Restricts the feed to echoes this user has liked.
    pub liked_by: Option<Uuid>,
    pub limit: i64,
}

#[async_trait]
pub trait EchoRepository: Send + Sync {
    async fn create_echo(&self, author_id: Uuid, content: &str) -> anyhow::Result<i64>;
    /// Returns `None` when the parent echo does not exist.
    async fn create_comment(
        &self,
        author_id: Uuid,
        echo_id: i64,
        content: &str,
    ) -> anyhow::Result<Option<i64>>;
    /// Flips the user's like on the echo. Returns the new state, or `None`
    /// when the echo does not exist.
    async fn toggle_like(&self, echo_id: i64, user_id: Uuid) -> anyhow::Result<Option<bool>>;
    async fn find_echo(&self, echo_id: i64, viewer: Option<Uuid>)
    -> anyhow::Result<Option<Echo>>;
    /// Newest first by `created_at`, then id.
    async fn list_recent(&self, query: FeedQuery) -> anyhow::Result<Vec<Echo>>;
    /// Up to `per_echo` newest comments for each of the given echoes.
    async fn recent_comments(&self, echo_ids: &[i64], per_echo: i64)
    -> anyhow::Result<Vec<Comment>>;
}
