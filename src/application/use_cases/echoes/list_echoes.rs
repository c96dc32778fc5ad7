use uuid::Uuid;

use crate::application::error::AppResult;
use crate::application::ports::echo_repository::{EchoRepository, FeedQuery};
use crate::application::services::threads::attach_comments;
use crate::domain::echoes::echo::{EchoThread, MAX_FEED_ITEMS};

pub struct ListEchoes<'a, R: EchoRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EchoRepository + ?Sized> ListEchoes<'a, R> {
    /// Most recent echoes, newest first. `limit` is clamped to
    /// `1..=MAX_FEED_ITEMS`.
    pub async fn execute(
        &self,
        viewer: Option<Uuid>,
        liked_by: Option<Uuid>,
        limit: Option<i64>,
    ) -> AppResult<Vec<EchoThread>> {
        let limit = limit.unwrap_or(MAX_FEED_ITEMS).clamp(1, MAX_FEED_ITEMS);
        let echoes = self
            .repo
            .list_recent(FeedQuery {
                viewer,
                liked_by,
                limit,
            })
            .await?;
        Ok(attach_comments(self.repo, echoes).await?)
    }
}
