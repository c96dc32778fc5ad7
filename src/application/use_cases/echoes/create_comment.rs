use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::echo_repository::EchoRepository;
use crate::application::services::threads::load_thread;
use crate::domain::echoes::echo::EchoThread;

pub struct CreateComment<'a, R: EchoRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug)]
pub struct CommentCreated {
    pub comment_id: i64,
    /// The parent echo, reloaded so it includes the new comment.
    pub thread: EchoThread,
}

impl<'a, R: EchoRepository + ?Sized> CreateComment<'a, R> {
    pub async fn execute(
        &self,
        author_id: Uuid,
        echo_id: Option<i64>,
        content: Option<&str>,
    ) -> AppResult<CommentCreated> {
        let echo_id = echo_id.ok_or(AppError::MissingField("echo_id"))?;
        let content = content.map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(AppError::EmptyContent);
        }
        let comment_id = self
            .repo
            .create_comment(author_id, echo_id, content)
            .await?
            .ok_or(AppError::NotFound("Echo"))?;
        let thread = load_thread(self.repo, echo_id, Some(author_id))
            .await?
            .ok_or(AppError::NotFound("Echo"))?;
        Ok(CommentCreated { comment_id, thread })
    }
}
