use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::echo_repository::EchoRepository;
use crate::application::services::threads::load_thread;
use crate::domain::echoes::echo::EchoThread;

pub struct CreateEcho<'a, R: EchoRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EchoRepository + ?Sized> CreateEcho<'a, R> {
    pub async fn execute(&self, author_id: Uuid, content: Option<&str>) -> AppResult<EchoThread> {
        let content = content.map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(AppError::EmptyContent);
        }
        let id = self.repo.create_echo(author_id, content).await?;
        tracing::debug!(echo_id = id, author_id = %author_id, "echo_created");
        load_thread(self.repo, id, Some(author_id))
            .await?
            .ok_or_else(|| anyhow::anyhow!("echo {id} vanished after insert").into())
    }
}
