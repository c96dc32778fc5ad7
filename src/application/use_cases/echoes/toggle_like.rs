use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::echo_repository::EchoRepository;
use crate::application::services::threads::load_thread;
use crate::domain::echoes::echo::EchoThread;

pub struct ToggleLike<'a, R: EchoRepository + ?Sized> {
    pub repo: &'a R,
}

impl<'a, R: EchoRepository + ?Sized> ToggleLike<'a, R> {
    /// Returns the echo as seen by `user_id` after the toggle, and whether
    /// it is now liked.
    pub async fn execute(&self, user_id: Uuid, echo_id: i64) -> AppResult<(EchoThread, bool)> {
        let liked = self
            .repo
            .toggle_like(echo_id, user_id)
            .await?
            .ok_or(AppError::NotFound("Echo"))?;
        let thread = load_thread(self.repo, echo_id, Some(user_id))
            .await?
            .ok_or(AppError::NotFound("Echo"))?;
        Ok((thread, liked))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn toggling_twice_restores_count() {
        let repo = MemoryStore::default();
        let alice = repo.add_user("alice");
        let bob = repo.add_user("bob");
        let echo_id = repo.create_echo(alice, "hello").await.unwrap();
        let uc = ToggleLike { repo: &repo };

        let (thread, liked) = uc.execute(bob, echo_id).await.unwrap();
        assert!(liked);
        assert!(thread.echo.liked_by_viewer);
        assert_eq!(thread.echo.like_count, 1);

        // self-likes count too
        let (thread, liked) = uc.execute(alice, echo_id).await.unwrap();
        assert!(liked);
        assert_eq!(thread.echo.like_count, 2);

        let (thread, liked) = uc.execute(bob, echo_id).await.unwrap();
        assert!(!liked);
        assert!(!thread.echo.liked_by_viewer);
        assert_eq!(thread.echo.like_count, 1);
    }

    #[tokio::test]
    async fn missing_echo_is_not_found() {
        let repo = MemoryStore::default();
        let alice = repo.add_user("alice");
        let err = ToggleLike { repo: &repo }
            .execute(alice, 42)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }
}
