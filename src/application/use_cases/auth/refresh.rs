use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::media::MediaUrls;
use crate::application::services::tokens::TokenService;
use crate::application::use_cases::auth::token_subject;

pub struct RefreshAccess<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub tokens: &'a TokenService,
    pub media: &'a MediaUrls,
}

impl<'a, R: UserRepository + ?Sized> RefreshAccess<'a, R> {
    /// Mints a new access token carrying the user's current claims.
    pub async fn execute(&self, refresh_token: &str) -> AppResult<String> {
        let claims = self.tokens.decode_refresh(refresh_token)?;
        let user_id = claims.user_id().ok_or(AppError::InvalidToken)?;
        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::InvalidToken)?;
        self.tokens.issue_access(&token_subject(&user, self.media))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::user_repository::{CreateUserOutcome, UserRepository};
    use crate::application::services::tokens::TokenSubject;
    use crate::testing::MemoryStore;

    #[tokio::test]
    async fn refreshes_with_current_avatar() {
        let repo = MemoryStore::default();
        let CreateUserOutcome::Created(user) =
            repo.create_user("alice", "a@b.com", "hash").await.unwrap()
        else {
            panic!("user not created");
        };
        let tokens = TokenService::new("test-secret", 300, 3600);
        let media = MediaUrls::new("http://localhost:8888", true);
        let pair = tokens
            .issue(&token_subject(&user, &media))
            .unwrap();
        repo.set_profile_picture(user.id, Some("avatars/x/pic.png"))
            .await
            .unwrap();

        let uc = RefreshAccess {
            repo: &repo,
            tokens: &tokens,
            media: &media,
        };
        let access = uc.execute(&pair.refresh).await.unwrap();
        let claims = tokens.decode_access(&access).unwrap();
        assert_eq!(
            claims.user_profile_picture,
            Some(Some("http://localhost:8888/api/uploads/avatars/x/pic.png".into()))
        );
    }

    #[tokio::test]
    async fn rejects_access_tokens_and_unknown_subjects() {
        let repo = MemoryStore::default();
        let tokens = TokenService::new("test-secret", 300, 3600);
        let media = MediaUrls::new("http://localhost:8888", true);
        let ghost = tokens
            .issue(&TokenSubject {
                user_id: uuid::Uuid::new_v4(),
                username: "ghost".into(),
                profile_picture_url: Some(None),
            })
            .unwrap();
        let uc = RefreshAccess {
            repo: &repo,
            tokens: &tokens,
            media: &media,
        };

        assert!(matches!(
            uc.execute(&ghost.access).await,
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            uc.execute(&ghost.refresh).await,
            Err(AppError::InvalidToken)
        ));
        assert!(matches!(
            uc.execute("tampered").await,
            Err(AppError::InvalidToken)
        ));
    }
}
