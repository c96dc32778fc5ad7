use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};

use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::services::media::MediaUrls;
use crate::application::services::tokens::{TokenPair, TokenService};
use crate::application::use_cases::auth::token_subject;

pub struct Login<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub tokens: &'a TokenService,
    pub media: &'a MediaUrls,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Login<'a, R> {
    /// Checks the password against the stored hash.
    pub async fn authenticate(&self, req: &LoginRequest) -> anyhow::Result<Option<UserRow>> {
        let row = match self.repo.find_by_username(req.username.trim()).await? {
            Some(r) => r,
            None => return Ok(None),
        };
        let hash = row.password_hash.clone().unwrap_or_default();
        let parsed = PasswordHash::new(&hash).map_err(|e| anyhow::anyhow!(e.to_string()))?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_ok()
        {
            Ok(Some(UserRow {
                password_hash: None,
                ..row
            }))
        } else {
            Ok(None)
        }
    }

    pub async fn execute(&self, req: &LoginRequest) -> AppResult<(UserRow, TokenPair)> {
        let user = self
            .authenticate(req)
            .await?
            .ok_or(AppError::InvalidCredentials)?;
        let pair = self.tokens.issue(&token_subject(&user, self.media))?;
        tracing::info!(user_id = %user.id, "user_logged_in");
        Ok((user, pair))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::use_cases::auth::register::{Register, RegisterRequest};
    use crate::application::use_cases::auth::verify_access::VerifyAccess;
    use crate::testing::MemoryStore;

    async fn seeded() -> MemoryStore {
        let repo = MemoryStore::default();
        Register { repo: &repo }
            .execute(&RegisterRequest {
                username: "alice".into(),
                email: "a@b.com".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        repo
    }

    #[tokio::test]
    async fn issued_access_token_resolves_to_same_user() {
        let repo = seeded().await;
        let tokens = TokenService::new("test-secret", 300, 3600);
        let media = MediaUrls::new("http://localhost:8888", true);
        let uc = Login {
            repo: &repo,
            tokens: &tokens,
            media: &media,
        };
        let (user, pair) = uc
            .execute(&LoginRequest {
                username: "alice".into(),
                password: "secret1".into(),
            })
            .await
            .unwrap();
        assert!(user.password_hash.is_none());

        let verified = VerifyAccess {
            repo: &repo,
            tokens: &tokens,
        }
        .execute(&pair.access)
        .await
        .unwrap();
        assert_eq!(verified.id, user.id);
        assert_eq!(verified.username, "alice");
    }

    #[tokio::test]
    async fn wrong_password_or_unknown_user_is_invalid_credentials() {
        let repo = seeded().await;
        let tokens = TokenService::new("test-secret", 300, 3600);
        let media = MediaUrls::new("http://localhost:8888", true);
        let uc = Login {
            repo: &repo,
            tokens: &tokens,
            media: &media,
        };
        for (username, password) in [("alice", "wrong-pass"), ("mallory", "secret1")] {
            let err = uc
                .execute(&LoginRequest {
                    username: username.into(),
                    password: password.into(),
                })
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidCredentials));
        }
    }
}
