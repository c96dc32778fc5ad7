use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::application::services::tokens::TokenService;

/// Resolves a bearer access token to a live user.
pub struct VerifyAccess<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub tokens: &'a TokenService,
}

impl<'a, R: UserRepository + ?Sized> VerifyAccess<'a, R> {
    pub async fn execute(&self, access_token: &str) -> AppResult<UserRow> {
        let claims = self.tokens.decode_access(access_token)?;
        let user_id = claims.user_id().ok_or(AppError::Unauthorized)?;
        self.repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)
    }
}
