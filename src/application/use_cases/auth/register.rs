use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use once_cell::sync::Lazy;
use password_hash::rand_core::OsRng;
use regex::Regex;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::user_repository::{
    CreateUserOutcome, UniqueField, UserRepository, UserRow,
};

pub const MIN_PASSWORD_LEN: usize = 6;

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s.]+$").expect("email pattern compiles")
});

pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> AppResult<UserRow> {
        let username = req.username.trim();
        let email = req.email.trim();
        if username.is_empty() {
            return Err(AppError::MissingField("username"));
        }
        if email.is_empty() {
            return Err(AppError::MissingField("email"));
        }
        if req.password.is_empty() {
            return Err(AppError::MissingField("password"));
        }
        if !EMAIL_RE.is_match(email) {
            return Err(AppError::InvalidInput("Enter a valid email address".into()));
        }
        if req.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::InvalidInput(format!(
                "Password must be at least {MIN_PASSWORD_LEN} characters long"
            )));
        }

        if self.repo.username_exists(username).await? {
            return Err(AppError::DuplicateUsername);
        }
        if self.repo.email_exists(email).await? {
            return Err(AppError::DuplicateEmail);
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .to_string();

        match self.repo.create_user(username, email, &hash).await? {
            CreateUserOutcome::Created(user) => {
                tracing::info!(user_id = %user.id, username = %user.username, "user_registered");
                Ok(user)
            }
            CreateUserOutcome::Duplicate(UniqueField::Username) => Err(AppError::DuplicateUsername),
            CreateUserOutcome::Duplicate(UniqueField::Email) => Err(AppError::DuplicateEmail),
        }
    }
}
