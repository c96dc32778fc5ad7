use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

/// Every failure a request can end in. The HTTP mapping lives in
/// `presentation::http::error`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Malformed JSON: {0}")]
    MalformedJson(String),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Content cannot be empty")]
    EmptyContent,

    #[error("Username already exists")]
    DuplicateUsername,

    #[error("Email already exists")]
    DuplicateEmail,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token is invalid or expired")]
    InvalidToken,

    #[error("Authentication credentials were not provided or are invalid")]
    Unauthorized,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("No file uploaded")]
    NoFileUploaded,

    #[error("File too large: {size} bytes (max {max})")]
    FileTooLarge { size: usize, max: usize },

    /// The request body hit the upload limit before it was fully read.
    #[error("File too large (max {max} bytes)")]
    UploadTooLarge { max: usize },

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}
