use axum::extract::FromRequest;

use crate::application::error::AppError;

/// `axum::Json` whose rejection is reported as `MalformedJson`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);
