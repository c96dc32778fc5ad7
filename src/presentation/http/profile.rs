use axum::{
    Json, Router,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    routing::post,
};
use serde::Serialize;
use utoipa::ToSchema;

use crate::application::error::{AppError, AppResult};
use crate::application::use_cases::profile::upload_profile_picture::UploadProfilePicture;
use crate::bootstrap::app_context::AppContext;
use crate::presentation::http::auth::CurrentUser;

const FIELD: &str = "profile_picture";

#[derive(Debug, Serialize, ToSchema)]
pub struct UploadProfilePictureResponse {
    pub message: String,
    pub user_profile_picture: String,
}

#[derive(ToSchema)]
#[allow(dead_code)]
pub struct UploadProfilePictureMultipart {
    /// Image file
    #[schema(value_type = String, format = Binary)]
    profile_picture: String,
}

pub fn routes(ctx: AppContext) -> Router {
    Router::new()
        .route("/upload-profile-pic", post(upload_profile_pic))
        .with_state(ctx)
}

/// Body-limit failures surface mid-stream, so keep their 413.
fn multipart_error(err: MultipartError, max: usize) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::UploadTooLarge { max }
    } else {
        AppError::InvalidInput(err.body_text())
    }
}

/// POST /api/upload-profile-pic (multipart/form-data)
/// Fields:
/// - profile_picture: image file (required)
#[utoipa::path(
    post,
    path = "/api/upload-profile-pic",
    tag = "Profile",
    request_body(
        content = UploadProfilePictureMultipart,
        content_type = "multipart/form-data",
    ),
    responses(
        (status = 201, description = "Profile picture replaced", body = UploadProfilePictureResponse),
        (status = 400, body = crate::presentation::http::error::ErrorBody),
        (status = 413, body = crate::presentation::http::error::ErrorBody)
    )
)]
pub async fn upload_profile_pic(
    State(ctx): State<AppContext>,
    CurrentUser(user): CurrentUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<(StatusCode, Json<UploadProfilePictureResponse>)> {
    let mut multipart = multipart.map_err(|_| AppError::NoFileUploaded)?;
    let max = ctx.cfg.upload_max_bytes;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut orig_filename: Option<String> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max))?
    {
        if field.name() != Some(FIELD) {
            continue;
        }
        orig_filename = field.file_name().map(|s| s.to_string());
        let data = field.bytes().await.map_err(|e| multipart_error(e, max))?;
        file_bytes = Some(data.to_vec());
    }
    let bytes = file_bytes.ok_or(AppError::NoFileUploaded)?;

    let repo = ctx.user_repo();
    let storage = ctx.storage_port();
    let uc = UploadProfilePicture {
        repo: repo.as_ref(),
        storage: storage.as_ref(),
        media: ctx.media(),
        max_bytes: ctx.cfg.upload_max_bytes,
    };
    let out = uc.execute(user.id, bytes, orig_filename).await?;
    tracing::info!(
        user_id = %user.id,
        path = %out.relative_path,
        size = out.size,
        "profile_picture_uploaded"
    );
    Ok((
        StatusCode::CREATED,
        Json(UploadProfilePictureResponse {
            message: "Profile picture uploaded successfully".into(),
            user_profile_picture: out.url,
        }),
    ))
}
