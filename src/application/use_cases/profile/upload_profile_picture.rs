use uuid::Uuid;

use crate::application::error::{AppError, AppResult};
use crate::application::ports::storage_port::StoragePort;
use crate::application::ports::user_repository::UserRepository;
use crate::application::services::media::MediaUrls;

/// Formats accepted as avatars. Anything else, including SVG, is refused
/// since uploads are served from the API origin.
const ALLOWED_IMAGE_TYPES: [&str; 4] = ["image/png", "image/jpeg", "image/gif", "image/webp"];

fn is_allowed_image(filename: Option<&str>) -> bool {
    filename
        .and_then(|name| mime_guess::from_path(name).first())
        .is_some_and(|mime| ALLOWED_IMAGE_TYPES.contains(&mime.essence_str()))
}

pub struct UploadProfilePicture<'a, R, S>
where
    R: UserRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    pub repo: &'a R,
    pub storage: &'a S,
    pub media: &'a MediaUrls,
    pub max_bytes: usize,
}

#[derive(Debug, Clone)]
pub struct UploadedAvatar {
    pub url: String,
    pub relative_path: String,
    pub size: i64,
}

impl<'a, R, S> UploadProfilePicture<'a, R, S>
where
    R: UserRepository + ?Sized,
    S: StoragePort + ?Sized,
{
    /// Replaces the user's avatar. The previous file is removed and the
    /// avatar cleared before the new one is written, so a failed write leaves
    /// the user without an avatar.
    pub async fn execute(
        &self,
        user_id: Uuid,
        bytes: Vec<u8>,
        orig_filename: Option<String>,
    ) -> AppResult<UploadedAvatar> {
        if bytes.is_empty() {
            return Err(AppError::NoFileUploaded);
        }
        if bytes.len() > self.max_bytes {
            return Err(AppError::FileTooLarge {
                size: bytes.len(),
                max: self.max_bytes,
            });
        }
        if !is_allowed_image(orig_filename.as_deref()) {
            return Err(AppError::InvalidInput(
                "Upload a valid image (png, jpg, gif, webp)".into(),
            ));
        }

        let user = self
            .repo
            .find_by_id(user_id)
            .await?
            .ok_or(AppError::Unauthorized)?;
        if let Some(previous) = user.profile_picture.as_deref() {
            if let Err(err) = self.storage.delete_relative(previous).await {
                tracing::warn!(user_id = %user_id, path = %previous, error = ?err, "failed to remove previous avatar");
            }
            self.repo.set_profile_picture(user_id, None).await?;
        }

        let stored = self
            .storage
            .store_avatar(user_id, orig_filename.as_deref(), &bytes)
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, user_id = %user_id, "store_avatar_failed");
                err
            })?;
        self.repo
            .set_profile_picture(user_id, Some(&stored.relative_path))
            .await
            .map_err(|err| {
                tracing::error!(error = ?err, user_id = %user_id, "set_profile_picture_failed");
                err
            })?;

        Ok(UploadedAvatar {
            url: self.media.upload_url(&stored.relative_path),
            relative_path: stored.relative_path,
            size: stored.size,
        })
    }
}
