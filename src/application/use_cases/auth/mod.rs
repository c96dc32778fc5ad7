use crate::application::ports::user_repository::UserRow;
use crate::application::services::media::MediaUrls;
use crate::application::services::tokens::TokenSubject;

pub mod login;
pub mod me;
pub mod refresh;
pub mod register;
pub mod verify_access;

pub(crate) fn token_subject(user: &UserRow, media: &MediaUrls) -> TokenSubject {
    TokenSubject {
        user_id: user.id,
        username: user.username.clone(),
        profile_picture_url: media.avatar_field(user.profile_picture.as_deref()),
    }
}
