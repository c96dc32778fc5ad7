pub mod upload_profile_picture;
