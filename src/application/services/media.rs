/// Builds public URLs for stored avatars.
#[derive(Debug, Clone)]
pub struct MediaUrls {
    origin: String,
    profile_pictures: bool,
}

impl MediaUrls {
    pub fn new(public_origin: &str, profile_pictures: bool) -> Self {
        Self {
            origin: public_origin.trim_end_matches('/').to_string(),
            profile_pictures,
        }
    }

    pub fn profile_pictures_enabled(&self) -> bool {
        self.profile_pictures
    }

    /// Absolute URL for a path relative to the upload root.
    pub fn upload_url(&self, relative: &str) -> String {
        format!(
            "{}/api/uploads/{}",
            self.origin,
            relative.trim_start_matches('/')
        )
    }

    pub fn avatar_url(&self, relative: Option<&str>) -> Option<String> {
        relative
            .filter(|r| !r.trim().is_empty())
            .map(|r| self.upload_url(r))
    }

    /// `None` when profile pictures are disabled, so the field can be left
    /// out of responses and token claims altogether.
    pub fn avatar_field(&self, relative: Option<&str>) -> Option<Option<String>> {
        self.profile_pictures.then(|| self.avatar_url(relative))
    }
}
