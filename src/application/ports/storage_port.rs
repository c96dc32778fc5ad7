use async_trait::async_trait;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct StoredAvatar {
    pub filename: String,
    pub absolute_path: PathBuf,
    pub relative_path: String,
    pub size: i64,
}

#[async_trait]
pub trait StoragePort: Send + Sync {
    async fn store_avatar(
        &self,
        user_id: Uuid,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredAvatar>;
    /// Removes a previously stored file. Missing files are not an error.
    async fn delete_relative(&self, relative_path: &str) -> anyhow::Result<()>;
    fn absolute_from_relative(&self, rel: &str) -> PathBuf;
}
