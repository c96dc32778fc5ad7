use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::application::ports::storage_port::{StoragePort, StoredAvatar};
use rand::Rng;

pub struct FsStoragePort {
    pub uploads_root: PathBuf,
}

#[async_trait::async_trait]
impl StoragePort for FsStoragePort {
    async fn store_avatar(
        &self,
        user_id: Uuid,
        original_filename: Option<&str>,
        bytes: &[u8],
    ) -> anyhow::Result<StoredAvatar> {
        use tokio::fs;

        let dir = self
            .uploads_root
            .join("avatars")
            .join(user_id.simple().to_string());
        fs::create_dir_all(&dir).await?;

        let safe = crate::infrastructure::storage::sanitize_filename(
            original_filename.unwrap_or("avatar"),
        );
        let (stem, ext) = {
            let p = Path::new(&safe);
            let stem = p
                .file_stem()
                .and_then(|s| s.to_str())
                .filter(|s| !s.is_empty())
                .unwrap_or("avatar")
                .to_string();
            let ext = p
                .extension()
                .and_then(|s| s.to_str())
                .unwrap_or("")
                .to_ascii_lowercase();
            (stem, ext)
        };
        let token: u32 = rand::thread_rng().r#gen();
        let filename = if ext.is_empty() {
            format!("{}_{:08x}", stem, token)
        } else {
            format!("{}_{:08x}.{}", stem, token, ext)
        };

        let candidate = dir.join(&filename);
        fs::write(&candidate, bytes).await?;
        let relative = crate::infrastructure::storage::relative_from_uploads(
            self.uploads_root.as_path(),
            &candidate,
        );
        tracing::debug!(user_id = %user_id, path = %relative, size = bytes.len(), "avatar_stored");

        Ok(StoredAvatar {
            filename,
            absolute_path: candidate,
            relative_path: relative,
            size: bytes.len() as i64,
        })
    }

    async fn delete_relative(&self, relative_path: &str) -> anyhow::Result<()> {
        let path = crate::infrastructure::storage::resolve_under_root(
            self.uploads_root.as_path(),
            relative_path,
        )?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn absolute_from_relative(&self, rel: &str) -> PathBuf {
        self.uploads_root.join(rel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn stores_under_user_avatar_dir() {
        let temp = TempDir::new().unwrap();
        let storage = FsStoragePort {
            uploads_root: temp.path().to_path_buf(),
        };
        let user_id = Uuid::new_v4();

        let stored = storage
            .store_avatar(user_id, Some("Me Smiling.PNG"), b"img")
            .await
            .unwrap();
        let prefix = format!("avatars/{}/Me_Smiling_", user_id.simple());
        assert!(stored.relative_path.starts_with(&prefix), "{}", stored.relative_path);
        assert!(stored.relative_path.ends_with(".png"));
        assert_eq!(stored.size, 3);
        assert_eq!(std::fs::read(&stored.absolute_path).unwrap(), b"img");

        storage.delete_relative(&stored.relative_path).await.unwrap();
        assert!(!stored.absolute_path.exists());
        // deleting twice is fine
        storage.delete_relative(&stored.relative_path).await.unwrap();
    }

    #[tokio::test]
    async fn refuses_to_delete_outside_root() {
        let temp = TempDir::new().unwrap();
        let storage = FsStoragePort {
            uploads_root: temp.path().join("uploads"),
        };
        assert!(storage.delete_relative("../outside.png").await.is_err());
    }
}
