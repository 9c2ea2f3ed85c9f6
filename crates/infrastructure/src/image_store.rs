//! 本地文件系统上的图片存储。

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use application::{ImageStore, ImageStoreError};
use async_trait::async_trait;
use tracing::debug;

#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// 只接受单层文件名，防止路径穿越。
    fn path_for(&self, filename: &str) -> Result<PathBuf, ImageStoreError> {
        let valid = !filename.is_empty()
            && !filename.starts_with('.')
            && filename
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
        if !valid {
            return Err(ImageStoreError::InvalidName(filename.to_owned()));
        }
        Ok(self.root.join(filename))
    }
}

fn io_error(err: std::io::Error) -> ImageStoreError {
    ImageStoreError::Io(err.to_string())
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(io_error)?;
        tokio::fs::write(&path, bytes).await.map_err(io_error)?;
        debug!(path = %path.display(), size = bytes.len(), "image written");
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        let path = self.path_for(filename)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(io_error(err)),
        }
    }

    async fn delete(&self, filename: &str) -> Result<(), ImageStoreError> {
        let path = self.path_for(filename)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(io_error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> FsImageStore {
        let dir = std::env::temp_dir().join(format!("marketplace-images-{}", uuid::Uuid::new_v4()));
        FsImageStore::new(dir)
    }

    #[tokio::test]
    async fn save_load_delete_cycle() {
        let store = temp_store();
        store.save("game_1.png", b"\x89PNG").await.unwrap();
        assert_eq!(
            store.load("game_1.png").await.unwrap(),
            Some(b"\x89PNG".to_vec())
        );

        store.delete("game_1.png").await.unwrap();
        assert_eq!(store.load("game_1.png").await.unwrap(), None);
        // 再次删除不存在的文件不报错
        store.delete("game_1.png").await.unwrap();

        let _ = tokio::fs::remove_dir_all(store.root()).await;
    }

    #[tokio::test]
    async fn rejects_path_like_names() {
        let store = temp_store();
        for name in ["../etc/passwd", "a/b.png", "", ".hidden"] {
            assert!(matches!(
                store.save(name, b"x").await,
                Err(ImageStoreError::InvalidName(_))
            ));
        }
    }
}
