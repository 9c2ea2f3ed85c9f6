//! 图片文件存储端口
//!
//! 数据库只记录文件名，图片字节由 [`ImageStore`] 的实现负责保存。

use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ImageStoreError {
    #[error("invalid image name: {0}")]
    InvalidName(String),
    #[error("image io error: {0}")]
    Io(String),
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ImageStoreError>;
    /// 文件不存在时返回 `None`
    async fn load(&self, filename: &str) -> Result<Option<Vec<u8>>, ImageStoreError>;
    /// 文件不存在时视为成功
    async fn delete(&self, filename: &str) -> Result<(), ImageStoreError>;
}
