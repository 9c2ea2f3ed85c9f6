use domain::{DomainError, RepositoryError};
use thiserror::Error;

use crate::image_store::ImageStoreError;
use crate::password::PasswordHasherError;

#[derive(Debug, Error)]
pub enum ApplicationError {
    #[error("domain error: {0}")]
    Domain(#[from] DomainError),
    #[error("repository error: {0}")]
    Repository(RepositoryError),
    #[error("password error: {0}")]
    Password(#[from] PasswordHasherError),
    #[error("image store error: {0}")]
    ImageStore(#[from] ImageStoreError),
    /// 缺少令牌或令牌无效
    #[error("authentication required")]
    Authentication,
    /// 登录时邮箱或密码错误
    #[error("invalid email or password")]
    InvalidCredentials,
}

impl ApplicationError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ApplicationError::Domain(DomainError::invalid_argument(field, reason))
    }

    pub fn not_allowed(reason: impl Into<String>) -> Self {
        ApplicationError::Domain(DomainError::not_allowed(reason))
    }

    /// 是否属于需要记录为服务端故障的错误
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            ApplicationError::Repository(_)
                | ApplicationError::Password(_)
                | ApplicationError::ImageStore(_)
        )
    }
}

impl From<RepositoryError> for ApplicationError {
    fn from(value: RepositoryError) -> Self {
        ApplicationError::Repository(value)
    }
}

pub type ApplicationResult<T> = Result<T, ApplicationError>;
