//! 领域模型错误定义
//!
//! 业务校验失败与仓储访问失败分开建模，由上层决定映射到哪个 HTTP 状态码。

use thiserror::Error;

/// 领域模型错误类型
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// 输入不满足约束
    #[error("invalid argument {field}: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("user not found")]
    UserNotFound,

    #[error("game not found")]
    GameNotFound,

    #[error("image not found")]
    ImageNotFound,

    /// 邮箱已被其他账号使用
    #[error("email already in use")]
    EmailAlreadyInUse,

    /// 游戏标题必须全局唯一
    #[error("game title already in use")]
    TitleAlreadyInUse,

    /// 调用者身份合法，但业务规则禁止该操作
    #[error("operation not allowed: {reason}")]
    OperationNotAllowed { reason: String },
}

impl DomainError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn not_allowed(reason: impl Into<String>) -> Self {
        Self::OperationNotAllowed {
            reason: reason.into(),
        }
    }
}

/// 领域模型结果类型
pub type DomainResult<T> = Result<T, DomainError>;

/// 仓储层错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    /// 唯一约束冲突
    #[error("record conflict")]
    Conflict,
    #[error("storage error: {message}")]
    Storage { message: String },
}

impl RepositoryError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }
}
