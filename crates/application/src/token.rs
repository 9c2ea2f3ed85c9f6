use domain::{AuthToken, DomainError};

/// 登录令牌生成器。
pub trait TokenGenerator: Send + Sync {
    fn generate(&self) -> Result<AuthToken, DomainError>;
}
