//! 基于 `X-Authorization` 请求头的身份提取。
//!
//! 令牌是登录时签发并保存在用户表中的随机字符串，
//! 提取器通过 [`UserService::authenticate`](application::UserService::authenticate) 查找对应用户。

use axum::{extract::FromRequestParts, http::request::Parts};
use domain::{User, UserId};

use crate::{error::ApiError, state::AppState};

pub const AUTH_HEADER: &str = "X-Authorization";

fn token_from_parts(parts: &Parts) -> Result<Option<&str>, ApiError> {
    match parts.headers.get(AUTH_HEADER) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(Some)
            .map_err(|_| ApiError::unauthorized("malformed authorization header")),
    }
}

/// 必须登录的接口使用；未登录时返回 401。
#[derive(Debug, Clone)]
pub struct AuthUser(pub User);

impl AuthUser {
    pub fn id(&self) -> UserId {
        self.0.id
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = token_from_parts(parts)?;
        state
            .user_service
            .authenticate(token)
            .await?
            .map(AuthUser)
            .ok_or_else(|| ApiError::unauthorized("missing or invalid authorization token"))
    }
}

/// 可选登录；令牌缺失或无效时视为匿名访问。
#[derive(Debug, Clone)]
pub struct MaybeAuthUser(pub Option<User>);

impl MaybeAuthUser {
    pub fn id(&self) -> Option<UserId> {
        self.0.as_ref().map(|user| user.id)
    }
}

impl FromRequestParts<AppState> for MaybeAuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let Ok(token) = token_from_parts(parts) else {
            return Ok(MaybeAuthUser(None));
        };
        let user = state.user_service.authenticate(token).await?;
        Ok(MaybeAuthUser(user))
    }
}
