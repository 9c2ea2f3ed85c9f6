//! 请求提取器：路径 id、带校验的 JSON 与查询参数。
//!
//! 所有解析失败统一转换为 400 [`ApiError`]。

use axum::{
    extract::{FromRequest, FromRequestParts, Path, Request},
    http::request::Parts,
    Json,
};
use axum_extra::extract::Query;
use serde::de::DeserializeOwned;
use validator::Validate;

use crate::error::ApiError;

/// 路径中的整数 id。
#[derive(Debug, Clone, Copy)]
pub struct PathId(pub i32);

impl<S: Send + Sync> FromRequestParts<S> for PathId {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(id) = Path::<i32>::from_request_parts(parts, state)
            .await
            .map_err(|_| ApiError::bad_request("id must be an integer"))?;
        Ok(PathId(id))
    }
}

/// 反序列化后再执行 `validator` 规则的 JSON 请求体。
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.body_text()))?;
        value
            .validate()
            .map_err(|errors| ApiError::bad_request(errors.to_string()))?;
        Ok(ValidatedJson(value))
    }
}

/// 支持重复键（`genreIds=1&genreIds=2`）的查询参数，同样经过校验。
#[derive(Debug, Clone)]
pub struct ValidatedQuery<T>(pub T);

impl<T, S> FromRequestParts<S> for ValidatedQuery<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection| ApiError::bad_request(rejection.to_string()))?;
        value
            .validate()
            .map_err(|errors| ApiError::bad_request(errors.to_string()))?;
        Ok(ValidatedQuery(value))
    }
}
