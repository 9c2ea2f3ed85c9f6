use application::services::{LoginRequest, RegisterUserRequest, UpdateUserRequest};
use application::dto::{LoginDto, RegisteredUserDto, UserProfileDto};
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use domain::UserId;
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::{AuthUser, MaybeAuthUser},
    error::ApiError,
    extract::{PathId, ValidatedJson},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct RegisterPayload {
    #[validate(length(min = 1, max = 64))]
    first_name: String,
    #[validate(length(min = 1, max = 64))]
    last_name: String,
    #[validate(email, length(min = 1, max = 256))]
    email: String,
    #[validate(length(min = 6, max = 64))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct LoginPayload {
    #[validate(email, length(min = 1, max = 256))]
    email: String,
    #[validate(length(min = 1, max = 64))]
    password: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateUserPayload {
    #[validate(email, length(min = 1, max = 256))]
    email: Option<String>,
    #[validate(length(min = 1, max = 64))]
    first_name: Option<String>,
    #[validate(length(min = 1, max = 64))]
    last_name: Option<String>,
    #[validate(length(min = 6, max = 64))]
    password: Option<String>,
    #[validate(length(min = 1, max = 64))]
    current_password: Option<String>,
}

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/register", post(register_user))
        .route("/users/login", post(login_user))
        .route("/users/logout", post(logout_user))
        .route("/users/{id}", get(view_user).patch(update_user))
}

async fn register_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<RegisterPayload>,
) -> Result<(StatusCode, Json<RegisteredUserDto>), ApiError> {
    let dto = state
        .user_service
        .register(RegisterUserRequest {
            first_name: payload.first_name,
            last_name: payload.last_name,
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(dto)))
}

async fn login_user(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<LoginPayload>,
) -> Result<Json<LoginDto>, ApiError> {
    let dto = state
        .user_service
        .login(LoginRequest {
            email: payload.email,
            password: payload.password,
        })
        .await?;

    Ok(Json(dto))
}

async fn logout_user(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.user_service.logout(&user).await?;
    Ok(StatusCode::OK)
}

async fn view_user(
    State(state): State<AppState>,
    PathId(id): PathId,
    viewer: MaybeAuthUser,
) -> Result<Json<UserProfileDto>, ApiError> {
    let dto = state
        .user_service
        .view(UserId::new(id), viewer.id())
        .await?;
    Ok(Json(dto))
}

async fn update_user(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(actor): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateUserPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .user_service
        .update(
            &actor,
            UserId::new(id),
            UpdateUserRequest {
                email: payload.email,
                first_name: payload.first_name,
                last_name: payload.last_name,
                password: payload.password,
                current_password: payload.current_password,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}
