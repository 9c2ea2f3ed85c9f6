use application::{ImageWriteOutcome, StoredImage};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use domain::{GameId, UserId};

use crate::{auth::AuthUser, error::ApiError, extract::PathId, state::AppState};

pub fn image_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users/{id}/image",
            get(get_user_image)
                .put(put_user_image)
                .delete(delete_user_image),
        )
        .route(
            "/games/{id}/image",
            get(get_game_image)
                .put(put_game_image)
                .delete(delete_game_image),
        )
}

fn content_type(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
}

fn image_response(image: StoredImage) -> Response {
    (
        [(header::CONTENT_TYPE, image.kind.content_type())],
        image.bytes,
    )
        .into_response()
}

fn write_status(outcome: ImageWriteOutcome) -> StatusCode {
    match outcome {
        ImageWriteOutcome::Created => StatusCode::CREATED,
        ImageWriteOutcome::Replaced => StatusCode::OK,
    }
}

async fn get_user_image(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Response, ApiError> {
    let image = state.image_service.user_image(UserId::new(id)).await?;
    Ok(image_response(image))
}

async fn put_user_image(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .image_service
        .set_user_image(user.id, UserId::new(id), content_type(&headers), &body)
        .await?;
    Ok(write_status(outcome))
}

async fn delete_user_image(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .image_service
        .delete_user_image(user.id, UserId::new(id))
        .await?;
    Ok(StatusCode::OK)
}

async fn get_game_image(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Response, ApiError> {
    let image = state.image_service.game_image(GameId::new(id)).await?;
    Ok(image_response(image))
}

async fn put_game_image(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
    headers: HeaderMap,
    body: Bytes,
) -> Result<StatusCode, ApiError> {
    let outcome = state
        .image_service
        .set_game_image(user.id, GameId::new(id), content_type(&headers), &body)
        .await?;
    Ok(write_status(outcome))
}

async fn delete_game_image(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .image_service
        .delete_game_image(user.id, GameId::new(id))
        .await?;
    Ok(StatusCode::OK)
}
