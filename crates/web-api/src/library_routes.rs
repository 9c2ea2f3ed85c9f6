use axum::{extract::State, http::StatusCode, routing::post, Router};
use domain::GameId;

use crate::{auth::AuthUser, error::ApiError, extract::PathId, state::AppState};

pub fn library_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/games/{id}/wishlist",
            post(add_to_wishlist).delete(remove_from_wishlist),
        )
        .route("/games/{id}/owned", post(mark_owned).delete(unmark_owned))
}

async fn add_to_wishlist(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .library_service
        .add_to_wishlist(user.id, GameId::new(id))
        .await?;
    Ok(StatusCode::OK)
}

async fn remove_from_wishlist(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .library_service
        .remove_from_wishlist(user.id, GameId::new(id))
        .await?;
    Ok(StatusCode::OK)
}

async fn mark_owned(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .library_service
        .mark_owned(user.id, GameId::new(id))
        .await?;
    Ok(StatusCode::OK)
}

async fn unmark_owned(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state
        .library_service
        .unmark_owned(user.id, GameId::new(id))
        .await?;
    Ok(StatusCode::OK)
}
