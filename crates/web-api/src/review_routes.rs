use application::dto::ReviewDto;
use application::services::CreateReviewRequest;
use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use domain::GameId;
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::AuthUser,
    error::ApiError,
    extract::{PathId, ValidatedJson},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(deny_unknown_fields)]
struct CreateReviewPayload {
    #[validate(range(min = 1, max = 10))]
    rating: i32,
    #[validate(length(min = 1, max = 512))]
    review: Option<String>,
}

pub fn review_routes() -> Router<AppState> {
    Router::new().route("/games/{id}/reviews", get(list_reviews).post(create_review))
}

async fn list_reviews(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<Vec<ReviewDto>>, ApiError> {
    Ok(Json(state.review_service.list(GameId::new(id)).await?))
}

async fn create_review(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateReviewPayload>,
) -> Result<StatusCode, ApiError> {
    state
        .review_service
        .create(
            user.id,
            GameId::new(id),
            CreateReviewRequest {
                rating: payload.rating,
                review: payload.review,
            },
        )
        .await?;
    Ok(StatusCode::CREATED)
}
