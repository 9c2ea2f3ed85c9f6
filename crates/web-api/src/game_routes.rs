use application::dto::{CreatedGameDto, GameDetailDto, GameListDto, GenreDto, PlatformDto};
use application::services::{CreateGameRequest, UpdateGameRequest};
use application::{GameSearch, GameSortOrder};
use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use domain::{GameId, GenreId, PlatformId, UserId};
use serde::Deserialize;
use validator::Validate;

use crate::{
    auth::{AuthUser, MaybeAuthUser},
    error::ApiError,
    extract::{PathId, ValidatedJson, ValidatedQuery},
    state::AppState,
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
struct GameListQuery {
    start_index: Option<usize>,
    count: Option<usize>,
    #[validate(length(min = 1, max = 64))]
    q: Option<String>,
    #[serde(default)]
    genre_ids: Vec<i32>,
    #[validate(range(min = 0))]
    price: Option<i32>,
    #[serde(default)]
    platform_ids: Vec<i32>,
    creator_id: Option<i32>,
    reviewer_id: Option<i32>,
    sort_by: Option<GameSortOrder>,
    owned_by_me: Option<bool>,
    wishlisted_by_me: Option<bool>,
}

impl From<GameListQuery> for GameSearch {
    fn from(query: GameListQuery) -> Self {
        GameSearch {
            start_index: query.start_index,
            count: query.count,
            q: query.q,
            genre_ids: query.genre_ids.into_iter().map(GenreId::new).collect(),
            price: query.price,
            platform_ids: query.platform_ids.into_iter().map(PlatformId::new).collect(),
            creator_id: query.creator_id.map(UserId::new),
            reviewer_id: query.reviewer_id.map(UserId::new),
            sort_by: query.sort_by.unwrap_or_default(),
            owned_by_me: query.owned_by_me.unwrap_or(false),
            wishlisted_by_me: query.wishlisted_by_me.unwrap_or(false),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct CreateGamePayload {
    #[validate(length(min = 1, max = 128))]
    title: String,
    #[validate(length(min = 1, max = 1024))]
    description: String,
    genre_id: i32,
    #[validate(range(min = 0))]
    price: i32,
    #[validate(length(min = 1))]
    platform_ids: Vec<i32>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct UpdateGamePayload {
    #[validate(length(min = 1, max = 128))]
    title: Option<String>,
    #[validate(length(min = 1, max = 1024))]
    description: Option<String>,
    genre_id: Option<i32>,
    #[validate(range(min = 0))]
    price: Option<i32>,
    #[validate(length(min = 1))]
    platform_ids: Option<Vec<i32>>,
}

pub fn game_routes() -> Router<AppState> {
    Router::new()
        .route("/games", get(list_games).post(create_game))
        .route("/games/genres", get(list_genres))
        .route("/games/platforms", get(list_platforms))
        .route(
            "/games/{id}",
            get(get_game).patch(update_game).delete(delete_game),
        )
}

async fn list_genres(State(state): State<AppState>) -> Result<Json<Vec<GenreDto>>, ApiError> {
    Ok(Json(state.game_service.genres().await?))
}

async fn list_platforms(
    State(state): State<AppState>,
) -> Result<Json<Vec<PlatformDto>>, ApiError> {
    Ok(Json(state.game_service.platforms().await?))
}

async fn list_games(
    State(state): State<AppState>,
    viewer: MaybeAuthUser,
    ValidatedQuery(query): ValidatedQuery<GameListQuery>,
) -> Result<Json<GameListDto>, ApiError> {
    let dto = state
        .game_service
        .search(GameSearch::from(query), viewer.id())
        .await?;
    Ok(Json(dto))
}

async fn get_game(
    State(state): State<AppState>,
    PathId(id): PathId,
) -> Result<Json<GameDetailDto>, ApiError> {
    Ok(Json(state.game_service.get(GameId::new(id)).await?))
}

async fn create_game(
    State(state): State<AppState>,
    AuthUser(user): AuthUser,
    ValidatedJson(payload): ValidatedJson<CreateGamePayload>,
) -> Result<(StatusCode, Json<CreatedGameDto>), ApiError> {
    let dto = state
        .game_service
        .create(
            user.id,
            CreateGameRequest {
                title: payload.title,
                description: payload.description,
                genre_id: payload.genre_id,
                price: payload.price,
                platform_ids: payload.platform_ids,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(dto)))
}

async fn update_game(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
    ValidatedJson(payload): ValidatedJson<UpdateGamePayload>,
) -> Result<StatusCode, ApiError> {
    state
        .game_service
        .update(
            user.id,
            GameId::new(id),
            UpdateGameRequest {
                title: payload.title,
                description: payload.description,
                genre_id: payload.genre_id,
                price: payload.price,
                platform_ids: payload.platform_ids,
            },
        )
        .await?;
    Ok(StatusCode::OK)
}

async fn delete_game(
    State(state): State<AppState>,
    PathId(id): PathId,
    AuthUser(user): AuthUser,
) -> Result<StatusCode, ApiError> {
    state.game_service.delete(user.id, GameId::new(id)).await?;
    Ok(StatusCode::OK)
}
