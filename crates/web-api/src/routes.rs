use axum::{extract::DefaultBodyLimit, http::StatusCode, routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::{
    game_routes::game_routes, image_routes::image_routes, library_routes::library_routes,
    review_routes::review_routes, state::AppState, user_routes::user_routes,
};

pub fn router(state: AppState) -> Router {
    let body_limit = state.max_body_bytes;
    Router::new()
        .route("/health", get(health))
        .nest("/api/v1", api_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(user_routes())
        .merge(game_routes())
        .merge(image_routes())
        .merge(library_routes())
        .merge(review_routes())
}

async fn health() -> StatusCode {
    StatusCode::OK
}
