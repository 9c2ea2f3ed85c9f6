//! Web API 层。
//!
//! 提供 Axum 路由，将 HTTP 请求委托给应用层的用例服务。

mod auth;
mod error;
mod extract;
mod game_routes;
mod image_routes;
mod library_routes;
mod review_routes;
mod routes;
mod state;
mod user_routes;

pub use auth::{AuthUser, MaybeAuthUser, AUTH_HEADER};
pub use error::{ApiError, ErrorBody};
pub use routes::router;
pub use state::{AppAdapters, AppState, DEFAULT_MAX_BODY_BYTES};
