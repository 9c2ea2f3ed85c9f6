use futures::future::BoxFuture;

use crate::errors::RepositoryError;
use crate::game::{Game, GameSummary, Genre, NewGame, Platform};
use crate::review::{NewReview, ReviewWithAuthor};
use crate::user::{NewUser, User};
use crate::value_objects::{AuthToken, GameId, GameTitle, UserEmail, UserId};

pub type RepositoryResult<T> = Result<T, RepositoryError>;
pub type RepositoryFuture<T> = BoxFuture<'static, RepositoryResult<T>>;

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait UserRepository: Send + Sync {
    fn create(&self, user: NewUser) -> RepositoryFuture<User>;
    fn update(&self, user: User) -> RepositoryFuture<User>;
    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>>;
    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>>;
    fn find_by_token(&self, token: AuthToken) -> RepositoryFuture<Option<User>>;
    fn set_auth_token(&self, id: UserId, token: Option<AuthToken>) -> RepositoryFuture<()>;
    fn set_image_filename(&self, id: UserId, filename: Option<String>) -> RepositoryFuture<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait GameRepository: Send + Sync {
    /// 写入游戏及其平台关联，二者在同一事务内完成
    fn create(&self, game: NewGame) -> RepositoryFuture<Game>;
    fn update(&self, game: Game) -> RepositoryFuture<Game>;
    /// 删除游戏以及平台、心愿单、拥有记录。
    /// 评论检查与删除在同一事务内，存在评论时返回 `Conflict`
    fn delete(&self, id: GameId) -> RepositoryFuture<()>;
    fn find_by_id(&self, id: GameId) -> RepositoryFuture<Option<Game>>;
    fn find_by_title(&self, title: GameTitle) -> RepositoryFuture<Option<Game>>;
    /// 全部游戏的聚合视图，按创建时间升序
    fn list_summaries(&self) -> RepositoryFuture<Vec<GameSummary>>;
    fn find_summary(&self, id: GameId) -> RepositoryFuture<Option<GameSummary>>;
    fn set_image_filename(&self, id: GameId, filename: Option<String>) -> RepositoryFuture<()>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait CatalogRepository: Send + Sync {
    fn list_genres(&self) -> RepositoryFuture<Vec<Genre>>;
    fn list_platforms(&self) -> RepositoryFuture<Vec<Platform>>;
}

/// 心愿单与已拥有记录。
#[cfg_attr(feature = "testing", mockall::automock)]
pub trait LibraryRepository: Send + Sync {
    fn is_wishlisted(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
    /// 已在心愿单中时不报错；已拥有时不写入并返回 `false`。
    /// 与 `mark_owned` 对同一 (游戏, 用户) 串行执行
    fn add_to_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
    /// 返回是否真的删除了记录
    fn remove_from_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
    fn is_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
    /// 标记为已拥有，并在同一事务内移出心愿单
    fn mark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<()>;
    fn unmark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
}

#[cfg_attr(feature = "testing", mockall::automock)]
pub trait ReviewRepository: Send + Sync {
    fn create(&self, review: NewReview) -> RepositoryFuture<()>;
    fn exists(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool>;
    fn count_for_game(&self, game_id: GameId) -> RepositoryFuture<i64>;
    /// 按时间倒序
    fn list_for_game(&self, game_id: GameId) -> RepositoryFuture<Vec<ReviewWithAuthor>>;
}
