//! 心愿单与已拥有游戏
//!
//! 创建者不能收藏或拥有自己的游戏；已拥有的游戏不能再加入心愿单，
//! 标记为已拥有时会自动移出心愿单。

use std::sync::Arc;

use domain::{DomainError, Game, GameId, GameRepository, LibraryRepository, UserId};
use tracing::info;

use crate::error::{ApplicationError, ApplicationResult};

pub struct LibraryServiceDependencies {
    pub game_repository: Arc<dyn GameRepository>,
    pub library_repository: Arc<dyn LibraryRepository>,
}

pub struct LibraryService {
    deps: LibraryServiceDependencies,
}

impl LibraryService {
    pub fn new(deps: LibraryServiceDependencies) -> Self {
        Self { deps }
    }

    async fn load_game(&self, game_id: GameId) -> ApplicationResult<Game> {
        Ok(self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?)
    }

    pub async fn add_to_wishlist(&self, user_id: UserId, game_id: GameId) -> ApplicationResult<()> {
        let game = self.load_game(game_id).await?;
        if game.is_created_by(user_id) {
            return Err(ApplicationError::not_allowed(
                "cannot wishlist a game you created",
            ));
        }
        let added = self
            .deps
            .library_repository
            .add_to_wishlist(game_id, user_id)
            .await?;
        if !added {
            return Err(ApplicationError::not_allowed(
                "cannot wishlist a game you already own",
            ));
        }
        info!(game_id = %game_id, user_id = %user_id, "game wishlisted");
        Ok(())
    }

    pub async fn remove_from_wishlist(
        &self,
        user_id: UserId,
        game_id: GameId,
    ) -> ApplicationResult<()> {
        self.load_game(game_id).await?;
        let removed = self
            .deps
            .library_repository
            .remove_from_wishlist(game_id, user_id)
            .await?;
        if !removed {
            return Err(ApplicationError::not_allowed(
                "cannot unwishlist a game you have not wishlisted",
            ));
        }
        info!(game_id = %game_id, user_id = %user_id, "game removed from wishlist");
        Ok(())
    }

    pub async fn mark_owned(&self, user_id: UserId, game_id: GameId) -> ApplicationResult<()> {
        let game = self.load_game(game_id).await?;
        if game.is_created_by(user_id) {
            return Err(ApplicationError::not_allowed(
                "cannot mark a game you created as owned",
            ));
        }
        self.deps
            .library_repository
            .mark_owned(game_id, user_id)
            .await?;
        info!(game_id = %game_id, user_id = %user_id, "game marked as owned");
        Ok(())
    }

    pub async fn unmark_owned(&self, user_id: UserId, game_id: GameId) -> ApplicationResult<()> {
        self.load_game(game_id).await?;
        let removed = self
            .deps
            .library_repository
            .unmark_owned(game_id, user_id)
            .await?;
        if !removed {
            return Err(ApplicationError::not_allowed(
                "cannot unmark a game you do not own",
            ));
        }
        info!(game_id = %game_id, user_id = %user_id, "game unmarked as owned");
        Ok(())
    }
}
