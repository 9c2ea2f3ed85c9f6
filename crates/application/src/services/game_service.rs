use std::collections::HashSet;
use std::sync::Arc;

use domain::{
    CatalogRepository, DomainError, Game, GameChanges, GameDescription, GameId, GameRepository,
    GameTitle, GenreId, NewGame, PlatformId, Price, RepositoryError, ReviewRepository, UserId,
};
use tracing::{info, warn};

use crate::{
    dto::{CreatedGameDto, GameDetailDto, GameListDto, GenreDto, PlatformDto},
    error::{ApplicationError, ApplicationResult},
    game_search::GameSearch,
    image_store::ImageStore,
};

#[derive(Debug, Clone)]
pub struct CreateGameRequest {
    pub title: String,
    pub description: String,
    pub genre_id: i32,
    pub price: i32,
    pub platform_ids: Vec<i32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateGameRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub genre_id: Option<i32>,
    pub price: Option<i32>,
    pub platform_ids: Option<Vec<i32>>,
}

pub struct GameServiceDependencies {
    pub game_repository: Arc<dyn GameRepository>,
    pub catalog_repository: Arc<dyn CatalogRepository>,
    pub review_repository: Arc<dyn ReviewRepository>,
    pub image_store: Arc<dyn ImageStore>,
}

pub struct GameService {
    deps: GameServiceDependencies,
}

fn title_conflict(err: RepositoryError) -> ApplicationError {
    match err {
        RepositoryError::Conflict => DomainError::TitleAlreadyInUse.into(),
        other => other.into(),
    }
}

/// 平台列表不能为空，重复的 id 只保留一个。
fn platform_list(ids: Vec<i32>) -> Result<Vec<PlatformId>, DomainError> {
    if ids.is_empty() {
        return Err(DomainError::invalid_argument(
            "platformIds",
            "at least one platform is required",
        ));
    }
    let mut ids: Vec<PlatformId> = ids.into_iter().map(PlatformId::new).collect();
    ids.sort();
    ids.dedup();
    Ok(ids)
}

impl GameService {
    pub fn new(deps: GameServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn genres(&self) -> ApplicationResult<Vec<GenreDto>> {
        let genres = self.deps.catalog_repository.list_genres().await?;
        Ok(genres.iter().map(GenreDto::from).collect())
    }

    pub async fn platforms(&self) -> ApplicationResult<Vec<PlatformDto>> {
        let platforms = self.deps.catalog_repository.list_platforms().await?;
        Ok(platforms.iter().map(PlatformDto::from).collect())
    }

    async fn ensure_genres_exist(&self, ids: &[GenreId]) -> ApplicationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let known: HashSet<GenreId> = self
            .deps
            .catalog_repository
            .list_genres()
            .await?
            .into_iter()
            .map(|genre| genre.id)
            .collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(*id)) {
            return Err(ApplicationError::invalid_argument(
                "genreId",
                format!("no genre with id {missing}"),
            ));
        }
        Ok(())
    }

    async fn ensure_platforms_exist(&self, ids: &[PlatformId]) -> ApplicationResult<()> {
        if ids.is_empty() {
            return Ok(());
        }
        let known: HashSet<PlatformId> = self
            .deps
            .catalog_repository
            .list_platforms()
            .await?
            .into_iter()
            .map(|platform| platform.id)
            .collect();
        if let Some(missing) = ids.iter().find(|id| !known.contains(*id)) {
            return Err(ApplicationError::invalid_argument(
                "platformIds",
                format!("no platform with id {missing}"),
            ));
        }
        Ok(())
    }

    async fn load_game(&self, game_id: GameId) -> ApplicationResult<Game> {
        Ok(self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?)
    }

    fn ensure_creator(game: &Game, actor: UserId, action: &str) -> ApplicationResult<()> {
        if !game.is_created_by(actor) {
            warn!(game_id = %game.id, actor = %actor, action, "rejected: not the creator");
            return Err(ApplicationError::not_allowed(format!(
                "only the creator of a game may {action} it"
            )));
        }
        Ok(())
    }

    pub async fn search(
        &self,
        search: GameSearch,
        viewer: Option<UserId>,
    ) -> ApplicationResult<GameListDto> {
        if search.requires_viewer() && viewer.is_none() {
            return Err(ApplicationError::Authentication);
        }
        self.ensure_genres_exist(&search.genre_ids).await?;
        self.ensure_platforms_exist(&search.platform_ids).await?;

        let summaries = self.deps.game_repository.list_summaries().await?;
        let page = search.apply(summaries, viewer);
        Ok(GameListDto::from(&page))
    }

    pub async fn get(&self, game_id: GameId) -> ApplicationResult<GameDetailDto> {
        let summary = self
            .deps
            .game_repository
            .find_summary(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        Ok(GameDetailDto::from(&summary))
    }

    pub async fn create(
        &self,
        creator: UserId,
        request: CreateGameRequest,
    ) -> ApplicationResult<CreatedGameDto> {
        let title = GameTitle::parse(request.title)?;
        let description = GameDescription::parse(request.description)?;
        let price = Price::new(request.price)?;
        let genre_id = GenreId::new(request.genre_id);
        let platform_ids = platform_list(request.platform_ids)?;

        self.ensure_genres_exist(&[genre_id]).await?;
        self.ensure_platforms_exist(&platform_ids).await?;

        if self
            .deps
            .game_repository
            .find_by_title(title.clone())
            .await?
            .is_some()
        {
            return Err(DomainError::TitleAlreadyInUse.into());
        }

        let game = self
            .deps
            .game_repository
            .create(NewGame {
                title,
                description,
                creator_id: creator,
                genre_id,
                price,
                platform_ids,
            })
            .await
            .map_err(title_conflict)?;

        info!(game_id = %game.id, creator = %creator, "game created");
        Ok(CreatedGameDto {
            game_id: game.id.value(),
        })
    }

    pub async fn update(
        &self,
        actor: UserId,
        game_id: GameId,
        request: UpdateGameRequest,
    ) -> ApplicationResult<()> {
        let changes = GameChanges {
            title: request.title.map(GameTitle::parse).transpose()?,
            description: request.description.map(GameDescription::parse).transpose()?,
            genre_id: request.genre_id.map(GenreId::new),
            price: request.price.map(Price::new).transpose()?,
            platform_ids: request.platform_ids.map(platform_list).transpose()?,
        };

        let mut game = self.load_game(game_id).await?;
        Self::ensure_creator(&game, actor, "edit")?;

        if let Some(genre_id) = changes.genre_id {
            self.ensure_genres_exist(&[genre_id]).await?;
        }
        if let Some(platform_ids) = &changes.platform_ids {
            self.ensure_platforms_exist(platform_ids).await?;
        }
        if let Some(title) = &changes.title {
            let holder = self
                .deps
                .game_repository
                .find_by_title(title.clone())
                .await?;
            if holder.is_some_and(|other| other.id != game.id) {
                return Err(DomainError::TitleAlreadyInUse.into());
            }
        }
        if changes.is_empty() {
            return Ok(());
        }

        game.apply(changes);
        self.deps
            .game_repository
            .update(game)
            .await
            .map_err(title_conflict)?;
        info!(game_id = %game_id, "game updated");
        Ok(())
    }

    /// 有评价的游戏不能删除；删除成功后顺带清理图片文件。
    pub async fn delete(&self, actor: UserId, game_id: GameId) -> ApplicationResult<()> {
        let game = self.load_game(game_id).await?;
        Self::ensure_creator(&game, actor, "delete")?;

        let reviews = self.deps.review_repository.count_for_game(game_id).await?;
        if reviews > 0 {
            return Err(ApplicationError::not_allowed(
                "cannot delete a game that has reviews",
            ));
        }

        // 并发写入的评论由仓储事务兜底，同样视为不允许
        self.deps
            .game_repository
            .delete(game_id)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => {
                    ApplicationError::not_allowed("cannot delete a game that has reviews")
                }
                RepositoryError::NotFound => DomainError::GameNotFound.into(),
                other => other.into(),
            })?;
        if let Some(filename) = game.image_filename {
            // 数据库记录已删除，文件残留不影响结果
            if let Err(err) = self.deps.image_store.delete(&filename).await {
                warn!(game_id = %game_id, error = %err, "failed to remove game image");
            }
        }
        info!(game_id = %game_id, "game deleted");
        Ok(())
    }
}
