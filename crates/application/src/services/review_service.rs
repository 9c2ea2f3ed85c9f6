use std::sync::Arc;

use domain::{
    DomainError, GameId, GameRepository, NewReview, Rating, RepositoryError, ReviewRepository,
    ReviewText, UserId,
};
use tracing::info;

use crate::{
    dto::ReviewDto,
    error::{ApplicationError, ApplicationResult},
};

#[derive(Debug, Clone)]
pub struct CreateReviewRequest {
    pub rating: i32,
    pub review: Option<String>,
}

pub struct ReviewServiceDependencies {
    pub game_repository: Arc<dyn GameRepository>,
    pub review_repository: Arc<dyn ReviewRepository>,
}

pub struct ReviewService {
    deps: ReviewServiceDependencies,
}

fn already_reviewed() -> ApplicationError {
    ApplicationError::not_allowed("you have already reviewed this game")
}

impl ReviewService {
    pub fn new(deps: ReviewServiceDependencies) -> Self {
        Self { deps }
    }

    /// 按时间倒序列出游戏的评价。
    pub async fn list(&self, game_id: GameId) -> ApplicationResult<Vec<ReviewDto>> {
        self.deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        let reviews = self.deps.review_repository.list_for_game(game_id).await?;
        Ok(reviews.iter().map(ReviewDto::from).collect())
    }

    pub async fn create(
        &self,
        user_id: UserId,
        game_id: GameId,
        request: CreateReviewRequest,
    ) -> ApplicationResult<()> {
        let rating = Rating::new(request.rating)?;
        let review = request.review.map(ReviewText::parse).transpose()?;

        let game = self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        if game.is_created_by(user_id) {
            return Err(ApplicationError::not_allowed("cannot review your own game"));
        }
        if self.deps.review_repository.exists(game_id, user_id).await? {
            return Err(already_reviewed());
        }

        self.deps
            .review_repository
            .create(NewReview {
                game_id,
                user_id,
                rating,
                review,
            })
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict => already_reviewed(),
                other => other.into(),
            })?;
        info!(game_id = %game_id, user_id = %user_id, rating = rating.value(), "review posted");
        Ok(())
    }
}
