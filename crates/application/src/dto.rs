use domain::{GameSummary, Genre, Platform, ReviewWithAuthor, Timestamp, User, UserId};
use serde::Serialize;

use crate::game_search::GamePage;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredUserDto {
    pub user_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginDto {
    pub user_id: i32,
    pub token: String,
}

/// 用户资料，邮箱只对本人可见。
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfileDto {
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl UserProfileDto {
    pub fn for_viewer(user: &User, viewer: Option<UserId>) -> Self {
        Self {
            first_name: user.first_name.as_str().to_owned(),
            last_name: user.last_name.as_str().to_owned(),
            email: (viewer == Some(user.id)).then(|| user.email.as_str().to_owned()),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenreDto {
    pub genre_id: i32,
    pub name: String,
}

impl From<&Genre> for GenreDto {
    fn from(genre: &Genre) -> Self {
        Self {
            genre_id: genre.id.value(),
            name: genre.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformDto {
    pub platform_id: i32,
    pub name: String,
}

impl From<&Platform> for PlatformDto {
    fn from(platform: &Platform) -> Self {
        Self {
            platform_id: platform.id.value(),
            name: platform.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummaryDto {
    pub game_id: i32,
    pub title: String,
    pub genre_id: i32,
    pub creation_date: Timestamp,
    pub creator_id: i32,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub price: i32,
    pub rating: f64,
    pub platform_ids: Vec<i32>,
}

impl From<&GameSummary> for GameSummaryDto {
    fn from(game: &GameSummary) -> Self {
        Self {
            game_id: game.id.value(),
            title: game.title.clone(),
            genre_id: game.genre_id.value(),
            creation_date: game.creation_date,
            creator_id: game.creator_id.value(),
            creator_first_name: game.creator_first_name.clone(),
            creator_last_name: game.creator_last_name.clone(),
            price: game.price,
            rating: game.rating,
            platform_ids: game.platform_ids.iter().map(|p| p.value()).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GameListDto {
    pub games: Vec<GameSummaryDto>,
    pub count: usize,
}

impl From<&GamePage> for GameListDto {
    fn from(page: &GamePage) -> Self {
        Self {
            games: page.games.iter().map(GameSummaryDto::from).collect(),
            count: page.total,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameDetailDto {
    #[serde(flatten)]
    pub summary: GameSummaryDto,
    pub description: String,
    pub number_of_wishlists: usize,
    pub number_of_owners: usize,
}

impl From<&GameSummary> for GameDetailDto {
    fn from(game: &GameSummary) -> Self {
        Self {
            summary: GameSummaryDto::from(game),
            description: game.description.clone(),
            number_of_wishlists: game.wishlister_ids.len(),
            number_of_owners: game.owner_ids.len(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedGameDto {
    pub game_id: i32,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewDto {
    pub reviewer_id: i32,
    pub reviewer_first_name: String,
    pub reviewer_last_name: String,
    pub rating: i32,
    pub review: Option<String>,
    pub timestamp: Timestamp,
}

impl From<&ReviewWithAuthor> for ReviewDto {
    fn from(review: &ReviewWithAuthor) -> Self {
        Self {
            reviewer_id: review.reviewer_id.value(),
            reviewer_first_name: review.reviewer_first_name.clone(),
            reviewer_last_name: review.reviewer_last_name.clone(),
            rating: review.rating,
            review: review.review.clone(),
            timestamp: review.timestamp,
        }
    }
}
