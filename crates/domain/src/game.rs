use serde::Serialize;

use crate::value_objects::{
    GameDescription, GameId, GameTitle, GenreId, PlatformId, Price, Timestamp, UserId,
};

/// 游戏类型。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Genre {
    pub id: GenreId,
    pub name: String,
}

/// 游戏平台。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Platform {
    pub id: PlatformId,
    pub name: String,
}

/// 游戏上架记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Game {
    pub id: GameId,
    pub title: GameTitle,
    pub description: GameDescription,
    pub creation_date: Timestamp,
    pub image_filename: Option<String>,
    pub creator_id: UserId,
    pub genre_id: GenreId,
    pub price: Price,
    pub platform_ids: Vec<PlatformId>,
}

impl Game {
    pub fn is_created_by(&self, user_id: UserId) -> bool {
        self.creator_id == user_id
    }

    pub fn apply(&mut self, changes: GameChanges) {
        if let Some(title) = changes.title {
            self.title = title;
        }
        if let Some(description) = changes.description {
            self.description = description;
        }
        if let Some(genre_id) = changes.genre_id {
            self.genre_id = genre_id;
        }
        if let Some(price) = changes.price {
            self.price = price;
        }
        if let Some(platform_ids) = changes.platform_ids {
            self.platform_ids = platform_ids;
        }
    }
}

/// 创建游戏时的输入，id 与创建时间由存储层生成。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewGame {
    pub title: GameTitle,
    pub description: GameDescription,
    pub creator_id: UserId,
    pub genre_id: GenreId,
    pub price: Price,
    pub platform_ids: Vec<PlatformId>,
}

/// 部分更新，`None` 表示保持原值。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameChanges {
    pub title: Option<GameTitle>,
    pub description: Option<GameDescription>,
    pub genre_id: Option<GenreId>,
    pub price: Option<Price>,
    pub platform_ids: Option<Vec<PlatformId>>,
}

impl GameChanges {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.genre_id.is_none()
            && self.price.is_none()
            && self.platform_ids.is_none()
    }
}

/// 列表查询使用的聚合行：游戏本身、创建者姓名、平均分，以及过滤所需的关联用户集合。
#[derive(Debug, Clone, PartialEq)]
pub struct GameSummary {
    pub id: GameId,
    pub title: String,
    pub description: String,
    pub genre_id: GenreId,
    pub creation_date: Timestamp,
    pub creator_id: UserId,
    pub creator_first_name: String,
    pub creator_last_name: String,
    pub price: i32,
    /// 平均评分，没有评价时为 0
    pub rating: f64,
    pub platform_ids: Vec<PlatformId>,
    pub reviewer_ids: Vec<UserId>,
    pub owner_ids: Vec<UserId>,
    pub wishlister_ids: Vec<UserId>,
}

impl GameSummary {
    pub fn matches_text(&self, needle_lowercase: &str) -> bool {
        self.title.to_lowercase().contains(needle_lowercase)
            || self.description.to_lowercase().contains(needle_lowercase)
    }

    pub fn supports_any_platform(&self, platforms: &[PlatformId]) -> bool {
        platforms.iter().any(|p| self.platform_ids.contains(p))
    }
}
