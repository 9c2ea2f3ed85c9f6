//! 游戏列表的过滤、排序与分页
//!
//! 仓储返回全部游戏的聚合行，这里按查询条件在内存中依次过滤、排序、截取。
//! 所有过滤条件是"与"关系，排序相同的项按游戏 id 升序。

use std::cmp::Ordering;

use domain::{GameSummary, GenreId, PlatformId, UserId};
use serde::Deserialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GameSortOrder {
    AlphabeticalAsc,
    AlphabeticalDesc,
    PriceAsc,
    PriceDesc,
    #[default]
    CreatedAsc,
    CreatedDesc,
    RatingAsc,
    RatingDesc,
}

impl GameSortOrder {
    fn compare(self, a: &GameSummary, b: &GameSummary) -> Ordering {
        let primary = match self {
            Self::AlphabeticalAsc => compare_titles(a, b),
            Self::AlphabeticalDesc => compare_titles(b, a),
            Self::PriceAsc => a.price.cmp(&b.price),
            Self::PriceDesc => b.price.cmp(&a.price),
            Self::CreatedAsc => a.creation_date.cmp(&b.creation_date),
            Self::CreatedDesc => b.creation_date.cmp(&a.creation_date),
            Self::RatingAsc => a.rating.total_cmp(&b.rating),
            Self::RatingDesc => b.rating.total_cmp(&a.rating),
        };
        primary.then_with(|| a.id.cmp(&b.id))
    }
}

fn compare_titles(a: &GameSummary, b: &GameSummary) -> Ordering {
    a.title
        .to_lowercase()
        .cmp(&b.title.to_lowercase())
        .then_with(|| a.title.cmp(&b.title))
}

/// 游戏列表查询条件。
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameSearch {
    pub start_index: Option<usize>,
    pub count: Option<usize>,
    pub q: Option<String>,
    pub genre_ids: Vec<GenreId>,
    pub price: Option<i32>,
    pub platform_ids: Vec<PlatformId>,
    pub creator_id: Option<UserId>,
    pub reviewer_id: Option<UserId>,
    pub sort_by: GameSortOrder,
    pub owned_by_me: bool,
    pub wishlisted_by_me: bool,
}

/// 过滤后的一页结果，`total` 为分页前的匹配数量。
#[derive(Debug, Clone, PartialEq)]
pub struct GamePage {
    pub games: Vec<GameSummary>,
    pub total: usize,
}

impl GameSearch {
    pub fn requires_viewer(&self) -> bool {
        self.owned_by_me || self.wishlisted_by_me
    }

    fn matches(&self, game: &GameSummary, needle: Option<&str>, viewer: Option<UserId>) -> bool {
        if let Some(needle) = needle {
            if !game.matches_text(needle) {
                return false;
            }
        }
        if let Some(max_price) = self.price {
            if game.price > max_price {
                return false;
            }
        }
        if !self.genre_ids.is_empty() && !self.genre_ids.contains(&game.genre_id) {
            return false;
        }
        if !self.platform_ids.is_empty() && !game.supports_any_platform(&self.platform_ids) {
            return false;
        }
        if let Some(creator) = self.creator_id {
            if game.creator_id != creator {
                return false;
            }
        }
        if let Some(reviewer) = self.reviewer_id {
            if !game.reviewer_ids.contains(&reviewer) {
                return false;
            }
        }
        // 匿名访问时"我的"过滤条件匹配不到任何游戏
        if self.owned_by_me && !viewer.is_some_and(|v| game.owner_ids.contains(&v)) {
            return false;
        }
        if self.wishlisted_by_me && !viewer.is_some_and(|v| game.wishlister_ids.contains(&v)) {
            return false;
        }
        true
    }

    pub fn apply(&self, games: Vec<GameSummary>, viewer: Option<UserId>) -> GamePage {
        let needle = self.q.as_ref().map(|q| q.to_lowercase());
        let mut matched: Vec<GameSummary> = games
            .into_iter()
            .filter(|game| self.matches(game, needle.as_deref(), viewer))
            .collect();
        matched.sort_by(|a, b| self.sort_by.compare(a, b));

        let total = matched.len();
        let start = self.start_index.unwrap_or(0);
        let games = matched
            .into_iter()
            .skip(start)
            .take(self.count.unwrap_or(usize::MAX))
            .collect();

        GamePage { games, total }
    }
}
