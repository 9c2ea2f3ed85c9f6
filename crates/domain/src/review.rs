use crate::value_objects::{GameId, Rating, ReviewText, Timestamp, UserId};

/// 新评价，时间戳由存储层写入。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewReview {
    pub game_id: GameId,
    pub user_id: UserId,
    pub rating: Rating,
    pub review: Option<ReviewText>,
}

/// 带评价人姓名的评价记录。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewWithAuthor {
    pub reviewer_id: UserId,
    pub reviewer_first_name: String,
    pub reviewer_last_name: String,
    pub rating: i32,
    pub review: Option<String>,
    pub timestamp: Timestamp,
}
