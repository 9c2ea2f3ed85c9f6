use std::sync::Arc;
use std::time::Duration;

use domain::{
    AuthToken, CatalogRepository, Game, GameDescription, GameId, GameRepository, GameSummary,
    GameTitle, Genre, GenreId, LibraryRepository, NewGame, NewReview, NewUser, PasswordHash,
    PersonName, Platform, PlatformId, Price, RepositoryError, RepositoryFuture, ReviewRepository,
    ReviewWithAuthor, Timestamp, User, UserEmail, UserId, UserRepository,
};
use sqlx::{postgres::PgPoolOptions, FromRow, PgPool};

fn map_sqlx_err(err: sqlx::Error) -> RepositoryError {
    match &err {
        sqlx::Error::RowNotFound => RepositoryError::NotFound,
        sqlx::Error::Database(db) if db.is_unique_violation() => RepositoryError::Conflict,
        _ => RepositoryError::storage(err.to_string()),
    }
}

fn invalid_data(message: impl Into<String>) -> RepositoryError {
    RepositoryError::storage(message)
}

fn to_ids<T: From<i32>>(values: Vec<i32>) -> Vec<T> {
    values.into_iter().map(T::from).collect()
}

fn from_ids<T: Copy + Into<i32>>(values: &[T]) -> Vec<i32> {
    values.iter().map(|id| (*id).into()).collect()
}

#[derive(Debug, FromRow)]
struct UserRecord {
    id: i32,
    email: String,
    first_name: String,
    last_name: String,
    image_filename: Option<String>,
    password: String,
    auth_token: Option<String>,
}

impl TryFrom<UserRecord> for User {
    type Error = RepositoryError;

    fn try_from(value: UserRecord) -> Result<Self, Self::Error> {
        let email = UserEmail::parse(value.email).map_err(|err| invalid_data(err.to_string()))?;
        let first_name = PersonName::parse("firstName", value.first_name)
            .map_err(|err| invalid_data(err.to_string()))?;
        let last_name = PersonName::parse("lastName", value.last_name)
            .map_err(|err| invalid_data(err.to_string()))?;
        let password =
            PasswordHash::new(value.password).map_err(|err| invalid_data(err.to_string()))?;
        let auth_token = value
            .auth_token
            .map(AuthToken::new)
            .transpose()
            .map_err(|err| invalid_data(err.to_string()))?;

        Ok(User {
            id: UserId::new(value.id),
            email,
            first_name,
            last_name,
            image_filename: value.image_filename,
            password,
            auth_token,
        })
    }
}

const USER_COLUMNS: &str =
    "id, email, first_name, last_name, image_filename, password, auth_token";

#[derive(Clone)]
pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl UserRepository for PgUserRepository {
    fn create(&self, user: NewUser) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                r#"
                INSERT INTO users (email, first_name, last_name, password)
                VALUES ($1, $2, $3, $4)
                RETURNING {USER_COLUMNS}
                "#
            ))
            .bind(user.email.as_str())
            .bind(user.first_name.as_str())
            .bind(user.last_name.as_str())
            .bind(user.password.as_str())
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                r#"
                UPDATE users
                SET email = $2, first_name = $3, last_name = $4, password = $5
                WHERE id = $1
                RETURNING {USER_COLUMNS}
                "#
            ))
            .bind(user.id.value())
            .bind(user.email.as_str())
            .bind(user.first_name.as_str())
            .bind(user.last_name.as_str())
            .bind(user.password.as_str())
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)?;

            User::try_from(record)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
            ))
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
            ))
            .bind(email.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn find_by_token(&self, token: AuthToken) -> RepositoryFuture<Option<User>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, UserRecord>(&format!(
                "SELECT {USER_COLUMNS} FROM users WHERE auth_token = $1"
            ))
            .bind(token.as_str())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            record.map(User::try_from).transpose()
        })
    }

    fn set_auth_token(&self, id: UserId, token: Option<AuthToken>) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE users SET auth_token = $2 WHERE id = $1")
                .bind(id.value())
                .bind(token.as_ref().map(AuthToken::as_str))
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }

    fn set_image_filename(&self, id: UserId, filename: Option<String>) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE users SET image_filename = $2 WHERE id = $1")
                .bind(id.value())
                .bind(filename)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}

#[derive(Debug, FromRow)]
struct GameRecord {
    id: i32,
    title: String,
    description: String,
    creation_date: Timestamp,
    image_filename: Option<String>,
    creator_id: i32,
    genre_id: i32,
    price: i32,
    platform_ids: Vec<i32>,
}

impl TryFrom<GameRecord> for Game {
    type Error = RepositoryError;

    fn try_from(value: GameRecord) -> Result<Self, Self::Error> {
        let title = GameTitle::parse(value.title).map_err(|err| invalid_data(err.to_string()))?;
        let description = GameDescription::parse(value.description)
            .map_err(|err| invalid_data(err.to_string()))?;
        let price = Price::new(value.price).map_err(|err| invalid_data(err.to_string()))?;

        Ok(Game {
            id: GameId::new(value.id),
            title,
            description,
            creation_date: value.creation_date,
            image_filename: value.image_filename,
            creator_id: UserId::new(value.creator_id),
            genre_id: GenreId::new(value.genre_id),
            price,
            platform_ids: to_ids(value.platform_ids),
        })
    }
}

const GAME_SELECT: &str = r#"
    SELECT g.id, g.title, g.description, g.creation_date, g.image_filename,
           g.creator_id, g.genre_id, g.price,
           ARRAY(SELECT gp.platform_id FROM game_platforms gp
                 WHERE gp.game_id = g.id ORDER BY gp.platform_id) AS platform_ids
    FROM games g
"#;

#[derive(Debug, FromRow)]
struct GameSummaryRecord {
    id: i32,
    title: String,
    description: String,
    genre_id: i32,
    creation_date: Timestamp,
    creator_id: i32,
    creator_first_name: String,
    creator_last_name: String,
    price: i32,
    rating: f64,
    platform_ids: Vec<i32>,
    reviewer_ids: Vec<i32>,
    owner_ids: Vec<i32>,
    wishlister_ids: Vec<i32>,
}

impl From<GameSummaryRecord> for GameSummary {
    fn from(value: GameSummaryRecord) -> Self {
        GameSummary {
            id: GameId::new(value.id),
            title: value.title,
            description: value.description,
            genre_id: GenreId::new(value.genre_id),
            creation_date: value.creation_date,
            creator_id: UserId::new(value.creator_id),
            creator_first_name: value.creator_first_name,
            creator_last_name: value.creator_last_name,
            price: value.price,
            rating: value.rating,
            platform_ids: to_ids(value.platform_ids),
            reviewer_ids: to_ids(value.reviewer_ids),
            owner_ids: to_ids(value.owner_ids),
            wishlister_ids: to_ids(value.wishlister_ids),
        }
    }
}

// 每行附带平均分和关联用户集合，过滤与排序在应用层完成
const GAME_SUMMARY_SELECT: &str = r#"
    SELECT g.id, g.title, g.description, g.genre_id, g.creation_date, g.creator_id,
           u.first_name AS creator_first_name, u.last_name AS creator_last_name, g.price,
           COALESCE((SELECT AVG(r.rating)::float8 FROM game_reviews r
                     WHERE r.game_id = g.id), 0::float8) AS rating,
           ARRAY(SELECT gp.platform_id FROM game_platforms gp
                 WHERE gp.game_id = g.id ORDER BY gp.platform_id) AS platform_ids,
           ARRAY(SELECT r.user_id FROM game_reviews r WHERE r.game_id = g.id) AS reviewer_ids,
           ARRAY(SELECT o.user_id FROM owned_games o WHERE o.game_id = g.id) AS owner_ids,
           ARRAY(SELECT w.user_id FROM wishlists w WHERE w.game_id = g.id) AS wishlister_ids
    FROM games g
    JOIN users u ON u.id = g.creator_id
"#;

#[derive(Clone)]
pub struct PgGameRepository {
    pool: PgPool,
}

impl PgGameRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl GameRepository for PgGameRepository {
    fn create(&self, game: NewGame) -> RepositoryFuture<Game> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let platform_ids = from_ids(&game.platform_ids);
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;

            let record = sqlx::query_as::<_, GameRecord>(
                r#"
                INSERT INTO games (title, description, creator_id, genre_id, price)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING id, title, description, creation_date, image_filename,
                          creator_id, genre_id, price, $6::int4[] AS platform_ids
                "#,
            )
            .bind(game.title.as_str())
            .bind(game.description.as_str())
            .bind(game.creator_id.value())
            .bind(game.genre_id.value())
            .bind(game.price.cents())
            .bind(&platform_ids)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

            sqlx::query(
                "INSERT INTO game_platforms (game_id, platform_id) SELECT $1, UNNEST($2::int4[])",
            )
            .bind(record.id)
            .bind(&platform_ids)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

            tx.commit().await.map_err(map_sqlx_err)?;
            Game::try_from(record)
        })
    }

    fn update(&self, game: Game) -> RepositoryFuture<Game> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let platform_ids = from_ids(&game.platform_ids);
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;

            let record = sqlx::query_as::<_, GameRecord>(
                r#"
                UPDATE games
                SET title = $2, description = $3, genre_id = $4, price = $5
                WHERE id = $1
                RETURNING id, title, description, creation_date, image_filename,
                          creator_id, genre_id, price, $6::int4[] AS platform_ids
                "#,
            )
            .bind(game.id.value())
            .bind(game.title.as_str())
            .bind(game.description.as_str())
            .bind(game.genre_id.value())
            .bind(game.price.cents())
            .bind(&platform_ids)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_err)?
            .ok_or(RepositoryError::NotFound)?;

            sqlx::query("DELETE FROM game_platforms WHERE game_id = $1")
                .bind(record.id)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            sqlx::query(
                "INSERT INTO game_platforms (game_id, platform_id) SELECT $1, UNNEST($2::int4[])",
            )
            .bind(record.id)
            .bind(&platform_ids)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;

            tx.commit().await.map_err(map_sqlx_err)?;
            Game::try_from(record)
        })
    }

    fn delete(&self, id: GameId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            // 行锁与插入评论时的外键锁互斥
            let locked =
                sqlx::query_scalar::<_, i32>("SELECT id FROM games WHERE id = $1 FOR UPDATE")
                    .bind(id.value())
                    .fetch_optional(&mut *tx)
                    .await
                    .map_err(map_sqlx_err)?;
            if locked.is_none() {
                return Err(RepositoryError::NotFound);
            }
            let reviewed = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM game_reviews WHERE game_id = $1)",
            )
            .bind(id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            if reviewed {
                return Err(RepositoryError::Conflict);
            }

            // 平台、心愿单与拥有记录通过外键级联删除
            sqlx::query("DELETE FROM games WHERE id = $1")
                .bind(id.value())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn find_by_id(&self, id: GameId) -> RepositoryFuture<Option<Game>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, GameRecord>(&format!("{GAME_SELECT} WHERE g.id = $1"))
                .bind(id.value())
                .fetch_optional(&pool)
                .await
                .map_err(map_sqlx_err)?;

            record.map(Game::try_from).transpose()
        })
    }

    fn find_by_title(&self, title: GameTitle) -> RepositoryFuture<Option<Game>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record =
                sqlx::query_as::<_, GameRecord>(&format!("{GAME_SELECT} WHERE g.title = $1"))
                    .bind(title.as_str())
                    .fetch_optional(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            record.map(Game::try_from).transpose()
        })
    }

    fn list_summaries(&self) -> RepositoryFuture<Vec<GameSummary>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, GameSummaryRecord>(&format!(
                "{GAME_SUMMARY_SELECT} ORDER BY g.creation_date ASC, g.id ASC"
            ))
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(records.into_iter().map(GameSummary::from).collect())
        })
    }

    fn find_summary(&self, id: GameId) -> RepositoryFuture<Option<GameSummary>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let record = sqlx::query_as::<_, GameSummaryRecord>(&format!(
                "{GAME_SUMMARY_SELECT} WHERE g.id = $1"
            ))
            .bind(id.value())
            .fetch_optional(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(record.map(GameSummary::from))
        })
    }

    fn set_image_filename(&self, id: GameId, filename: Option<String>) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("UPDATE games SET image_filename = $2 WHERE id = $1")
                .bind(id.value())
                .bind(filename)
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            if result.rows_affected() == 0 {
                return Err(RepositoryError::NotFound);
            }
            Ok(())
        })
    }
}

#[derive(Debug, FromRow)]
struct NamedRecord {
    id: i32,
    name: String,
}

#[derive(Clone)]
pub struct PgCatalogRepository {
    pool: PgPool,
}

impl PgCatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl CatalogRepository for PgCatalogRepository {
    fn list_genres(&self) -> RepositoryFuture<Vec<Genre>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records =
                sqlx::query_as::<_, NamedRecord>("SELECT id, name FROM genres ORDER BY id")
                    .fetch_all(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            Ok(records
                .into_iter()
                .map(|record| Genre {
                    id: GenreId::new(record.id),
                    name: record.name,
                })
                .collect())
        })
    }

    fn list_platforms(&self) -> RepositoryFuture<Vec<Platform>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records =
                sqlx::query_as::<_, NamedRecord>("SELECT id, name FROM platforms ORDER BY id")
                    .fetch_all(&pool)
                    .await
                    .map_err(map_sqlx_err)?;

            Ok(records
                .into_iter()
                .map(|record| Platform {
                    id: PlatformId::new(record.id),
                    name: record.name,
                })
                .collect())
        })
    }
}

#[derive(Clone)]
pub struct PgLibraryRepository {
    pool: PgPool,
}

impl PgLibraryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// 事务级咨询锁，串行化同一 (游戏, 用户) 的心愿单与拥有写入
async fn lock_library_entry(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    game_id: GameId,
    user_id: UserId,
) -> Result<(), RepositoryError> {
    sqlx::query("SELECT pg_advisory_xact_lock($1, $2)")
        .bind(game_id.value())
        .bind(user_id.value())
        .execute(&mut **tx)
        .await
        .map_err(map_sqlx_err)?;
    Ok(())
}

impl LibraryRepository for PgLibraryRepository {
    fn is_wishlisted(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM wishlists WHERE game_id = $1 AND user_id = $2)",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)
        })
    }

    fn add_to_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            lock_library_entry(&mut tx, game_id, user_id).await?;
            let owned = sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM owned_games WHERE game_id = $1 AND user_id = $2)",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            if owned {
                return Ok(false);
            }
            sqlx::query(
                "INSERT INTO wishlists (game_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(true)
        })
    }

    fn remove_from_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM wishlists WHERE game_id = $1 AND user_id = $2")
                .bind(game_id.value())
                .bind(user_id.value())
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }

    fn is_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM owned_games WHERE game_id = $1 AND user_id = $2)",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)
        })
    }

    fn mark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut tx = pool.begin().await.map_err(map_sqlx_err)?;
            lock_library_entry(&mut tx, game_id, user_id).await?;
            sqlx::query(
                "INSERT INTO owned_games (game_id, user_id) VALUES ($1, $2) ON CONFLICT DO NOTHING",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_err)?;
            sqlx::query("DELETE FROM wishlists WHERE game_id = $1 AND user_id = $2")
                .bind(game_id.value())
                .bind(user_id.value())
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_err)?;
            tx.commit().await.map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn unmark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let result = sqlx::query("DELETE FROM owned_games WHERE game_id = $1 AND user_id = $2")
                .bind(game_id.value())
                .bind(user_id.value())
                .execute(&pool)
                .await
                .map_err(map_sqlx_err)?;
            Ok(result.rows_affected() > 0)
        })
    }
}

#[derive(Debug, FromRow)]
struct ReviewRecord {
    reviewer_id: i32,
    reviewer_first_name: String,
    reviewer_last_name: String,
    rating: i32,
    review: Option<String>,
    timestamp: Timestamp,
}

impl From<ReviewRecord> for ReviewWithAuthor {
    fn from(value: ReviewRecord) -> Self {
        ReviewWithAuthor {
            reviewer_id: UserId::new(value.reviewer_id),
            reviewer_first_name: value.reviewer_first_name,
            reviewer_last_name: value.reviewer_last_name,
            rating: value.rating,
            review: value.review,
            timestamp: value.timestamp,
        }
    }
}

#[derive(Clone)]
pub struct PgReviewRepository {
    pool: PgPool,
}

impl PgReviewRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ReviewRepository for PgReviewRepository {
    fn create(&self, review: NewReview) -> RepositoryFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query(
                "INSERT INTO game_reviews (game_id, user_id, rating, review) VALUES ($1, $2, $3, $4)",
            )
            .bind(review.game_id.value())
            .bind(review.user_id.value())
            .bind(review.rating.value())
            .bind(review.review.as_ref().map(|text| text.as_str()))
            .execute(&pool)
            .await
            .map_err(map_sqlx_err)?;
            Ok(())
        })
    }

    fn exists(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, bool>(
                "SELECT EXISTS(SELECT 1 FROM game_reviews WHERE game_id = $1 AND user_id = $2)",
            )
            .bind(game_id.value())
            .bind(user_id.value())
            .fetch_one(&pool)
            .await
            .map_err(map_sqlx_err)
        })
    }

    fn count_for_game(&self, game_id: GameId) -> RepositoryFuture<i64> {
        let pool = self.pool.clone();
        Box::pin(async move {
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM game_reviews WHERE game_id = $1")
                .bind(game_id.value())
                .fetch_one(&pool)
                .await
                .map_err(map_sqlx_err)
        })
    }

    fn list_for_game(&self, game_id: GameId) -> RepositoryFuture<Vec<ReviewWithAuthor>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let records = sqlx::query_as::<_, ReviewRecord>(
                r#"
                SELECT r.user_id AS reviewer_id, u.first_name AS reviewer_first_name,
                       u.last_name AS reviewer_last_name, r.rating, r.review, r.timestamp
                FROM game_reviews r
                JOIN users u ON u.id = r.user_id
                WHERE r.game_id = $1
                ORDER BY r.timestamp DESC, r.id DESC
                "#,
            )
            .bind(game_id.value())
            .fetch_all(&pool)
            .await
            .map_err(map_sqlx_err)?;

            Ok(records.into_iter().map(ReviewWithAuthor::from).collect())
        })
    }
}

#[derive(Clone)]
pub struct PgStorage {
    pub pool: PgPool,
    pub user_repository: Arc<PgUserRepository>,
    pub game_repository: Arc<PgGameRepository>,
    pub catalog_repository: Arc<PgCatalogRepository>,
    pub library_repository: Arc<PgLibraryRepository>,
    pub review_repository: Arc<PgReviewRepository>,
}

impl PgStorage {
    pub fn new(pool: PgPool) -> Self {
        Self {
            user_repository: Arc::new(PgUserRepository::new(pool.clone())),
            game_repository: Arc::new(PgGameRepository::new(pool.clone())),
            catalog_repository: Arc::new(PgCatalogRepository::new(pool.clone())),
            library_repository: Arc::new(PgLibraryRepository::new(pool.clone())),
            review_repository: Arc::new(PgReviewRepository::new(pool.clone())),
            pool,
        }
    }
}

pub async fn create_pg_pool(
    database_url: &str,
    max_connections: u32,
    acquire_timeout: Duration,
) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .acquire_timeout(acquire_timeout)
        .connect(database_url)
        .await
}
