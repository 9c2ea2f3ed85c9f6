//! 测试用的内存适配器与请求辅助函数。

#![allow(dead_code)]

use std::{
    collections::{BTreeMap, HashMap, HashSet},
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};

use application::{
    ImageStore, ImageStoreError, PasswordHasher, PasswordHasherError, TokenGenerator,
};
use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{Duration, TimeZone, Utc};
use domain::{
    AuthToken, CatalogRepository, DomainError, Game, GameId, GameRepository, GameSummary,
    GameTitle, Genre, GenreId, LibraryRepository, NewGame, NewReview, NewUser, PasswordHash,
    Platform, PlatformId, RepositoryError, RepositoryFuture, ReviewRepository, ReviewWithAuthor,
    Timestamp, User, UserEmail, UserId, UserRepository,
};
use serde_json::Value;
use tokio::sync::RwLock;
use tower::ServiceExt;
use web_api::{router, AppAdapters, AppState, AUTH_HEADER};

struct StoredReview {
    review: NewReview,
    timestamp: Timestamp,
}

#[derive(Default)]
struct MarketData {
    users: BTreeMap<i32, User>,
    games: BTreeMap<i32, Game>,
    genres: Vec<Genre>,
    platforms: Vec<Platform>,
    wishlists: HashSet<(GameId, UserId)>,
    owned: HashSet<(GameId, UserId)>,
    reviews: Vec<StoredReview>,
    next_user_id: i32,
    next_game_id: i32,
    /// 单调递增的逻辑时钟，保证创建时间可排序
    ticks: i64,
}

impl MarketData {
    fn seeded() -> Self {
        Self {
            genres: ["Action", "Puzzle", "Strategy"]
                .iter()
                .enumerate()
                .map(|(i, name)| Genre {
                    id: GenreId::new(i as i32 + 1),
                    name: (*name).to_owned(),
                })
                .collect(),
            platforms: ["PC", "PlayStation 5", "Nintendo Switch"]
                .iter()
                .enumerate()
                .map(|(i, name)| Platform {
                    id: PlatformId::new(i as i32 + 1),
                    name: (*name).to_owned(),
                })
                .collect(),
            next_user_id: 1,
            next_game_id: 1,
            ..Self::default()
        }
    }

    fn now(&mut self) -> Timestamp {
        self.ticks += 1;
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::seconds(self.ticks)
    }

    fn email_taken(&self, email: &UserEmail, except: Option<UserId>) -> bool {
        self.users
            .values()
            .any(|u| u.email == *email && Some(u.id) != except)
    }

    fn title_taken(&self, title: &GameTitle, except: Option<GameId>) -> bool {
        self.games
            .values()
            .any(|g| g.title == *title && Some(g.id) != except)
    }

    fn summary(&self, game: &Game) -> GameSummary {
        let creator = self.users.get(&game.creator_id.value());
        let ratings: Vec<i32> = self
            .reviews
            .iter()
            .filter(|r| r.review.game_id == game.id)
            .map(|r| r.review.rating.value())
            .collect();
        let rating = if ratings.is_empty() {
            0.0
        } else {
            ratings.iter().sum::<i32>() as f64 / ratings.len() as f64
        };
        let users_in = |set: &HashSet<(GameId, UserId)>| {
            let mut ids: Vec<UserId> = set
                .iter()
                .filter(|(g, _)| *g == game.id)
                .map(|(_, u)| *u)
                .collect();
            ids.sort();
            ids
        };

        GameSummary {
            id: game.id,
            title: game.title.as_str().to_owned(),
            description: game.description.as_str().to_owned(),
            genre_id: game.genre_id,
            creation_date: game.creation_date,
            creator_id: game.creator_id,
            creator_first_name: creator
                .map(|u| u.first_name.as_str().to_owned())
                .unwrap_or_default(),
            creator_last_name: creator
                .map(|u| u.last_name.as_str().to_owned())
                .unwrap_or_default(),
            price: game.price.cents(),
            rating,
            platform_ids: game.platform_ids.clone(),
            reviewer_ids: self
                .reviews
                .iter()
                .filter(|r| r.review.game_id == game.id)
                .map(|r| r.review.user_id)
                .collect(),
            owner_ids: users_in(&self.owned),
            wishlister_ids: users_in(&self.wishlists),
        }
    }
}

/// 同时实现全部仓储接口的内存存储。
#[derive(Clone)]
pub struct InMemoryMarket {
    data: Arc<RwLock<MarketData>>,
}

impl InMemoryMarket {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(MarketData::seeded())),
        }
    }
}

impl UserRepository for InMemoryMarket {
    fn create(&self, user: NewUser) -> RepositoryFuture<User> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if guard.email_taken(&user.email, None) {
                return Err(RepositoryError::Conflict);
            }
            let id = guard.next_user_id;
            guard.next_user_id += 1;
            let stored = user.into_user(UserId::new(id));
            guard.users.insert(id, stored.clone());
            Ok(stored)
        })
    }

    fn update(&self, user: User) -> RepositoryFuture<User> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if !guard.users.contains_key(&user.id.value()) {
                return Err(RepositoryError::NotFound);
            }
            if guard.email_taken(&user.email, Some(user.id)) {
                return Err(RepositoryError::Conflict);
            }
            guard.users.insert(user.id.value(), user.clone());
            Ok(user)
        })
    }

    fn find_by_id(&self, id: UserId) -> RepositoryFuture<Option<User>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.users.get(&id.value()).cloned()) })
    }

    fn find_by_email(&self, email: UserEmail) -> RepositoryFuture<Option<User>> {
        let data = self.data.clone();
        Box::pin(async move {
            Ok(data
                .read()
                .await
                .users
                .values()
                .find(|u| u.email == email)
                .cloned())
        })
    }

    fn find_by_token(&self, token: AuthToken) -> RepositoryFuture<Option<User>> {
        let data = self.data.clone();
        Box::pin(async move {
            Ok(data
                .read()
                .await
                .users
                .values()
                .find(|u| u.auth_token.as_ref() == Some(&token))
                .cloned())
        })
    }

    fn set_auth_token(&self, id: UserId, token: Option<AuthToken>) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            let user = guard
                .users
                .get_mut(&id.value())
                .ok_or(RepositoryError::NotFound)?;
            user.auth_token = token;
            Ok(())
        })
    }

    fn set_image_filename(&self, id: UserId, filename: Option<String>) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            let user = guard
                .users
                .get_mut(&id.value())
                .ok_or(RepositoryError::NotFound)?;
            user.image_filename = filename;
            Ok(())
        })
    }
}

impl GameRepository for InMemoryMarket {
    fn create(&self, game: NewGame) -> RepositoryFuture<Game> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if guard.title_taken(&game.title, None) {
                return Err(RepositoryError::Conflict);
            }
            let id = guard.next_game_id;
            guard.next_game_id += 1;
            let stored = Game {
                id: GameId::new(id),
                title: game.title,
                description: game.description,
                creation_date: guard.now(),
                image_filename: None,
                creator_id: game.creator_id,
                genre_id: game.genre_id,
                price: game.price,
                platform_ids: game.platform_ids,
            };
            guard.games.insert(id, stored.clone());
            Ok(stored)
        })
    }

    fn update(&self, game: Game) -> RepositoryFuture<Game> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if !guard.games.contains_key(&game.id.value()) {
                return Err(RepositoryError::NotFound);
            }
            if guard.title_taken(&game.title, Some(game.id)) {
                return Err(RepositoryError::Conflict);
            }
            guard.games.insert(game.id.value(), game.clone());
            Ok(game)
        })
    }

    fn delete(&self, id: GameId) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if !guard.games.contains_key(&id.value()) {
                return Err(RepositoryError::NotFound);
            }
            if guard.reviews.iter().any(|r| r.review.game_id == id) {
                return Err(RepositoryError::Conflict);
            }
            guard.games.remove(&id.value());
            guard.wishlists.retain(|(g, _)| *g != id);
            guard.owned.retain(|(g, _)| *g != id);
            Ok(())
        })
    }

    fn find_by_id(&self, id: GameId) -> RepositoryFuture<Option<Game>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.games.get(&id.value()).cloned()) })
    }

    fn find_by_title(&self, title: GameTitle) -> RepositoryFuture<Option<Game>> {
        let data = self.data.clone();
        Box::pin(async move {
            Ok(data
                .read()
                .await
                .games
                .values()
                .find(|g| g.title == title)
                .cloned())
        })
    }

    fn list_summaries(&self) -> RepositoryFuture<Vec<GameSummary>> {
        let data = self.data.clone();
        Box::pin(async move {
            let guard = data.read().await;
            Ok(guard.games.values().map(|g| guard.summary(g)).collect())
        })
    }

    fn find_summary(&self, id: GameId) -> RepositoryFuture<Option<GameSummary>> {
        let data = self.data.clone();
        Box::pin(async move {
            let guard = data.read().await;
            Ok(guard.games.get(&id.value()).map(|g| guard.summary(g)))
        })
    }

    fn set_image_filename(&self, id: GameId, filename: Option<String>) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            let game = guard
                .games
                .get_mut(&id.value())
                .ok_or(RepositoryError::NotFound)?;
            game.image_filename = filename;
            Ok(())
        })
    }
}

impl CatalogRepository for InMemoryMarket {
    fn list_genres(&self) -> RepositoryFuture<Vec<Genre>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.genres.clone()) })
    }

    fn list_platforms(&self) -> RepositoryFuture<Vec<Platform>> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.platforms.clone()) })
    }
}

impl LibraryRepository for InMemoryMarket {
    fn is_wishlisted(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.wishlists.contains(&(game_id, user_id))) })
    }

    fn add_to_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if guard.owned.contains(&(game_id, user_id)) {
                return Ok(false);
            }
            guard.wishlists.insert((game_id, user_id));
            Ok(true)
        })
    }

    fn remove_from_wishlist(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.write().await.wishlists.remove(&(game_id, user_id))) })
    }

    fn is_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.read().await.owned.contains(&(game_id, user_id))) })
    }

    fn mark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            guard.wishlists.remove(&(game_id, user_id));
            guard.owned.insert((game_id, user_id));
            Ok(())
        })
    }

    fn unmark_owned(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move { Ok(data.write().await.owned.remove(&(game_id, user_id))) })
    }
}

impl ReviewRepository for InMemoryMarket {
    fn create(&self, review: NewReview) -> RepositoryFuture<()> {
        let data = self.data.clone();
        Box::pin(async move {
            let mut guard = data.write().await;
            if guard
                .reviews
                .iter()
                .any(|r| r.review.game_id == review.game_id && r.review.user_id == review.user_id)
            {
                return Err(RepositoryError::Conflict);
            }
            let timestamp = guard.now();
            guard.reviews.push(StoredReview { review, timestamp });
            Ok(())
        })
    }

    fn exists(&self, game_id: GameId, user_id: UserId) -> RepositoryFuture<bool> {
        let data = self.data.clone();
        Box::pin(async move {
            Ok(data
                .read()
                .await
                .reviews
                .iter()
                .any(|r| r.review.game_id == game_id && r.review.user_id == user_id))
        })
    }

    fn count_for_game(&self, game_id: GameId) -> RepositoryFuture<i64> {
        let data = self.data.clone();
        Box::pin(async move {
            Ok(data
                .read()
                .await
                .reviews
                .iter()
                .filter(|r| r.review.game_id == game_id)
                .count() as i64)
        })
    }

    fn list_for_game(&self, game_id: GameId) -> RepositoryFuture<Vec<ReviewWithAuthor>> {
        let data = self.data.clone();
        Box::pin(async move {
            let guard = data.read().await;
            let mut reviews: Vec<ReviewWithAuthor> = guard
                .reviews
                .iter()
                .filter(|r| r.review.game_id == game_id)
                .map(|r| {
                    let author = guard.users.get(&r.review.user_id.value());
                    ReviewWithAuthor {
                        reviewer_id: r.review.user_id,
                        reviewer_first_name: author
                            .map(|u| u.first_name.as_str().to_owned())
                            .unwrap_or_default(),
                        reviewer_last_name: author
                            .map(|u| u.last_name.as_str().to_owned())
                            .unwrap_or_default(),
                        rating: r.review.rating.value(),
                        review: r.review.review.as_ref().map(|t| t.as_str().to_owned()),
                        timestamp: r.timestamp,
                    }
                })
                .collect();
            reviews.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
            Ok(reviews)
        })
    }
}

/// 不做哈希，只加前缀，方便断言。
pub struct PlainPasswordHasher;

#[async_trait]
impl PasswordHasher for PlainPasswordHasher {
    async fn hash(&self, plaintext: &str) -> Result<PasswordHash, PasswordHasherError> {
        PasswordHash::new(format!("plain:{plaintext}"))
            .map_err(|err| PasswordHasherError::hash_error(err.to_string()))
    }

    async fn verify(
        &self,
        plaintext: &str,
        hashed: &PasswordHash,
    ) -> Result<bool, PasswordHasherError> {
        Ok(hashed.as_str() == format!("plain:{plaintext}"))
    }
}

#[derive(Default)]
pub struct CountingTokenGenerator {
    counter: AtomicU64,
}

impl TokenGenerator for CountingTokenGenerator {
    fn generate(&self) -> Result<AuthToken, DomainError> {
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        AuthToken::new(format!("token-{n:04}"))
    }
}

#[derive(Default)]
pub struct InMemoryImageStore {
    files: std::sync::Mutex<HashMap<String, Vec<u8>>>,
}

impl InMemoryImageStore {
    pub fn filenames(&self) -> Vec<String> {
        let mut names: Vec<String> = self.files.lock().unwrap().keys().cloned().collect();
        names.sort();
        names
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn save(&self, filename: &str, bytes: &[u8]) -> Result<(), ImageStoreError> {
        self.files
            .lock()
            .unwrap()
            .insert(filename.to_owned(), bytes.to_vec());
        Ok(())
    }

    async fn load(&self, filename: &str) -> Result<Option<Vec<u8>>, ImageStoreError> {
        Ok(self.files.lock().unwrap().get(filename).cloned())
    }

    async fn delete(&self, filename: &str) -> Result<(), ImageStoreError> {
        self.files.lock().unwrap().remove(filename);
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub images: Arc<InMemoryImageStore>,
}

pub fn test_state() -> (AppState, Arc<InMemoryImageStore>) {
    let market = Arc::new(InMemoryMarket::new());
    let images = Arc::new(InMemoryImageStore::default());
    let state = AppState::from_adapters(AppAdapters {
        user_repository: market.clone(),
        game_repository: market.clone(),
        catalog_repository: market.clone(),
        library_repository: market.clone(),
        review_repository: market,
        password_hasher: Arc::new(PlainPasswordHasher),
        token_generator: Arc::new(CountingTokenGenerator::default()),
        image_store: images.clone(),
    });
    (state, images)
}

pub fn test_app() -> TestApp {
    let (state, images) = test_state();
    TestApp {
        router: router(state),
        images,
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl TestResponse {
    pub fn json(&self) -> Value {
        serde_json::from_slice(&self.bytes).unwrap_or(Value::Null)
    }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> TestResponse {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();
        TestResponse {
            status,
            content_type,
            bytes,
        }
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn upload(
        &self,
        uri: &str,
        token: Option<&str>,
        content_type: &str,
        bytes: &[u8],
    ) -> TestResponse {
        let mut builder = Request::builder()
            .method("PUT")
            .uri(uri)
            .header(header::CONTENT_TYPE, content_type);
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }
        self.send(builder.body(Body::from(bytes.to_vec())).unwrap())
            .await
    }

    /// 注册并登录，返回 (user_id, token)。
    pub async fn register_and_login(&self, first_name: &str, email: &str) -> (i64, String) {
        let register = self
            .call(
                "POST",
                "/api/v1/users/register",
                None,
                Some(serde_json::json!({
                    "firstName": first_name,
                    "lastName": "Tester",
                    "email": email,
                    "password": "hunter22",
                })),
            )
            .await;
        assert_eq!(register.status, StatusCode::CREATED);

        let login = self
            .call(
                "POST",
                "/api/v1/users/login",
                None,
                Some(serde_json::json!({ "email": email, "password": "hunter22" })),
            )
            .await;
        assert_eq!(login.status, StatusCode::OK);
        let body = login.json();
        (
            body["userId"].as_i64().unwrap(),
            body["token"].as_str().unwrap().to_owned(),
        )
    }

    /// 以指定用户创建一款游戏，返回 gameId。
    pub async fn create_game(&self, token: &str, title: &str, price: i32) -> i64 {
        let response = self
            .call(
                "POST",
                "/api/v1/games",
                Some(token),
                Some(serde_json::json!({
                    "title": title,
                    "description": format!("{title} description"),
                    "genreId": 1,
                    "price": price,
                    "platformIds": [1, 2],
                })),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.json());
        response.json()["gameId"].as_i64().unwrap()
    }
}
