use std::sync::Arc;

use application::{
    services::{
        GameService, GameServiceDependencies, ImageService, ImageServiceDependencies,
        LibraryService, LibraryServiceDependencies, ReviewService, ReviewServiceDependencies,
        UserService, UserServiceDependencies,
    },
    ImageStore, PasswordHasher, TokenGenerator,
};
use domain::{
    CatalogRepository, GameRepository, LibraryRepository, ReviewRepository, UserRepository,
};

/// 默认请求体上限，与配置默认值一致
pub const DEFAULT_MAX_BODY_BYTES: usize = 20 * 1024 * 1024;

/// 构建全部用例服务所需的适配器。
#[derive(Clone)]
pub struct AppAdapters {
    pub user_repository: Arc<dyn UserRepository>,
    pub game_repository: Arc<dyn GameRepository>,
    pub catalog_repository: Arc<dyn CatalogRepository>,
    pub library_repository: Arc<dyn LibraryRepository>,
    pub review_repository: Arc<dyn ReviewRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_generator: Arc<dyn TokenGenerator>,
    pub image_store: Arc<dyn ImageStore>,
}

#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<UserService>,
    pub game_service: Arc<GameService>,
    pub library_service: Arc<LibraryService>,
    pub review_service: Arc<ReviewService>,
    pub image_service: Arc<ImageService>,
    pub max_body_bytes: usize,
}

impl AppState {
    pub fn new(
        user_service: Arc<UserService>,
        game_service: Arc<GameService>,
        library_service: Arc<LibraryService>,
        review_service: Arc<ReviewService>,
        image_service: Arc<ImageService>,
    ) -> Self {
        Self {
            user_service,
            game_service,
            library_service,
            review_service,
            image_service,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn from_adapters(adapters: AppAdapters) -> Self {
        let user_service = UserService::new(UserServiceDependencies {
            user_repository: adapters.user_repository.clone(),
            password_hasher: adapters.password_hasher,
            token_generator: adapters.token_generator,
        });
        let game_service = GameService::new(GameServiceDependencies {
            game_repository: adapters.game_repository.clone(),
            catalog_repository: adapters.catalog_repository,
            review_repository: adapters.review_repository.clone(),
            image_store: adapters.image_store.clone(),
        });
        let library_service = LibraryService::new(LibraryServiceDependencies {
            game_repository: adapters.game_repository.clone(),
            library_repository: adapters.library_repository,
        });
        let review_service = ReviewService::new(ReviewServiceDependencies {
            game_repository: adapters.game_repository.clone(),
            review_repository: adapters.review_repository,
        });
        let image_service = ImageService::new(ImageServiceDependencies {
            user_repository: adapters.user_repository,
            game_repository: adapters.game_repository,
            image_store: adapters.image_store,
        });

        Self::new(
            Arc::new(user_service),
            Arc::new(game_service),
            Arc::new(library_service),
            Arc::new(review_service),
            Arc::new(image_service),
        )
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}
