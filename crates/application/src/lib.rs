//! 应用层实现。
//!
//! 这里提供围绕领域模型的用例服务，负责输入校验和权限判断，
//! 以及对外部适配器（密码哈希、令牌生成、图片存储）的抽象。

pub mod dto;
pub mod error;
pub mod game_search;
pub mod image_store;
pub mod password;
pub mod services;
pub mod token;

pub use error::{ApplicationError, ApplicationResult};
pub use game_search::{GamePage, GameSearch, GameSortOrder};
pub use image_store::{ImageStore, ImageStoreError};
pub use password::{PasswordHasher, PasswordHasherError};
pub use services::{
    CreateGameRequest, CreateReviewRequest, GameService, GameServiceDependencies, ImageService,
    ImageServiceDependencies, ImageWriteOutcome, LibraryService, LibraryServiceDependencies,
    LoginRequest, RegisterUserRequest, ReviewService, ReviewServiceDependencies, StoredImage,
    UpdateGameRequest, UpdateUserRequest, UserService, UserServiceDependencies,
};
pub use token::TokenGenerator;
