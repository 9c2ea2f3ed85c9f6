mod game_service;
mod image_service;
mod library_service;
mod review_service;
mod user_service;

pub use game_service::{
    CreateGameRequest, GameService, GameServiceDependencies, UpdateGameRequest,
};
pub use image_service::{
    ImageService, ImageServiceDependencies, ImageWriteOutcome, StoredImage,
};
pub use library_service::{LibraryService, LibraryServiceDependencies};
pub use review_service::{CreateReviewRequest, ReviewService, ReviewServiceDependencies};
pub use user_service::{
    LoginRequest, RegisterUserRequest, UpdateUserRequest, UserService, UserServiceDependencies,
    PASSWORD_MAX_LEN, PASSWORD_MIN_LEN,
};
