//! 基础设施层实现。
//!
//! 提供 PostgreSQL 仓储、密码哈希、令牌生成与图片文件存储等适配器，
//! 实现应用/领域层定义的接口。

pub mod builder;
pub mod image_store;
pub mod migrations;
pub mod password;
pub mod repository;
pub mod token;

pub use builder::{Infrastructure, InfrastructureConfig, InfrastructureError};
pub use image_store::FsImageStore;
pub use migrations::MIGRATOR;
pub use password::BcryptPasswordHasher;
pub use repository::{
    create_pg_pool, PgCatalogRepository, PgGameRepository, PgLibraryRepository,
    PgReviewRepository, PgStorage, PgUserRepository,
};
pub use token::RandomTokenGenerator;
