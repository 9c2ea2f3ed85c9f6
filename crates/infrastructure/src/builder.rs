use std::sync::Arc;
use std::time::Duration;

use application::{ImageStore, PasswordHasher, TokenGenerator};
use config::AppConfig;
use thiserror::Error;
use tracing::info;

use crate::{
    image_store::FsImageStore,
    migrations::MIGRATOR,
    password::BcryptPasswordHasher,
    repository::{create_pg_pool, PgStorage},
    token::RandomTokenGenerator,
};

#[derive(Debug, Clone)]
pub struct InfrastructureConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub run_migrations: bool,
    pub bcrypt_cost: Option<u32>,
    pub token_length: usize,
    pub image_dir: String,
}

impl Default for InfrastructureConfig {
    fn default() -> Self {
        InfrastructureConfig::from(&AppConfig::default())
    }
}

impl From<&AppConfig> for InfrastructureConfig {
    fn from(config: &AppConfig) -> Self {
        Self {
            database_url: config.database.url.clone(),
            max_connections: config.database.max_connections,
            acquire_timeout: Duration::from_secs(config.database.acquire_timeout_seconds),
            run_migrations: config.database.run_migrations,
            bcrypt_cost: Some(config.security.bcrypt_cost),
            token_length: config.security.token_length,
            image_dir: config.storage.image_dir.clone(),
        }
    }
}

#[derive(Debug, Error)]
pub enum InfrastructureError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// 组装好的基础设施适配器。
#[derive(Clone)]
pub struct Infrastructure {
    pub storage: Arc<PgStorage>,
    pub password_hasher: Arc<BcryptPasswordHasher>,
    pub token_generator: Arc<RandomTokenGenerator>,
    pub image_store: Arc<FsImageStore>,
}

impl Infrastructure {
    pub async fn connect(config: InfrastructureConfig) -> Result<Self, InfrastructureError> {
        let pool = create_pg_pool(
            &config.database_url,
            config.max_connections,
            config.acquire_timeout,
        )
        .await?;
        if config.run_migrations {
            MIGRATOR.run(&pool).await?;
            info!("database migrations applied");
        }

        Ok(Self {
            storage: Arc::new(PgStorage::new(pool)),
            password_hasher: Arc::new(BcryptPasswordHasher::new(config.bcrypt_cost)),
            token_generator: Arc::new(RandomTokenGenerator::new(config.token_length)),
            image_store: Arc::new(FsImageStore::new(config.image_dir)),
        })
    }

    pub fn password_hasher_trait(&self) -> Arc<dyn PasswordHasher> {
        self.password_hasher.clone()
    }

    pub fn token_generator_trait(&self) -> Arc<dyn TokenGenerator> {
        self.token_generator.clone()
    }

    pub fn image_store_trait(&self) -> Arc<dyn ImageStore> {
        self.image_store.clone()
    }
}
