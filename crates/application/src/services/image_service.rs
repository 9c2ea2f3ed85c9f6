//! 用户头像与游戏封面
//!
//! 文件名固定为 `user_{id}.{ext}` / `game_{id}.{ext}`，扩展名随图片类型变化。
//! 顺序：先写新文件，再更新数据库，最后删除扩展名不同的旧文件。
//! 数据库更新失败时撤掉新文件，记录仍指向旧文件。

use std::sync::Arc;

use domain::{
    DomainError, GameId, GameRepository, ImageKind, RepositoryResult, UserId, UserRepository,
};
use tracing::{info, warn};

use crate::{
    error::{ApplicationError, ApplicationResult},
    image_store::ImageStore,
};

/// 读取到的图片内容。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredImage {
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

/// 上传结果：首次设置还是替换已有图片。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageWriteOutcome {
    Created,
    Replaced,
}

pub struct ImageServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub game_repository: Arc<dyn GameRepository>,
    pub image_store: Arc<dyn ImageStore>,
}

pub struct ImageService {
    deps: ImageServiceDependencies,
}

impl ImageService {
    pub fn new(deps: ImageServiceDependencies) -> Self {
        Self { deps }
    }

    async fn read(&self, filename: Option<String>) -> ApplicationResult<StoredImage> {
        let filename = filename.ok_or(DomainError::ImageNotFound)?;
        let Some(kind) = ImageKind::from_filename(&filename) else {
            warn!(filename = %filename, "stored image has unknown extension");
            return Err(DomainError::ImageNotFound.into());
        };
        match self.deps.image_store.load(&filename).await? {
            Some(bytes) => Ok(StoredImage { kind, bytes }),
            None => {
                warn!(filename = %filename, "image file missing from store");
                Err(DomainError::ImageNotFound.into())
            }
        }
    }

    /// 写入新文件并返回文件名；数据库此时尚未更新。
    async fn write(
        &self,
        prefix: &str,
        id: i32,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ApplicationResult<String> {
        let kind = ImageKind::from_content_type(content_type.unwrap_or_default())?;
        if bytes.is_empty() {
            return Err(ApplicationError::invalid_argument(
                "image",
                "image body cannot be empty",
            ));
        }
        let filename = format!("{prefix}_{id}.{}", kind.extension());
        self.deps.image_store.save(&filename, bytes).await?;
        Ok(filename)
    }

    /// 根据数据库写入结果收尾：成功则删除旧文件，失败则删除刚写入的新文件。
    async fn settle(
        &self,
        previous: Option<&str>,
        filename: &str,
        persisted: RepositoryResult<()>,
    ) -> ApplicationResult<ImageWriteOutcome> {
        let stale = match &persisted {
            Ok(()) => previous.filter(|old| *old != filename),
            Err(_) if previous != Some(filename) => Some(filename),
            Err(_) => None,
        };
        if let Some(stale) = stale {
            self.discard(stale).await;
        }
        persisted?;
        Ok(if previous.is_some() {
            ImageWriteOutcome::Replaced
        } else {
            ImageWriteOutcome::Created
        })
    }

    // 记录已经更新，文件删除失败只留日志
    async fn discard(&self, filename: &str) {
        if let Err(err) = self.deps.image_store.delete(filename).await {
            warn!(filename = %filename, error = %err, "failed to remove stale image file");
        }
    }

    pub async fn user_image(&self, user_id: UserId) -> ApplicationResult<StoredImage> {
        let user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        self.read(user.image_filename).await
    }

    pub async fn set_user_image(
        &self,
        actor: UserId,
        user_id: UserId,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ApplicationResult<ImageWriteOutcome> {
        let user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        if actor != user.id {
            return Err(ApplicationError::not_allowed(
                "cannot change another user's profile photo",
            ));
        }

        let filename = self
            .write("user", user_id.value(), content_type, bytes)
            .await?;
        let persisted = self
            .deps
            .user_repository
            .set_image_filename(user_id, Some(filename.clone()))
            .await;
        let outcome = self
            .settle(user.image_filename.as_deref(), &filename, persisted)
            .await?;
        info!(user_id = %user_id, ?outcome, "user image stored");
        Ok(outcome)
    }

    pub async fn delete_user_image(&self, actor: UserId, user_id: UserId) -> ApplicationResult<()> {
        let user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        if actor != user.id {
            return Err(ApplicationError::not_allowed(
                "cannot delete another user's profile photo",
            ));
        }
        let filename = user.image_filename.ok_or(DomainError::ImageNotFound)?;

        self.deps
            .user_repository
            .set_image_filename(user_id, None)
            .await?;
        self.discard(&filename).await;
        info!(user_id = %user_id, "user image deleted");
        Ok(())
    }

    pub async fn game_image(&self, game_id: GameId) -> ApplicationResult<StoredImage> {
        let game = self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        self.read(game.image_filename).await
    }

    pub async fn set_game_image(
        &self,
        actor: UserId,
        game_id: GameId,
        content_type: Option<&str>,
        bytes: &[u8],
    ) -> ApplicationResult<ImageWriteOutcome> {
        let game = self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        if !game.is_created_by(actor) {
            return Err(ApplicationError::not_allowed(
                "only the creator of a game may change its image",
            ));
        }

        let filename = self
            .write("game", game_id.value(), content_type, bytes)
            .await?;
        let persisted = self
            .deps
            .game_repository
            .set_image_filename(game_id, Some(filename.clone()))
            .await;
        let outcome = self
            .settle(game.image_filename.as_deref(), &filename, persisted)
            .await?;
        info!(game_id = %game_id, ?outcome, "game image stored");
        Ok(outcome)
    }

    pub async fn delete_game_image(&self, actor: UserId, game_id: GameId) -> ApplicationResult<()> {
        let game = self
            .deps
            .game_repository
            .find_by_id(game_id)
            .await?
            .ok_or(DomainError::GameNotFound)?;
        if !game.is_created_by(actor) {
            return Err(ApplicationError::not_allowed(
                "only the creator of a game may delete its image",
            ));
        }
        let filename = game.image_filename.ok_or(DomainError::ImageNotFound)?;

        self.deps
            .game_repository
            .set_image_filename(game_id, None)
            .await?;
        self.discard(&filename).await;
        info!(game_id = %game_id, "game image deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use domain::{
        MockGameRepository, MockUserRepository, NewUser, PasswordHash, PersonName, RepositoryError,
        User, UserEmail,
    };

    use super::*;
    use crate::image_store::ImageStoreError;

    #[derive(Default)]
    struct MemoryImageStore {
        files: Mutex<HashMap<String, Vec<u8>>>,
        fail_deletes: bool,
    }

    #[async_trait]
    impl ImageStore for MemoryImageStore {
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
            if self.fail_deletes {
                return Err(ImageStoreError::Io("disk unavailable".into()));
            }
            self.files.lock().unwrap().remove(filename);
            Ok(())
        }
    }

    fn user_with_image(id: i32, image: Option<&str>) -> User {
        let mut user = NewUser {
            email: UserEmail::parse("pic@example.com").unwrap(),
            first_name: PersonName::parse("firstName", "Pic").unwrap(),
            last_name: PersonName::parse("lastName", "Owner").unwrap(),
            password: PasswordHash::new("hash").unwrap(),
        }
        .into_user(UserId::new(id));
        user.image_filename = image.map(str::to_owned);
        user
    }

    fn service(users: MockUserRepository, store: Arc<MemoryImageStore>) -> ImageService {
        ImageService::new(ImageServiceDependencies {
            user_repository: Arc::new(users),
            game_repository: Arc::new(MockGameRepository::new()),
            image_store: store,
        })
    }

    #[tokio::test]
    async fn first_upload_creates_and_second_replaces_old_extension() {
        let store = Arc::new(MemoryImageStore::default());
        store
            .save("user_3.png", b"old")
            .await
            .unwrap();

        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning({
            let mut calls = 0;
            move |id| {
                calls += 1;
                let image = (calls > 1).then_some("user_3.png");
                let user = user_with_image(id.value(), image);
                Box::pin(async move { Ok(Some(user)) })
            }
        });
        users
            .expect_set_image_filename()
            .returning(|_, _| Box::pin(async { Ok(()) }));
        let svc = service(users, store.clone());

        let created = svc
            .set_user_image(UserId::new(3), UserId::new(3), Some("image/png"), b"png")
            .await
            .unwrap();
        assert_eq!(created, ImageWriteOutcome::Created);

        let replaced = svc
            .set_user_image(UserId::new(3), UserId::new(3), Some("image/jpeg"), b"jpg")
            .await
            .unwrap();
        assert_eq!(replaced, ImageWriteOutcome::Replaced);

        let files = store.files.lock().unwrap();
        assert!(files.contains_key("user_3.jpg"));
        assert!(!files.contains_key("user_3.png"));
    }

    #[tokio::test]
    async fn upload_checks_owner_then_content_type() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = user_with_image(id.value(), None);
            Box::pin(async move { Ok(Some(user)) })
        });
        users.expect_set_image_filename().never();
        let svc = service(users, Arc::new(MemoryImageStore::default()));

        assert!(matches!(
            svc.set_user_image(UserId::new(1), UserId::new(3), Some("image/png"), b"x")
                .await,
            Err(ApplicationError::Domain(DomainError::OperationNotAllowed { .. }))
        ));
        assert!(matches!(
            svc.set_user_image(UserId::new(3), UserId::new(3), Some("text/plain"), b"x")
                .await,
            Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
        ));
        assert!(matches!(
            svc.set_user_image(UserId::new(3), UserId::new(3), None, b"x")
                .await,
            Err(ApplicationError::Domain(DomainError::InvalidArgument { .. }))
        ));
    }

    #[tokio::test]
    async fn reading_or_deleting_absent_image_is_not_found() {
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = user_with_image(id.value(), None);
            Box::pin(async move { Ok(Some(user)) })
        });
        let svc = service(users, Arc::new(MemoryImageStore::default()));

        assert!(matches!(
            svc.user_image(UserId::new(3)).await,
            Err(ApplicationError::Domain(DomainError::ImageNotFound))
        ));
        assert!(matches!(
            svc.delete_user_image(UserId::new(3), UserId::new(3)).await,
            Err(ApplicationError::Domain(DomainError::ImageNotFound))
        ));
    }

    #[tokio::test]
    async fn stored_image_is_served_with_its_kind() {
        let store = Arc::new(MemoryImageStore::default());
        store.save("user_3.gif", b"GIF89a").await.unwrap();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = user_with_image(id.value(), Some("user_3.gif"));
            Box::pin(async move { Ok(Some(user)) })
        });

        let image = service(users, store)
            .user_image(UserId::new(3))
            .await
            .unwrap();
        assert_eq!(image.kind, ImageKind::Gif);
        assert_eq!(image.bytes, b"GIF89a".to_vec());
    }

    #[tokio::test]
    async fn failed_record_update_keeps_previous_image() {
        let store = Arc::new(MemoryImageStore::default());
        store.save("user_1.png", b"old").await.unwrap();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = user_with_image(id.value(), Some("user_1.png"));
            Box::pin(async move { Ok(Some(user)) })
        });
        users
            .expect_set_image_filename()
            .times(1)
            .returning(|_, _| Box::pin(async { Err(RepositoryError::storage("db down")) }));
        let svc = service(users, store.clone());

        let err = svc
            .set_user_image(UserId::new(1), UserId::new(1), Some("image/jpeg"), b"jpg")
            .await
            .unwrap_err();
        assert!(err.is_internal());

        let files = store.files.lock().unwrap();
        assert_eq!(files.get("user_1.png"), Some(&b"old".to_vec()));
        assert!(!files.contains_key("user_1.jpg"));
    }

    #[tokio::test]
    async fn file_removal_failure_does_not_fail_delete() {
        let store = Arc::new(MemoryImageStore {
            fail_deletes: true,
            ..Default::default()
        });
        store.save("user_4.gif", b"GIF89a").await.unwrap();
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|id| {
            let user = user_with_image(id.value(), Some("user_4.gif"));
            Box::pin(async move { Ok(Some(user)) })
        });
        users
            .expect_set_image_filename()
            .withf(|_, filename| filename.is_none())
            .times(1)
            .returning(|_, _| Box::pin(async { Ok(()) }));

        service(users, store)
            .delete_user_image(UserId::new(4), UserId::new(4))
            .await
            .unwrap();
    }
}
