use std::sync::Arc;

use domain::{
    AuthToken, DomainError, NewUser, PersonName, RepositoryError, User, UserEmail, UserId,
    UserRepository,
};
use tracing::{info, warn};

use crate::{
    dto::{LoginDto, RegisteredUserDto, UserProfileDto},
    error::{ApplicationError, ApplicationResult},
    password::PasswordHasher,
    token::TokenGenerator,
};

pub const PASSWORD_MIN_LEN: usize = 6;
pub const PASSWORD_MAX_LEN: usize = 64;

#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub password: Option<String>,
    pub current_password: Option<String>,
}

pub struct UserServiceDependencies {
    pub user_repository: Arc<dyn UserRepository>,
    pub password_hasher: Arc<dyn PasswordHasher>,
    pub token_generator: Arc<dyn TokenGenerator>,
}

pub struct UserService {
    deps: UserServiceDependencies,
}

fn check_password(field: &'static str, password: &str) -> Result<(), DomainError> {
    let len = password.chars().count();
    if !(PASSWORD_MIN_LEN..=PASSWORD_MAX_LEN).contains(&len) {
        return Err(DomainError::invalid_argument(
            field,
            format!("must be between {PASSWORD_MIN_LEN} and {PASSWORD_MAX_LEN} characters"),
        ));
    }
    Ok(())
}

fn email_conflict(err: RepositoryError) -> ApplicationError {
    match err {
        RepositoryError::Conflict => DomainError::EmailAlreadyInUse.into(),
        other => other.into(),
    }
}

impl UserService {
    pub fn new(deps: UserServiceDependencies) -> Self {
        Self { deps }
    }

    pub async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> ApplicationResult<RegisteredUserDto> {
        let email = UserEmail::parse(request.email)?;
        let first_name = PersonName::parse("firstName", request.first_name)?;
        let last_name = PersonName::parse("lastName", request.last_name)?;
        check_password("password", &request.password)?;

        if self
            .deps
            .user_repository
            .find_by_email(email.clone())
            .await?
            .is_some()
        {
            return Err(DomainError::EmailAlreadyInUse.into());
        }

        let password = self.deps.password_hasher.hash(&request.password).await?;
        let user = self
            .deps
            .user_repository
            .create(NewUser {
                email,
                first_name,
                last_name,
                password,
            })
            .await
            .map_err(email_conflict)?;

        info!(user_id = %user.id, "user registered");
        Ok(RegisteredUserDto {
            user_id: user.id.value(),
        })
    }

    /// 校验邮箱和密码，签发新令牌并覆盖旧令牌。
    pub async fn login(&self, request: LoginRequest) -> ApplicationResult<LoginDto> {
        let email = UserEmail::parse(request.email)?;
        let user = self
            .deps
            .user_repository
            .find_by_email(email)
            .await?
            .ok_or(ApplicationError::InvalidCredentials)?;

        let password_ok = self
            .deps
            .password_hasher
            .verify(&request.password, &user.password)
            .await?;
        if !password_ok {
            warn!(user_id = %user.id, "login rejected: wrong password");
            return Err(ApplicationError::InvalidCredentials);
        }

        let token = self.deps.token_generator.generate()?;
        self.deps
            .user_repository
            .set_auth_token(user.id, Some(token.clone()))
            .await?;

        info!(user_id = %user.id, "user logged in");
        Ok(LoginDto {
            user_id: user.id.value(),
            token: token.as_str().to_owned(),
        })
    }

    pub async fn logout(&self, user: &User) -> ApplicationResult<()> {
        self.deps
            .user_repository
            .set_auth_token(user.id, None)
            .await?;
        info!(user_id = %user.id, "user logged out");
        Ok(())
    }

    /// 根据请求头中的令牌查找用户；没有令牌或令牌未知时返回 `None`。
    pub async fn authenticate(&self, token: Option<&str>) -> ApplicationResult<Option<User>> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(None);
        };
        let token = AuthToken::new(token)?;
        Ok(self.deps.user_repository.find_by_token(token).await?)
    }

    pub async fn view(
        &self,
        user_id: UserId,
        viewer: Option<UserId>,
    ) -> ApplicationResult<UserProfileDto> {
        let user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        Ok(UserProfileDto::for_viewer(&user, viewer))
    }

    pub async fn update(
        &self,
        actor: &User,
        user_id: UserId,
        request: UpdateUserRequest,
    ) -> ApplicationResult<()> {
        // 字段校验先于查找与权限检查
        let email = request.email.map(UserEmail::parse).transpose()?;
        let first_name = request
            .first_name
            .map(|name| PersonName::parse("firstName", name))
            .transpose()?;
        let last_name = request
            .last_name
            .map(|name| PersonName::parse("lastName", name))
            .transpose()?;
        let password_change = match (request.password, request.current_password) {
            (None, None) => None,
            (Some(password), Some(current)) => {
                check_password("password", &password)?;
                Some((password, current))
            }
            _ => {
                return Err(ApplicationError::invalid_argument(
                    "password",
                    "password and currentPassword must be supplied together",
                ))
            }
        };

        let mut user = self
            .deps
            .user_repository
            .find_by_id(user_id)
            .await?
            .ok_or(DomainError::UserNotFound)?;
        if actor.id != user.id {
            warn!(actor = %actor.id, target = %user.id, "rejected edit of another user");
            return Err(ApplicationError::not_allowed(
                "cannot edit another user's information",
            ));
        }

        let new_password = match password_change {
            None => None,
            Some((password, current)) => {
                if password == current {
                    return Err(ApplicationError::not_allowed(
                        "new password must differ from the current password",
                    ));
                }
                let current_ok = self
                    .deps
                    .password_hasher
                    .verify(&current, &user.password)
                    .await?;
                if !current_ok {
                    return Err(ApplicationError::InvalidCredentials);
                }
                Some(password)
            }
        };

        if let Some(email) = &email {
            let owner = self
                .deps
                .user_repository
                .find_by_email(email.clone())
                .await?;
            if owner.is_some_and(|owner| owner.id != user.id) {
                return Err(DomainError::EmailAlreadyInUse.into());
            }
        }

        user.update_profile(email, first_name, last_name);
        if let Some(password) = new_password {
            let hashed = self.deps.password_hasher.hash(&password).await?;
            user.set_password(hashed);
        }

        self.deps
            .user_repository
            .update(user)
            .await
            .map_err(email_conflict)?;
        info!(user_id = %user_id, "user updated");
        Ok(())
    }
}
