use serde::Serialize;

use crate::value_objects::{AuthToken, PasswordHash, PersonName, UserEmail, UserId};

/// 已注册的用户账号。
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: UserId,
    pub email: UserEmail,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub image_filename: Option<String>,
    #[serde(skip_serializing)] // 密码字段不暴露给客户端
    pub password: PasswordHash,
    #[serde(skip_serializing)]
    pub auth_token: Option<AuthToken>,
}

impl User {
    pub fn update_profile(
        &mut self,
        email: Option<UserEmail>,
        first_name: Option<PersonName>,
        last_name: Option<PersonName>,
    ) {
        if let Some(email) = email {
            self.email = email;
        }
        if let Some(first_name) = first_name {
            self.first_name = first_name;
        }
        if let Some(last_name) = last_name {
            self.last_name = last_name;
        }
    }

    pub fn set_password(&mut self, password: PasswordHash) {
        self.password = password;
    }

    pub fn has_image(&self) -> bool {
        self.image_filename.is_some()
    }
}

/// 注册时写入的新用户，id 由数据库分配。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: UserEmail,
    pub first_name: PersonName,
    pub last_name: PersonName,
    pub password: PasswordHash,
}

impl NewUser {
    pub fn into_user(self, id: UserId) -> User {
        User {
            id,
            email: self.email,
            first_name: self.first_name,
            last_name: self.last_name,
            image_filename: None,
            password: self.password,
            auth_token: None,
        }
    }
}
