use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::ValidateEmail;

use crate::errors::DomainError;

/// 统一的时间戳类型。
pub type Timestamp = DateTime<Utc>;

macro_rules! integer_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub i32);

        impl $name {
            pub fn new(id: i32) -> Self {
                Self(id)
            }

            pub fn value(self) -> i32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<i32> for $name {
            fn from(value: i32) -> Self {
                Self(value)
            }
        }

        impl From<$name> for i32 {
            fn from(value: $name) -> Self {
                value.0
            }
        }
    };
}

integer_id!(
    /// 用户唯一标识。
    UserId
);
integer_id!(
    /// 游戏唯一标识。
    GameId
);
integer_id!(
    /// 游戏类型标识。
    GenreId
);
integer_id!(
    /// 游戏平台标识。
    PlatformId
);

fn bounded_text(
    field: &'static str,
    value: impl Into<String>,
    max_len: usize,
) -> Result<String, DomainError> {
    let value = value.into().trim().to_owned();
    if value.is_empty() {
        return Err(DomainError::invalid_argument(field, "cannot be empty"));
    }
    if value.chars().count() > max_len {
        return Err(DomainError::invalid_argument(
            field,
            format!("must be at most {max_len} characters"),
        ));
    }
    Ok(value)
}

/// 经过验证的邮箱。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct UserEmail(String);

impl UserEmail {
    pub const MAX_LEN: usize = 256;

    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        let value = bounded_text("email", value, Self::MAX_LEN)?;
        if !value.validate_email() || !has_alpha_tld(&value) || !has_plain_local_part(&value) {
            return Err(DomainError::invalid_argument(
                "email",
                "must be a valid email address",
            ));
        }
        Ok(Self(value))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserEmail {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// 顶级域名至少两个字母，例如 `a@b.co`
fn has_alpha_tld(email: &str) -> bool {
    let Some((_, domain)) = email.rsplit_once('@') else {
        return false;
    };
    match domain.rsplit_once('.') {
        Some((host, tld)) => {
            !host.is_empty() && tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic())
        }
        None => false,
    }
}

fn has_plain_local_part(email: &str) -> bool {
    let Some((local, _)) = email.rsplit_once('@') else {
        return false;
    };
    local
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '%' | '+' | '-'))
}

/// 用户名或姓氏。
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct PersonName(String);

impl PersonName {
    pub const MAX_LEN: usize = 64;

    pub fn parse(field: &'static str, value: impl Into<String>) -> Result<Self, DomainError> {
        bounded_text(field, value, Self::MAX_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 经过外部服务生成的密码哈希。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct PasswordHash(String);

impl PasswordHash {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let hash = value.into();
        if hash.trim().is_empty() {
            return Err(DomainError::invalid_argument(
                "password_hash",
                "cannot be empty",
            ));
        }
        Ok(Self(hash))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 登录后签发的不透明令牌，存放在用户表中。
#[derive(Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct AuthToken(String);

impl AuthToken {
    pub fn new(value: impl Into<String>) -> Result<Self, DomainError> {
        let token = value.into();
        if token.trim().is_empty() {
            return Err(DomainError::invalid_argument("token", "cannot be empty"));
        }
        Ok(Self(token))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// 日志里不输出令牌明文
impl fmt::Debug for AuthToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthToken(***)")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct GameTitle(String);

impl GameTitle {
    pub const MAX_LEN: usize = 128;

    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        bounded_text("title", value, Self::MAX_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct GameDescription(String);

impl GameDescription {
    pub const MAX_LEN: usize = 1024;

    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        bounded_text("description", value, Self::MAX_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// 价格，以分为单位。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32")]
pub struct Price(i32);

impl Price {
    pub fn new(cents: i32) -> Result<Self, DomainError> {
        if cents < 0 {
            return Err(DomainError::invalid_argument("price", "cannot be negative"));
        }
        Ok(Self(cents))
    }

    pub fn cents(self) -> i32 {
        self.0
    }
}

/// 评分，闭区间 1..=10。
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32")]
pub struct Rating(i32);

impl Rating {
    pub const MIN: i32 = 1;
    pub const MAX: i32 = 10;

    pub fn new(value: i32) -> Result<Self, DomainError> {
        if !(Self::MIN..=Self::MAX).contains(&value) {
            return Err(DomainError::invalid_argument(
                "rating",
                format!("must be between {} and {}", Self::MIN, Self::MAX),
            ));
        }
        Ok(Self(value))
    }

    pub fn value(self) -> i32 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String")]
pub struct ReviewText(String);

impl ReviewText {
    pub const MAX_LEN: usize = 512;

    pub fn parse(value: impl Into<String>) -> Result<Self, DomainError> {
        bounded_text("review", value, Self::MAX_LEN).map(Self)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// 反序列化同样走校验构造函数
macro_rules! validated_from {
    ($name:ident, $raw:ty, $ctor:expr) => {
        impl TryFrom<$raw> for $name {
            type Error = DomainError;

            fn try_from(value: $raw) -> Result<Self, Self::Error> {
                $ctor(value)
            }
        }
    };
}

validated_from!(UserEmail, String, UserEmail::parse);
validated_from!(PersonName, String, |value: String| PersonName::parse("name", value));
validated_from!(PasswordHash, String, PasswordHash::new);
validated_from!(AuthToken, String, AuthToken::new);
validated_from!(GameTitle, String, GameTitle::parse);
validated_from!(GameDescription, String, GameDescription::parse);
validated_from!(ReviewText, String, ReviewText::parse);
validated_from!(Price, i32, Price::new);
validated_from!(Rating, i32, Rating::new);

/// 支持的图片格式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
}

impl ImageKind {
    /// 根据 `Content-Type` 解析，忽略大小写和 `;` 之后的参数。
    pub fn from_content_type(content_type: &str) -> Result<Self, DomainError> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/png" => Ok(Self::Png),
            "image/jpeg" | "image/jpg" => Ok(Self::Jpeg),
            "image/gif" => Ok(Self::Gif),
            _ => Err(DomainError::invalid_argument(
                "content-type",
                "must be one of image/png, image/jpeg, image/gif",
            )),
        }
    }

    /// 根据存储文件名的扩展名反推格式。
    pub fn from_filename(filename: &str) -> Option<Self> {
        let (_, ext) = filename.rsplit_once('.')?;
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(Self::Png),
            "jpg" | "jpeg" => Some(Self::Jpeg),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
            Self::Gif => "gif",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
            Self::Gif => "image/gif",
        }
    }
}
