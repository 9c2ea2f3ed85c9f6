//! 游戏商城核心领域模型
//!
//! 包含用户、游戏、评价等实体，经过校验的值对象，以及仓储接口。

pub mod errors;
pub mod game;
pub mod repository;
pub mod review;
pub mod user;
pub mod value_objects;

// 重新导出常用类型
pub use errors::*;
pub use game::*;
pub use repository::*;
pub use review::*;
pub use user::*;
pub use value_objects::*;
