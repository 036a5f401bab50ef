pub mod admin;
pub mod prize;
pub mod user;
pub mod wheel;

pub use admin::admin_config;
pub use prize::prize_config;
pub use user::user_config;
pub use wheel::wheel_config;

use crate::error::{AppError, AppResult};

/// 路径 / 请求体中的自增 ID 必须为正数
pub fn validate_id(id: i32) -> AppResult<i32> {
    if id <= 0 {
        return Err(AppError::ValidationError(format!("Invalid id: {id}")));
    }
    Ok(id)
}
