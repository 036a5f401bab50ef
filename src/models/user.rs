use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::user_entity;

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RegisterUserRequest {
    #[schema(example = "20123456")]
    pub phone: String,
    #[schema(example = "Amine")]
    pub first_name: String,
    #[schema(example = "Trabelsi")]
    pub last_name: String,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct LookupUserRequest {
    #[schema(example = "20123456")]
    pub phone: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    pub id: i32,
    pub phone: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
}

impl From<user_entity::Model> for UserResponse {
    fn from(m: user_entity::Model) -> Self {
        Self {
            id: m.id,
            phone: m.phone,
            first_name: m.first_name,
            last_name: m.last_name,
            created_at: m.created_at,
        }
    }
}

/// 按手机号查询用户的结果（不存在时 user 为空）
#[derive(Debug, Serialize, ToSchema)]
pub struct UserLookupResponse {
    pub exists: bool,
    pub user: Option<UserResponse>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct UserStatsResponse {
    /// 累计进入抽签池的次数
    pub play_count: u64,
}
