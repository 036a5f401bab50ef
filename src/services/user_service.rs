use crate::entities::user_entity as users;
use crate::error::{AppError, AppResult};
use crate::models::{RegisterUserRequest, UserLookupResponse, UserResponse};
use crate::utils::{SharedClock, validate_phone};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, Set, SqlErr,
};

/// 与 users 表 first_name / last_name 列宽一致
pub const MAX_NAME_LEN: usize = 100;

#[derive(Clone)]
pub struct UserService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl UserService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// 注册参与用户，手机号唯一
    pub async fn register(&self, request: RegisterUserRequest) -> AppResult<UserResponse> {
        let phone = validate_phone(&request.phone)?;
        let first_name = request.first_name.trim();
        let last_name = request.last_name.trim();
        if first_name.is_empty() || last_name.is_empty() {
            return Err(AppError::ValidationError(
                "First name and last name are required".into(),
            ));
        }
        if first_name.chars().count() > MAX_NAME_LEN
            || last_name.chars().count() > MAX_NAME_LEN
        {
            return Err(AppError::ValidationError(format!(
                "Names must be at most {MAX_NAME_LEN} characters"
            )));
        }

        if self.find_model_by_phone(&phone).await?.is_some() {
            return Err(AppError::Conflict(
                "Phone number is already registered".into(),
            ));
        }

        let inserted = users::ActiveModel {
            phone: Set(phone),
            first_name: Set(first_name.to_string()),
            last_name: Set(last_name.to_string()),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await;

        // 并发注册同一号码时由唯一索引兜底
        let user = match inserted {
            Ok(user) => user,
            Err(e) if matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_))) => {
                return Err(AppError::Conflict(
                    "Phone number is already registered".into(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

        log::info!("User registered: id={}", user.id);
        Ok(user.into())
    }

    pub async fn find_by_phone(&self, phone: &str) -> AppResult<UserLookupResponse> {
        let phone = validate_phone(phone)?;
        let user = self.find_model_by_phone(&phone).await?;
        Ok(UserLookupResponse {
            exists: user.is_some(),
            user: user.map(Into::into),
        })
    }

    pub async fn get(&self, user_id: i32) -> AppResult<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))
    }

    async fn find_model_by_phone(&self, phone: &str) -> AppResult<Option<users::Model>> {
        let user = users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .one(&self.pool)
            .await?;
        Ok(user)
    }
}
