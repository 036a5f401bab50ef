use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::prize_entity;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PrizeResponse {
    pub id: i32,
    pub name: String,
    /// 概率 (百分比, 0-100)
    pub probability: f64,
    /// 剩余最终中奖名额
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<prize_entity::Model> for PrizeResponse {
    fn from(m: prize_entity::Model) -> Self {
        Self {
            probability: m.probability_percent(),
            id: m.id,
            name: m.name,
            quantity: m.quantity,
            is_active: m.is_active,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct CreatePrizeRequest {
    #[schema(example = "Power Bank")]
    pub name: String,
    #[schema(example = 12.5)]
    pub probability: f64,
    #[schema(example = 1)]
    pub quantity: i32,
    pub is_active: Option<bool>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize, ToSchema)]
pub struct UpdatePrizeRequest {
    pub name: Option<String>,
    pub probability: Option<f64>,
    pub quantity: Option<i32>,
    pub is_active: Option<bool>,
}

impl UpdatePrizeRequest {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.probability.is_none()
            && self.quantity.is_none()
            && self.is_active.is_none()
    }
}

pub fn validate_prize_name(name: &str) -> AppResult<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::ValidationError("Prize name is required".into()));
    }
    if name.chars().count() > 200 {
        return Err(AppError::ValidationError(
            "Prize name must be at most 200 characters".into(),
        ));
    }
    Ok(name.to_string())
}

/// 百分比 (0-100, 两位小数) 转 basis points
pub fn probability_to_bp(probability: f64) -> AppResult<i32> {
    if !probability.is_finite() || !(0.0..=100.0).contains(&probability) {
        return Err(AppError::ValidationError(
            "Probability must be between 0 and 100".into(),
        ));
    }
    Ok((probability * 100.0).round() as i32)
}

pub fn validate_quantity(quantity: i32) -> AppResult<i32> {
    if quantity < 0 {
        return Err(AppError::ValidationError(
            "Quantity must not be negative".into(),
        ));
    }
    Ok(quantity)
}
