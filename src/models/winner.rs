use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::entities::{prize_entity, user_entity, winner_entity};

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct RecordWinRequest {
    pub user_id: i32,
    pub prize_id: i32,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerResponse {
    pub id: i32,
    pub user_id: i32,
    pub prize_id: i32,
    pub is_final_winner: bool,
    pub won_at: DateTime<Utc>,
}

impl From<winner_entity::Model> for WinnerResponse {
    fn from(m: winner_entity::Model) -> Self {
        Self {
            id: m.id,
            user_id: m.user_id,
            prize_id: m.prize_id,
            is_final_winner: m.is_final_winner,
            won_at: m.won_at,
        }
    }
}

/// 奖品抽签池中的一条记录（附带用户与奖品信息，供管理后台展示）
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WinnerDetailResponse {
    pub id: i32,
    pub user_id: i32,
    pub prize_id: i32,
    pub is_final_winner: bool,
    pub won_at: DateTime<Utc>,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub prize_name: String,
}

impl WinnerDetailResponse {
    pub fn new(
        winner: winner_entity::Model,
        user: &user_entity::Model,
        prize: &prize_entity::Model,
    ) -> Self {
        Self {
            id: winner.id,
            user_id: winner.user_id,
            prize_id: winner.prize_id,
            is_final_winner: winner.is_final_winner,
            won_at: winner.won_at,
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: user.phone.clone(),
            prize_name: prize.name.clone(),
        }
    }
}

/// 最终抽签结果
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct DrawResultResponse {
    pub winner: WinnerResponse,
    /// 扣减后的剩余名额
    pub remaining_quantity: i32,
    /// 该奖品当前最终中奖人数（含本次）
    pub final_winner_count: u64,
}
