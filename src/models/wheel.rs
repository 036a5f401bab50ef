use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use super::WinnerResponse;

/// 转盘上的一个扇区：真实奖品或“再转一次”填充格
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Segment {
    RealPrize {
        prize_id: i32,
        name: String,
        probability_bp: i32,
    },
    Filler,
}

impl Segment {
    pub fn is_filler(&self) -> bool {
        matches!(self, Segment::Filler)
    }

    pub fn prize_id(&self) -> Option<i32> {
        match self {
            Segment::RealPrize { prize_id, .. } => Some(*prize_id),
            Segment::Filler => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct WheelResponse {
    pub segments: Vec<Segment>,
    /// 每个扇区的角度
    pub segment_angle: f64,
}

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct SpinRequest {
    pub user_id: i32,
    /// 客户端当前转盘角度，用于连续动画 (默认 0)
    pub previous_rotation: Option<f64>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SpinResponse {
    pub segments: Vec<Segment>,
    /// 转盘最终累计旋转角度 (度)
    pub rotation: f64,
    pub segment_index: usize,
    pub landed: Segment,
    /// 落在真实奖品上时写入的中奖记录；填充格为空，可立即再转
    pub winner: Option<WinnerResponse>,
}

/// 每日参与资格
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct EligibilityResponse {
    pub allowed: bool,
    pub reason: String,
    pub retry_after: Option<DateTime<Utc>>,
}
