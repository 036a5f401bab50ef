use serde::Serialize;
use utoipa::ToSchema;

/// 管理后台统计
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, ToSchema)]
pub struct AdminStats {
    /// 启用中的奖品数
    pub total_prizes: u64,
    /// 启用奖品剩余名额之和
    pub total_quantity: i64,
    /// 参与过（有中奖记录）的不同用户数
    pub total_participants: u64,
    pub total_winners: u64,
    pub final_winners: u64,
    pub pending_winners: u64,
}
