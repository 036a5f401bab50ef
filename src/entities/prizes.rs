use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// 奖品配置实体
/// 概念说明:
/// - probability_bp: 概率权重 (basis points) 1% = 100bp, 100% = 10000bp，各奖品之和不要求为 100%
/// - quantity: 剩余可抽取的最终中奖名额，仅由最终抽签递减或管理员编辑修改
/// - is_active: 是否出现在转盘上（软下线）
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Eq, Serialize, Deserialize)]
#[sea_orm(table_name = "prizes")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub probability_bp: i32,
    pub quantity: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl Model {
    /// 是否还能产生最终中奖者
    pub fn has_remaining(&self) -> bool {
        self.quantity > 0
    }

    /// 百分比形式的概率 (两位小数)
    pub fn probability_percent(&self) -> f64 {
        f64::from(self.probability_bp) / 100.0
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::winners::Entity")]
    Winners,
}

impl Related<super::winners::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Winners.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
