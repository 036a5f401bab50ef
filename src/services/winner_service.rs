use crate::entities::{prize_entity as prizes, user_entity as users, winner_entity as winners};
use crate::error::{AppError, AppResult};
use crate::models::WinnerDetailResponse;
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};

#[derive(Clone)]
pub struct WinnerService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl WinnerService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// 记录一次转盘中奖（进入该奖品的抽签池）
    ///
    /// 只校验奖品存在且启用，不校验剩余名额：名额只在最终抽签时限制。
    /// 不幂等，重复调用会产生多条记录。
    pub async fn record_win(&self, user_id: i32, prize_id: i32) -> AppResult<winners::Model> {
        users::Entity::find_by_id(user_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("User {user_id} not found")))?;

        let prize = prizes::Entity::find_by_id(prize_id)
            .filter(prizes::Column::IsActive.eq(true))
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::Unavailable("Prize is not available".into()))?;

        let winner = winners::ActiveModel {
            user_id: Set(user_id),
            prize_id: Set(prize.id),
            is_final_winner: Set(false),
            won_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Win recorded: winner={} user={} prize={}",
            winner.id,
            user_id,
            prize.id
        );
        Ok(winner)
    }

    /// 某奖品的抽签池（最新在前）
    pub async fn list_by_prize(&self, prize_id: i32) -> AppResult<Vec<WinnerDetailResponse>> {
        let prize = prizes::Entity::find_by_id(prize_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))?;

        let rows = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .find_also_related(users::Entity)
            .order_by_desc(winners::Column::WonAt)
            .order_by_desc(winners::Column::Id)
            .all(&self.pool)
            .await?;

        let mut items = Vec::with_capacity(rows.len());
        for (winner, user) in rows {
            match user {
                Some(user) => items.push(WinnerDetailResponse::new(winner, &user, &prize)),
                None => log::warn!("Winner {} references a missing user", winner.id),
            }
        }
        Ok(items)
    }

    /// 用户累计进入抽签池的次数
    pub async fn play_count(&self, user_id: i32) -> AppResult<u64> {
        let count = winners::Entity::find()
            .filter(winners::Column::UserId.eq(user_id))
            .count(&self.pool)
            .await?;
        Ok(count)
    }
}
