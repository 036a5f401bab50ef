use crate::entities::{prize_entity as prizes, winner_entity as winners};
use crate::error::{AppError, AppResult};
use crate::models::DrawResultResponse;
use rand::Rng;
use rand::seq::IndexedRandom;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait, UpdateResult,
};

/// 在待定中奖者中等概率选一个
pub fn pick_candidate<'a, R: Rng>(
    candidates: &'a [winners::Model],
    rng: &mut R,
) -> Option<&'a winners::Model> {
    candidates.choose(rng)
}

#[derive(Clone)]
pub struct DrawService {
    pool: DatabaseConnection,
}

impl DrawService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 最终抽签：把一条待定中奖记录升级为最终中奖，并扣减奖品名额
    ///
    /// 逻辑 (单个事务内):
    /// 1. 读取中奖记录及其奖品
    /// 2. 已是最终中奖 -> Conflict
    /// 3. 剩余名额为 0 (已抽出人数达到总名额) -> CapacityExceeded
    /// 4. 条件更新 is_final_winner (where is_final_winner = false)
    /// 5. 条件扣减名额 (where quantity > 0)，影响 0 行 -> CapacityExceeded 并回滚
    pub async fn draw_final_winner(&self, winner_id: i32) -> AppResult<DrawResultResponse> {
        let txn = self.pool.begin().await?;

        let (winner, prize) = winners::Entity::find_by_id(winner_id)
            .find_also_related(prizes::Entity)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Winner {winner_id} not found")))?;
        let prize = prize.ok_or_else(|| {
            AppError::NotFound(format!("Prize of winner {winner_id} not found"))
        })?;

        if winner.is_final_winner {
            return Err(AppError::Conflict(format!(
                "Winner {winner_id} is already a final winner"
            )));
        }

        let final_count = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize.id))
            .filter(winners::Column::IsFinalWinner.eq(true))
            .count(&txn)
            .await?;
        if !prize.has_remaining() {
            return Err(AppError::CapacityExceeded(format!(
                "Cannot add more final winners for '{}': the limit of {} has been reached",
                prize.name, final_count
            )));
        }

        let promoted: UpdateResult = winners::Entity::update_many()
            .col_expr(winners::Column::IsFinalWinner, Expr::value(true))
            .filter(winners::Column::Id.eq(winner.id))
            .filter(winners::Column::IsFinalWinner.eq(false))
            .exec(&txn)
            .await?;
        if promoted.rows_affected != 1 {
            return Err(AppError::Conflict(format!(
                "Winner {winner_id} is already a final winner"
            )));
        }

        let decremented: UpdateResult = prizes::Entity::update_many()
            .col_expr(
                prizes::Column::Quantity,
                Expr::col(prizes::Column::Quantity).sub(1),
            )
            .filter(prizes::Column::Id.eq(prize.id))
            .filter(prizes::Column::Quantity.gt(0))
            .exec(&txn)
            .await?;
        if decremented.rows_affected != 1 {
            // txn 未提交，丢弃时回滚上面的升级
            log::warn!(
                "Quantity guard rejected draw: winner={} prize={}",
                winner_id,
                prize.id
            );
            return Err(AppError::CapacityExceeded(format!(
                "No remaining quantity for '{}'",
                prize.name
            )));
        }

        let remaining_quantity = prizes::Entity::find_by_id(prize.id)
            .one(&txn)
            .await?
            .map(|p| p.quantity)
            .ok_or_else(|| AppError::InternalError("Prize disappeared during draw".into()))?;

        txn.commit().await?;

        log::info!(
            "Final winner drawn: winner={} user={} prize={} remaining={}",
            winner.id,
            winner.user_id,
            prize.id,
            remaining_quantity
        );

        Ok(DrawResultResponse {
            winner: winners::Model {
                is_final_winner: true,
                ..winner
            }
            .into(),
            remaining_quantity,
            final_winner_count: final_count + 1,
        })
    }

    /// 随机抽取某奖品的一名最终中奖者
    ///
    /// 候选读取不在抽签事务内：期间新写入的待定记录只会成为下一次抽签的候选。
    pub async fn draw_random_winner(&self, prize_id: i32) -> AppResult<DrawResultResponse> {
        let prize = prizes::Entity::find_by_id(prize_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))?;

        if !prize.has_remaining() {
            return Err(AppError::CapacityExceeded(format!(
                "No remaining quantity for '{}'",
                prize.name
            )));
        }

        let candidates = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .filter(winners::Column::IsFinalWinner.eq(false))
            .order_by_asc(winners::Column::Id)
            .all(&self.pool)
            .await?;

        let chosen = pick_candidate(&candidates, &mut rand::rng())
            .map(|w| w.id)
            .ok_or_else(|| {
                AppError::NotFound(format!("No provisional winners for '{}'", prize.name))
            })?;

        log::info!(
            "Drawing prize {} among {} candidates, picked winner {}",
            prize_id,
            candidates.len(),
            chosen
        );
        self.draw_final_winner(chosen).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;
    use crate::models::{CreatePrizeRequest, RegisterUserRequest, UpdatePrizeRequest};
    use crate::services::{PrizeService, UserService, WinnerService};
    use crate::utils::{FixedClock, SharedClock};
    use chrono::{TimeZone, Utc};
    use futures_util::future::join;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashMap;
    use std::sync::Arc;

    struct Fixture {
        prizes: PrizeService,
        users: UserService,
        winners: WinnerService,
        draws: DrawService,
    }

    async fn fixture() -> Fixture {
        let pool = memory_pool().await;
        let clock: SharedClock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap(),
        ));
        Fixture {
            prizes: PrizeService::new(pool.clone(), clock.clone()),
            users: UserService::new(pool.clone(), clock.clone()),
            winners: WinnerService::new(pool.clone(), clock),
            draws: DrawService::new(pool),
        }
    }

    impl Fixture {
        async fn prize(&self, quantity: i32) -> i32 {
            self.prizes
                .create(CreatePrizeRequest {
                    name: "Pc Portable".into(),
                    probability: 10.0,
                    quantity,
                    is_active: None,
                })
                .await
                .unwrap()
                .id
        }

        async fn provisional(&self, phone: &str, prize_id: i32) -> i32 {
            let user = self
                .users
                .register(RegisterUserRequest {
                    phone: phone.into(),
                    first_name: "Yassine".into(),
                    last_name: "Gharbi".into(),
                })
                .await
                .unwrap();
            self.winners.record_win(user.id, prize_id).await.unwrap().id
        }

        async fn quantity(&self, prize_id: i32) -> i32 {
            self.prizes.get(prize_id).await.unwrap().quantity
        }

        async fn final_ids(&self, prize_id: i32) -> Vec<i32> {
            self.winners
                .list_by_prize(prize_id)
                .await
                .unwrap()
                .into_iter()
                .filter(|w| w.is_final_winner)
                .map(|w| w.id)
                .collect()
        }
    }

    #[tokio::test]
    async fn test_draw_without_winners_is_not_found() {
        let f = fixture().await;
        f.prize(1).await;
        assert!(matches!(
            f.draws.draw_final_winner(1).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_exhausted_prize_rejects_draw() {
        let f = fixture().await;
        let p = f.prize(0).await;
        let a = f.provisional("20000001", p).await;

        assert!(matches!(
            f.draws.draw_final_winner(a).await,
            Err(AppError::CapacityExceeded(_))
        ));
        assert_eq!(f.quantity(p).await, 0);
        assert!(f.final_ids(p).await.is_empty());
    }

    #[tokio::test]
    async fn test_quantity_caps_final_winners() {
        let f = fixture().await;
        let p = f.prize(2).await;
        let a = f.provisional("20000001", p).await;
        let b = f.provisional("20000002", p).await;
        let c = f.provisional("20000003", p).await;

        let first = f.draws.draw_final_winner(a).await.unwrap();
        assert_eq!(first.remaining_quantity, 1);
        assert_eq!(first.final_winner_count, 1);
        assert!(first.winner.is_final_winner);

        let second = f.draws.draw_final_winner(b).await.unwrap();
        assert_eq!(second.remaining_quantity, 0);
        assert_eq!(second.final_winner_count, 2);

        assert!(matches!(
            f.draws.draw_final_winner(c).await,
            Err(AppError::CapacityExceeded(_))
        ));
        assert_eq!(f.quantity(p).await, 0);

        let mut finals = f.final_ids(p).await;
        finals.sort();
        assert_eq!(finals, vec![a, b]);
    }

    #[tokio::test]
    async fn test_already_final_cannot_be_drawn_again() {
        let f = fixture().await;
        let p = f.prize(3).await;
        let a = f.provisional("20000001", p).await;

        f.draws.draw_final_winner(a).await.unwrap();
        assert!(matches!(
            f.draws.draw_final_winner(a).await,
            Err(AppError::Conflict(_))
        ));
        // 失败不改变任何状态
        assert_eq!(f.quantity(p).await, 2);
        assert_eq!(f.final_ids(p).await, vec![a]);
    }

    // memory_pool 只有一个连接，两次抽签实际上依次执行；
    // 这里验证的是最后一个名额只能被领取一次，而不是事务交错
    #[tokio::test]
    async fn test_joined_draws_on_last_unit_claim_it_once() {
        let f = fixture().await;
        let p = f.prize(1).await;
        let a = f.provisional("20000001", p).await;
        let b = f.provisional("20000002", p).await;

        let (ra, rb) = join(f.draws.draw_final_winner(a), f.draws.draw_final_winner(b)).await;

        let successes = [&ra, &rb].iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        assert!(
            matches!(ra, Err(AppError::CapacityExceeded(_)))
                || matches!(rb, Err(AppError::CapacityExceeded(_)))
        );
        assert_eq!(f.quantity(p).await, 0);
        assert_eq!(f.final_ids(p).await.len(), 1);
    }

    #[tokio::test]
    async fn test_deactivated_prize_is_still_drawable() {
        let f = fixture().await;
        let p = f.prize(1).await;
        let a = f.provisional("20000001", p).await;
        f.prizes
            .update(
                p,
                UpdatePrizeRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let drawn = f.draws.draw_random_winner(p).await.unwrap();
        assert_eq!(drawn.winner.id, a);
        assert_eq!(drawn.remaining_quantity, 0);
    }

    #[tokio::test]
    async fn test_random_draw_edge_cases() {
        let f = fixture().await;
        assert!(matches!(
            f.draws.draw_random_winner(999).await,
            Err(AppError::NotFound(_))
        ));

        let p = f.prize(2).await;
        assert!(matches!(
            f.draws.draw_random_winner(p).await,
            Err(AppError::NotFound(_))
        ));

        f.provisional("20000001", p).await;
        f.provisional("20000002", p).await;
        f.provisional("20000003", p).await;
        f.draws.draw_random_winner(p).await.unwrap();
        f.draws.draw_random_winner(p).await.unwrap();
        assert!(matches!(
            f.draws.draw_random_winner(p).await,
            Err(AppError::CapacityExceeded(_))
        ));
        assert_eq!(f.final_ids(p).await.len(), 2);
    }

    #[tokio::test]
    async fn test_admin_edit_reopens_capacity() {
        let f = fixture().await;
        let p = f.prize(1).await;
        let a = f.provisional("20000001", p).await;
        let b = f.provisional("20000002", p).await;
        f.draws.draw_final_winner(a).await.unwrap();
        assert!(f.draws.draw_final_winner(b).await.is_err());

        f.prizes
            .update(
                p,
                UpdatePrizeRequest {
                    quantity: Some(1),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        f.draws.draw_final_winner(b).await.unwrap();
        assert_eq!(f.quantity(p).await, 0);
    }

    fn candidate(id: i32) -> winners::Model {
        winners::Model {
            id,
            user_id: id,
            prize_id: 1,
            is_final_winner: false,
            won_at: Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap(),
        }
    }

    #[test]
    fn test_pick_candidate_is_uniform() {
        let candidates: Vec<_> = (1..=4).map(candidate).collect();
        let mut rng = StdRng::seed_from_u64(3);
        let mut hits: HashMap<i32, usize> = HashMap::new();
        for _ in 0..40_000 {
            let picked = pick_candidate(&candidates, &mut rng).unwrap();
            *hits.entry(picked.id).or_default() += 1;
        }
        assert_eq!(hits.len(), 4);
        assert!(hits.values().all(|h| h.abs_diff(10_000) < 1_000));
        assert!(pick_candidate(&[], &mut rng).is_none());
    }
}
