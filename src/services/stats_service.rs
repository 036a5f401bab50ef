use crate::entities::{prize_entity as prizes, winner_entity as winners};
use crate::error::AppResult;
use crate::models::AdminStats;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, FromQueryResult, PaginatorTrait, QueryFilter,
    QuerySelect,
};

#[derive(Clone)]
pub struct StatsService {
    pool: DatabaseConnection,
}

impl StatsService {
    pub fn new(pool: DatabaseConnection) -> Self {
        Self { pool }
    }

    /// 管理后台统计（只读，空表时全部为 0）
    pub async fn admin_stats(&self) -> AppResult<AdminStats> {
        let total_prizes = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .count(&self.pool)
            .await?;

        #[derive(Debug, FromQueryResult)]
        struct QuantityRow {
            total: Option<i64>,
        }
        let total_quantity = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .select_only()
            .column_as(Expr::col(prizes::Column::Quantity).sum(), "total")
            .into_model::<QuantityRow>()
            .one(&self.pool)
            .await?
            .and_then(|r| r.total)
            .unwrap_or(0);

        let total_participants = winners::Entity::find()
            .select_only()
            .column(winners::Column::UserId)
            .distinct()
            .count(&self.pool)
            .await?;

        let total_winners = winners::Entity::find().count(&self.pool).await?;

        let final_winners = winners::Entity::find()
            .filter(winners::Column::IsFinalWinner.eq(true))
            .count(&self.pool)
            .await?;

        Ok(AdminStats {
            total_prizes,
            total_quantity,
            total_participants,
            total_winners,
            final_winners,
            pending_winners: total_winners.saturating_sub(final_winners),
        })
    }
}
