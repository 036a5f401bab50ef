use sea_orm_migration::prelude::*;

#[derive(DeriveIden)]
enum Winners {
    Table,
    UserId,
    PrizeId,
    IsFinalWinner,
    WonAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 中奖表常用查询:
/// - 用户最近一次中奖时间 (每日资格判断)
/// - 某奖品的最终 / 待定中奖人数
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_user_won_at")
                    .table(Winners::Table)
                    .col(Winners::UserId)
                    .col(Winners::WonAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_winners_prize_final")
                    .table(Winners::Table)
                    .col(Winners::PrizeId)
                    .col(Winners::IsFinalWinner)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx_winners_prize_final")
                    .table(Winners::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx_winners_user_won_at")
                    .table(Winners::Table)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }
}
