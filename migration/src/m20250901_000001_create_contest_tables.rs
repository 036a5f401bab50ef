use sea_orm_migration::prelude::*;

/// Users (参与用户, phone 唯一)
#[derive(DeriveIden)]
enum Users {
    Table,
    Id,
    Phone,
    FirstName,
    LastName,
    CreatedAt,
}

/// Prizes (奖品配置表)
#[derive(DeriveIden)]
enum Prizes {
    Table,
    Id,
    Name,
    ProbabilityBp,
    Quantity,
    IsActive,
    CreatedAt,
}

/// Winners (转盘中奖记录 / 最终抽签状态)
#[derive(DeriveIden)]
enum Winners {
    Table,
    Id,
    UserId,
    PrizeId,
    IsFinalWinner,
    WonAt,
}

#[derive(DeriveMigrationName)]
pub struct Migration;

/// 概率使用 basis points (bp) 存储，100% = 10000bp
/// quantity 为剩余可抽取的最终中奖名额，最终抽签时递减
#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Users::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Users::Phone)
                            .string_len(20)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Users::FirstName).string_len(100).not_null())
                    .col(ColumnDef::new(Users::LastName).string_len(100).not_null())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Prizes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Prizes::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Prizes::Name).string_len(200).not_null())
                    .col(
                        ColumnDef::new(Prizes::ProbabilityBp)
                            .integer()
                            .not_null()
                            .default(1250),
                    )
                    .col(
                        ColumnDef::new(Prizes::Quantity)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(Prizes::IsActive)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Prizes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // 外键内联在建表语句中（SQLite 不支持 ALTER TABLE ADD CONSTRAINT）
        // 不加 ON DELETE CASCADE：有中奖记录的奖品由应用层禁止删除
        manager
            .create_table(
                Table::create()
                    .table(Winners::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Winners::Id)
                            .integer()
                            .not_null()
                            .auto_increment()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Winners::UserId).integer().not_null())
                    .col(ColumnDef::new(Winners::PrizeId).integer().not_null())
                    .col(
                        ColumnDef::new(Winners::IsFinalWinner)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Winners::WonAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_user")
                            .from(Winners::Table, Winners::UserId)
                            .to(Users::Table, Users::Id),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_winners_prize")
                            .from(Winners::Table, Winners::PrizeId)
                            .to(Prizes::Table, Prizes::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .if_not_exists()
                    .name("idx_prizes_is_active")
                    .table(Prizes::Table)
                    .col(Prizes::IsActive)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // 删除顺序：中奖记录 -> 奖品 -> 用户
        manager
            .drop_table(Table::drop().if_exists().table(Winners::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Prizes::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().if_exists().table(Users::Table).to_owned())
            .await?;

        Ok(())
    }
}
