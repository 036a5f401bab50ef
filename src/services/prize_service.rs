use crate::entities::{prize_entity as prizes, winner_entity as winners};
use crate::error::{AppError, AppResult};
use crate::models::{
    CreatePrizeRequest, PrizeResponse, UpdatePrizeRequest, probability_to_bp,
    validate_prize_name, validate_quantity,
};
use crate::utils::SharedClock;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, IntoActiveModel,
    PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
};

/// 奖品表为空时写入的默认奖品 (名称, 概率 bp, 名额)
const DEFAULT_PRIZES: [(&str, i32, i32); 7] = [
    ("Téléphone portable", 800, 1),
    ("Support de voiture pour téléphone", 800, 1),
    ("Pc Portable", 500, 1),
    ("Puce + 10GB Gratuit", 1000, 1),
    ("Tablette", 800, 1),
    ("Imprimante Canon", 500, 1),
    ("Power Bank", 500, 1),
];

#[derive(Clone)]
pub struct PrizeService {
    pool: DatabaseConnection,
    clock: SharedClock,
}

impl PrizeService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock) -> Self {
        Self { pool, clock }
    }

    /// 所有奖品（管理后台）
    pub async fn list_all(&self) -> AppResult<Vec<PrizeResponse>> {
        let list = prizes::Entity::find()
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        log::debug!("Fetched {} prizes", list.len());
        Ok(list.into_iter().map(Into::into).collect())
    }

    /// 转盘上展示的奖品：仅启用的，按概率从高到低
    pub async fn list_active(&self) -> AppResult<Vec<prizes::Model>> {
        let list = prizes::Entity::find()
            .filter(prizes::Column::IsActive.eq(true))
            .order_by_desc(prizes::Column::ProbabilityBp)
            .order_by_asc(prizes::Column::Id)
            .all(&self.pool)
            .await?;
        Ok(list)
    }

    pub async fn get(&self, prize_id: i32) -> AppResult<prizes::Model> {
        prizes::Entity::find_by_id(prize_id)
            .one(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))
    }

    pub async fn create(&self, request: CreatePrizeRequest) -> AppResult<PrizeResponse> {
        let name = validate_prize_name(&request.name)?;
        let probability_bp = probability_to_bp(request.probability)?;
        let quantity = validate_quantity(request.quantity)?;

        let created = prizes::ActiveModel {
            name: Set(name),
            probability_bp: Set(probability_bp),
            quantity: Set(quantity),
            is_active: Set(request.is_active.unwrap_or(true)),
            created_at: Set(self.clock.now()),
            ..Default::default()
        }
        .insert(&self.pool)
        .await?;

        log::info!(
            "Prize created: id={} name={} quantity={}",
            created.id,
            created.name,
            created.quantity
        );
        Ok(created.into())
    }

    /// 部分更新奖品；至少需要一个字段
    pub async fn update(
        &self,
        prize_id: i32,
        request: UpdatePrizeRequest,
    ) -> AppResult<PrizeResponse> {
        if request.is_empty() {
            return Err(AppError::ValidationError("No fields to update".into()));
        }

        // 先校验全部字段，避免部分写入
        let name = request.name.as_deref().map(validate_prize_name).transpose()?;
        let probability_bp = request.probability.map(probability_to_bp).transpose()?;
        let quantity = request.quantity.map(validate_quantity).transpose()?;

        let txn = self.pool.begin().await?;

        let mut am = prizes::Entity::find_by_id(prize_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))?
            .into_active_model();

        if let Some(name) = name {
            am.name = Set(name);
        }
        if let Some(bp) = probability_bp {
            am.probability_bp = Set(bp);
        }
        if let Some(q) = quantity {
            am.quantity = Set(q);
        }
        if let Some(active) = request.is_active {
            am.is_active = Set(active);
        }

        let updated = am.update(&txn).await?;
        txn.commit().await?;

        log::info!(
            "Prize updated: id={} quantity={} active={}",
            updated.id,
            updated.quantity,
            updated.is_active
        );
        Ok(updated.into())
    }

    /// 删除奖品；已有中奖记录的奖品不可删除
    pub async fn delete(&self, prize_id: i32) -> AppResult<()> {
        let txn = self.pool.begin().await?;

        prizes::Entity::find_by_id(prize_id)
            .one(&txn)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Prize {prize_id} not found")))?;

        let winner_count = winners::Entity::find()
            .filter(winners::Column::PrizeId.eq(prize_id))
            .count(&txn)
            .await?;
        if winner_count > 0 {
            return Err(AppError::Conflict(format!(
                "Cannot delete a prize that has winners ({winner_count})"
            )));
        }

        prizes::Entity::delete_by_id(prize_id).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Prize deleted: id={prize_id}");
        Ok(())
    }

    /// 奖品表为空时写入默认奖品，返回写入条数
    pub async fn seed_default_prizes(&self) -> AppResult<usize> {
        let txn = self.pool.begin().await?;

        let existing = prizes::Entity::find().count(&txn).await?;
        if existing > 0 {
            log::info!("Prizes already exist ({existing}), skipping seed");
            return Ok(0);
        }

        let now = self.clock.now();
        let models = DEFAULT_PRIZES
            .iter()
            .map(|(name, bp, quantity)| prizes::ActiveModel {
                name: Set((*name).to_string()),
                probability_bp: Set(*bp),
                quantity: Set(*quantity),
                is_active: Set(true),
                created_at: Set(now),
                ..Default::default()
            });
        prizes::Entity::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        log::info!("Seeded {} default prizes", DEFAULT_PRIZES.len());
        Ok(DEFAULT_PRIZES.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;
    use crate::models::RegisterUserRequest;
    use crate::services::{UserService, WinnerService};
    use crate::utils::FixedClock;
    use chrono::{TimeZone, Utc};
    use std::sync::Arc;

    fn clock() -> SharedClock {
        Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap(),
        ))
    }

    fn prize(name: &str, probability: f64, quantity: i32) -> CreatePrizeRequest {
        CreatePrizeRequest {
            name: name.to_string(),
            probability,
            quantity,
            is_active: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_list_active_ordering() {
        let service = PrizeService::new(memory_pool().await, clock());
        service.create(prize("Power Bank", 5.0, 1)).await.unwrap();
        service.create(prize("Puce + 10GB", 10.0, 2)).await.unwrap();
        let hidden = service.create(prize("Tablette", 50.0, 1)).await.unwrap();
        service
            .update(
                hidden.id,
                UpdatePrizeRequest {
                    is_active: Some(false),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        let active = service.list_active().await.unwrap();
        let names: Vec<&str> = active.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Puce + 10GB", "Power Bank"]);
        assert_eq!(service.list_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_input() {
        let service = PrizeService::new(memory_pool().await, clock());
        assert!(matches!(
            service.create(prize(" ", 5.0, 1)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(prize("A", 101.0, 1)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service.create(prize("A", 5.0, -1)).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(service.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_validation_and_not_found() {
        let service = PrizeService::new(memory_pool().await, clock());
        let p = service.create(prize("Power Bank", 5.0, 1)).await.unwrap();

        assert!(matches!(
            service.update(p.id, UpdatePrizeRequest::default()).await,
            Err(AppError::ValidationError(_))
        ));
        assert!(matches!(
            service
                .update(
                    999,
                    UpdatePrizeRequest {
                        quantity: Some(3),
                        ..Default::default()
                    }
                )
                .await,
            Err(AppError::NotFound(_))
        ));

        let updated = service
            .update(
                p.id,
                UpdatePrizeRequest {
                    name: Some("Power Bank XL".into()),
                    probability: Some(7.25),
                    quantity: Some(4),
                    is_active: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.name, "Power Bank XL");
        assert_eq!(updated.probability, 7.25);
        assert_eq!(updated.quantity, 4);
        assert!(updated.is_active);
    }

    #[tokio::test]
    async fn test_delete_guarded_by_winners() {
        let pool = memory_pool().await;
        let service = PrizeService::new(pool.clone(), clock());
        let users = UserService::new(pool.clone(), clock());
        let wins = WinnerService::new(pool.clone(), clock());

        let kept = service.create(prize("Tablette", 8.0, 1)).await.unwrap();
        let free = service.create(prize("Power Bank", 5.0, 1)).await.unwrap();
        let user = users
            .register(RegisterUserRequest {
                phone: "20123456".into(),
                first_name: "Amine".into(),
                last_name: "Trabelsi".into(),
            })
            .await
            .unwrap();
        wins.record_win(user.id, kept.id).await.unwrap();

        assert!(matches!(
            service.delete(kept.id).await,
            Err(AppError::Conflict(_))
        ));
        service.delete(free.id).await.unwrap();
        assert!(matches!(
            service.delete(free.id).await,
            Err(AppError::NotFound(_))
        ));
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_seed_only_when_empty() {
        let service = PrizeService::new(memory_pool().await, clock());
        assert_eq!(service.seed_default_prizes().await.unwrap(), 7);
        assert_eq!(service.seed_default_prizes().await.unwrap(), 0);

        let active = service.list_active().await.unwrap();
        assert_eq!(active.len(), 7);
        assert_eq!(active[0].name, "Puce + 10GB Gratuit");
        assert!(active.iter().all(|p| p.quantity == 1));
    }
}
