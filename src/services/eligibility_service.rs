use crate::config::ContestConfig;
use crate::entities::winner_entity as winners;
use crate::error::{AppError, AppResult};
use crate::models::EligibilityResponse;
use crate::utils::SharedClock;
use chrono::{DateTime, Days, FixedOffset, NaiveTime, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, DbErr, EntityTrait, QueryFilter, QueryOrder};

/// 每日参与资格
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Eligible,
    /// 今天（活动时区）已经中过奖，直到 until 才可再玩
    CoolingDown { until: DateTime<Utc> },
    /// 无法确认（存储异常），按不可玩处理
    Unknown,
}

impl Eligibility {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Eligibility::Eligible)
    }
}

impl From<Eligibility> for EligibilityResponse {
    fn from(e: Eligibility) -> Self {
        match e {
            Eligibility::Eligible => EligibilityResponse {
                allowed: true,
                reason: "You can play today!".into(),
                retry_after: None,
            },
            Eligibility::CoolingDown { until } => EligibilityResponse {
                allowed: false,
                reason: "You have already played today. Come back tomorrow for a new chance!"
                    .into(),
                retry_after: Some(until),
            },
            Eligibility::Unknown => EligibilityResponse {
                allowed: false,
                reason: "Could not verify eligibility. Please try again.".into(),
                retry_after: None,
            },
        }
    }
}

/// 按自然日（活动本地时区）判断，不是滚动 24 小时窗口
#[derive(Debug, Clone, Copy)]
pub struct EligibilityRules {
    offset: FixedOffset,
    reopen_at: NaiveTime,
}

impl EligibilityRules {
    pub fn new(utc_offset_minutes: i32, reopen_hour: u32) -> AppResult<Self> {
        let offset = FixedOffset::east_opt(utc_offset_minutes * 60).ok_or_else(|| {
            AppError::ConfigError(format!("Invalid UTC offset: {utc_offset_minutes} minutes"))
        })?;
        let reopen_at = NaiveTime::from_hms_opt(reopen_hour, 0, 0)
            .ok_or_else(|| AppError::ConfigError(format!("Invalid reopen hour: {reopen_hour}")))?;
        Ok(Self { offset, reopen_at })
    }

    pub fn from_config(config: &ContestConfig) -> AppResult<Self> {
        Self::new(config.utc_offset_minutes, config.reopen_hour)
    }

    pub fn evaluate(&self, last_win: Option<DateTime<Utc>>, now: DateTime<Utc>) -> Eligibility {
        let Some(last_win) = last_win else {
            return Eligibility::Eligible;
        };

        let today = now.with_timezone(&self.offset).date_naive();
        if last_win.with_timezone(&self.offset).date_naive() != today {
            return Eligibility::Eligible;
        }

        let reopen = today
            .checked_add_days(Days::new(1))
            .map(|tomorrow| tomorrow.and_time(self.reopen_at))
            .and_then(|local| local.and_local_timezone(self.offset).single());
        match reopen {
            Some(until) => Eligibility::CoolingDown {
                until: until.with_timezone(&Utc),
            },
            None => Eligibility::Unknown,
        }
    }
}

#[derive(Clone)]
pub struct EligibilityService {
    pool: DatabaseConnection,
    clock: SharedClock,
    rules: EligibilityRules,
}

impl EligibilityService {
    pub fn new(pool: DatabaseConnection, clock: SharedClock, rules: EligibilityRules) -> Self {
        Self { pool, clock, rules }
    }

    /// 用户能否在今天转盘；存储异常时按不可玩返回
    pub async fn check(&self, user_id: i32) -> Eligibility {
        match self.last_win_at(user_id).await {
            Ok(last_win) => self.rules.evaluate(last_win, self.clock.now()),
            Err(e) => {
                log::error!("Failed to check eligibility for user {user_id}: {e}");
                Eligibility::Unknown
            }
        }
    }

    /// 用户最近一次中奖时间（任意奖品，无论是否最终中奖）
    pub async fn last_win_at(&self, user_id: i32) -> Result<Option<DateTime<Utc>>, DbErr> {
        let latest = winners::Entity::find()
            .filter(winners::Column::UserId.eq(user_id))
            .order_by_desc(winners::Column::WonAt)
            .order_by_desc(winners::Column::Id)
            .one(&self.pool)
            .await?;
        Ok(latest.map(|w| w.won_at))
    }
}
