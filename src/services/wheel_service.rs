use crate::entities::prize_entity as prizes;
use crate::error::{AppError, AppResult};
use crate::models::{EligibilityResponse, Segment, SpinResponse, WheelResponse};
use crate::services::{EligibilityService, PrizeService, UserService, WinnerService};
use rand::Rng;

/// 穿插在奖品之间的“再转一次”格上限
pub const MAX_INTERLEAVED_FILLERS: usize = 3;
/// 转盘最少扇区数，奖品不足时用填充格补齐
pub const MIN_SEGMENTS: usize = 8;
const MIN_FULL_ROTATIONS: f64 = 5.0;
const MAX_FULL_ROTATIONS: f64 = 10.0;

/// 填充格插入位置（奖品下标之后）：顶部、约 1/3 与 2/3 处
fn filler_positions(prize_count: usize) -> [usize; 3] {
    let n = prize_count as f64;
    [0, (n * 0.67).floor() as usize, (n * 0.33).floor() as usize]
}

/// 由启用奖品构建转盘
///
/// 奖品按概率从高到低排列（相同概率保持原有顺序），在固定位置穿插最多
/// 3 个填充格，总数不足 8 时继续补填充格。没有奖品时返回空转盘。
pub fn build_wheel(active_prizes: &[prizes::Model]) -> Vec<Segment> {
    let mut ordered: Vec<&prizes::Model> = active_prizes.iter().filter(|p| p.is_active).collect();
    if ordered.is_empty() {
        return Vec::new();
    }
    ordered.sort_by(|a, b| b.probability_bp.cmp(&a.probability_bp));

    let positions = filler_positions(ordered.len());
    let mut segments = Vec::with_capacity(ordered.len().max(MIN_SEGMENTS) + 1);
    let mut fillers = 0;

    for (index, prize) in ordered.into_iter().enumerate() {
        segments.push(Segment::RealPrize {
            prize_id: prize.id,
            name: prize.name.clone(),
            probability_bp: prize.probability_bp,
        });
        if positions.contains(&index) && fillers < MAX_INTERLEAVED_FILLERS {
            segments.push(Segment::Filler);
            fillers += 1;
        }
    }

    while segments.len() < MIN_SEGMENTS {
        segments.push(Segment::Filler);
    }

    segments
}

pub fn segment_angle(segment_count: usize) -> f64 {
    if segment_count == 0 {
        0.0
    } else {
        360.0 / segment_count as f64
    }
}

/// 随机旋转：在上一次角度基础上转 5~10 圈再加随机偏移
pub fn spin_rotation<R: Rng>(rng: &mut R, previous_rotation: f64) -> f64 {
    let spins = rng.random_range(MIN_FULL_ROTATIONS..MAX_FULL_ROTATIONS);
    let offset = rng.random_range(0.0..360.0);
    previous_rotation + spins * 360.0 + offset
}

/// 指针固定在顶部，转盘顺时针转过 rotation 度后指针所在的扇区
pub fn select_landing(segments: &[Segment], rotation: f64) -> Option<(usize, &Segment)> {
    if segments.is_empty() || !rotation.is_finite() {
        return None;
    }
    let angle = segment_angle(segments.len());
    let normalized = (360.0 - rotation.rem_euclid(360.0)).rem_euclid(360.0);
    let index = (normalized / angle).floor() as usize % segments.len();
    segments.get(index).map(|segment| (index, segment))
}

#[derive(Clone)]
pub struct WheelService {
    prize_service: PrizeService,
    user_service: UserService,
    eligibility_service: EligibilityService,
    winner_service: WinnerService,
}

impl WheelService {
    pub fn new(
        prize_service: PrizeService,
        user_service: UserService,
        eligibility_service: EligibilityService,
        winner_service: WinnerService,
    ) -> Self {
        Self {
            prize_service,
            user_service,
            eligibility_service,
            winner_service,
        }
    }

    /// 当前转盘布局
    pub async fn wheel(&self) -> AppResult<WheelResponse> {
        let active = self.prize_service.list_active().await?;
        let segments = build_wheel(&active);
        Ok(WheelResponse {
            segment_angle: segment_angle(segments.len()),
            segments,
        })
    }

    pub async fn eligibility(&self, user_id: i32) -> EligibilityResponse {
        self.eligibility_service.check(user_id).await.into()
    }

    /// 服务端转盘
    pub async fn spin(&self, user_id: i32, previous_rotation: f64) -> AppResult<SpinResponse> {
        if !previous_rotation.is_finite() {
            return Err(AppError::ValidationError("Invalid previous rotation".into()));
        }
        let rotation = spin_rotation(&mut rand::rng(), previous_rotation);
        self.spin_to(user_id, rotation).await
    }

    /// 用给定的最终角度完成一次转盘:
    /// 1. 校验用户存在与今日资格
    /// 2. 由启用奖品构建转盘，确定落点
    /// 3. 真实奖品写入中奖记录；填充格不落库，可立即再转
    pub async fn spin_to(&self, user_id: i32, rotation: f64) -> AppResult<SpinResponse> {
        self.user_service.get(user_id).await?;

        let eligibility = self.eligibility_service.check(user_id).await;
        if !eligibility.is_allowed() {
            let response: EligibilityResponse = eligibility.into();
            return Err(AppError::Conflict(match response.retry_after {
                Some(at) => format!("{} (retry after {})", response.reason, at.to_rfc3339()),
                None => response.reason,
            }));
        }

        let active = self.prize_service.list_active().await?;
        let segments = build_wheel(&active);
        let (segment_index, landed) = select_landing(&segments, rotation)
            .map(|(i, s)| (i, s.clone()))
            .ok_or_else(|| AppError::Unavailable("No prizes available".into()))?;

        let winner = match &landed {
            Segment::RealPrize { prize_id, .. } => {
                Some(self.winner_service.record_win(user_id, *prize_id).await?.into())
            }
            Segment::Filler => {
                log::debug!("User {user_id} landed on a filler segment");
                None
            }
        };

        Ok(SpinResponse {
            segments,
            rotation,
            segment_index,
            landed,
            winner,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::memory_pool;
    use crate::models::{CreatePrizeRequest, RegisterUserRequest};
    use crate::services::EligibilityRules;
    use crate::utils::{FixedClock, SharedClock};
    use chrono::{TimeZone, Utc};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;

    fn prize(id: i32, bp: i32) -> prizes::Model {
        prizes::Model {
            id,
            name: format!("Prize {id}"),
            probability_bp: bp,
            quantity: 1,
            is_active: true,
            created_at: Utc.with_ymd_and_hms(2025, 9, 1, 0, 0, 0).unwrap(),
        }
    }

    fn layout(segments: &[Segment]) -> Vec<Option<i32>> {
        segments.iter().map(Segment::prize_id).collect()
    }

    #[test]
    fn test_empty_catalog_builds_empty_wheel() {
        assert!(build_wheel(&[]).is_empty());
        let mut hidden = prize(1, 500);
        hidden.is_active = false;
        assert!(build_wheel(&[hidden]).is_empty());
    }

    #[test]
    fn test_small_catalog_is_padded_to_minimum() {
        let wheel = build_wheel(&[prize(1, 500)]);
        assert_eq!(wheel.len(), MIN_SEGMENTS);
        assert_eq!(wheel[0].prize_id(), Some(1));
        assert!(wheel[1..].iter().all(Segment::is_filler));
    }

    #[test]
    fn test_seven_prizes_layout() {
        let prizes: Vec<_> = [800, 800, 500, 1000, 800, 500, 500]
            .iter()
            .enumerate()
            .map(|(i, bp)| prize(i as i32 + 1, *bp))
            .collect();
        let wheel = build_wheel(&prizes);

        // 顺序: 4(1000), 1, 2, 5 (800), 3, 6, 7 (500)；填充位置 0, 4, 2
        assert_eq!(
            layout(&wheel),
            vec![
                Some(4),
                None,
                Some(1),
                Some(2),
                None,
                Some(5),
                Some(3),
                None,
                Some(6),
                Some(7),
            ]
        );
    }

    #[test]
    fn test_interleaved_fillers_are_capped() {
        for n in 1..40 {
            let prizes: Vec<_> = (1..=n).map(|i| prize(i, 100)).collect();
            let wheel = build_wheel(&prizes);
            let real = wheel.iter().filter(|s| !s.is_filler()).count();
            let fillers = wheel.len() - real;
            assert_eq!(real, n as usize);
            assert!(wheel.len() >= MIN_SEGMENTS);
            if real + MAX_INTERLEAVED_FILLERS >= MIN_SEGMENTS {
                assert!(fillers <= MAX_INTERLEAVED_FILLERS, "n={n}");
            }
            assert!(!wheel[0].is_filler());
        }
    }

    #[test]
    fn test_select_landing_slices() {
        let wheel = build_wheel(&[prize(1, 500)]);
        // 8 格，每格 45 度；不旋转时指针指向第 0 格
        assert_eq!(select_landing(&wheel, 0.0).unwrap().0, 0);
        // 顺时针转 10 度，指针落在最后一格
        assert_eq!(select_landing(&wheel, 10.0).unwrap().0, 7);
        assert_eq!(select_landing(&wheel, 360.0 * 7.0 + 350.0).unwrap().0, 0);
        assert_eq!(select_landing(&wheel, 360.0 - 45.0 - 1.0).unwrap().0, 1);
        assert!(select_landing(&[], 10.0).is_none());
        assert!(select_landing(&wheel, f64::NAN).is_none());
    }

    #[test]
    fn test_spin_rotation_range() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..1000 {
            let r = spin_rotation(&mut rng, 90.0);
            assert!(r >= 90.0 + 5.0 * 360.0);
            assert!(r < 90.0 + 11.0 * 360.0);
        }
    }

    #[test]
    fn test_landing_is_uniform_over_segments() {
        let wheel = build_wheel(&[prize(1, 9000), prize(2, 100)]);
        let mut hits = vec![0usize; wheel.len()];
        let mut rng = StdRng::seed_from_u64(42);
        let mut rotation = 0.0;
        for _ in 0..80_000 {
            rotation = spin_rotation(&mut rng, rotation % 360.0);
            hits[select_landing(&wheel, rotation).unwrap().0] += 1;
        }
        let expected = 80_000 / wheel.len();
        for h in hits {
            assert!(h.abs_diff(expected) < expected / 10, "{h} vs {expected}");
        }
    }

    struct Fixture {
        clock: FixedClock,
        wheel: WheelService,
        winners: WinnerService,
        user_id: i32,
    }

    async fn fixture() -> Fixture {
        let pool = memory_pool().await;
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 9, 1, 10, 0, 0).unwrap());
        let shared: SharedClock = Arc::new(clock.clone());
        let prizes = PrizeService::new(pool.clone(), shared.clone());
        let users = UserService::new(pool.clone(), shared.clone());
        let winners = WinnerService::new(pool.clone(), shared.clone());
        let eligibility =
            EligibilityService::new(pool, shared, EligibilityRules::new(0, 8).unwrap());

        prizes
            .create(CreatePrizeRequest {
                name: "Power Bank".into(),
                probability: 5.0,
                quantity: 1,
                is_active: None,
            })
            .await
            .unwrap();
        let user_id = users
            .register(RegisterUserRequest {
                phone: "20123456".into(),
                first_name: "Amine".into(),
                last_name: "Trabelsi".into(),
            })
            .await
            .unwrap()
            .id;

        Fixture {
            clock,
            wheel: WheelService::new(prizes, users, eligibility, winners.clone()),
            winners,
            user_id,
        }
    }

    #[tokio::test]
    async fn test_filler_landing_persists_nothing() {
        let f = fixture().await;
        for _ in 0..3 {
            // 10 度落在最后一个填充格
            let spin = f.wheel.spin_to(f.user_id, 10.0).await.unwrap();
            assert!(spin.landed.is_filler());
            assert!(spin.winner.is_none());
        }
        assert_eq!(f.winners.play_count(f.user_id).await.unwrap(), 0);
        assert!(f.wheel.eligibility(f.user_id).await.allowed);
    }

    #[tokio::test]
    async fn test_prize_landing_records_and_locks_until_tomorrow() {
        let f = fixture().await;
        let spin = f.wheel.spin_to(f.user_id, 0.0).await.unwrap();
        assert_eq!(spin.segment_index, 0);
        let winner = spin.winner.expect("winner recorded");
        assert!(!winner.is_final_winner);
        assert_eq!(f.winners.play_count(f.user_id).await.unwrap(), 1);

        let status = f.wheel.eligibility(f.user_id).await;
        assert!(!status.allowed);
        assert_eq!(
            status.retry_after,
            Some(Utc.with_ymd_and_hms(2025, 9, 2, 8, 0, 0).unwrap())
        );
        assert!(matches!(
            f.wheel.spin_to(f.user_id, 0.0).await,
            Err(AppError::Conflict(_))
        ));

        f.clock.set(Utc.with_ymd_and_hms(2025, 9, 2, 0, 0, 1).unwrap());
        assert!(f.wheel.spin(f.user_id, 0.0).await.is_ok());
    }

    #[tokio::test]
    async fn test_spin_unknown_user() {
        let f = fixture().await;
        assert!(matches!(
            f.wheel.spin(999, 0.0).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            f.wheel.spin(f.user_id, f64::INFINITY).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_wheel_layout_from_catalog() {
        let f = fixture().await;
        let wheel = f.wheel.wheel().await.unwrap();
        assert_eq!(wheel.segments.len(), MIN_SEGMENTS);
        assert_eq!(wheel.segment_angle, 45.0);
    }
}
