use crate::database::DbPool;
use crate::entities::{
    PaymentStatus, SubscriptionStatus, order_entity as orders, tier_entity as tiers,
    tier_subscription_entity as tier_subscriptions,
};
use crate::error::{AppError, AppResult};
use crate::models::MonthlyEarnings;
use crate::services::creator_service::owned_creator;
use crate::utils::Identity;
use crate::utils::DEFAULT_CURRENCY;
use chrono::{DateTime, Duration, TimeZone, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};
use std::collections::HashMap;

/// Share of gross earnings kept by the platform.
pub const PLATFORM_FEE_PERCENT: i64 = 5;

/// First and last millisecond of a calendar month in UTC.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(DateTime<Utc>, DateTime<Utc>)> {
    if !(1..=12).contains(&month) {
        return Err(AppError::ValidationError(
            "Month must be between 1 and 12".to_string(),
        ));
    }
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let start = Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::ValidationError(format!("Invalid year: {year}")))?;
    let next = Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| AppError::ValidationError(format!("Invalid year: {year}")))?;
    Ok((start, next - Duration::milliseconds(1)))
}

/// Share of `price` covered by the overlap of a billing period with a month,
/// rounded half-up. All bounds are epoch milliseconds.
pub fn prorate(price: i64, period: (i64, i64), month: (i64, i64)) -> i64 {
    let period_ms = period.1 - period.0;
    if period_ms <= 0 {
        return 0;
    }
    let overlap_start = period.0.max(month.0);
    let overlap_end = period.1.min(month.1);
    if overlap_end <= overlap_start {
        return 0;
    }
    let overlap_ms = i128::from(overlap_end - overlap_start);
    let period_ms = i128::from(period_ms);
    ((i128::from(price) * overlap_ms + period_ms / 2) / period_ms) as i64
}

/// `PLATFORM_FEE_PERCENT` of `total`, rounded half-up.
pub fn platform_fee(total: i64) -> i64 {
    ((i128::from(total) * i128::from(PLATFORM_FEE_PERCENT) + 50) / 100) as i64
}

impl MonthlyEarnings {
    pub fn from_totals(
        gift_earnings: i64,
        subscription_earnings: i64,
        gift_count: u64,
        subscription_count: u64,
        currency: String,
    ) -> Self {
        let total_earnings = gift_earnings + subscription_earnings;
        let platform_fee = platform_fee(total_earnings);
        Self {
            total_earnings,
            gift_earnings,
            subscription_earnings,
            platform_fee,
            net_earnings: total_earnings - platform_fee,
            gift_count,
            subscription_count,
            currency,
        }
    }
}

#[derive(Clone)]
pub struct EarningsService {
    pool: DbPool,
}

impl EarningsService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Earnings of the caller's own creator profile.
    pub async fn earnings_for(
        &self,
        identity: &Identity,
        year: i32,
        month: u32,
    ) -> AppResult<MonthlyEarnings> {
        let creator = owned_creator(&self.pool, identity).await?;
        self.monthly_earnings(creator.id, year, month).await
    }

    pub async fn monthly_earnings(
        &self,
        creator_id: i64,
        year: i32,
        month: u32,
    ) -> AppResult<MonthlyEarnings> {
        let (start, end) = month_bounds(year, month)?;

        let completed_orders = orders::Entity::find()
            .filter(orders::Column::CreatorId.eq(creator_id))
            .filter(orders::Column::Status.eq(PaymentStatus::Completed))
            .filter(orders::Column::CreatedAt.between(start, end))
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?;

        let gift_earnings: i64 = completed_orders.iter().map(|o| o.total_amount).sum();
        let currency = completed_orders
            .first()
            .map(|o| o.currency.clone())
            .unwrap_or_else(|| DEFAULT_CURRENCY.to_string());

        let subscriptions = tier_subscriptions::Entity::find()
            .filter(tier_subscriptions::Column::CreatorId.eq(creator_id))
            .filter(tier_subscriptions::Column::Status.eq(SubscriptionStatus::Active))
            .filter(tier_subscriptions::Column::CurrentPeriodStart.between(start, end))
            .all(&self.pool)
            .await?;

        let tier_ids: Vec<i64> = subscriptions.iter().map(|s| s.tier_id).collect();
        let prices: HashMap<i64, i64> = if tier_ids.is_empty() {
            HashMap::new()
        } else {
            tiers::Entity::find()
                .filter(tiers::Column::Id.is_in(tier_ids))
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|t| (t.id, t.price))
                .collect()
        };

        let month_ms = (start.timestamp_millis(), end.timestamp_millis());
        let subscription_earnings: i64 = subscriptions
            .iter()
            .map(|s| match prices.get(&s.tier_id) {
                Some(&price) => prorate(
                    price,
                    (
                        s.current_period_start.timestamp_millis(),
                        s.current_period_end.timestamp_millis(),
                    ),
                    month_ms,
                ),
                None => 0,
            })
            .sum();

        Ok(MonthlyEarnings::from_totals(
            gift_earnings,
            subscription_earnings,
            completed_orders.len() as u64,
            subscriptions.len() as u64,
            currency,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::services::test_support::*;

    #[test]
    fn test_month_bounds() {
        let (start, end) = month_bounds(2025, 2).unwrap();
        assert_eq!(start, utc(2025, 2, 1, 0));
        assert_eq!(end, utc(2025, 3, 1, 0) - Duration::milliseconds(1));

        let (_, end) = month_bounds(2024, 12).unwrap();
        assert_eq!(end, utc(2025, 1, 1, 0) - Duration::milliseconds(1));

        assert!(month_bounds(2025, 0).is_err());
        assert!(month_bounds(2025, 13).is_err());
    }

    #[test]
    fn test_prorate() {
        // full containment
        assert_eq!(prorate(2000, (100, 200), (0, 1000)), 2000);
        // half overlap
        assert_eq!(prorate(2000, (500, 1500), (0, 1000)), 1000);
        // no overlap
        assert_eq!(prorate(2000, (2000, 3000), (0, 1000)), 0);
        // zero-length period
        assert_eq!(prorate(2000, (500, 500), (0, 1000)), 0);
        // 999 * 1/2 = 499.5 rounds up
        assert_eq!(prorate(999, (0, 2), (1, 10)), 500);
    }

    #[test]
    fn test_platform_fee() {
        assert_eq!(platform_fee(0), 0);
        assert_eq!(platform_fee(2700), 135);
        assert_eq!(platform_fee(10), 1); // 0.5 rounds up
        assert_eq!(platform_fee(9), 0);
        assert_eq!(platform_fee(i64::MAX), 461_168_601_842_738_790);
        let e = MonthlyEarnings::from_totals(333, 0, 1, 0, "USD".to_string());
        assert_eq!(e.platform_fee + e.net_earnings, e.total_earnings);
    }

    #[tokio::test]
    async fn test_empty_month() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let earnings = EarningsService::new(db)
            .monthly_earnings(creator.id, 2025, 3)
            .await
            .unwrap();
        assert_eq!(
            earnings,
            MonthlyEarnings::from_totals(0, 0, 0, 0, "USD".to_string())
        );
    }

    #[tokio::test]
    async fn test_earnings_require_own_profile() {
        let db = test_pool().await;
        insert_creator(&db, "user_1", "conor").await;
        let service = EarningsService::new(db);
        assert!(service.earnings_for(&identity("user_1"), 2025, 3).await.is_ok());
        assert!(matches!(
            service.earnings_for(&identity("user_2"), 2025, 3).await,
            Err(AppError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_gift_and_subscription_earnings() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let other = insert_creator(&db, "user_2", "other").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let tier = insert_tier(&db, creator.id, 2000).await;

        let seed = |status, created_at| OrderSeed {
            creator_id: creator.id,
            gift_id: gift.id,
            fan_name: Some("Sam"),
            total_amount: 700,
            currency: "EUR",
            status,
            created_at,
        };
        insert_order(&db, seed(PaymentStatus::Completed, utc(2025, 3, 10, 12))).await;
        // not completed, or outside the month
        insert_order(&db, seed(PaymentStatus::Pending, utc(2025, 3, 11, 12))).await;
        insert_order(&db, seed(PaymentStatus::Completed, utc(2025, 4, 2, 12))).await;

        insert_subscription(
            &db,
            creator.id,
            tier.id,
            "sub_full",
            (utc(2025, 3, 1, 0), utc(2025, 3, 31, 0)),
            SubscriptionStatus::Active,
        )
        .await;
        insert_subscription(
            &db,
            creator.id,
            tier.id,
            "sub_canceled",
            (utc(2025, 3, 1, 0), utc(2025, 3, 31, 0)),
            SubscriptionStatus::Canceled,
        )
        .await;
        let other_tier = insert_tier(&db, other.id, 5000).await;
        insert_subscription(
            &db,
            other.id,
            other_tier.id,
            "sub_other",
            (utc(2025, 3, 1, 0), utc(2025, 3, 31, 0)),
            SubscriptionStatus::Active,
        )
        .await;

        let earnings = EarningsService::new(db)
            .monthly_earnings(creator.id, 2025, 3)
            .await
            .unwrap();

        assert_eq!(earnings.gift_earnings, 700);
        assert_eq!(earnings.subscription_earnings, 2000);
        assert_eq!(earnings.total_earnings, 2700);
        assert_eq!(earnings.platform_fee, 135);
        assert_eq!(earnings.net_earnings, 2565);
        assert_eq!(earnings.gift_count, 1);
        assert_eq!(earnings.subscription_count, 1);
        assert_eq!(earnings.currency, "EUR");
    }

    #[tokio::test]
    async fn test_period_spilling_into_next_month_is_prorated() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let tier = insert_tier(&db, creator.id, 3000).await;
        // 10 days in April, 20 days in May
        insert_subscription(
            &db,
            creator.id,
            tier.id,
            "sub_split",
            (utc(2025, 4, 21, 0), utc(2025, 5, 21, 0)),
            SubscriptionStatus::Active,
        )
        .await;

        let service = EarningsService::new(db);
        let april = service.monthly_earnings(creator.id, 2025, 4).await.unwrap();
        assert_eq!(april.subscription_earnings, 1000);
        assert_eq!(april.subscription_count, 1);

        // period started in April, so May does not count it
        let may = service.monthly_earnings(creator.id, 2025, 5).await.unwrap();
        assert_eq!(may.subscription_earnings, 0);
        assert_eq!(may.subscription_count, 0);
    }

    #[tokio::test]
    async fn test_invalid_month() {
        let db = test_pool().await;
        let result = EarningsService::new(db).monthly_earnings(1, 2025, 13).await;
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
