use crate::database::DbPool;
use crate::entities::{PaymentStatus, contribution_entity as contributions, order_entity as orders};
use crate::error::AppResult;
use crate::models::{ANONYMOUS_FAN, LeaderboardEntry, Timeframe};
use crate::services::creator_service::find_active_by_handle;
use chrono::{DateTime, Duration, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Select};
use std::collections::HashMap;

pub const LEADERBOARD_SIZE: usize = 10;

/// One completed payment attributed to a fan.
#[derive(Debug, Clone)]
pub struct FanPayment {
    pub fan_name: Option<String>,
    pub amount: i64,
    pub currency: String,
}

pub fn window_start(timeframe: Timeframe, now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    match timeframe {
        Timeframe::Week => Some(now - Duration::days(7)),
        Timeframe::Month => Some(now - Duration::days(30)),
        Timeframe::AllTime => None,
    }
}

/// Sums payments per fan name and returns the top fans, highest total first.
/// Nameless payments share the `Anonymous` bucket; each bucket keeps the
/// currency of the first payment it sees, in iteration order.
pub fn rank(payments: impl IntoIterator<Item = FanPayment>) -> Vec<LeaderboardEntry> {
    let mut buckets: HashMap<String, (i64, String)> = HashMap::new();
    for payment in payments {
        let name = payment
            .fan_name
            .filter(|n| !n.trim().is_empty())
            .unwrap_or_else(|| ANONYMOUS_FAN.to_string());
        buckets
            .entry(name)
            .and_modify(|(total, _)| *total += payment.amount)
            .or_insert((payment.amount, payment.currency));
    }

    let mut totals: Vec<(String, i64, String)> = buckets
        .into_iter()
        .map(|(name, (total, currency))| (name, total, currency))
        .collect();
    totals.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    totals
        .into_iter()
        .take(LEADERBOARD_SIZE)
        .enumerate()
        .map(|(i, (fan_name, total_amount, currency))| LeaderboardEntry {
            rank: i as u32 + 1,
            fan_name,
            total_amount,
            currency,
        })
        .collect()
}

#[derive(Clone)]
pub struct LeaderboardService {
    pool: DbPool,
}

impl LeaderboardService {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub async fn leaderboard(
        &self,
        handle: &str,
        timeframe: Timeframe,
        now: DateTime<Utc>,
    ) -> AppResult<Vec<LeaderboardEntry>> {
        let creator = find_active_by_handle(&self.pool, handle).await?;
        let since = window_start(timeframe, now);

        let order_query = since_filter(
            orders::Entity::find()
                .filter(orders::Column::CreatorId.eq(creator.id))
                .filter(orders::Column::Status.eq(PaymentStatus::Completed)),
            orders::Column::CreatedAt,
            since,
        );
        let contribution_query = since_filter(
            contributions::Entity::find()
                .filter(contributions::Column::CreatorId.eq(creator.id))
                .filter(contributions::Column::Status.eq(PaymentStatus::Completed)),
            contributions::Column::CreatedAt,
            since,
        );

        let mut payments: Vec<FanPayment> = order_query
            .order_by_asc(orders::Column::CreatedAt)
            .all(&self.pool)
            .await?
            .into_iter()
            .map(|o| FanPayment {
                fan_name: o.fan_name,
                amount: o.total_amount,
                currency: o.currency,
            })
            .collect();
        payments.extend(
            contribution_query
                .order_by_asc(contributions::Column::CreatedAt)
                .all(&self.pool)
                .await?
                .into_iter()
                .map(|c| FanPayment {
                    fan_name: c.fan_name,
                    amount: c.amount,
                    currency: c.currency,
                }),
        );
        // orders come before contributions when picking a bucket's currency
        Ok(rank(payments))
    }
}

fn since_filter<E, C>(query: Select<E>, column: C, since: Option<DateTime<Utc>>) -> Select<E>
where
    E: sea_orm::EntityTrait,
    C: ColumnTrait,
{
    match since {
        Some(start) => query.filter(column.gte(start)),
        None => query,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::test_pool;
    use crate::error::AppError;
    use crate::services::test_support::*;

    fn payment(name: Option<&str>, amount: i64) -> FanPayment {
        FanPayment {
            fan_name: name.map(str::to_string),
            amount,
            currency: "USD".to_string(),
        }
    }

    #[test]
    fn test_rank_orders_and_breaks_ties_by_name() {
        let entries = rank(vec![
            payment(Some("Zoe"), 2000),
            payment(Some("Cara"), 700),
            payment(Some("Abe"), 1500),
            payment(Some("Abe"), 500),
        ]);
        let names: Vec<&str> = entries.iter().map(|e| e.fan_name.as_str()).collect();
        assert_eq!(names, vec!["Abe", "Zoe", "Cara"]);
        assert_eq!(
            entries.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
        assert_eq!(entries[2].total_amount, 700);
    }

    #[test]
    fn test_rank_merges_anonymous_fans() {
        let entries = rank(vec![
            payment(None, 300),
            payment(Some("  "), 200),
            payment(Some("Sam"), 400),
        ]);
        assert_eq!(entries[0].fan_name, "Anonymous");
        assert_eq!(entries[0].total_amount, 500);
        assert_eq!(entries[1].fan_name, "Sam");
    }

    #[test]
    fn test_rank_limits_to_ten_and_keeps_first_currency() {
        let mut payments: Vec<FanPayment> = (0..15)
            .map(|i| payment(Some(&format!("fan{i:02}")), 100 + i))
            .collect();
        payments.push(FanPayment {
            currency: "EUR".to_string(),
            ..payment(Some("fan14"), 1)
        });
        let entries = rank(payments);
        assert_eq!(entries.len(), 10);
        assert!(entries.windows(2).all(|w| w[0].total_amount >= w[1].total_amount));
        assert_eq!(entries[0].fan_name, "fan14");
        assert_eq!(entries[0].total_amount, 115);
        assert_eq!(entries[0].currency, "USD");
        assert_eq!(entries[9].rank, 10);
    }

    #[test]
    fn test_window_start() {
        let now = utc(2025, 3, 31, 12);
        assert_eq!(window_start(Timeframe::Week, now), Some(utc(2025, 3, 24, 12)));
        assert_eq!(window_start(Timeframe::Month, now), Some(utc(2025, 3, 1, 12)));
        assert_eq!(window_start(Timeframe::AllTime, now), None);
    }

    #[tokio::test]
    async fn test_leaderboard_from_orders_and_contributions() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let item = insert_spoil_item(&db, creator.id, 10_000, 1000).await;
        let now = utc(2025, 3, 31, 12);

        let order = |fan_name, total_amount, created_at| OrderSeed {
            creator_id: creator.id,
            gift_id: gift.id,
            fan_name,
            total_amount,
            currency: "USD",
            status: PaymentStatus::Completed,
            created_at,
        };
        insert_order(&db, order(Some("Alice"), 2000, utc(2025, 3, 30, 0))).await;
        insert_order(&db, order(Some("Bob"), 1000, utc(2025, 3, 29, 0))).await;
        insert_contribution(&db, creator.id, item.id, Some("Bob"), 1000, utc(2025, 1, 5, 0)).await;
        insert_order(&db, order(Some("Cara"), 700, utc(2025, 3, 28, 0))).await;
        insert_order(
            &db,
            OrderSeed {
                status: PaymentStatus::Refunded,
                ..order(Some("Dan"), 9000, utc(2025, 3, 30, 0))
            },
        )
        .await;

        let service = LeaderboardService::new(db);

        let all_time = service
            .leaderboard("conor", Timeframe::AllTime, now)
            .await
            .unwrap();
        let summary: Vec<(u32, &str, i64)> = all_time
            .iter()
            .map(|e| (e.rank, e.fan_name.as_str(), e.total_amount))
            .collect();
        assert_eq!(
            summary,
            vec![(1, "Alice", 2000), (2, "Bob", 2000), (3, "Cara", 700)]
        );

        let week = service
            .leaderboard("conor", Timeframe::Week, now)
            .await
            .unwrap();
        assert_eq!(week[1].fan_name, "Bob");
        assert_eq!(week[1].total_amount, 1000);

        let missing = service.leaderboard("nobody", Timeframe::Week, now).await;
        assert!(matches!(missing, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_leaderboard_currency_prefers_orders() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        let item = insert_spoil_item(&db, creator.id, 10_000, 1000).await;

        insert_contribution(&db, creator.id, item.id, Some("Eve"), 100, utc(2025, 1, 5, 0)).await;
        insert_order(
            &db,
            OrderSeed {
                creator_id: creator.id,
                gift_id: gift.id,
                fan_name: Some("Eve"),
                total_amount: 500,
                currency: "EUR",
                status: PaymentStatus::Completed,
                created_at: utc(2025, 3, 27, 0),
            },
        )
        .await;

        let entries = LeaderboardService::new(db)
            .leaderboard("conor", Timeframe::AllTime, utc(2025, 3, 31, 12))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].total_amount, 600);
        assert_eq!(entries[0].currency, "EUR");
    }
}
