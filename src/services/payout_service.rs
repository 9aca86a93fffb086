use crate::database::DbPool;
use crate::entities::creator_entity as creators;
use crate::error::AppResult;
use crate::models::PayoutDigestResponse;
use crate::services::creator_service::owned_creator;
use crate::services::{EarningsService, NotificationService};
use crate::utils::Identity;
use chrono::{DateTime, Datelike, Utc};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter, QueryOrder};

/// The calendar month before the one containing `now`.
pub fn previous_month(now: DateTime<Utc>) -> (i32, u32) {
    match now.month() {
        1 => (now.year() - 1, 12),
        m => (now.year(), m - 1),
    }
}

#[derive(Clone)]
pub struct PayoutService {
    pool: DbPool,
    earnings: EarningsService,
    notifications: NotificationService,
}

impl PayoutService {
    pub fn new(pool: DbPool, earnings: EarningsService, notifications: NotificationService) -> Self {
        Self {
            pool,
            earnings,
            notifications,
        }
    }

    /// Emails the caller their earnings summary for one month.
    pub async fn send_digest(
        &self,
        identity: &Identity,
        year: i32,
        month: u32,
    ) -> AppResult<PayoutDigestResponse> {
        let creator = owned_creator(&self.pool, identity).await?;
        let earnings = self
            .earnings
            .monthly_earnings(creator.id, year, month)
            .await?;
        let queued = self
            .notifications
            .payout_digest(&creator, year, month, &earnings);

        Ok(PayoutDigestResponse {
            queued,
            recipient: creator.email,
            earnings,
        })
    }

    /// Sends last month's digest to every active creator with an email and
    /// something earned. Returns how many creators were digested.
    pub async fn run_monthly(&self, now: DateTime<Utc>) -> AppResult<usize> {
        let (year, month) = previous_month(now);
        let active = creators::Entity::find()
            .filter(creators::Column::Active.eq(true))
            .filter(creators::Column::Email.is_not_null())
            .order_by_asc(creators::Column::Id)
            .all(&self.pool)
            .await?;

        let mut digested = 0;
        for creator in active {
            let earnings = match self.earnings.monthly_earnings(creator.id, year, month).await {
                Ok(earnings) => earnings,
                Err(e) => {
                    log::error!("Failed to compute earnings for creator {}: {e}", creator.id);
                    continue;
                }
            };
            if earnings.total_earnings == 0 {
                continue;
            }
            self.notifications
                .payout_digest(&creator, year, month, &earnings);
            digested += 1;
        }
        log::info!("Payout digest for {year}-{month:02}: {digested} creators");
        Ok(digested)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{AppConfig, EmailConfig};
    use crate::database::test_pool;
    use crate::entities::{PaymentStatus, SubscriptionStatus};
    use crate::error::AppError;
    use crate::external::EmailService;
    use crate::services::test_support::*;

    fn service(pool: DbPool) -> PayoutService {
        let notifications = NotificationService::new(
            EmailService::new(EmailConfig::default()),
            AppConfig::default(),
        );
        PayoutService::new(pool.clone(), EarningsService::new(pool), notifications)
    }

    #[test]
    fn test_previous_month() {
        assert_eq!(previous_month(utc(2025, 3, 1, 0)), (2025, 2));
        assert_eq!(previous_month(utc(2025, 1, 1, 6)), (2024, 12));
        assert_eq!(previous_month(utc(2025, 12, 31, 23)), (2025, 11));
    }

    #[tokio::test]
    async fn test_send_digest_for_owner() {
        let db = test_pool().await;
        let creator = insert_creator(&db, "user_1", "conor").await;
        let gift = insert_gift(&db, creator.id, 700).await;
        insert_order(
            &db,
            OrderSeed {
                creator_id: creator.id,
                gift_id: gift.id,
                fan_name: Some("Sam"),
                total_amount: 2000,
                currency: "USD",
                status: PaymentStatus::Completed,
                created_at: utc(2025, 2, 10, 12),
            },
        )
        .await;

        let service = service(db);
        let digest = service
            .send_digest(&identity("user_1"), 2025, 2)
            .await
            .unwrap();
        assert!(!digest.queued);
        assert_eq!(digest.recipient.as_deref(), Some("user_1@example.com"));
        assert_eq!(digest.earnings.total_earnings, 2000);
        assert_eq!(digest.earnings.platform_fee, 100);

        assert!(matches!(
            service.send_digest(&identity("stranger"), 2025, 2).await,
            Err(AppError::NotFound(_))
        ));
        assert!(matches!(
            service.send_digest(&identity("user_1"), 2025, 13).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn test_run_monthly_skips_idle_creators() {
        let db = test_pool().await;
        let busy = insert_creator(&db, "user_1", "conor").await;
        insert_creator(&db, "user_2", "idle").await;
        let tier = insert_tier(&db, busy.id, 1000).await;
        insert_subscription(
            &db,
            busy.id,
            tier.id,
            "sub_1",
            (utc(2025, 2, 1, 0), utc(2025, 3, 1, 0)),
            SubscriptionStatus::Active,
        )
        .await;

        let digested = service(db).run_monthly(utc(2025, 3, 1, 0)).await.unwrap();
        assert_eq!(digested, 1);
    }
}
